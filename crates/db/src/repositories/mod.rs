//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument. Helpers that must run inside
//! a caller's transaction take `&mut SqliteConnection` instead.

pub mod analytics_repo;
pub mod customer_repo;
pub mod delivery_note_repo;
pub mod delivery_repo;
pub mod interaction_repo;
pub mod product_repo;
pub mod prospect_repo;
pub mod sale_repo;
pub mod session_repo;
pub mod user_repo;

pub use analytics_repo::AnalyticsRepo;
pub use customer_repo::CustomerRepo;
pub use delivery_note_repo::DeliveryNoteRepo;
pub use delivery_repo::DeliveryRepo;
pub use interaction_repo::InteractionRepo;
pub use product_repo::ProductRepo;
pub use prospect_repo::ProspectRepo;
pub use sale_repo::SaleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
