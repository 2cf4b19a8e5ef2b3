//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod analytics;
pub mod customer;
pub mod delivery;
pub mod delivery_note;
pub mod interaction;
pub mod product;
pub mod prospect;
pub mod sale;
pub mod session;
pub mod user;
