//! Domain rules for the MIMO business system.
//!
//! This crate has no I/O. It holds the shared id/timestamp types, the
//! domain error type, and the small deterministic rules (stock
//! classification, CRM stage table, kanban statuses, sale totals) used by
//! both the repository and HTTP layers.

pub mod customers;
pub mod error;
pub mod kanban;
pub mod metrics;
pub mod pagination;
pub mod pipeline;
pub mod roles;
pub mod sales;
pub mod stock;
pub mod types;
pub mod validation;
