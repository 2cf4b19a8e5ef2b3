pub mod admin;
pub mod analytics;
pub mod auth;
pub mod crm;
pub mod customers;
pub mod deliveries;
pub mod delivery_notes;
pub mod products;
pub mod sales;
