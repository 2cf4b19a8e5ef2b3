//! MIMO API server library.
//!
//! Exposes configuration, state, error handling, authentication and the
//! route tree so the binary and the integration tests share one router.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
