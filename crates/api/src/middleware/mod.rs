//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: the user behind a Bearer access token.
//! - [`rbac::RequireAuth`]: any authenticated user.
//! - [`rbac::RequireAdmin`]: the `admin` role.

pub mod auth;
pub mod rbac;
