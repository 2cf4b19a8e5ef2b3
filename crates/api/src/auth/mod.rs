//! Authentication primitives.
//!
//! - [`password`]: Argon2id hashing and verification of user passwords.
//! - [`jwt`]: access tokens and the hashed refresh tokens stored in sessions.

pub mod jwt;
pub mod password;
