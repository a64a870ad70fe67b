//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing, verification and temporary passwords.
//! - [`jwt`] -- JWT access tokens and opaque token helpers (refresh, password reset).

pub mod jwt;
pub mod password;
