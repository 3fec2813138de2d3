//! Authentication primitives.
//!
//! - [`jwt`] issues and verifies bearer tokens.
//! - [`extractor`] turns a request's `Authorization` header into an [`AuthUser`].
//! - [`password`] hashes and checks account passwords.

pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::AuthUser;
pub use jwt::{issue_token, verify_token, Claims, JwtConfig};
