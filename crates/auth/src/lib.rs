//! `folio-auth` — pure authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how
//! to turn a verified identity into a bearer credential and back, and how to
//! hash/verify passwords. Who may call what is decided by the API layer.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{validate_claims, SessionClaims, TokenValidationError};
pub use password::{PasswordError, PasswordHasher};
pub use roles::Role;
pub use token::{Hs256TokenService, TokenError, TokenVerifier};
