//! `folio-core` — shared identifiers and the domain error model.
//!
//! Everything in here is deterministic and dependency-light; HTTP and storage
//! concerns live in the outer crates.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{InviteId, PortfolioId, ProjectId, UserId};
