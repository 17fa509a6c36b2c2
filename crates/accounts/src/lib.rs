//! `folio-accounts` — account, invite, portfolio and project records.
//!
//! This crate holds the fixed-shape entity records, the pure validation that
//! runs before any persistence call, and the storage port traits the infra
//! crate implements. No HTTP, no SQL.

pub mod error;
pub mod invite;
pub mod portfolio;
pub mod project;
pub mod store;
pub mod user;

pub use error::AccountError;
pub use invite::{generate_code, InviteCode, InviteWithParties, DEFAULT_INVITE_TTL_HOURS};
pub use portfolio::{NewPortfolio, Portfolio, PortfolioPatch};
pub use project::{NewProject, Project, ProjectPatch};
pub use store::{IdentityStore, PortfolioStore, ProjectStore, StoreResult};
pub use user::{NewUser, ProfilePatch, RegisterInput, User, UserPatch};
