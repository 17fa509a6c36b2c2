//! `folio-infra` — storage adapters for the account ports.
//!
//! Two interchangeable backends:
//! - [`store::memory`]: mutex-guarded maps for dev and tests;
//! - [`store::postgres`]: sqlx-backed Postgres (see `schema.sql` for the
//!   expected tables).
//!
//! Both uphold the same guarantees: store-level email uniqueness and atomic
//! invite redemption.

pub mod store;

pub use store::memory::{MemoryIdentityStore, MemoryPortfolioStore, MemoryProjectStore};
pub use store::postgres::{PgIdentityStore, PgPortfolioStore, PgProjectStore};
