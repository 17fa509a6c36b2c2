//! Storage port traits.
//!
//! The infra crate provides two implementations of each port: an in-memory
//! store for dev/test and a Postgres store. Implementations own the two
//! race-sensitive guarantees of this system:
//!
//! - email uniqueness is enforced at the store (constraint or single lock),
//!   never by an application-level check-then-insert;
//! - invite redemption is a single atomic match-and-mutate that also creates
//!   the new admin user, so two concurrent redemptions of one code can never
//!   both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use folio_core::{PortfolioId, ProjectId, UserId};

use crate::error::AccountError;
use crate::invite::{InviteCode, InviteWithParties};
use crate::portfolio::{Portfolio, PortfolioPatch};
use crate::project::{Project, ProjectPatch};
use crate::user::{NewUser, User, UserPatch};

pub type StoreResult<T> = Result<T, AccountError>;

/// Users and the invite ledger.
///
/// The two live behind one port because `redeem_invite` must mutate both
/// atomically.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert a new user. Fails with [`AccountError::DuplicateEmail`] when
    /// the email is already registered.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Lookup by canonical (lowercased) email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Apply a patch. Fails with [`AccountError::NotFound`] when the user is
    /// absent, [`AccountError::DuplicateEmail`] when an email change collides.
    async fn update_user(
        &self,
        id: UserId,
        patch: UserPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<User>;

    async fn delete_user(&self, id: UserId) -> StoreResult<()>;

    /// Persist a freshly issued invite.
    async fn insert_invite(&self, invite: InviteCode) -> StoreResult<InviteCode>;

    /// Atomically consume a consumable invite and create the new admin user.
    ///
    /// Fails with [`AccountError::InvalidOrExpiredInvite`] when no code
    /// matches `is_used = false AND expires_at > now`, and with
    /// [`AccountError::DuplicateEmail`] when the new admin's email collides
    /// (in which case the invite stays unconsumed).
    async fn redeem_invite(
        &self,
        code: &str,
        now: DateTime<Utc>,
        new_admin: NewUser,
    ) -> StoreResult<User>;

    /// Full ledger, newest first, issuer/redeemer resolved.
    async fn list_invites(&self) -> StoreResult<Vec<InviteWithParties>>;
}

/// Portfolio documents.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn insert(&self, portfolio: Portfolio) -> StoreResult<Portfolio>;

    async fn find_by_owner(&self, owner: UserId) -> StoreResult<Option<Portfolio>>;

    async fn get(&self, id: PortfolioId) -> StoreResult<Option<Portfolio>>;

    /// Public gallery: every portfolio, newest first.
    async fn list_all(&self) -> StoreResult<Vec<Portfolio>>;

    async fn update_by_owner(
        &self,
        owner: UserId,
        patch: PortfolioPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Portfolio>;

    async fn delete_by_owner(&self, owner: UserId) -> StoreResult<()>;

    /// Admin-only removal by id, regardless of owner.
    async fn delete(&self, id: PortfolioId) -> StoreResult<()>;
}

/// Project entries. Every accessor is pre-filtered to the owner.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert(&self, project: Project) -> StoreResult<Project>;

    async fn list_by_owner(&self, owner: UserId) -> StoreResult<Vec<Project>>;

    async fn get_owned(&self, id: ProjectId, owner: UserId) -> StoreResult<Option<Project>>;

    async fn update_owned(
        &self,
        id: ProjectId,
        owner: UserId,
        patch: ProjectPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Project>;

    async fn delete_owned(&self, id: ProjectId, owner: UserId) -> StoreResult<()>;
}
