//! In-memory store backend (dev/test).
//!
//! Users and the invite ledger share one mutex so `redeem_invite` is a single
//! critical section: the consumability check, the ledger mutation and the
//! admin insert cannot interleave with a competing redemption.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use folio_accounts::{
    AccountError, IdentityStore, InviteCode, InviteWithParties, NewUser, Portfolio,
    PortfolioPatch, PortfolioStore, Project, ProjectPatch, ProjectStore, StoreResult, User,
    UserPatch,
};
use folio_core::{InviteId, PortfolioId, ProjectId, UserId};

const DELETED_USER: &str = "(deleted)";

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct IdentityInner {
    users: HashMap<UserId, User>,
    invites: HashMap<InviteId, InviteCode>,
}

impl IdentityInner {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// Mutex-guarded users + invite ledger.
#[derive(Default)]
pub struct MemoryIdentityStore {
    inner: Mutex<IdentityInner>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.email_taken(&user.email, None) {
            return Err(AccountError::DuplicateEmail);
        }
        let user = user.into_user();
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_user(
        &self,
        id: UserId,
        patch: UserPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&id) {
            return Err(AccountError::NotFound);
        }
        if let Some(email) = &patch.email {
            if inner.email_taken(email, Some(id)) {
                return Err(AccountError::DuplicateEmail);
            }
        }
        let user = inner.users.get_mut(&id).ok_or(AccountError::NotFound)?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(AccountError::NotFound)
    }

    async fn insert_invite(&self, invite: InviteCode) -> StoreResult<InviteCode> {
        let mut inner = self.inner.lock().unwrap();
        inner.invites.insert(invite.id, invite.clone());
        Ok(invite)
    }

    async fn redeem_invite(
        &self,
        code: &str,
        now: DateTime<Utc>,
        new_admin: NewUser,
    ) -> StoreResult<User> {
        let mut inner = self.inner.lock().unwrap();

        let invite_id = inner
            .invites
            .values()
            .find(|i| i.code == code && i.is_consumable(now))
            .map(|i| i.id)
            .ok_or(AccountError::InvalidOrExpiredInvite)?;

        // The duplicate-email check precedes the ledger mutation so a
        // collision leaves the invite consumable.
        if inner.email_taken(&new_admin.email, None) {
            return Err(AccountError::DuplicateEmail);
        }

        let user = new_admin.into_user();
        inner.users.insert(user.id, user.clone());

        let invite = inner.invites.get_mut(&invite_id).unwrap();
        invite.is_used = true;
        invite.used_by = Some(user.id);
        invite.used_at = Some(now);

        Ok(user)
    }

    async fn list_invites(&self) -> StoreResult<Vec<InviteWithParties>> {
        let inner = self.inner.lock().unwrap();
        let mut invites: Vec<InviteWithParties> = inner
            .invites
            .values()
            .map(|invite| {
                let issuer = inner.users.get(&invite.created_by);
                let redeemer = invite.used_by.and_then(|id| inner.users.get(&id));
                InviteWithParties {
                    invite: invite.clone(),
                    created_by_name: issuer
                        .map(|u| u.name.clone())
                        .unwrap_or_else(|| DELETED_USER.to_string()),
                    created_by_email: issuer
                        .map(|u| u.email.clone())
                        .unwrap_or_else(|| DELETED_USER.to_string()),
                    used_by_name: redeemer.map(|u| u.name.clone()),
                    used_by_email: redeemer.map(|u| u.email.clone()),
                }
            })
            .collect();
        invites.sort_by(|a, b| b.invite.created_at.cmp(&a.invite.created_at));
        Ok(invites)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Portfolios
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryPortfolioStore {
    inner: Mutex<HashMap<PortfolioId, Portfolio>>,
}

impl MemoryPortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortfolioStore for MemoryPortfolioStore {
    async fn insert(&self, portfolio: Portfolio) -> StoreResult<Portfolio> {
        let mut inner = self.inner.lock().unwrap();
        inner.insert(portfolio.id, portfolio.clone());
        Ok(portfolio)
    }

    async fn find_by_owner(&self, owner: UserId) -> StoreResult<Option<Portfolio>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.values().find(|p| p.user_id == owner).cloned())
    }

    async fn get(&self, id: PortfolioId) -> StoreResult<Option<Portfolio>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.get(&id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<Portfolio>> {
        let inner = self.inner.lock().unwrap();
        let mut portfolios: Vec<Portfolio> = inner.values().cloned().collect();
        portfolios.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(portfolios)
    }

    async fn update_by_owner(
        &self,
        owner: UserId,
        patch: PortfolioPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Portfolio> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner
            .values()
            .find(|p| p.user_id == owner)
            .map(|p| p.id)
            .ok_or(AccountError::NotFound)?;
        let current = inner.remove(&id).unwrap();
        let updated = patch.apply(current, now);
        inner.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_by_owner(&self, owner: UserId) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner
            .values()
            .find(|p| p.user_id == owner)
            .map(|p| p.id)
            .ok_or(AccountError::NotFound)?;
        inner.remove(&id);
        Ok(())
    }

    async fn delete(&self, id: PortfolioId) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.remove(&id).map(|_| ()).ok_or(AccountError::NotFound)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryProjectStore {
    inner: Mutex<HashMap<ProjectId, Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn insert(&self, project: Project) -> StoreResult<Project> {
        let mut inner = self.inner.lock().unwrap();
        inner.insert(project.id, project.clone());
        Ok(project)
    }

    async fn list_by_owner(&self, owner: UserId) -> StoreResult<Vec<Project>> {
        let inner = self.inner.lock().unwrap();
        let mut projects: Vec<Project> = inner
            .values()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.created_at);
        Ok(projects)
    }

    async fn get_owned(&self, id: ProjectId, owner: UserId) -> StoreResult<Option<Project>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.get(&id).filter(|p| p.user_id == owner).cloned())
    }

    async fn update_owned(
        &self,
        id: ProjectId,
        owner: UserId,
        patch: ProjectPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Project> {
        let mut inner = self.inner.lock().unwrap();
        match inner.get(&id) {
            Some(p) if p.user_id == owner => {}
            _ => return Err(AccountError::NotFound),
        }
        let current = inner.remove(&id).unwrap();
        let updated = patch.apply(current, now);
        inner.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete_owned(&self, id: ProjectId, owner: UserId) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        match inner.get(&id) {
            Some(p) if p.user_id == owner => {
                inner.remove(&id);
                Ok(())
            }
            _ => Err(AccountError::NotFound),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use folio_accounts::InviteCode;
    use folio_auth::Role;

    use super::*;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            id: UserId::new(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_and_leaves_one_user() {
        let store = MemoryIdentityStore::new();
        store.create_user(new_user("a@example.com", Role::User)).await.unwrap();

        let err = store
            .create_user(new_user("a@example.com", Role::User))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::DuplicateEmail);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn redeem_consumes_the_invite_exactly_once() {
        let store = MemoryIdentityStore::new();
        let issuer = store
            .create_user(new_user("admin@example.com", Role::Admin))
            .await
            .unwrap();

        let now = Utc::now();
        let invite = store
            .insert_invite(InviteCode::issue(issuer.id, 24, now))
            .await
            .unwrap();

        let admin = store
            .redeem_invite(&invite.code, now, new_user("new@example.com", Role::Admin))
            .await
            .unwrap();
        assert_eq!(admin.role, Role::Admin);

        let err = store
            .redeem_invite(&invite.code, now, new_user("other@example.com", Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::InvalidOrExpiredInvite);
    }

    #[tokio::test]
    async fn expired_invite_is_rejected_even_if_unused() {
        let store = MemoryIdentityStore::new();
        let issuer = store
            .create_user(new_user("admin@example.com", Role::Admin))
            .await
            .unwrap();

        let issued = Utc::now() - Duration::hours(48);
        let invite = store
            .insert_invite(InviteCode::issue(issuer.id, 24, issued))
            .await
            .unwrap();

        let err = store
            .redeem_invite(&invite.code, Utc::now(), new_user("new@example.com", Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::InvalidOrExpiredInvite);
    }

    #[tokio::test]
    async fn duplicate_email_during_redeem_leaves_invite_consumable() {
        let store = MemoryIdentityStore::new();
        let issuer = store
            .create_user(new_user("admin@example.com", Role::Admin))
            .await
            .unwrap();

        let now = Utc::now();
        let invite = store
            .insert_invite(InviteCode::issue(issuer.id, 24, now))
            .await
            .unwrap();

        let err = store
            .redeem_invite(&invite.code, now, new_user("admin@example.com", Role::Admin))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::DuplicateEmail);

        // The failed attempt must not burn the code.
        store
            .redeem_invite(&invite.code, now, new_user("fresh@example.com", Role::Admin))
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_redemptions_produce_exactly_one_admin() {
        let store = Arc::new(MemoryIdentityStore::new());
        let issuer = store
            .create_user(new_user("admin@example.com", Role::Admin))
            .await
            .unwrap();

        let now = Utc::now();
        let invite = store
            .insert_invite(InviteCode::issue(issuer.id, 24, now))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..2 {
            let store = store.clone();
            let code = invite.code.clone();
            handles.push(tokio::spawn(async move {
                store
                    .redeem_invite(&code, now, new_user(&format!("racer{i}@example.com"), Role::Admin))
                    .await
            }));
        }

        let mut successes = 0;
        let mut invite_failures = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AccountError::InvalidOrExpiredInvite) => invite_failures += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(invite_failures, 1);

        let admins = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.role == Role::Admin && u.email.starts_with("racer"))
            .count();
        assert_eq!(admins, 1);
    }

    #[tokio::test]
    async fn email_change_collision_is_rejected() {
        let store = MemoryIdentityStore::new();
        let a = store.create_user(new_user("a@example.com", Role::User)).await.unwrap();
        store.create_user(new_user("b@example.com", Role::User)).await.unwrap();

        let patch = UserPatch {
            email: Some("b@example.com".to_string()),
            ..Default::default()
        };
        let err = store.update_user(a.id, patch, Utc::now()).await.unwrap_err();
        assert_eq!(err, AccountError::DuplicateEmail);
    }

    #[tokio::test]
    async fn invite_ledger_lists_newest_first_with_parties() {
        let store = MemoryIdentityStore::new();
        let issuer = store
            .create_user(new_user("admin@example.com", Role::Admin))
            .await
            .unwrap();

        let t0 = Utc::now();
        store.insert_invite(InviteCode::issue(issuer.id, 24, t0)).await.unwrap();
        let newer = store
            .insert_invite(InviteCode::issue(issuer.id, 24, t0 + Duration::minutes(1)))
            .await
            .unwrap();

        let listed = store.list_invites().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].invite.id, newer.id);
        assert_eq!(listed[0].created_by_email, "admin@example.com");
        assert!(listed[0].used_by_name.is_none());
    }

    #[tokio::test]
    async fn project_access_is_owner_scoped() {
        let store = MemoryProjectStore::new();
        let owner = UserId::new();
        let stranger = UserId::new();
        let now = Utc::now();

        let project = folio_accounts::NewProject {
            title: "Folio".to_string(),
            description: "app".to_string(),
            tech_stack: vec!["rust".to_string()],
            project_link: None,
            image: None,
        }
        .into_project(owner, now);
        let project = store.insert(project).await.unwrap();

        assert!(store.get_owned(project.id, owner).await.unwrap().is_some());
        assert!(store.get_owned(project.id, stranger).await.unwrap().is_none());
        assert_eq!(
            store.delete_owned(project.id, stranger).await.unwrap_err(),
            AccountError::NotFound
        );
    }
}
