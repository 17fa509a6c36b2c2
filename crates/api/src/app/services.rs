//! Service wiring and the provisioning workflow.
//!
//! `AppServices` owns the wired storage backends plus the token service and
//! password hasher, and exposes the account-creation/login pipelines the
//! routes call into. Role *enforcement* is not here: the middleware decides
//! who may reach which route; this layer decides what the operation does.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::postgres::PgPool;

use folio_accounts::{
    AccountError, IdentityStore, InviteCode, InviteWithParties, NewPortfolio, NewProject,
    NewUser, Portfolio, PortfolioPatch, PortfolioStore, Project, ProjectPatch, ProjectStore,
    ProfilePatch, RegisterInput, User, UserPatch,
};
use folio_auth::{Hs256TokenService, PasswordHasher, Role};
use folio_core::{PortfolioId, ProjectId, UserId};
use folio_infra::{
    MemoryIdentityStore, MemoryPortfolioStore, MemoryProjectStore, PgIdentityStore,
    PgPortfolioStore, PgProjectStore,
};

use crate::config::AppConfig;

pub struct AppServices {
    identity: Arc<dyn IdentityStore>,
    portfolios: Arc<dyn PortfolioStore>,
    projects: Arc<dyn ProjectStore>,
    tokens: Arc<Hs256TokenService>,
    hasher: PasswordHasher,
    invite_ttl_hours: i64,
}

/// In-memory infra wiring (dev/test).
pub fn build_memory_services(config: &AppConfig) -> AppServices {
    AppServices::new(
        Arc::new(MemoryIdentityStore::new()),
        Arc::new(MemoryPortfolioStore::new()),
        Arc::new(MemoryProjectStore::new()),
        config,
    )
}

/// Postgres infra wiring. Connection failure is a startup condition.
pub async fn build_postgres_services(config: &AppConfig) -> AppServices {
    let database_url = config
        .database_url
        .clone()
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("failed to connect to Postgres");

    AppServices::new(
        Arc::new(PgIdentityStore::new(pool.clone())),
        Arc::new(PgPortfolioStore::new(pool.clone())),
        Arc::new(PgProjectStore::new(pool)),
        config,
    )
}

impl AppServices {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        portfolios: Arc<dyn PortfolioStore>,
        projects: Arc<dyn ProjectStore>,
        config: &AppConfig,
    ) -> Self {
        let hasher = PasswordHasher::new(config.hash_time_cost)
            .expect("invalid FOLIO_HASH_COST configuration");
        let tokens = Arc::new(Hs256TokenService::new(
            config.jwt_secret.as_bytes(),
            Duration::hours(config.token_ttl_hours),
        ));

        Self {
            identity,
            portfolios,
            projects,
            tokens,
            hasher,
            invite_ttl_hours: config.invite_ttl_hours,
        }
    }

    pub fn identity_store(&self) -> Arc<dyn IdentityStore> {
        self.identity.clone()
    }

    pub fn token_service(&self) -> Arc<Hs256TokenService> {
        self.tokens.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Provisioning workflow
    // ─────────────────────────────────────────────────────────────────────────

    /// Self-service registration. Always creates a regular user; this path
    /// can never mint an admin.
    pub async fn register(&self, input: RegisterInput) -> Result<(User, String), AccountError> {
        let user = self.create_account(input, Role::User).await?;
        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Credential login. Unknown email and wrong password are deliberately
    /// the same failure, and every success issues a fresh token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AccountError> {
        let email = email.trim().to_lowercase();

        let user = self
            .identity
            .find_user_by_email(&email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let verified = self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?;
        if !verified {
            return Err(AccountError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    pub async fn profile(&self, user_id: UserId) -> Result<User, AccountError> {
        self.identity
            .get_user(user_id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    pub async fn update_profile(
        &self,
        user_id: UserId,
        patch: ProfilePatch,
    ) -> Result<User, AccountError> {
        patch.validate()?;
        self.identity
            .update_user(user_id, UserPatch::from(patch.normalized()), Utc::now())
            .await
    }

    /// Issue a single-use invite on behalf of an authenticated admin.
    pub async fn issue_invite(
        &self,
        issuer: UserId,
        expires_in_hours: Option<i64>,
    ) -> Result<InviteCode, AccountError> {
        let ttl = expires_in_hours.unwrap_or(self.invite_ttl_hours);
        if ttl <= 0 {
            return Err(AccountError::Validation(
                "expires_in_hours must be positive".to_string(),
            ));
        }

        let invite = InviteCode::issue(issuer, ttl, Utc::now());
        self.identity.insert_invite(invite).await
    }

    pub async fn list_invites(&self) -> Result<Vec<InviteWithParties>, AccountError> {
        self.identity.list_invites().await
    }

    /// The one unauthenticated path that can mint an admin; the store's
    /// atomic redeem is what keeps it single-use.
    pub async fn create_admin_with_invite(
        &self,
        input: RegisterInput,
        code: &str,
    ) -> Result<User, AccountError> {
        if code.trim().is_empty() {
            return Err(AccountError::Validation("invite_code is required".to_string()));
        }
        input.validate()?;

        let new_admin = self.new_user_record(&input, Role::Admin).await?;
        self.identity
            .redeem_invite(code.trim(), Utc::now(), new_admin)
            .await
    }

    /// Admin-authenticated bootstrap of another admin; no invite involved.
    pub async fn create_admin_direct(&self, input: RegisterInput) -> Result<User, AccountError> {
        self.create_account(input, Role::Admin).await
    }

    /// Seed the first admin at startup. A duplicate email means some admin
    /// already exists, which is fine.
    pub async fn bootstrap_admin(&self, input: RegisterInput) -> Result<(), AccountError> {
        match self.create_account(input, Role::Admin).await {
            Ok(user) => {
                tracing::info!("bootstrap admin created: {}", user.email);
                Ok(())
            }
            Err(AccountError::DuplicateEmail) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Admin user management
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>, AccountError> {
        self.identity.list_users().await
    }

    pub async fn admin_update_user(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<User, AccountError> {
        patch.validate()?;
        self.identity
            .update_user(id, patch.normalized(), Utc::now())
            .await
    }

    pub async fn admin_delete_user(&self, id: UserId) -> Result<(), AccountError> {
        self.identity.delete_user(id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Portfolios
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_portfolio(
        &self,
        owner: UserId,
        input: NewPortfolio,
    ) -> Result<Portfolio, AccountError> {
        input.validate()?;

        // One portfolio per user, enforced by query pattern.
        if self.portfolios.find_by_owner(owner).await?.is_some() {
            return Err(AccountError::Validation(
                "a portfolio already exists for this user".to_string(),
            ));
        }

        self.portfolios
            .insert(input.into_portfolio(owner, Utc::now()))
            .await
    }

    pub async fn my_portfolio(&self, owner: UserId) -> Result<Portfolio, AccountError> {
        self.portfolios
            .find_by_owner(owner)
            .await?
            .ok_or(AccountError::NotFound)
    }

    pub async fn update_my_portfolio(
        &self,
        owner: UserId,
        patch: PortfolioPatch,
    ) -> Result<Portfolio, AccountError> {
        patch.validate()?;
        self.portfolios
            .update_by_owner(owner, patch, Utc::now())
            .await
    }

    pub async fn delete_my_portfolio(&self, owner: UserId) -> Result<(), AccountError> {
        self.portfolios.delete_by_owner(owner).await
    }

    pub async fn admin_delete_portfolio(&self, id: PortfolioId) -> Result<(), AccountError> {
        self.portfolios.delete(id).await
    }

    /// Public gallery; no authentication involved.
    pub async fn public_portfolios(&self) -> Result<Vec<Portfolio>, AccountError> {
        self.portfolios.list_all().await
    }

    pub async fn public_portfolio(&self, id: PortfolioId) -> Result<Portfolio, AccountError> {
        self.portfolios.get(id).await?.ok_or(AccountError::NotFound)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_project(
        &self,
        owner: UserId,
        input: NewProject,
    ) -> Result<Project, AccountError> {
        input.validate()?;
        self.projects
            .insert(input.into_project(owner, Utc::now()))
            .await
    }

    pub async fn my_projects(&self, owner: UserId) -> Result<Vec<Project>, AccountError> {
        self.projects.list_by_owner(owner).await
    }

    pub async fn project(&self, id: ProjectId, owner: UserId) -> Result<Project, AccountError> {
        self.projects
            .get_owned(id, owner)
            .await?
            .ok_or(AccountError::NotFound)
    }

    pub async fn update_project(
        &self,
        id: ProjectId,
        owner: UserId,
        patch: ProjectPatch,
    ) -> Result<Project, AccountError> {
        patch.validate()?;
        self.projects.update_owned(id, owner, patch, Utc::now()).await
    }

    pub async fn delete_project(&self, id: ProjectId, owner: UserId) -> Result<(), AccountError> {
        self.projects.delete_owned(id, owner).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    async fn create_account(
        &self,
        input: RegisterInput,
        role: Role,
    ) -> Result<User, AccountError> {
        input.validate()?;
        let record = self.new_user_record(&input, role).await?;
        self.identity.create_user(record).await
    }

    async fn new_user_record(
        &self,
        input: &RegisterInput,
        role: Role,
    ) -> Result<NewUser, AccountError> {
        let password_hash = self.hash_password(input.password.clone()).await?;
        Ok(NewUser {
            id: UserId::new(),
            name: input.normalized_name(),
            email: input.normalized_email(),
            password_hash,
            role,
            created_at: Utc::now(),
        })
    }

    fn issue_token(&self, user: &User) -> Result<String, AccountError> {
        self.tokens
            .issue(user.id, user.role, Utc::now())
            .map_err(|e| AccountError::store(e.to_string()))
    }

    // Hashing is CPU-bound by design; keep it off the async executor.
    async fn hash_password(&self, password: String) -> Result<String, AccountError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AccountError::store(e.to_string()))?
            .map_err(|e| AccountError::store(e.to_string()))
    }

    async fn verify_password(
        &self,
        password: String,
        stored: String,
    ) -> Result<bool, AccountError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| AccountError::store(e.to_string()))?
            .map_err(|e| AccountError::store(e.to_string()))
    }
}
