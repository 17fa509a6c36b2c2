//! Postgres store backend.
//!
//! Queries are runtime-checked (`sqlx::query`), matching how the rest of the
//! stack talks to Postgres: no compile-time database is required to build.
//!
//! ## Concurrency
//!
//! - Email uniqueness rides on the `users_email_key` unique index; violation
//!   code `23505` maps to [`AccountError::DuplicateEmail`].
//! - `redeem_invite` runs one transaction whose first statement is a
//!   conditional `UPDATE ... WHERE is_used = FALSE AND expires_at > $now
//!   RETURNING`: of two concurrent redemptions, exactly one sees the row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use folio_accounts::{
    AccountError, IdentityStore, InviteCode, InviteWithParties, NewUser, Portfolio,
    PortfolioPatch, PortfolioStore, Project, ProjectPatch, ProjectStore, StoreResult, User,
    UserPatch,
};
use folio_auth::Role;
use folio_core::{InviteId, PortfolioId, ProjectId, UserId};

const UNIQUE_VIOLATION: &str = "23505";

fn map_db_err(err: sqlx::Error) -> AccountError {
    if let Some(db) = err.as_database_error() {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AccountError::DuplicateEmail;
        }
    }
    AccountError::store(err.to_string())
}

fn row_error(err: sqlx::Error) -> AccountError {
    AccountError::store(format!("row decode: {err}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

fn user_from_row(row: &PgRow) -> Result<User, AccountError> {
    let role: String = row.try_get("role").map_err(row_error)?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(row_error)?),
        name: row.try_get("name").map_err(row_error)?,
        email: row.try_get("email").map_err(row_error)?,
        password_hash: row.try_get("password_hash").map_err(row_error)?,
        role: role.parse::<Role>().map_err(AccountError::from)?,
        created_at: row.try_get("created_at").map_err(row_error)?,
        updated_at: row.try_get("updated_at").map_err(row_error)?,
    })
}

fn invite_from_row(row: &PgRow) -> Result<InviteCode, AccountError> {
    Ok(InviteCode {
        id: InviteId::from_uuid(row.try_get("id").map_err(row_error)?),
        code: row.try_get("code").map_err(row_error)?,
        created_by: UserId::from_uuid(row.try_get("created_by").map_err(row_error)?),
        used_by: row
            .try_get::<Option<Uuid>, _>("used_by")
            .map_err(row_error)?
            .map(UserId::from_uuid),
        used_at: row.try_get("used_at").map_err(row_error)?,
        expires_at: row.try_get("expires_at").map_err(row_error)?,
        is_used: row.try_get("is_used").map_err(row_error)?,
        created_at: row.try_get("created_at").map_err(row_error)?,
    })
}

fn portfolio_from_row(row: &PgRow) -> Result<Portfolio, AccountError> {
    Ok(Portfolio {
        id: PortfolioId::from_uuid(row.try_get("id").map_err(row_error)?),
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(row_error)?),
        name: row.try_get("name").map_err(row_error)?,
        profession: row.try_get("profession").map_err(row_error)?,
        bio: row.try_get("bio").map_err(row_error)?,
        profile_image: row.try_get("profile_image").map_err(row_error)?,
        contact_info: row.try_get("contact_info").map_err(row_error)?,
        skills: row.try_get("skills").map_err(row_error)?,
        social_links: row.try_get("social_links").map_err(row_error)?,
        template_style: row.try_get("template_style").map_err(row_error)?,
        created_at: row.try_get("created_at").map_err(row_error)?,
        updated_at: row.try_get("updated_at").map_err(row_error)?,
    })
}

fn project_from_row(row: &PgRow) -> Result<Project, AccountError> {
    Ok(Project {
        id: ProjectId::from_uuid(row.try_get("id").map_err(row_error)?),
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(row_error)?),
        title: row.try_get("title").map_err(row_error)?,
        description: row.try_get("description").map_err(row_error)?,
        tech_stack: row.try_get("tech_stack").map_err(row_error)?,
        project_link: row.try_get("project_link").map_err(row_error)?,
        image: row.try_get("image").map_err(row_error)?,
        created_at: row.try_get("created_at").map_err(row_error)?,
        updated_at: row.try_get("updated_at").map_err(row_error)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, name, email, password_hash, role, created_at, updated_at
    FROM users
"#;

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, name, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        user_from_row(&row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!("{SELECT_USER} ORDER BY created_at"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        rows.iter().map(user_from_row).collect()
    }

    async fn update_user(
        &self,
        id: UserId,
        patch: UserPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<User> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                updated_at = $5
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.role.map(|r| r.as_str()))
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(AccountError::NotFound),
        }
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound);
        }
        Ok(())
    }

    async fn insert_invite(&self, invite: InviteCode) -> StoreResult<InviteCode> {
        let row = sqlx::query(
            r#"
            INSERT INTO invite_codes (id, code, created_by, expires_at, is_used, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            RETURNING id, code, created_by, used_by, used_at, expires_at, is_used, created_at
            "#,
        )
        .bind(invite.id.as_uuid())
        .bind(&invite.code)
        .bind(invite.created_by.as_uuid())
        .bind(invite.expires_at)
        .bind(invite.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        invite_from_row(&row)
    }

    async fn redeem_invite(
        &self,
        code: &str,
        now: DateTime<Utc>,
        new_admin: NewUser,
    ) -> StoreResult<User> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        // Single conditional match-and-mutate: only one of two concurrent
        // redemptions can see the unconsumed row.
        let claimed = sqlx::query(
            r#"
            UPDATE invite_codes
            SET is_used = TRUE, used_at = $2
            WHERE code = $1 AND is_used = FALSE AND expires_at > $2
            RETURNING id
            "#,
        )
        .bind(code)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;

        let Some(claimed) = claimed else {
            // Dropping the transaction rolls back; nothing was changed.
            return Err(AccountError::InvalidOrExpiredInvite);
        };
        let invite_id: Uuid = claimed.try_get("id").map_err(row_error)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, name, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(new_admin.id.as_uuid())
        .bind(&new_admin.name)
        .bind(&new_admin.email)
        .bind(&new_admin.password_hash)
        .bind(new_admin.role.as_str())
        .bind(new_admin.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;
        let user = user_from_row(&inserted)?;

        sqlx::query("UPDATE invite_codes SET used_by = $2 WHERE id = $1")
            .bind(invite_id)
            .bind(user.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        Ok(user)
    }

    async fn list_invites(&self) -> StoreResult<Vec<InviteWithParties>> {
        let rows = sqlx::query(
            r#"
            SELECT i.id, i.code, i.created_by, i.used_by, i.used_at, i.expires_at,
                   i.is_used, i.created_at,
                   COALESCE(c.name, '(deleted)') AS created_by_name,
                   COALESCE(c.email, '(deleted)') AS created_by_email,
                   u.name AS used_by_name,
                   u.email AS used_by_email
            FROM invite_codes i
            LEFT JOIN users c ON c.id = i.created_by
            LEFT JOIN users u ON u.id = i.used_by
            ORDER BY i.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.iter()
            .map(|row| {
                Ok(InviteWithParties {
                    invite: invite_from_row(row)?,
                    created_by_name: row.try_get("created_by_name").map_err(row_error)?,
                    created_by_email: row.try_get("created_by_email").map_err(row_error)?,
                    used_by_name: row.try_get("used_by_name").map_err(row_error)?,
                    used_by_email: row.try_get("used_by_email").map_err(row_error)?,
                })
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Portfolios
// ─────────────────────────────────────────────────────────────────────────────

pub struct PgPortfolioStore {
    pool: PgPool,
}

impl PgPortfolioStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_PORTFOLIO: &str = r#"
    SELECT id, user_id, name, profession, bio, profile_image, contact_info,
           skills, social_links, template_style, created_at, updated_at
    FROM portfolios
"#;

#[async_trait]
impl PortfolioStore for PgPortfolioStore {
    async fn insert(&self, portfolio: Portfolio) -> StoreResult<Portfolio> {
        let row = sqlx::query(
            r#"
            INSERT INTO portfolios (id, user_id, name, profession, bio, profile_image,
                                    contact_info, skills, social_links, template_style,
                                    created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING id, user_id, name, profession, bio, profile_image, contact_info,
                      skills, social_links, template_style, created_at, updated_at
            "#,
        )
        .bind(portfolio.id.as_uuid())
        .bind(portfolio.user_id.as_uuid())
        .bind(&portfolio.name)
        .bind(&portfolio.profession)
        .bind(&portfolio.bio)
        .bind(&portfolio.profile_image)
        .bind(&portfolio.contact_info)
        .bind(&portfolio.skills)
        .bind(&portfolio.social_links)
        .bind(&portfolio.template_style)
        .bind(portfolio.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        portfolio_from_row(&row)
    }

    async fn find_by_owner(&self, owner: UserId) -> StoreResult<Option<Portfolio>> {
        let row = sqlx::query(&format!("{SELECT_PORTFOLIO} WHERE user_id = $1"))
            .bind(owner.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        row.as_ref().map(portfolio_from_row).transpose()
    }

    async fn get(&self, id: PortfolioId) -> StoreResult<Option<Portfolio>> {
        let row = sqlx::query(&format!("{SELECT_PORTFOLIO} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        row.as_ref().map(portfolio_from_row).transpose()
    }

    async fn list_all(&self) -> StoreResult<Vec<Portfolio>> {
        let rows = sqlx::query(&format!("{SELECT_PORTFOLIO} ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;

        rows.iter().map(portfolio_from_row).collect()
    }

    async fn update_by_owner(
        &self,
        owner: UserId,
        patch: PortfolioPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Portfolio> {
        let row = sqlx::query(
            r#"
            UPDATE portfolios
            SET name = COALESCE($2, name),
                profession = COALESCE($3, profession),
                bio = COALESCE($4, bio),
                profile_image = COALESCE($5, profile_image),
                contact_info = COALESCE($6, contact_info),
                skills = COALESCE($7, skills),
                social_links = COALESCE($8, social_links),
                template_style = COALESCE($9, template_style),
                updated_at = $10
            WHERE user_id = $1
            RETURNING id, user_id, name, profession, bio, profile_image, contact_info,
                      skills, social_links, template_style, created_at, updated_at
            "#,
        )
        .bind(owner.as_uuid())
        .bind(patch.name)
        .bind(patch.profession)
        .bind(patch.bio)
        .bind(patch.profile_image)
        .bind(patch.contact_info)
        .bind(patch.skills)
        .bind(patch.social_links)
        .bind(patch.template_style)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        match row {
            Some(row) => portfolio_from_row(&row),
            None => Err(AccountError::NotFound),
        }
    }

    async fn delete_by_owner(&self, owner: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM portfolios WHERE user_id = $1")
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: PortfolioId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM portfolios WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_PROJECT: &str = r#"
    SELECT id, user_id, title, description, tech_stack, project_link, image,
           created_at, updated_at
    FROM projects
"#;

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn insert(&self, project: Project) -> StoreResult<Project> {
        let row = sqlx::query(
            r#"
            INSERT INTO projects (id, user_id, title, description, tech_stack,
                                  project_link, image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id, user_id, title, description, tech_stack, project_link, image,
                      created_at, updated_at
            "#,
        )
        .bind(project.id.as_uuid())
        .bind(project.user_id.as_uuid())
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.tech_stack)
        .bind(&project.project_link)
        .bind(&project.image)
        .bind(project.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        project_from_row(&row)
    }

    async fn list_by_owner(&self, owner: UserId) -> StoreResult<Vec<Project>> {
        let rows = sqlx::query(&format!(
            "{SELECT_PROJECT} WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.iter().map(project_from_row).collect()
    }

    async fn get_owned(&self, id: ProjectId, owner: UserId) -> StoreResult<Option<Project>> {
        let row = sqlx::query(&format!(
            "{SELECT_PROJECT} WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.as_ref().map(project_from_row).transpose()
    }

    async fn update_owned(
        &self,
        id: ProjectId,
        owner: UserId,
        patch: ProjectPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Project> {
        let row = sqlx::query(
            r#"
            UPDATE projects
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                tech_stack = COALESCE($5, tech_stack),
                project_link = COALESCE($6, project_link),
                image = COALESCE($7, image),
                updated_at = $8
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, tech_stack, project_link, image,
                      created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.tech_stack)
        .bind(patch.project_link)
        .bind(patch.image)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        match row {
            Some(row) => project_from_row(&row),
            None => Err(AccountError::NotFound),
        }
    }

    async fn delete_owned(&self, id: ProjectId, owner: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound);
        }
        Ok(())
    }
}
