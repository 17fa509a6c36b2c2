//! Admin routes: invite ledger, admin provisioning, user management.
//!
//! The whole surface sits behind the network policy gate; everything except
//! `create-with-invite` additionally requires an authenticated admin.
//! `create-with-invite` is reachable without a token because the invite code
//! itself is the authorization.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use folio_accounts::{RegisterInput, UserPatch};
use folio_core::UserId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::Identity;
use crate::middleware::{admin_only, auth_middleware, AuthState};
use crate::netpolicy::{network_policy_middleware, NetworkPolicy};

pub fn router(auth_state: AuthState, policy: NetworkPolicy) -> Router {
    let admin_gated = Router::new()
        .route("/invite", post(issue_invite))
        .route("/invites", get(list_invites))
        .route("/create", post(create_admin))
        .route("/users", get(list_users))
        .route("/users/:id", put(update_user).delete(delete_user))
        .layer(axum::middleware::from_fn(admin_only))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Router::new()
        .route("/create-with-invite", post(create_admin_with_invite))
        .merge(admin_gated)
        .layer(axum::middleware::from_fn_with_state(
            policy,
            network_policy_middleware,
        ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Invite ledger
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/admin/invite - issue a single-use invite code
pub async fn issue_invite(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Option<Json<dto::IssueInviteRequest>>,
) -> axum::response::Response {
    let expires_in_hours = body.and_then(|Json(b)| b.expires_in_hours);

    match services
        .issue_invite(identity.user_id(), expires_in_hours)
        .await
    {
        Ok(invite) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "invite_code": invite.code,
                "expires_at": invite.expires_at.to_rfc3339(),
            })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// GET /api/admin/invites - full ledger, newest first
pub async fn list_invites(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_invites().await {
        Ok(invites) => {
            let items: Vec<serde_json::Value> = invites.iter().map(dto::invite_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::account_error_to_response(e),
    }
}

/// POST /api/admin/create-with-invite - redeem an invite into an admin account
pub async fn create_admin_with_invite(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateAdminWithInviteRequest>,
) -> axum::response::Response {
    let input = RegisterInput {
        name: body.name,
        email: body.email,
        password: body.password,
    };

    match services
        .create_admin_with_invite(input, &body.invite_code)
        .await
    {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// POST /api/admin/create - direct admin creation by an existing admin
pub async fn create_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterInput>,
) -> axum::response::Response {
    match services.create_admin_direct(body).await {
        Ok(user) => (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User management
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/admin/users - every account, password hashes excluded
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_users().await {
        Ok(users) => {
            let items: Vec<serde_json::Value> = users.iter().map(dto::user_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::account_error_to_response(e),
    }
}

/// PUT /api/admin/users/:id - edit name/email/role
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<UserPatch>,
) -> axum::response::Response {
    let user_id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    match services.admin_update_user(user_id, body).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: UserId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"),
    };

    match services.admin_delete_user(user_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "user removed" })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}
