//! Registration, login and profile routes.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use folio_accounts::{ProfilePatch, RegisterInput, User};

use crate::app::{dto, errors, services::AppServices};
use crate::context::Identity;
use crate::middleware::{auth_middleware, AuthState, SESSION_COOKIE};

/// Cookie lifetime for the client-side copy of the token. The embedded claim
/// expiry is what actually bounds the session; this only controls how long
/// the browser keeps the cookie around.
const SESSION_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

pub fn router(auth_state: AuthState) -> Router {
    let protected = Router::new()
        .route("/profile", get(profile).put(update_profile))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/auth/register - create a regular account and log it in
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterInput>,
) -> axum::response::Response {
    match services.register(body).await {
        Ok((user, token)) => session_response(StatusCode::CREATED, &user, &token),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// POST /api/auth/login - credential login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.login(&body.email, &body.password).await {
        Ok((user, token)) => session_response(StatusCode::OK, &user, &token),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// GET /api/auth/profile - the authenticated caller's record
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> axum::response::Response {
    match services.profile(identity.user_id()).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// PUT /api/auth/profile - self-service name/email edit
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<ProfilePatch>,
) -> axum::response::Response {
    match services.update_profile(identity.user_id(), body).await {
        Ok(user) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// `{user, token}` body plus the session cookie.
fn session_response(status: StatusCode, user: &User, token: &str) -> axum::response::Response {
    let mut response = (
        status,
        Json(serde_json::json!({
            "user": dto::user_to_json(user),
            "token": token,
        })),
    )
        .into_response();

    let cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; Max-Age={SESSION_COOKIE_MAX_AGE_SECS}; SameSite=Lax"
    );
    // A token is always printable ASCII; if it somehow is not, skip the
    // cookie rather than fail the login.
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    response
}
