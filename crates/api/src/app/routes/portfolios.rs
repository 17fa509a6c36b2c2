//! Portfolio routes: the public gallery plus the owner's document.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use folio_accounts::{NewPortfolio, PortfolioPatch};
use folio_core::PortfolioId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::Identity;
use crate::middleware::{admin_only, auth_middleware, AuthState};

pub fn router(auth_state: AuthState) -> Router {
    let owner_routes = Router::new()
        .route("/", post(create))
        .route("/me", get(mine).put(update_mine).delete(delete_mine))
        .layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ));

    // Admins may remove any portfolio by id.
    let admin_routes = Router::new()
        .route("/:id", delete(admin_delete))
        .layer(axum::middleware::from_fn(admin_only))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Router::new()
        .route("/", get(gallery))
        .route("/:id", get(by_id))
        .merge(owner_routes)
        .merge(admin_routes)
}

// ─────────────────────────────────────────────────────────────────────────────
// Public gallery
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/portfolios - every portfolio, newest first, no auth
pub async fn gallery(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.public_portfolios().await {
        Ok(portfolios) => {
            let items: Vec<serde_json::Value> =
                portfolios.iter().map(dto::portfolio_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::account_error_to_response(e),
    }
}

/// GET /api/portfolios/:id - single public view
pub async fn by_id(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let portfolio_id: PortfolioId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid portfolio id")
        }
    };

    match services.public_portfolio(portfolio_id).await {
        Ok(p) => (StatusCode::OK, Json(dto::portfolio_to_json(&p))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Owner operations
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/portfolios - create the caller's portfolio (one per user)
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<NewPortfolio>,
) -> axum::response::Response {
    match services.create_portfolio(identity.user_id(), body).await {
        Ok(p) => (StatusCode::CREATED, Json(dto::portfolio_to_json(&p))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// GET /api/portfolios/me
pub async fn mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> axum::response::Response {
    match services.my_portfolio(identity.user_id()).await {
        Ok(p) => (StatusCode::OK, Json(dto::portfolio_to_json(&p))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// PUT /api/portfolios/me
pub async fn update_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<PortfolioPatch>,
) -> axum::response::Response {
    match services.update_my_portfolio(identity.user_id(), body).await {
        Ok(p) => (StatusCode::OK, Json(dto::portfolio_to_json(&p))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// DELETE /api/portfolios/me
pub async fn delete_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> axum::response::Response {
    match services.delete_my_portfolio(identity.user_id()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "portfolio deleted" })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// DELETE /api/portfolios/:id - admin removal of any portfolio
pub async fn admin_delete(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let portfolio_id: PortfolioId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid portfolio id")
        }
    };

    match services.admin_delete_portfolio(portfolio_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "portfolio deleted" })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}
