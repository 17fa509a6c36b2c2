//! Project routes, all ownership-scoped to the authenticated caller.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use folio_accounts::{NewProject, ProjectPatch};
use folio_core::ProjectId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::Identity;
use crate::middleware::{auth_middleware, AuthState};

pub fn router(auth_state: AuthState) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(by_id).put(update).delete(remove))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/projects
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<NewProject>,
) -> axum::response::Response {
    match services.add_project(identity.user_id(), body).await {
        Ok(p) => (StatusCode::CREATED, Json(dto::project_to_json(&p))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// GET /api/projects - the caller's projects
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> axum::response::Response {
    match services.my_projects(identity.user_id()).await {
        Ok(projects) => {
            let items: Vec<serde_json::Value> = projects.iter().map(dto::project_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::account_error_to_response(e),
    }
}

/// GET /api/projects/:id
pub async fn by_id(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let project_id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };

    match services.project(project_id, identity.user_id()).await {
        Ok(p) => (StatusCode::OK, Json(dto::project_to_json(&p))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// PUT /api/projects/:id
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(body): Json<ProjectPatch>,
) -> axum::response::Response {
    let project_id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };

    match services
        .update_project(project_id, identity.user_id(), body)
        .await
    {
        Ok(p) => (StatusCode::OK, Json(dto::project_to_json(&p))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// DELETE /api/projects/:id
pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let project_id: ProjectId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid project id")
        }
    };

    match services.delete_project(project_id, identity.user_id()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "project deleted" })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}
