//! HTTP API application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: backend wiring + the provisioning workflow
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use folio_accounts::RegisterInput;
use folio_auth::TokenVerifier;

use crate::config::AppConfig;
use crate::middleware::AuthState;
use crate::netpolicy::NetworkPolicy;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> Router {
    let services = if config.use_persistent_stores {
        services::build_postgres_services(&config).await
    } else {
        services::build_memory_services(&config)
    };
    let services = Arc::new(services);

    if let Some(bootstrap) = &config.bootstrap_admin {
        let input = RegisterInput {
            name: bootstrap.name.clone(),
            email: bootstrap.email.clone(),
            password: bootstrap.password.clone(),
        };
        if let Err(e) = services.bootstrap_admin(input).await {
            tracing::error!("bootstrap admin failed: {e}");
        }
    }

    build_router(services, &config)
}

/// Assemble the route tree over already-wired services.
///
/// Split out from [`build_app`] so tests can seed the services directly and
/// then drive the exact router production uses.
pub fn build_router(services: Arc<AppServices>, config: &AppConfig) -> Router {
    let tokens: Arc<dyn TokenVerifier> = services.token_service();
    let auth_state = AuthState {
        tokens,
        identity: services.identity_store(),
    };
    let policy = NetworkPolicy::from_config(config.admin_allowed_ips.clone());

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/auth", routes::auth::router(auth_state.clone()))
        .nest(
            "/api/admin",
            routes::admin::router(auth_state.clone(), policy),
        )
        .nest(
            "/api/portfolios",
            routes::portfolios::router(auth_state.clone()),
        )
        .nest("/api/projects", routes::projects::router(auth_state))
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
