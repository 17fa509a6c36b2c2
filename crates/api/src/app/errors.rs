//! Consistent JSON error responses.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use folio_accounts::AccountError;

/// Map a core account error to its stable wire shape.
///
/// Storage failures are logged server-side and surface as an opaque 500; the
/// driver's error text never reaches a client.
pub fn account_error_to_response(err: AccountError) -> axum::response::Response {
    match err {
        AccountError::DuplicateEmail => {
            json_error(StatusCode::CONFLICT, "duplicate_email", err.to_string())
        }
        AccountError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", err.to_string())
        }
        AccountError::InvalidOrExpiredInvite => {
            json_error(StatusCode::BAD_REQUEST, "invalid_or_expired_invite", err.to_string())
        }
        AccountError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        AccountError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_failed", msg)
        }
        AccountError::Store(msg) => {
            tracing::error!("storage failure: {msg}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "internal storage failure",
            )
        }
    }
}

pub fn unauthenticated() -> axum::response::Response {
    json_error(
        StatusCode::UNAUTHORIZED,
        "unauthenticated",
        "authentication required",
    )
}

pub fn forbidden(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
