//! Per-request authentication gate.
//!
//! State machine: no credential -> verifying -> authenticated | rejected.
//! Rejections deliberately collapse "no token", "malformed token" and
//! "expired token" into one `unauthenticated` response so the boundary never
//! leaks signing details.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use folio_accounts::IdentityStore;
use folio_auth::TokenVerifier;

use crate::app::errors;
use crate::context::Identity;

/// Name of the session cookie set at login/register.
pub const SESSION_COOKIE: &str = "token";

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenVerifier>,
    pub identity: Arc<dyn IdentityStore>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token(req.headers()).ok_or_else(errors::unauthenticated)?;

    let claims = state
        .tokens
        .verify(token, Utc::now())
        .map_err(|_| errors::unauthenticated())?;

    // A token can outlive its account; a deleted user is no longer a caller.
    let user = state
        .identity
        .get_user(claims.sub)
        .await
        .map_err(errors::account_error_to_response)?
        .ok_or_else(errors::unauthenticated)?;

    req.extensions_mut()
        .insert(Identity::new(user.id, user.role));

    Ok(next.run(req).await)
}

/// Role gate for the admin surface. Layered inside `auth_middleware`, so an
/// unauthenticated caller never reaches it.
pub async fn admin_only(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .copied()
        .ok_or_else(errors::unauthenticated)?;

    if !identity.is_admin() {
        return Err(errors::forbidden("admin access required"));
    }

    Ok(next.run(req).await)
}

/// Pull the bearer token from the `Authorization` header, falling back to the
/// session cookie.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = bearer_token(headers) {
        return Some(token);
    }
    cookie_token(headers)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE).and_then(|rest| rest.strip_prefix('=')))
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::header::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn bearer_header_wins() {
        let h = headers(&[
            ("authorization", "Bearer abc.def.ghi"),
            ("cookie", "token=from-cookie"),
        ]);
        assert_eq!(extract_token(&h), Some("abc.def.ghi"));
    }

    #[test]
    fn cookie_is_a_fallback() {
        let h = headers(&[("cookie", "theme=dark; token=from-cookie; lang=en")]);
        assert_eq!(extract_token(&h), Some("from-cookie"));
    }

    #[test]
    fn missing_credentials_yield_none() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        let h = headers(&[("authorization", "Bearer ")]);
        assert_eq!(extract_token(&h), None);
        let h = headers(&[("cookie", "tokenish=nope")]);
        assert_eq!(extract_token(&h), None);
    }
}
