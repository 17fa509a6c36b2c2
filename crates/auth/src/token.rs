//! HS256 session token signing and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use folio_core::UserId;

use crate::claims::{validate_claims, SessionClaims, TokenValidationError};
use crate::Role;

/// Typed failure of token verification or issuance.
///
/// Callers at the HTTP boundary must not distinguish `Invalid` from `Expired`
/// in what they reveal to clients; both collapse to the same rejection there.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature mismatch, malformed token, or undecodable claims.
    #[error("invalid token")]
    Invalid,

    /// Signature was fine but the embedded validity window has passed.
    #[error("token expired")]
    Expired,

    /// Signing failed (key misconfiguration). A startup condition, not a
    /// per-request one.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Verification half of the token service, object-safe so the middleware can
/// hold it as a trait object.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HMAC-SHA256 session token service.
///
/// Tokens are stateless: there is no revocation list, and logout is purely a
/// client-side credential discard. That trade-off (simplicity/availability
/// over revocability) is deliberate and bounded by the token TTL.
pub struct Hs256TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        // Claim timestamps are RFC3339, not numeric `exp`/`iat`, so the
        // library-side registered-claim checks are disabled and the window is
        // validated deterministically via `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a signed token for a verified identity, valid from `now` for the
    /// configured TTL.
    pub fn issue(
        &self,
        user_id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims {
            sub: user_id,
            role,
            issued_at: now,
            expires_at: now + self.ttl,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl TokenVerifier for Hs256TokenService {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Invalid)?;

        match validate_claims(&data.claims, now) {
            Ok(()) => Ok(data.claims),
            Err(TokenValidationError::Expired) => Err(TokenError::Expired),
            Err(_) => Err(TokenError::Invalid),
        }
    }
}
