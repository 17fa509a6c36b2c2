//! Account error taxonomy.
//!
//! Every core operation surfaces one of these stable kinds to the boundary;
//! raw storage-driver errors never cross this line. The wording is part of
//! the contract: credential and invite failures deliberately collapse their
//! causes into a single message so callers cannot enumerate accounts or
//! probe invite state.

use thiserror::Error;

use folio_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// The email is already registered. The uniqueness check is store-level,
    /// not check-then-insert.
    #[error("email already in use")]
    DuplicateEmail,

    /// Unknown email or wrong password; the two are indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Invite is used, expired, or never existed; the three are
    /// indistinguishable.
    #[error("invalid or expired invite code")]
    InvalidOrExpiredInvite,

    /// Record-level miss (profile, user, portfolio, project).
    #[error("not found")]
    NotFound,

    /// Malformed input, rejected before persistence.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Storage-layer failure. The message is for logs; the HTTP layer maps
    /// this to an opaque 500.
    #[error("storage failure: {0}")]
    Store(String),
}

impl AccountError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AccountError::Validation(msg),
            DomainError::InvalidId(msg) => AccountError::Validation(msg),
            DomainError::NotFound => AccountError::NotFound,
        }
    }
}
