//! User account records and input validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_auth::Role;
use folio_core::{DomainError, DomainResult, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted user record.
///
/// # Invariants
/// - `email` is unique across all users (store-level constraint) and stored
///   trimmed + lowercased.
/// - `role` defaults to [`Role::User`]; `Admin` is only minted through the
///   invite workflow, the direct admin-creation path, or an admin edit.
/// - `password_hash` is an argon2 PHC string; plaintext never reaches a
///   record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user record ready for insertion (already validated and hashed).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Raw registration input, validated before any hashing or persistence.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    pub const MIN_PASSWORD_LEN: usize = 8;

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        validate_email(&self.email)?;
        if self.password.len() < Self::MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }

    /// Canonical form of the email used for storage and lookups.
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    pub fn normalized_name(&self) -> String {
        self.name.trim().to_string()
    }
}

/// Self-service profile edit (name and/or email).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ProfilePatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email.map(|e| normalize_email(&e)),
        }
    }
}

/// Admin edit of another user (may also change the role).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email.map(|e| normalize_email(&e)),
            role: self.role,
        }
    }
}

impl From<ProfilePatch> for UserPatch {
    fn from(patch: ProfilePatch) -> Self {
        Self {
            name: patch.name,
            email: patch.email,
            role: None,
        }
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(input("Alice", "alice@example.com", "long enough pw").validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(input("   ", "alice@example.com", "long enough pw").validate().is_err());
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        assert!(input("Alice", "alice.example.com", "long enough pw").validate().is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(input("Alice", "alice@example.com", "short").validate().is_err());
    }

    #[test]
    fn email_is_normalized_for_storage() {
        let i = input("Alice", "  Alice@Example.COM ", "long enough pw");
        assert_eq!(i.normalized_email(), "alice@example.com");
    }

    #[test]
    fn patch_rejects_blank_fields_but_allows_absent_ones() {
        assert!(UserPatch::default().validate().is_ok());
        let bad = UserPatch {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
