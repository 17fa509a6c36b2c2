//! Invite-code ledger records.
//!
//! An invite code is a single-use, time-bounded authorization token that lets
//! an admin delegate "create one admin account" without sharing credentials.
//! Consumption is terminal: once redeemed a code can never become consumable
//! again.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use folio_core::{InviteId, UserId};

/// Default invite validity window.
pub const DEFAULT_INVITE_TTL_HOURS: i64 = 24;

/// Bytes of OS entropy per code; 16 bytes = 128 bits, rendered as 32
/// uppercase hex characters. Codes are unthrottled bearer secrets, so they
/// must be unguessable.
const CODE_ENTROPY_BYTES: usize = 16;

/// Generate a fresh invite code.
pub fn generate_code() -> String {
    let mut bytes = [0u8; CODE_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}

/// Persisted invite-code ledger entry.
///
/// # Invariants
/// - `code` is unique.
/// - Consumable iff `!is_used && expires_at > now`.
/// - Mutated exactly once, atomically, at redemption time: `is_used` flips to
///   true and `used_by`/`used_at` are set together with the creation of the
///   new admin user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteCode {
    pub id: InviteId,
    pub code: String,
    pub created_by: UserId,
    pub used_by: Option<UserId>,
    pub used_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
}

impl InviteCode {
    /// Issue a new unused code on behalf of `created_by`.
    pub fn issue(created_by: UserId, ttl_hours: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: InviteId::new(),
            code: generate_code(),
            created_by,
            used_by: None,
            used_at: None,
            expires_at: now + Duration::hours(ttl_hours),
            is_used: false,
            created_at: now,
        }
    }

    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at > now
    }
}

/// Ledger entry with issuer/redeemer identity resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteWithParties {
    pub invite: InviteCode,
    pub created_by_name: String,
    pub created_by_email: String,
    pub used_by_name: Option<String>,
    pub used_by_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_32_uppercase_hex_chars() {
        let code = generate_code();
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn two_codes_differ() {
        assert_ne!(generate_code(), generate_code());
    }

    #[test]
    fn fresh_invite_is_consumable_until_expiry() {
        let now = Utc::now();
        let invite = InviteCode::issue(UserId::new(), 24, now);

        assert!(invite.is_consumable(now));
        assert!(invite.is_consumable(now + Duration::hours(23)));
        assert!(!invite.is_consumable(now + Duration::hours(25)));
    }

    #[test]
    fn used_invite_is_never_consumable() {
        let now = Utc::now();
        let mut invite = InviteCode::issue(UserId::new(), 24, now);
        invite.is_used = true;
        invite.used_by = Some(UserId::new());
        invite.used_at = Some(now);

        assert!(!invite.is_consumable(now));
    }
}
