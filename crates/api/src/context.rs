use folio_auth::Role;
use folio_core::UserId;

/// Authenticated identity for a request.
///
/// This is immutable and is attached to request extensions by the auth
/// middleware; handlers receive it instead of re-deriving the caller. The
/// role is the one currently on the user record, not the one embedded in the
/// token, so role edits take effect on the next request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
    role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
