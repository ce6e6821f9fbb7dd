//! Per-request caller identity.

use super::User;

/// User ID reported for the anonymous identity. No stored user has it.
pub const ANONYMOUS_USER_ID: i64 = 0;

/// The caller a request is executed on behalf of.
///
/// Exactly one identity is attached to every request by the authentication
/// middleware and stays unchanged for the rest of the request.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    /// No credentials were supplied.
    Anonymous,
    User(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user_id(&self) -> i64 {
        match self {
            Identity::Anonymous => ANONYMOUS_USER_ID,
            Identity::User(user) => user.id,
        }
    }

    /// Anonymous callers are never activated.
    pub fn is_activated(&self) -> bool {
        match self {
            Identity::Anonymous => false,
            Identity::User(user) => user.activated,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }
}
