//! Bearer token entities.

use chrono::{DateTime, Utc};

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    Authentication,
    /// Single-purpose token mailed to a new user to activate the account.
    Activation,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Authentication => "authentication",
            TokenScope::Activation => "activation",
        }
    }
}

/// A token ready to be persisted. Only the hash is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewToken {
    pub hash: String,
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    pub scope: TokenScope,
}

/// A freshly issued token. `plaintext` is shown to the client once.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub plaintext: String,
    pub expiry: DateTime<Utc>,
}
