//! Session-scoped CSRF token

use uuid::Uuid;

/// Holds the one token issued for this page session.
///
/// Written once at startup; every form submission carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStore {
    token: String,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::generate()
    }
}

impl TokenStore {
    /// Issue a fresh random token
    pub fn generate() -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
        }
    }

    /// Use a known token
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The session token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether `candidate` is this session's token
    pub fn verify(&self, candidate: &str) -> bool {
        !candidate.is_empty() && candidate == self.token
    }
}
