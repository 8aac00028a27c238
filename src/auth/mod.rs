//! Credential boundary for backend requests.
//!
//! Token acquisition (login, registration) happens elsewhere. This module only
//! answers "is there a usable bearer token right now?".

mod storage;

pub use storage::{AccessToken, PublicUser, StoredLogin, TokenStorage};

/// Source of the bearer credential attached to outbound requests.
///
/// `None` means no usable credential; callers must not attempt the request.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed credential, for hosts that manage tokens themselves.
#[derive(Clone, Default)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = self.0.as_ref().map(|_| "[REDACTED]");
        f.debug_tuple("StaticCredential").field(&shown).finish()
    }
}

impl CredentialProvider for StaticCredential {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone().filter(|t| !t.is_empty())
    }
}
