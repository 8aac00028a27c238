//! File-backed storage for the signed-in user and their access token.

use super::CredentialProvider;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Identity returned by the backend on login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl PublicUser {
    /// Identity key used to scope per-user storage.
    #[must_use]
    pub fn user_key(&self) -> String {
        self.id.to_string()
    }
}

/// Bearer token with an optional absolute expiry.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    /// Build from a login response's relative lifetime.
    pub fn issued_now(access_token: impl Into<String>, expires_in_minutes: i64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Some(Utc::now() + Duration::minutes(expires_in_minutes)),
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLogin {
    pub user: PublicUser,
    pub token: AccessToken,
}

/// Persists the current login to a JSON file.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored login, if any.
    pub fn load(&self) -> Result<Option<StoredLogin>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let login: StoredLogin = serde_json::from_str(&content)
            .with_context(|| format!("Invalid credentials file {}", self.path.display()))?;
        Ok(Some(login))
    }

    pub fn save(&self, login: &StoredLogin) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(login)?;
        fs::write(&self.path, content)?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, permissions)?;
        }

        Ok(())
    }

    /// Forget the stored login (logout).
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// The signed-in user, if a login is stored.
    #[must_use]
    pub fn current_user(&self) -> Option<PublicUser> {
        self.load().ok().flatten().map(|login| login.user)
    }
}

impl CredentialProvider for TokenStorage {
    fn bearer_token(&self) -> Option<String> {
        match self.load() {
            Ok(Some(login)) if !login.token.is_expired() => Some(login.token.access_token),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable credentials");
                None
            }
        }
    }
}
