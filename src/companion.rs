//! Wiring for a signed-in user: durable history, stored credentials, and the
//! backend client.

use crate::Result;
use crate::attachment::StagedDocument;
use crate::auth::TokenStorage;
use crate::config::Config;
use crate::history::{PersistedHistoryStore, SqliteStore};
use crate::remote::BackendClient;
use crate::session::{ConversationSession, ExchangeOutcome};
use std::sync::Arc;
use tracing::info;

pub struct Companion {
    session: ConversationSession,
    remote: BackendClient,
    credentials: TokenStorage,
}

impl Companion {
    /// Open the conversation for the stored login.
    ///
    /// Returns `None` when nobody is signed in.
    pub fn connect(config: &Config) -> Result<Option<Self>> {
        let credentials = TokenStorage::new(config.credentials_path());
        let Some(login) = credentials.load()? else {
            return Ok(None);
        };

        let store = PersistedHistoryStore::new(SqliteStore::open(&config.history_db_path())?);
        let session = ConversationSession::open(login.user.user_key(), store);
        let remote = BackendClient::new(config, Arc::new(credentials.clone()));
        info!(user_id = session.user_id(), "Companion connected");

        Ok(Some(Self {
            session,
            remote,
            credentials,
        }))
    }

    #[must_use]
    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ConversationSession {
        &mut self.session
    }

    /// Submit through the backend client.
    pub async fn send(
        &mut self,
        text: &str,
        attachment: Option<StagedDocument>,
    ) -> Option<ExchangeOutcome> {
        self.session.submit(&self.remote, text, attachment).await
    }

    /// Forget the stored login and discard the session.
    pub fn logout(self) -> Result<()> {
        self.credentials.clear()?;
        self.session.end();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, PublicUser, StoredLogin};
    use crate::remote::ExchangeError;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            // Nothing listens here
            api_base_url: "http://127.0.0.1:1".into(),
            data_dir: dir.to_path_buf(),
            connect_timeout_secs: 2,
            request_timeout_secs: 2,
            ..Config::default()
        }
    }

    fn sign_in(config: &Config, token: AccessToken) {
        TokenStorage::new(config.credentials_path())
            .save(&StoredLogin {
                user: PublicUser {
                    id: 42,
                    email: "kim@example.com".into(),
                    display_name: None,
                },
                token,
            })
            .unwrap();
    }

    #[test]
    fn test_no_login_no_session() {
        let dir = tempdir().unwrap();
        assert!(Companion::connect(&config_in(dir.path())).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_login_fails_unauthenticated() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        sign_in(&config, AccessToken::issued_now("old", -5));

        let mut companion = Companion::connect(&config).unwrap().unwrap();
        assert_eq!(companion.session().user_id(), "42");

        let outcome = companion.send("hello", None).await.unwrap();
        assert_eq!(outcome, Err(ExchangeError::Unauthenticated));
        assert_eq!(companion.session().log().len(), 2);
        assert!(!companion.session().is_exchange_in_flight());
    }

    #[tokio::test]
    async fn test_history_persists_across_connects_and_logout_clears_login() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        sign_in(&config, AccessToken::issued_now("old", -5));

        let mut companion = Companion::connect(&config).unwrap().unwrap();
        companion.send("remember me", None).await;
        drop(companion);

        let companion = Companion::connect(&config).unwrap().unwrap();
        assert_eq!(companion.session().log().len(), 2);
        assert_eq!(companion.session().log().as_slice()[0].content, "remember me");

        companion.logout().unwrap();
        assert!(Companion::connect(&config).unwrap().is_none());
    }
}
