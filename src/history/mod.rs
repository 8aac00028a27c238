//! Per-user bounded conversation history.
//!
//! History is stored as one JSON array per user under `history:<userId>` in a
//! [`KeyValueStore`]. Writes keep only the newest [`RETENTION_CAP`] messages.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::message::ConversationLog;
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of messages kept in persisted history.
pub const RETENTION_CAP: usize = 10;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt history under {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// String key-value storage backing the history store.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;
    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError>;
    fn remove(&self, key: &str) -> Result<(), HistoryError>;
}

/// Storage key for a user's history.
#[must_use]
pub fn history_key(user_id: &str) -> String {
    format!("history:{user_id}")
}

pub struct PersistedHistoryStore {
    kv: Box<dyn KeyValueStore>,
}

impl PersistedHistoryStore {
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    /// Load a user's history.
    ///
    /// Absent, unreadable, or malformed data all yield an empty log.
    pub fn load(&self, user_id: &str) -> ConversationLog {
        match self.try_load(user_id) {
            Ok(log) => log,
            Err(e) => {
                warn!(user_id, error = %e, "Discarding unreadable history");
                ConversationLog::new()
            }
        }
    }

    fn try_load(&self, user_id: &str) -> Result<ConversationLog, HistoryError> {
        let key = history_key(user_id);
        let Some(raw) = self.kv.get(&key)? else {
            return Ok(ConversationLog::new());
        };

        let mut log: ConversationLog =
            serde_json::from_str(&raw).map_err(|e| HistoryError::Corrupt {
                key,
                reason: e.to_string(),
            })?;

        // Another writer may not have honored the cap
        log.retain_last(RETENTION_CAP);
        debug!(user_id, messages = log.len(), "Loaded history");
        Ok(log)
    }

    /// Persist the newest [`RETENTION_CAP`] messages of `log`.
    pub fn save(&self, user_id: &str, log: &ConversationLog) -> Result<(), HistoryError> {
        let retained = log.tail(RETENTION_CAP);
        let json = serde_json::to_string(&retained)?;
        self.kv.set(&history_key(user_id), &json)?;
        debug!(
            user_id,
            messages = retained.len(),
            dropped = log.len() - retained.len(),
            "Saved history"
        );
        Ok(())
    }

    /// Remove a user's persisted history.
    pub fn clear(&self, user_id: &str) -> Result<(), HistoryError> {
        self.kv.remove(&history_key(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{AttachmentRef, Message};
    use chrono::{Duration, TimeZone, Utc};

    fn numbered(n: usize) -> ConversationLog {
        (0..n)
            .map(|i| Message::user(format!("m{i}")))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_load_absent_is_empty() {
        let store = PersistedHistoryStore::new(MemoryStore::new());
        assert!(store.load("u1").is_empty());
    }

    #[test]
    fn test_save_trims_to_newest() {
        let kv = MemoryStore::new();
        let store = PersistedHistoryStore::new(kv.clone());
        let log = numbered(30);

        store.save("u1", &log).unwrap();

        let loaded = store.load("u1");
        assert_eq!(loaded.len(), RETENTION_CAP);
        assert_eq!(loaded.as_slice(), &log.as_slice()[20..]);

        // The raw stored value is bounded too, not just the loaded view
        let raw = kv.get("history:u1").unwrap().unwrap();
        let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), RETENTION_CAP);
    }

    #[test]
    fn test_retention_for_every_length() {
        let store = PersistedHistoryStore::new(MemoryStore::new());
        for n in 0..=25 {
            let log = numbered(n);
            store.save("u", &log).unwrap();
            let loaded = store.load("u");
            let expected = n.min(RETENTION_CAP);
            assert_eq!(loaded.len(), expected);
            assert_eq!(loaded.as_slice(), &log.as_slice()[n - expected..]);
        }
    }

    #[test]
    fn test_round_trip_preserves_content_and_time() {
        let store = PersistedHistoryStore::new(MemoryStore::new());
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();

        let mut first = Message::user("I slept badly");
        first.created_at = base + Duration::nanoseconds(123_456_789);
        let mut second = Message::assistant("That sounds hard.");
        second.created_at = base + Duration::seconds(4);
        let third = Message::user("see attached").with_attachments(vec![AttachmentRef {
            name: "labs.pdf".into(),
            size_bytes: 2048,
            mime_type: "application/pdf".into(),
            remote_url: Some("https://docs.example/1".into()),
        }]);
        let log: ConversationLog = vec![first, second, third].into();

        store.save("u1", &log).unwrap();
        let loaded = store.load("u1");

        assert_eq!(loaded, log);
        let times: Vec<_> = loaded.iter().map(|m| m.created_at).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_corrupt_entry_is_no_history() {
        let kv = MemoryStore::new();
        kv.set("history:u1", "{not json").unwrap();
        let store = PersistedHistoryStore::new(kv);
        assert!(store.load("u1").is_empty());
    }

    #[test]
    fn test_wrong_shape_is_no_history() {
        let kv = MemoryStore::new();
        kv.set("history:u1", r#"[{"role":"user"}]"#).unwrap();
        let store = PersistedHistoryStore::new(kv);
        assert!(store.load("u1").is_empty());
    }

    #[test]
    fn test_oversized_stored_log_is_capped_on_load() {
        let kv = MemoryStore::new();
        let json = serde_json::to_string(&numbered(14)).unwrap();
        kv.set("history:u1", &json).unwrap();

        let loaded = PersistedHistoryStore::new(kv).load("u1");
        assert_eq!(loaded.len(), RETENTION_CAP);
        assert_eq!(loaded.as_slice()[0].content, "m4");
    }

    #[test]
    fn test_users_are_isolated() {
        let store = PersistedHistoryStore::new(MemoryStore::new());
        store.save("alice", &numbered(3)).unwrap();

        assert_eq!(store.load("alice").len(), 3);
        assert!(store.load("bob").is_empty());
    }

    #[test]
    fn test_clear() {
        let store = PersistedHistoryStore::new(MemoryStore::new());
        store.save("u1", &numbered(2)).unwrap();
        store.clear("u1").unwrap();
        assert!(store.load("u1").is_empty());
    }
}
