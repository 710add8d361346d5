//! services/api/src/adapters/session_file.rs
//!
//! A small key-value JSON file that keeps the logged-in user across restarts.
//! It implements the `SessionStore` port from the `core` crate.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use study_assistant_core::{
    domain::AuthUser,
    ports::{PortError, PortResult, SessionStore},
};
use tokio::fs;
use tracing::{info, warn};

/// The fixed key the user record is stored under.
pub const SESSION_KEY: &str = "ai-study-assistant-user";

#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, String> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(format!("failed to read {}: {}", self.path.display(), err)),
        };
        serde_json::from_slice::<Map<String, Value>>(&data)
            .map_err(|err| format!("failed to parse {}: {}", self.path.display(), err))
    }

    /// Writes through a temporary file so a crash never leaves a half-written store.
    async fn write_entries(&self, entries: &Map<String, Value>) -> PortResult<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| {
                    PortError::Unexpected(format!("failed to create {}: {}", dir.display(), e))
                })?;
        }

        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| {
                PortError::Unexpected(format!("failed to write {}: {}", tmp_path.display(), e))
            })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| {
                PortError::Unexpected(format!("failed to replace {}: {}", self.path.display(), e))
            })
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn load_session(&self) -> Option<AuthUser> {
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Ignoring unreadable session store: {}", err);
                return None;
            }
        };

        let raw = entries.get(SESSION_KEY)?.clone();
        match serde_json::from_value::<AuthUser>(raw) {
            Ok(user) => {
                info!(email = %user.email, "Restored saved session");
                Some(user)
            }
            Err(err) => {
                warn!("Error parsing saved user, discarding it: {}", err);
                entries.remove(SESSION_KEY);
                if let Err(e) = self.write_entries(&entries).await {
                    warn!("Failed to discard corrupt session record: {}", e);
                }
                None
            }
        }
    }

    async fn save_session(&self, user: &AuthUser) -> PortResult<()> {
        // A corrupt store is replaced rather than blocking login.
        let mut entries = self.read_entries().await.unwrap_or_default();
        let value = serde_json::to_value(user).map_err(|e| PortError::Unexpected(e.to_string()))?;
        entries.insert(SESSION_KEY.to_string(), value);
        self.write_entries(&entries).await
    }

    async fn clear_session(&self) -> PortResult<()> {
        let mut entries = self.read_entries().await.unwrap_or_default();
        if entries.remove(SESSION_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store(prefix: &str) -> JsonFileSessionStore {
        let dir = std::env::temp_dir()
            .join(format!("study_assistant_{}_{}", prefix, Uuid::new_v4()));
        JsonFileSessionStore::new(dir.join("session.json"))
    }

    #[tokio::test]
    async fn missing_file_means_no_user() {
        let store = temp_store("missing");
        assert!(store.load_session().await.is_none());
    }

    #[tokio::test]
    async fn saved_user_is_restored() {
        let store = temp_store("roundtrip");
        let user = AuthUser::from_email("grace@example.com");
        store.save_session(&user).await.unwrap();

        let restored = JsonFileSessionStore::new(store.path().to_path_buf());
        assert_eq!(restored.load_session().await, Some(user));

        let _ = std::fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[tokio::test]
    async fn corrupt_file_means_no_user() {
        let store = temp_store("corrupt");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), b"{ not json").unwrap();

        assert!(store.load_session().await.is_none());

        let _ = std::fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[tokio::test]
    async fn corrupt_record_is_discarded_but_other_keys_survive() {
        let store = temp_store("bad_record");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            br#"{"ai-study-assistant-user": "oops", "theme": "dark"}"#,
        )
        .unwrap();

        assert!(store.load_session().await.is_none());
        let remaining: Map<String, Value> =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert!(!remaining.contains_key(SESSION_KEY));
        assert_eq!(remaining["theme"], "dark");

        let _ = std::fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[tokio::test]
    async fn clear_removes_the_user() {
        let store = temp_store("clear");
        store.save_session(&AuthUser::from_email("a@b.c")).await.unwrap();
        store.clear_session().await.unwrap();
        assert!(store.load_session().await.is_none());

        let _ = std::fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[tokio::test]
    async fn clearing_a_missing_store_writes_nothing() {
        let store = temp_store("clear_missing");
        store.clear_session().await.unwrap();
        assert!(!tokio::fs::try_exists(store.path()).await.unwrap());
    }
}
