//! SQLite implementation of `SessionRepository`.
//!
//! A single-row table holds the serialized session, so a login survives
//! process restarts. Synchronous rusqlite calls run under
//! `tokio::task::spawn_blocking` to keep the async runtime unblocked.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use super::{Session, SessionRepository, SessionStoreError};

/// SQLite-backed session repository.
pub struct SqliteSessionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionRepository {
    /// Open (or create) the session database at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, SessionStoreError> {
        let path_ref = path.as_ref();

        let path_str = path_ref.to_string_lossy();
        if path_str != ":memory:" && !path_str.is_empty() {
            if let Some(parent) = path_ref.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        SessionStoreError::storage(
                            "create database directory",
                            format!("{}: {}", parent.display(), e),
                        )
                    })?;

                    // Token material lives in this directory; keep it private.
                    #[cfg(unix)]
                    {
                        use std::os::unix::fs::PermissionsExt;
                        let permissions = std::fs::Permissions::from_mode(0o700);
                        if let Err(e) = std::fs::set_permissions(parent, permissions) {
                            warn!(
                                "Failed to set restrictive permissions on state directory: {}",
                                e
                            );
                        }
                    }
                }
            }
        }

        let conn = Connection::open(path_ref)
            .map_err(|e| SessionStoreError::storage("open database", e.to_string()))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| SessionStoreError::storage("set journal_mode", e.to_string()))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|e| SessionStoreError::storage("set busy_timeout", e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                session_json TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| SessionStoreError::storage("create schema", e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (tests).
    pub fn in_memory() -> Result<Self, SessionStoreError> {
        Self::new(":memory:")
    }

    fn now_secs() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn get(&self) -> Result<Option<Session>, SessionStoreError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();

            let json: Option<String> = conn
                .query_row("SELECT session_json FROM session WHERE id = 1", [], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| SessionStoreError::storage("get", e.to_string()))?;

            match json {
                Some(json) => {
                    let session: Session = serde_json::from_str(&json)
                        .map_err(|_| SessionStoreError::Corruption)?;
                    Ok(Some(session))
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| SessionStoreError::storage("get", e.to_string()))?
    }

    async fn put(&self, session: &Session) -> Result<(), SessionStoreError> {
        let conn = self.conn.clone();
        let json = serde_json::to_string(session)
            .map_err(|e| SessionStoreError::storage("serialize session", e.to_string()))?;

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.execute(
                "INSERT INTO session (id, session_json, updated_at) VALUES (1, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET session_json = ?1, updated_at = ?2",
                params![json, Self::now_secs()],
            )
            .map_err(|e| SessionStoreError::storage("put", e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| SessionStoreError::storage("put", e.to_string()))?
    }

    async fn delete(&self) -> Result<(), SessionStoreError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.execute("DELETE FROM session WHERE id = 1", [])
                .map_err(|e| SessionStoreError::storage("delete", e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| SessionStoreError::storage("delete", e.to_string()))?
    }
}
