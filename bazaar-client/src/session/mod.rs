//! Authenticated session handling.
//!
//! The session (bearer token plus the logged-in user record) is an explicit
//! object threaded through the HTTP layer, not module-level mutable state.
//! Persistence goes through the `SessionRepository` trait so the backend is
//! swappable (in-memory for tests, SQLite for the CLI).
//!
//! There is exactly one cross-cutting auth rule in this client: any 401
//! response clears the stored session and fires a process-wide auth-expired
//! notification. Consumers subscribe to that channel and decide what
//! "navigate to the landing route" means for them.

mod memory;
mod sqlite;

pub use memory::InMemorySessionRepository;
pub use sqlite::SqliteSessionRepository;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::info;

use bazaar_core::UserId;

/// The logged-in user record stored alongside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// A bearer token and the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

/// Notification sent to subscribers when a 401 invalidates the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthExpired;

/// Errors from session persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// The storage backend failed.
    Storage { operation: String, message: String },
    /// A persisted session could not be deserialized.
    Corruption,
}

impl SessionStoreError {
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage { operation, message } => {
                write!(f, "session storage failed during {}: {}", operation, message)
            }
            Self::Corruption => write!(f, "persisted session is corrupt"),
        }
    }
}

impl std::error::Error for SessionStoreError {}

/// Repository trait for persisting the session.
///
/// A single session exists at a time; `put` has upsert semantics.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn get(&self) -> Result<Option<Session>, SessionStoreError>;
    async fn put(&self, session: &Session) -> Result<(), SessionStoreError>;
    async fn delete(&self) -> Result<(), SessionStoreError>;
}

/// Shared handle to the current session.
///
/// Cheap to clone; all clones observe the same session and the same
/// auth-expired channel.
#[derive(Clone)]
pub struct SessionHandle {
    repository: Arc<dyn SessionRepository>,
    current: Arc<RwLock<Option<Session>>>,
    expired_tx: broadcast::Sender<AuthExpired>,
}

impl SessionHandle {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        let (expired_tx, _) = broadcast::channel(8);
        Self {
            repository,
            current: Arc::new(RwLock::new(None)),
            expired_tx,
        }
    }

    /// Load any persisted session into memory. Called once at startup.
    pub async fn restore(&self) -> Result<Option<Session>, SessionStoreError> {
        let session = self.repository.get().await?;
        *self.current.write().await = session.clone();
        Ok(session)
    }

    /// Store a freshly issued session (after login).
    pub async fn store(&self, session: Session) -> Result<(), SessionStoreError> {
        self.repository.put(&session).await?;
        *self.current.write().await = Some(session);
        Ok(())
    }

    /// Clear the session without notifying subscribers (explicit logout).
    pub async fn clear(&self) -> Result<(), SessionStoreError> {
        self.repository.delete().await?;
        *self.current.write().await = None;
        Ok(())
    }

    /// Clear the session and notify subscribers. Invoked by the HTTP layer
    /// on any 401 response.
    pub async fn expire(&self) {
        if let Err(e) = self.repository.delete().await {
            // The in-memory session is cleared regardless; a stale row in
            // the store only costs a redundant expiry on next restore.
            tracing::warn!("Failed to delete persisted session: {}", e);
        }
        *self.current.write().await = None;
        info!("Session expired, notifying subscribers");
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self.expired_tx.send(AuthExpired);
    }

    /// Subscribe to auth-expired notifications.
    pub fn subscribe_expiry(&self) -> broadcast::Receiver<AuthExpired> {
        self.expired_tx.subscribe()
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn user(&self) -> Option<SessionUser> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_logged_in(&self) -> bool {
        self.current.read().await.is_some()
    }
}
