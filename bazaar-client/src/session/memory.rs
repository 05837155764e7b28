//! In-memory implementation of `SessionRepository`.
//!
//! The session is lost when the process exits. Used in tests and anywhere
//! persistence across restarts is not wanted.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Session, SessionRepository, SessionStoreError};

pub struct InMemorySessionRepository {
    session: RwLock<Option<Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn get(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.session.read().await.clone())
    }

    async fn put(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn delete(&self) -> Result<(), SessionStoreError> {
        *self.session.write().await = None;
        Ok(())
    }
}
