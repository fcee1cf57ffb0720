use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{models::session::SessionData, types::SessionId};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the live session for `id`. Expired sessions read as absent.
    async fn get(&self, id: &SessionId) -> anyhow::Result<Option<SessionData>>;
    async fn set(&self, id: SessionId, data: SessionData) -> anyhow::Result<()>;
    async fn destroy(&self, id: &SessionId) -> anyhow::Result<()>;
}

/// Process-local store. Sessions do not survive a restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired session and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, data| !data.is_expired_at(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &SessionId) -> anyhow::Result<Option<SessionData>> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                None => return Ok(None),
                Some(data) if !data.is_expired_at(now) => return Ok(Some(data.clone())),
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions.get(id).is_some_and(|data| data.is_expired_at(now)) {
            tracing::debug!(session_id = %id, "Evicting expired session");
            sessions.remove(id);
        }
        Ok(None)
    }

    async fn set(&self, id: SessionId, data: SessionData) -> anyhow::Result<()> {
        self.sessions.write().await.insert(id, data);
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> anyhow::Result<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}
