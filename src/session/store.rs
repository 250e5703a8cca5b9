// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::rag::ChatTurn;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Most recent turns, oldest first; never longer than the store's limit
    pub chat_history: Vec<ChatTurn>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            last_activity: now,
            chat_history: Vec::new(),
        }
    }
}

/// Session registry shared by all request handlers
///
/// Every mutation takes the write lock, so appends to one session are
/// applied one at a time.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    timeout: Duration,
    max_history: usize,
}

impl SessionStore {
    pub fn new(timeout: std::time::Duration, max_history: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout: Duration::from_std(timeout).unwrap_or_else(|_| Duration::weeks(52 * 100)),
            max_history,
        }
    }

    /// Return `id` if it names a live session, otherwise allocate a new one.
    /// The flag is true when a session was created.
    pub async fn resolve(&self, id: Option<&str>) -> (String, bool) {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if sessions.contains_key(id) {
                return (id.to_string(), false);
            }
        }

        let mut new_id = Uuid::new_v4().to_string();
        while sessions.contains_key(&new_id) {
            new_id = Uuid::new_v4().to_string();
        }
        sessions.insert(new_id.clone(), Session::new(Utc::now()));
        debug!("Created session {}", new_id);
        (new_id, true)
    }

    pub async fn touch(&self, id: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        session.last_activity = Utc::now();
        Ok(())
    }

    /// Add turns, then drop the oldest until the history fits the limit
    pub async fn append(&self, id: &str, turns: Vec<ChatTurn>) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        session.chat_history.extend(turns);
        let len = session.chat_history.len();
        if len > self.max_history {
            session.chat_history.drain(..len - self.max_history);
        }
        Ok(())
    }

    /// Snapshot of a session's history
    pub async fn history(&self, id: &str) -> Result<Vec<ChatTurn>, SessionError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(|s| s.chat_history.clone())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove sessions idle for longer than the timeout, returning how many
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    /// [`sweep`](Self::sweep) against an explicit clock
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_activity <= self.timeout);
        let removed = before - sessions.len();
        if removed > 0 {
            info!("Removed {} expired sessions", removed);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    #[cfg(test)]
    async fn set_last_activity(&self, id: &str, at: DateTime<Utc>) {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.last_activity = at;
        }
    }
}
