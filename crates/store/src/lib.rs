//! Session persistence.
//!
//! [`InMemorySessionRepository`] implements [`picking::SessionRepository`] over
//! a process-local map. It enforces the two storage constraints of the port:
//! optimistic concurrency on every save and at most one active session per
//! worker.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Storage layout lives here; the [`picking`] crate sees
//! only the repository trait.

use std::collections::HashMap;

use async_trait::async_trait;
use picking::{
    PickError, PickSession, Result, SessionId, SessionRepository, SessionStatus, TaskId,
    WarehouseId, WorkerId,
};
use tokio::sync::RwLock;
use tracing::debug;

/// Stores session snapshots keyed by session id.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, PickSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<PickSession>
    where
        F: Fn(&PickSession) -> bool,
    {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<PickSession> =
            sessions.values().filter(|s| predicate(s)).cloned().collect();
        matching.sort_by_key(|s| s.created_at());
        matching
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_id(&self, session_id: &SessionId) -> Result<Option<PickSession>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save(&self, session: &PickSession, expected_version: u64) -> Result<u64> {
        let mut sessions = self.sessions.write().await;

        let stored_version = sessions
            .get(session.session_id())
            .map_or(0, PickSession::version);
        if stored_version != expected_version {
            return Err(PickError::Conflict {
                session_id: session.session_id().to_string(),
                expected: expected_version,
                actual: stored_version,
            });
        }

        if session.status().is_active() {
            if let Some(other) = sessions.values().find(|s| {
                s.worker_id() == session.worker_id()
                    && s.session_id() != session.session_id()
                    && s.status().is_active()
            }) {
                return Err(PickError::AlreadyActive {
                    worker_id: session.worker_id().to_string(),
                    session_id: other.session_id().to_string(),
                });
            }
        }

        let version = stored_version + 1;
        let mut stored = session.clone();
        stored.set_version(version);
        sessions.insert(session.session_id().clone(), stored);

        debug!(
            session_id = %session.session_id(),
            status = %session.status(),
            version,
            "Session saved"
        );
        Ok(version)
    }

    async fn mark_events_published(&self, session_id: &SessionId, count: usize) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(session_id)
            .ok_or_else(|| PickError::not_found("session", session_id.as_str()))?;
        stored.acknowledge_events(count);

        debug!(
            %session_id,
            published = count,
            remaining = stored.pending_events().len(),
            "Outbox drained"
        );
        Ok(())
    }

    async fn find_active_by_worker(&self, worker_id: &WorkerId) -> Result<Option<PickSession>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.worker_id() == worker_id && s.status().is_active())
            .cloned())
    }

    async fn find_by_task(&self, task_id: &TaskId) -> Result<Option<PickSession>> {
        Ok(self
            .filtered(|s| s.task_id() == task_id)
            .await
            .into_iter()
            .last())
    }

    async fn find_by_status(&self, status: SessionStatus) -> Result<Vec<PickSession>> {
        Ok(self.filtered(|s| s.status() == status).await)
    }

    async fn find_by_warehouse(&self, warehouse_id: &WarehouseId) -> Result<Vec<PickSession>> {
        Ok(self.filtered(|s| s.warehouse_id() == warehouse_id).await)
    }
}
