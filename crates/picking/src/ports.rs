//! Port traits implemented by infrastructure crates.
//!
//! The domain defines *what* it needs from persistence and messaging; the
//! `store` and `messaging` crates define *how*.

use async_trait::async_trait;

use crate::errors::Result;
use crate::events::SessionEvent;
use crate::identifiers::{SessionId, TaskId, WarehouseId, WorkerId};
use crate::session::{PickSession, SessionStatus};

/// Durable storage for session snapshots.
///
/// Implementations must enforce two constraints:
///
/// - **Optimistic concurrency.** [`save`](Self::save) succeeds only if the
///   stored version still equals `expected_version`; otherwise it returns
///   [`crate::PickError::Conflict`]. A session that has never been saved has
///   version 0.
/// - **One active session per worker.** Saving an IN_PROGRESS or PAUSED
///   session fails with [`crate::PickError::AlreadyActive`] when a different
///   session of the same worker is already active.
///
/// Staged events ([`PickSession::pending_events`]) are stored with the
/// snapshot and stay there until [`mark_events_published`](Self::mark_events_published)
/// removes them.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_id(&self, session_id: &SessionId) -> Result<Option<PickSession>>;

    /// Persists `session` and returns its new version.
    async fn save(&self, session: &PickSession, expected_version: u64) -> Result<u64>;

    /// Removes the oldest `count` staged events of a stored session without
    /// changing its version.
    async fn mark_events_published(&self, session_id: &SessionId, count: usize) -> Result<()>;

    async fn find_active_by_worker(&self, worker_id: &WorkerId) -> Result<Option<PickSession>>;

    async fn find_by_task(&self, task_id: &TaskId) -> Result<Option<PickSession>>;

    async fn find_by_status(&self, status: SessionStatus) -> Result<Vec<PickSession>>;

    async fn find_by_warehouse(&self, warehouse_id: &WarehouseId) -> Result<Vec<PickSession>>;
}

/// Outbound channel for domain events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes `events` in order. An empty slice is a no-op.
    async fn publish(&self, events: &[SessionEvent]) -> Result<()>;
}
