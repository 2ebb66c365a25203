//! Domain events raised by [`crate::PickSession`] transitions.
//!
//! Events are returned from the operation that raised them; the session keeps
//! no buffer. A collaborator persists the new session state and publishes the
//! events together.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::identifiers::{
    CartId, InstructionId, SessionId, Sku, TaskId, WarehouseId, WorkerId,
};
use crate::location::Location;
use crate::types::{PickStrategy, Timestamp};

/// The session left CREATED with an optimized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStarted {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub worker_id: WorkerId,
    pub warehouse_id: WarehouseId,
    pub strategy: PickStrategy,
    pub cart_id: CartId,
    pub total_instructions: usize,
    pub occurred_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickConfirmed {
    pub session_id: SessionId,
    pub instruction_id: InstructionId,
    pub sku: Sku,
    pub quantity: u32,
    pub location: Location,
    pub worker_id: WorkerId,
    pub occurred_at: Timestamp,
}

/// Fewer units than expected were found at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortPickRecorded {
    pub session_id: SessionId,
    pub instruction_id: InstructionId,
    pub sku: Sku,
    pub expected_quantity: u32,
    pub actual_quantity: u32,
    pub location: Location,
    pub reason: String,
    pub worker_id: WorkerId,
    pub occurred_at: Timestamp,
}

impl ShortPickRecorded {
    pub fn shortage_quantity(&self) -> u32 {
        self.expected_quantity.saturating_sub(self.actual_quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionSkipped {
    pub session_id: SessionId,
    pub instruction_id: InstructionId,
    pub sku: Sku,
    pub location: Location,
    pub reason: String,
    pub worker_id: WorkerId,
    pub occurred_at: Timestamp,
}

/// Every instruction reached a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCompleted {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub worker_id: WorkerId,
    pub warehouse_id: WarehouseId,
    pub total_instructions: usize,
    pub completed_instructions: usize,
    pub short_picks: usize,
    /// Picked units over expected units, as a percentage.
    pub accuracy: f64,
    pub duration: Duration,
    pub occurred_at: Timestamp,
}

impl SessionCompleted {
    /// Completed instructions per hour of session time; zero for an instant session.
    pub fn picks_per_hour(&self) -> f64 {
        let hours = self.duration.as_secs_f64() / 3600.0;
        if hours == 0.0 {
            return 0.0;
        }
        self.completed_instructions as f64 / hours
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCancelled {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub worker_id: WorkerId,
    pub warehouse_id: WarehouseId,
    pub reason: String,
    pub completed_instructions: usize,
    pub total_instructions: usize,
    pub occurred_at: Timestamp,
}

impl SessionCancelled {
    pub fn completion_percentage(&self) -> f64 {
        if self.total_instructions == 0 {
            return 0.0;
        }
        self.completed_instructions as f64 / self.total_instructions as f64 * 100.0
    }
}

/// The session was abandoned because of an operational fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFailed {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub worker_id: WorkerId,
    pub warehouse_id: WarehouseId,
    pub reason: String,
    pub completed_instructions: usize,
    pub total_instructions: usize,
    pub occurred_at: Timestamp,
}

/// Any event a session can raise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted(SessionStarted),
    PickConfirmed(PickConfirmed),
    ShortPick(ShortPickRecorded),
    InstructionSkipped(InstructionSkipped),
    SessionCompleted(SessionCompleted),
    SessionCancelled(SessionCancelled),
    SessionFailed(SessionFailed),
}

impl SessionEvent {
    /// Stable dotted type name, e.g. `pick.session.started`.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionStarted(_) => "pick.session.started",
            Self::PickConfirmed(_) => "pick.instruction.picked",
            Self::ShortPick(_) => "pick.instruction.short_picked",
            Self::InstructionSkipped(_) => "pick.instruction.skipped",
            Self::SessionCompleted(_) => "pick.session.completed",
            Self::SessionCancelled(_) => "pick.session.cancelled",
            Self::SessionFailed(_) => "pick.session.failed",
        }
    }

    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::SessionStarted(e) => &e.session_id,
            Self::PickConfirmed(e) => &e.session_id,
            Self::ShortPick(e) => &e.session_id,
            Self::InstructionSkipped(e) => &e.session_id,
            Self::SessionCompleted(e) => &e.session_id,
            Self::SessionCancelled(e) => &e.session_id,
            Self::SessionFailed(e) => &e.session_id,
        }
    }

    pub fn occurred_at(&self) -> Timestamp {
        match self {
            Self::SessionStarted(e) => e.occurred_at,
            Self::PickConfirmed(e) => e.occurred_at,
            Self::ShortPick(e) => e.occurred_at,
            Self::InstructionSkipped(e) => e.occurred_at,
            Self::SessionCompleted(e) => e.occurred_at,
            Self::SessionCancelled(e) => e.occurred_at,
            Self::SessionFailed(e) => e.occurred_at,
        }
    }

    /// The event body as JSON, without the enum tag.
    pub fn payload(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::SessionStarted(e) => serde_json::to_value(e),
            Self::PickConfirmed(e) => serde_json::to_value(e),
            Self::ShortPick(e) => serde_json::to_value(e),
            Self::InstructionSkipped(e) => serde_json::to_value(e),
            Self::SessionCompleted(e) => serde_json::to_value(e),
            Self::SessionCancelled(e) => serde_json::to_value(e),
            Self::SessionFailed(e) => serde_json::to_value(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(duration: Duration, completed_instructions: usize) -> SessionCompleted {
        SessionCompleted {
            session_id: SessionId::new("SESSION-1").unwrap(),
            task_id: TaskId::new("T-1").unwrap(),
            worker_id: WorkerId::new("W-1").unwrap(),
            warehouse_id: WarehouseId::new("WH-1").unwrap(),
            total_instructions: completed_instructions,
            completed_instructions,
            short_picks: 0,
            accuracy: 100.0,
            duration,
            occurred_at: Timestamp::now(),
        }
    }

    #[test]
    fn picks_per_hour() {
        assert_eq!(completed(Duration::from_secs(1800), 10).picks_per_hour(), 20.0);
        assert_eq!(completed(Duration::ZERO, 10).picks_per_hour(), 0.0);
    }

    #[test]
    fn tagged_serialization_and_payload() {
        let event = SessionEvent::SessionCompleted(completed(Duration::from_secs(60), 3));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session_completed");
        assert_eq!(json["completed_instructions"], 3);

        let payload = event.payload().unwrap();
        assert!(payload.get("type").is_none());
        assert_eq!(payload["session_id"], "SESSION-1");
        assert_eq!(event.event_type(), "pick.session.completed");
    }
}
