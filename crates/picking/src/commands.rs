//! Commands accepted by the domain.
//!
//! [`CreateSession`] carries raw identifier strings; they are validated when
//! the session is built so that a missing field is reported by name.
//! [`SessionCommand`] covers every command addressed to an existing session.

use serde::{Deserialize, Serialize};

use crate::identifiers::{InstructionId, SessionId};
use crate::instruction::PickInstruction;
use crate::session::SessionOperation;
use crate::types::PickStrategy;

/// Request to open a new pick session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSession {
    pub task_id: String,
    pub worker_id: String,
    pub warehouse_id: String,
    pub strategy: PickStrategy,
    pub cart_id: String,
    pub instructions: Vec<PickInstruction>,
}

/// A command addressed to one existing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    ConfirmPick {
        instruction_id: InstructionId,
        quantity: u32,
    },
    ShortPick {
        instruction_id: InstructionId,
        actual_quantity: u32,
        reason: String,
    },
    Skip {
        instruction_id: InstructionId,
        reason: String,
    },
    Pause,
    Resume,
    Complete,
    Cancel {
        reason: String,
    },
    Fail {
        reason: String,
    },
}

impl SessionCommand {
    /// The lifecycle operation this command performs.
    pub fn operation(&self) -> SessionOperation {
        match self {
            Self::ConfirmPick { .. } => SessionOperation::ConfirmPick,
            Self::ShortPick { .. } => SessionOperation::ShortPick,
            Self::Skip { .. } => SessionOperation::Skip,
            Self::Pause => SessionOperation::Pause,
            Self::Resume => SessionOperation::Resume,
            Self::Complete => SessionOperation::Complete,
            Self::Cancel { .. } => SessionOperation::Cancel,
            Self::Fail { .. } => SessionOperation::Fail,
        }
    }
}

/// A [`SessionCommand`] routed to a session by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub command: SessionCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_deserialize_from_flat_json() {
        let request: SessionRequest = serde_json::from_str(
            r#"{"session_id":"SESSION-1","command":"short_pick","instruction_id":"I-1","actual_quantity":2,"reason":"damaged"}"#,
        )
        .unwrap();
        assert_eq!(request.session_id.as_str(), "SESSION-1");
        assert_eq!(request.command.operation(), SessionOperation::ShortPick);
    }

    #[test]
    fn negative_quantities_do_not_deserialize() {
        let result: Result<SessionCommand, _> = serde_json::from_str(
            r#"{"command":"confirm_pick","instruction_id":"I-1","quantity":-1}"#,
        );
        assert!(result.is_err());
    }
}
