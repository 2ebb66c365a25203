//! Session lifecycle states and the table of operations each state accepts.
//!
//! ```text
//! CREATED ──start──▶ IN_PROGRESS ◀──resume── PAUSED
//!    │                 │  │  └────pause────────▶│
//!    │                 │  └──complete──▶ COMPLETED
//!    └────cancel───────┴────cancel─────▶ CANCELLED ◀──cancel──┘
//!                      └─────fail──────▶ FAILED    ◀──fail────┘
//! ```
//!
//! Every mutating operation on a session is checked against
//! [`SessionStatus::allowed_operations`] before anything changes.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a pick session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Built, waiting for an optimized path.
    Created,
    InProgress,
    /// Temporarily halted by the worker.
    Paused,
    Completed,
    Cancelled,
    /// Abandoned because of an operational fault.
    Failed,
}

/// A mutating operation on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOperation {
    Start,
    ConfirmPick,
    ShortPick,
    Skip,
    Pause,
    Resume,
    Complete,
    Cancel,
    Fail,
}

impl SessionStatus {
    /// All states, in lifecycle order.
    pub const ALL: [SessionStatus; 6] = [
        Self::Created,
        Self::InProgress,
        Self::Paused,
        Self::Completed,
        Self::Cancelled,
        Self::Failed,
    ];

    /// The transition table.
    pub fn allowed_operations(self) -> &'static [SessionOperation] {
        use SessionOperation::*;
        match self {
            Self::Created => &[Start, Cancel],
            Self::InProgress => &[ConfirmPick, ShortPick, Skip, Pause, Complete, Cancel, Fail],
            Self::Paused => &[Resume, Cancel, Fail],
            Self::Completed | Self::Cancelled | Self::Failed => &[],
        }
    }

    pub fn allows(self, operation: SessionOperation) -> bool {
        self.allowed_operations().contains(&operation)
    }

    /// States from which `operation` is accepted.
    pub fn accepting(operation: SessionOperation) -> Vec<SessionStatus> {
        Self::ALL
            .into_iter()
            .filter(|status| status.allows(operation))
            .collect()
    }

    /// Returns `true` if some allowed operation moves the session from `self`
    /// to `next`.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        self.allowed_operations()
            .iter()
            .filter_map(|op| op.target())
            .any(|target| target == next)
    }

    /// IN_PROGRESS or PAUSED: the worker holds the session.
    pub fn is_active(self) -> bool {
        matches!(self, Self::InProgress | Self::Paused)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::InProgress => "IN_PROGRESS",
            Self::Paused => "PAUSED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionOperation {
    /// The state this operation moves the session into, if it always moves it.
    ///
    /// Pick operations stay IN_PROGRESS (or complete the session as a side
    /// effect of the last pick), so they have no fixed target.
    pub fn target(self) -> Option<SessionStatus> {
        match self {
            Self::Start | Self::Resume => Some(SessionStatus::InProgress),
            Self::Pause => Some(SessionStatus::Paused),
            Self::Complete => Some(SessionStatus::Completed),
            Self::Cancel => Some(SessionStatus::Cancelled),
            Self::Fail => Some(SessionStatus::Failed),
            Self::ConfirmPick | Self::ShortPick | Self::Skip => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ConfirmPick => "confirm_pick",
            Self::ShortPick => "short_pick",
            Self::Skip => "skip",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::Fail => "fail",
        }
    }
}

impl std::fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_can_start_or_cancel() {
        assert!(SessionStatus::Created.can_transition_to(SessionStatus::InProgress));
        assert!(SessionStatus::Created.can_transition_to(SessionStatus::Cancelled));
        assert!(!SessionStatus::Created.can_transition_to(SessionStatus::Paused));
        assert!(!SessionStatus::Created.can_transition_to(SessionStatus::Completed));
    }

    #[test]
    fn in_progress_and_paused_toggle() {
        assert!(SessionStatus::InProgress.can_transition_to(SessionStatus::Paused));
        assert!(SessionStatus::Paused.can_transition_to(SessionStatus::InProgress));
        assert!(SessionStatus::InProgress.can_transition_to(SessionStatus::Cancelled));
        assert!(SessionStatus::Paused.can_transition_to(SessionStatus::Cancelled));
        assert!(!SessionStatus::Paused.can_transition_to(SessionStatus::Completed));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for status in [SessionStatus::Completed, SessionStatus::Cancelled, SessionStatus::Failed] {
            assert!(status.is_terminal());
            assert!(status.allowed_operations().is_empty());
            assert!(SessionStatus::ALL.iter().all(|next| !status.can_transition_to(*next)));
        }
    }

    #[test]
    fn picks_are_only_accepted_in_progress() {
        assert_eq!(
            SessionStatus::accepting(SessionOperation::ConfirmPick),
            vec![SessionStatus::InProgress]
        );
        assert_eq!(
            SessionStatus::accepting(SessionOperation::Cancel),
            vec![SessionStatus::Created, SessionStatus::InProgress, SessionStatus::Paused]
        );
    }

    #[test]
    fn active_states() {
        assert!(SessionStatus::InProgress.is_active());
        assert!(SessionStatus::Paused.is_active());
        assert!(!SessionStatus::Created.is_active());
        assert!(!SessionStatus::Completed.is_active());
    }
}
