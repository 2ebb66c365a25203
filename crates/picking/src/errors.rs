//! Error and retry-policy types for the pick execution domain.
//!
//! [`PickError`] is the single error type returned by every operation in this
//! crate. Each variant names the invariant that was violated so that a caller
//! can correct its command without inspecting internal state.
//!
//! [`RetryPolicy`] tells a collaborator whether it may re-issue a rejected
//! command. The domain itself never retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// - `Retryable` errors: optimistic-concurrency conflicts on save, adapters
///   that are temporarily unavailable.
/// - `NonRetryable` errors: validation failures, illegal transitions, unknown
///   identifiers, and integrity faults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The command may be re-issued after the caller re-fetches the session.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The command must not be retried unchanged.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Errors raised by the pick execution domain and its ports.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PickError {
    /// Malformed input: a missing field, a non-positive quantity, an empty
    /// instruction list.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// Name of the offending field or argument.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// An operation was attempted from a state that does not allow it.
    ///
    /// The caller must re-fetch the current state before retrying.
    #[error("Cannot {operation} {entity} in state {current}; allowed states: {allowed}")]
    InvalidState {
        /// The rejecting entity, e.g. `session SESSION-1A2B3C4D`.
        entity: String,
        /// The rejected operation (e.g. `"confirm_pick"`).
        operation: String,
        /// State the entity was in.
        current: String,
        /// States from which the operation is accepted.
        allowed: String,
    },

    /// A session or instruction id could not be resolved.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// `"session"` or `"instruction"`.
        kind: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// A computed artefact disagrees with the aggregate it is applied to.
    ///
    /// This is a programming or data-consistency fault and is not user-recoverable.
    #[error("Integrity violation: {message}")]
    Integrity {
        /// Description of the inconsistency.
        message: String,
    },

    /// The stored session changed since it was loaded.
    #[error("Concurrent modification of session {session_id}: expected version {expected}, found {actual}")]
    Conflict {
        /// Session that was being saved.
        session_id: String,
        /// Version the caller loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// A worker may hold at most one active session.
    #[error("Worker {worker_id} already has an active session: {session_id}")]
    AlreadyActive {
        /// Worker that already has an active session.
        worker_id: String,
        /// The session that is active.
        session_id: String,
    },

    /// A port adapter (store, event channel) could not complete the request.
    #[error("{component} unavailable: {message}")]
    Unavailable {
        /// Which adapter failed (e.g. `"event publisher"`).
        component: String,
        /// Adapter-specific detail.
        message: String,
    },
}

impl PickError {
    /// Shorthand for a [`PickError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`PickError::NotFound`].
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Shorthand for a [`PickError::Integrity`].
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity {
            message: message.into(),
        }
    }

    /// Returns whether a collaborator may re-issue the command that produced this error.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Conflict { .. } | Self::Unavailable { .. } => {
                RetryPolicy::Retryable { after: None }
            }
            _ => RetryPolicy::NonRetryable,
        }
    }
}

/// Result alias used throughout the domain.
pub type Result<T> = std::result::Result<T, PickError>;
