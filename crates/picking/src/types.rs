//! Shared value types for the pick execution domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! behaviour: strategies know their order limits, statuses know whether they
//! are terminal, and timestamps can measure elapsed time.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::PickError;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Elapsed time from `earlier` to `self`, saturating at zero when the
    /// clock went backwards.
    pub fn duration_since(self, earlier: Timestamp) -> Duration {
        (self.0 - earlier.0).to_std().unwrap_or_default()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Urgency of a pick instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Expedited orders; pick immediately.
    Urgent,
    High,
    #[default]
    Normal,
    /// Batchable, no time pressure.
    Low,
}

impl Priority {
    /// Parses a priority name case-insensitively, falling back to
    /// [`Priority::Normal`] for blank or unknown input.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "URGENT",
            Self::High => "HIGH",
            Self::Normal => "NORMAL",
            Self::Low => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = PickError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "URGENT" => Ok(Self::Urgent),
            "HIGH" => Ok(Self::High),
            "NORMAL" => Ok(Self::Normal),
            "LOW" => Ok(Self::Low),
            _ => Err(PickError::validation(
                "priority",
                format!("unknown priority '{value}'; expected URGENT, HIGH, NORMAL or LOW"),
            )),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pick strategy
// ---------------------------------------------------------------------------

/// How the orders in a session are grouped for picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickStrategy {
    /// One order at a time.
    #[default]
    Single,
    /// Several orders sharing SKUs, picked together and split at a put wall.
    Batch,
    /// Every item within one zone, regardless of order.
    Zone,
    /// Orders released together as a wave.
    Wave,
    /// Several orders picked into separate totes on one cart.
    Cluster,
}

impl PickStrategy {
    /// Returns `true` if picked items must be sorted to orders at a put wall.
    pub fn requires_put_wall(self) -> bool {
        matches!(self, Self::Cluster | Self::Batch)
    }

    /// Returns `true` if one session may serve more than one order.
    pub fn supports_multiple_orders(self) -> bool {
        matches!(self, Self::Batch | Self::Cluster | Self::Wave)
    }

    /// Upper bound on distinct orders in one session.
    pub fn max_orders_per_session(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Batch => 10,
            Self::Zone => 20,
            Self::Wave => 50,
            // Limited by cart capacity.
            Self::Cluster => 8,
        }
    }

    /// Parses a strategy name case-insensitively, falling back to
    /// [`PickStrategy::Single`] for blank or unknown input.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Single => "SINGLE",
            Self::Batch => "BATCH",
            Self::Zone => "ZONE",
            Self::Wave => "WAVE",
            Self::Cluster => "CLUSTER",
        }
    }
}

impl FromStr for PickStrategy {
    type Err = PickError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SINGLE" => Ok(Self::Single),
            "BATCH" => Ok(Self::Batch),
            "ZONE" => Ok(Self::Zone),
            "WAVE" => Ok(Self::Wave),
            "CLUSTER" => Ok(Self::Cluster),
            _ => Err(PickError::validation(
                "strategy",
                format!("unknown pick strategy '{value}'"),
            )),
        }
    }
}

impl std::fmt::Display for PickStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Instruction status
// ---------------------------------------------------------------------------

/// Lifecycle state of a single pick instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstructionStatus {
    /// Not yet attempted.
    Pending,
    /// The worker is at the location.
    InProgress,
    /// Full quantity picked.
    Picked,
    /// Less than the expected quantity picked.
    ShortPicked,
    Skipped,
    Cancelled,
}

impl InstructionStatus {
    /// Returns `true` for the terminal states.
    pub fn is_complete(self) -> bool {
        matches!(
            self,
            Self::Picked | Self::ShortPicked | Self::Skipped | Self::Cancelled
        )
    }

    /// Returns `true` while the worker still has something to do.
    pub fn requires_action(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Picked => "PICKED",
            Self::ShortPicked => "SHORT_PICKED",
            Self::Skipped => "SKIPPED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for InstructionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_strings_fall_back_to_defaults() {
        assert_eq!(PickStrategy::parse_or_default(Some("cluster")), PickStrategy::Cluster);
        assert_eq!(PickStrategy::parse_or_default(Some("ZIGZAG")), PickStrategy::Single);
        assert_eq!(PickStrategy::parse_or_default(None), PickStrategy::Single);
        assert_eq!(Priority::parse_or_default(Some(" urgent ")), Priority::Urgent);
        assert_eq!(Priority::parse_or_default(Some("")), Priority::Normal);
    }

    #[test]
    fn strategy_order_limits() {
        assert_eq!(PickStrategy::Single.max_orders_per_session(), 1);
        assert_eq!(PickStrategy::Cluster.max_orders_per_session(), 8);
        assert!(PickStrategy::Batch.requires_put_wall());
        assert!(!PickStrategy::Wave.requires_put_wall());
        assert!(PickStrategy::Wave.supports_multiple_orders());
        assert!(!PickStrategy::Zone.supports_multiple_orders());
    }

    #[test]
    fn terminal_instruction_states() {
        assert!(!InstructionStatus::Pending.is_complete());
        assert!(!InstructionStatus::InProgress.is_complete());
        assert!(InstructionStatus::ShortPicked.is_complete());
        assert!(InstructionStatus::Cancelled.is_complete());
        assert!(InstructionStatus::InProgress.requires_action());
    }

    #[test]
    fn statuses_serialize_in_screaming_snake_case() {
        let json = serde_json::to_string(&InstructionStatus::ShortPicked).unwrap();
        assert_eq!(json, "\"SHORT_PICKED\"");
        assert_eq!(InstructionStatus::ShortPicked.to_string(), "SHORT_PICKED");
    }

    #[test]
    fn duration_since_saturates() {
        let later = Timestamp::now();
        let earlier = Timestamp::from_utc(later.as_datetime() - chrono::Duration::seconds(5));
        assert_eq!(later.duration_since(earlier), Duration::from_secs(5));
        assert_eq!(earlier.duration_since(later), Duration::ZERO);
    }
}
