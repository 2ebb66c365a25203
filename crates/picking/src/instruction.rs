//! A single line item to pick, with its own small state machine.
//!
//! ```text
//! PENDING ──start──▶ IN_PROGRESS ──confirm_pick──▶ PICKED | SHORT_PICKED
//!    │                    │      ──short_pick───▶ SHORT_PICKED
//!    └──────skip/cancel───┴────────────────────▶ SKIPPED | CANCELLED
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{PickError, Result};
use crate::identifiers::{InstructionId, OrderId, Sku};
use crate::location::Location;
use crate::types::{InstructionStatus, Priority, Timestamp};

/// One item to retrieve from one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickInstruction {
    instruction_id: InstructionId,
    sku: Sku,
    description: Option<String>,
    expected_quantity: u32,
    picked_quantity: u32,
    location: Location,
    order_id: Option<OrderId>,
    priority: Priority,
    status: InstructionStatus,
    sequence_number: u32,
    short_pick_reason: Option<String>,
    picked_at: Option<Timestamp>,
    #[serde(default)]
    special_handling: Vec<String>,
    weight: Option<f64>,
    unit_of_measure: Option<String>,
}

impl PickInstruction {
    /// Creates a PENDING instruction. `expected_quantity` must be positive.
    pub fn new(
        instruction_id: InstructionId,
        sku: Sku,
        expected_quantity: u32,
        location: Location,
        priority: Priority,
    ) -> Result<Self> {
        if expected_quantity == 0 {
            return Err(PickError::validation(
                "expected_quantity",
                "must be positive",
            ));
        }
        Ok(Self {
            instruction_id,
            sku,
            description: None,
            expected_quantity,
            picked_quantity: 0,
            location,
            order_id: None,
            priority,
            status: InstructionStatus::Pending,
            sequence_number: 0,
            short_pick_reason: None,
            picked_at: None,
            special_handling: Vec::new(),
            weight: None,
            unit_of_measure: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_weight(mut self, weight: f64, unit_of_measure: impl Into<String>) -> Self {
        self.weight = Some(weight);
        self.unit_of_measure = Some(unit_of_measure.into());
        self
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// The worker arrived at the location.
    pub fn start(&mut self) -> Result<()> {
        self.ensure_status("start", &[InstructionStatus::Pending])?;
        self.status = InstructionStatus::InProgress;
        Ok(())
    }

    /// Records a pick of `quantity` units.
    ///
    /// The full expected quantity moves the instruction to PICKED; anything
    /// less moves it to SHORT_PICKED without a reason.
    pub fn confirm_pick(&mut self, quantity: u32) -> Result<()> {
        self.ensure_status("confirm_pick", &[InstructionStatus::InProgress])?;
        if quantity == 0 {
            return Err(PickError::validation("quantity", "picked quantity must be positive"));
        }
        if quantity > self.expected_quantity {
            return Err(PickError::validation(
                "quantity",
                format!(
                    "picked quantity ({quantity}) exceeds expected quantity ({})",
                    self.expected_quantity
                ),
            ));
        }

        self.picked_quantity = quantity;
        self.picked_at = Some(Timestamp::now());
        self.status = if quantity == self.expected_quantity {
            InstructionStatus::Picked
        } else {
            InstructionStatus::ShortPicked
        };
        Ok(())
    }

    /// Records that only `actual_quantity` units could be found.
    ///
    /// Full-quantity picks must go through [`Self::confirm_pick`].
    pub fn short_pick(&mut self, actual_quantity: u32, reason: impl Into<String>) -> Result<()> {
        self.ensure_status("short_pick", &[InstructionStatus::InProgress])?;
        if actual_quantity >= self.expected_quantity {
            return Err(PickError::validation(
                "actual_quantity",
                format!(
                    "actual quantity ({actual_quantity}) is not below expected quantity ({}); use confirm_pick for full quantity picks",
                    self.expected_quantity
                ),
            ));
        }

        self.picked_quantity = actual_quantity;
        self.short_pick_reason = Some(reason.into());
        self.picked_at = Some(Timestamp::now());
        self.status = InstructionStatus::ShortPicked;
        Ok(())
    }

    pub fn skip(&mut self, reason: impl Into<String>) -> Result<()> {
        self.ensure_status(
            "skip",
            &[InstructionStatus::Pending, InstructionStatus::InProgress],
        )?;
        self.status = InstructionStatus::Skipped;
        self.short_pick_reason = Some(reason.into());
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_status(
            "cancel",
            &[InstructionStatus::Pending, InstructionStatus::InProgress],
        )?;
        self.status = InstructionStatus::Cancelled;
        Ok(())
    }

    pub(crate) fn set_sequence_number(&mut self, sequence_number: u32) {
        self.sequence_number = sequence_number;
    }

    /// Adds a handling tag such as `"FRAGILE"`; blank tags are ignored.
    pub fn add_special_handling(&mut self, handling: impl Into<String>) {
        let handling = handling.into();
        if !handling.trim().is_empty() {
            self.special_handling.push(handling);
        }
    }

    fn ensure_status(&self, operation: &str, allowed: &[InstructionStatus]) -> Result<()> {
        if allowed.contains(&self.status) {
            return Ok(());
        }
        Err(PickError::InvalidState {
            entity: format!("instruction {}", self.instruction_id),
            operation: operation.to_string(),
            current: self.status.to_string(),
            allowed: allowed
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn instruction_id(&self) -> &InstructionId {
        &self.instruction_id
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn expected_quantity(&self) -> u32 {
        self.expected_quantity
    }

    pub fn picked_quantity(&self) -> u32 {
        self.picked_quantity
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> InstructionStatus {
        self.status
    }

    /// Position in the optimized visiting order.
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Reason recorded by a short pick or a skip.
    pub fn short_pick_reason(&self) -> Option<&str> {
        self.short_pick_reason.as_deref()
    }

    pub fn picked_at(&self) -> Option<Timestamp> {
        self.picked_at
    }

    pub fn special_handling(&self) -> &[String] {
        &self.special_handling
    }

    pub fn has_special_handling(&self) -> bool {
        !self.special_handling.is_empty()
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn unit_of_measure(&self) -> Option<&str> {
        self.unit_of_measure.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    pub fn requires_action(&self) -> bool {
        self.status.requires_action()
    }

    pub fn is_short_pick(&self) -> bool {
        self.status == InstructionStatus::ShortPicked
    }

    /// Units missing from a short pick; zero in every other state.
    pub fn shortage_quantity(&self) -> u32 {
        if self.is_short_pick() {
            self.expected_quantity - self.picked_quantity
        } else {
            0
        }
    }

    /// Picked units as a percentage of expected units.
    pub fn accuracy(&self) -> f64 {
        f64::from(self.picked_quantity) / f64::from(self.expected_quantity) * 100.0
    }
}
