//! The pick session aggregate.
//!
//! A [`PickSession`] owns its instructions and, once started, the optimized
//! [`PickPath`] that ordered them. Every mutating operation:
//!
//! 1. checks the transition table ([`SessionStatus::allowed_operations`]);
//! 2. validates its input against the current state;
//! 3. mutates, and returns the [`SessionEvent`]s it raised.
//!
//! A rejected operation leaves the session exactly as it was.
//!
//! Completion is normally a side effect: the pick, short pick or skip that
//! closes the last open instruction moves the session to COMPLETED.

mod transitions;

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use transitions::{SessionOperation, SessionStatus};

use crate::commands::{CreateSession, SessionCommand};
use crate::errors::{PickError, Result};
use crate::events::{
    InstructionSkipped, PickConfirmed, SessionCancelled, SessionCompleted, SessionEvent,
    SessionFailed, SessionStarted, ShortPickRecorded,
};
use crate::identifiers::{CartId, InstructionId, SessionId, TaskId, WarehouseId, WorkerId};
use crate::instruction::PickInstruction;
use crate::path::PickPath;
use crate::types::{InstructionStatus, PickStrategy, Timestamp};

/// One worker's assigned set of picks, from creation to completion or cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickSession {
    session_id: SessionId,
    version: u64,
    task_id: TaskId,
    worker_id: WorkerId,
    warehouse_id: WarehouseId,
    strategy: PickStrategy,
    cart_id: CartId,
    instructions: Vec<PickInstruction>,
    optimized_path: Option<PickPath>,
    status: SessionStatus,
    created_at: Timestamp,
    started_at: Option<Timestamp>,
    completed_at: Option<Timestamp>,
    paused_at: Option<Timestamp>,
    current_instruction_index: usize,
    cancellation_reason: Option<String>,
    failure_reason: Option<String>,
    /// Events saved with this snapshot but not yet confirmed as published.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pending_events: Vec<SessionEvent>,
}

/// Read model summarising where a session stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub progress_percentage: f64,
    pub completed_instructions: usize,
    pub total_instructions: usize,
    pub short_picks: usize,
    pub accuracy: f64,
    pub duration: Duration,
}

impl PickSession {
    /// Builds a CREATED session with a freshly generated id.
    ///
    /// Every identifier must be non-blank and at least one instruction is
    /// required. Instructions must have unique ids, be PENDING, and expect a
    /// positive quantity.
    pub fn create(command: CreateSession) -> Result<Self> {
        let CreateSession {
            task_id,
            worker_id,
            warehouse_id,
            strategy,
            cart_id,
            instructions,
        } = command;

        let task_id = TaskId::parse(task_id, "task_id")?;
        let worker_id = WorkerId::parse(worker_id, "worker_id")?;
        let warehouse_id = WarehouseId::parse(warehouse_id, "warehouse_id")?;
        let cart_id = CartId::parse(cart_id, "cart_id")?;

        if instructions.is_empty() {
            return Err(PickError::validation(
                "instructions",
                "session must have at least one pick instruction",
            ));
        }
        let mut seen = HashSet::new();
        if let Some(duplicate) = instructions
            .iter()
            .find(|i| !seen.insert(i.instruction_id().clone()))
        {
            return Err(PickError::validation(
                "instructions",
                format!("duplicate instruction id {}", duplicate.instruction_id()),
            ));
        }
        if let Some(worked) = instructions
            .iter()
            .find(|i| i.status() != InstructionStatus::Pending)
        {
            return Err(PickError::validation(
                "instructions",
                format!(
                    "instruction {} is {}; new sessions take PENDING instructions only",
                    worked.instruction_id(),
                    worked.status()
                ),
            ));
        }
        if let Some(empty) = instructions.iter().find(|i| i.expected_quantity() == 0) {
            return Err(PickError::validation(
                "instructions",
                format!(
                    "instruction {} has an expected quantity of 0",
                    empty.instruction_id()
                ),
            ));
        }

        Ok(Self {
            session_id: SessionId::generate(),
            version: 0,
            task_id,
            worker_id,
            warehouse_id,
            strategy,
            cart_id,
            instructions,
            optimized_path: None,
            status: SessionStatus::Created,
            created_at: Timestamp::now(),
            started_at: None,
            completed_at: None,
            paused_at: None,
            current_instruction_index: 0,
            cancellation_reason: None,
            failure_reason: None,
            pending_events: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Dispatches a [`SessionCommand`] to the matching operation.
    pub fn handle(&mut self, command: SessionCommand) -> Result<Vec<SessionEvent>> {
        match command {
            SessionCommand::ConfirmPick {
                instruction_id,
                quantity,
            } => self.confirm_pick(&instruction_id, quantity),
            SessionCommand::ShortPick {
                instruction_id,
                actual_quantity,
                reason,
            } => self.short_pick(&instruction_id, actual_quantity, reason),
            SessionCommand::Skip {
                instruction_id,
                reason,
            } => self.skip(&instruction_id, reason),
            SessionCommand::Pause => self.pause(),
            SessionCommand::Resume => self.resume(),
            SessionCommand::Complete => self.complete(),
            SessionCommand::Cancel { reason } => self.cancel(reason),
            SessionCommand::Fail { reason } => self.fail(reason),
        }
    }

    /// Applies the optimized visiting order and moves to IN_PROGRESS.
    ///
    /// Each instruction takes the sequence number of its path node and the
    /// list is re-sorted by sequence number. The path must visit every
    /// instruction exactly once; otherwise the start fails with
    /// [`PickError::Integrity`].
    pub fn start(&mut self, path: PickPath) -> Result<Vec<SessionEvent>> {
        self.ensure_allowed(SessionOperation::Start)?;
        let visited: HashSet<&InstructionId> =
            path.nodes().iter().map(|n| &n.instruction_id).collect();
        if path.total_picks() != self.instructions.len() || visited.len() != path.total_picks() {
            return Err(PickError::integrity(format!(
                "path visits {} distinct of {} nodes but session {} has {} instructions",
                visited.len(),
                path.total_picks(),
                self.session_id,
                self.instructions.len()
            )));
        }

        let mut instructions = self.instructions.clone();
        for node in path.nodes() {
            let instruction = instructions
                .iter_mut()
                .find(|i| i.instruction_id() == &node.instruction_id)
                .ok_or_else(|| {
                    PickError::integrity(format!(
                        "path node references unknown instruction {} in session {}",
                        node.instruction_id, self.session_id
                    ))
                })?;
            instruction.set_sequence_number(node.sequence_number);
        }
        instructions.sort_by_key(PickInstruction::sequence_number);

        let now = Timestamp::now();
        self.instructions = instructions;
        self.optimized_path = Some(path);
        self.status = SessionStatus::InProgress;
        self.started_at = Some(now);
        self.current_instruction_index = 0;

        debug!(
            session_id = %self.session_id,
            instructions = self.instructions.len(),
            "Pick session started"
        );

        Ok(vec![SessionEvent::SessionStarted(SessionStarted {
            session_id: self.session_id.clone(),
            task_id: self.task_id.clone(),
            worker_id: self.worker_id.clone(),
            warehouse_id: self.warehouse_id.clone(),
            strategy: self.strategy,
            cart_id: self.cart_id.clone(),
            total_instructions: self.instructions.len(),
            occurred_at: now,
        })])
    }

    /// Records a pick of `quantity` units for `instruction_id`.
    ///
    /// A PENDING instruction is started implicitly. A quantity below the
    /// expected one is recorded as a short pick without a reason.
    pub fn confirm_pick(
        &mut self,
        instruction_id: &InstructionId,
        quantity: u32,
    ) -> Result<Vec<SessionEvent>> {
        self.ensure_allowed(SessionOperation::ConfirmPick)?;
        let index = self.instruction_index(instruction_id)?;

        let mut updated = self.instructions[index].clone();
        if updated.status() == InstructionStatus::Pending {
            updated.start()?;
        }
        updated.confirm_pick(quantity)?;

        let mut events = vec![SessionEvent::PickConfirmed(PickConfirmed {
            session_id: self.session_id.clone(),
            instruction_id: instruction_id.clone(),
            sku: updated.sku().clone(),
            quantity,
            location: updated.location().clone(),
            worker_id: self.worker_id.clone(),
            occurred_at: Timestamp::now(),
        })];
        self.instructions[index] = updated;
        events.extend(self.move_to_next_instruction()?);
        Ok(events)
    }

    /// Records that only `actual_quantity` units were available.
    pub fn short_pick(
        &mut self,
        instruction_id: &InstructionId,
        actual_quantity: u32,
        reason: impl Into<String>,
    ) -> Result<Vec<SessionEvent>> {
        self.ensure_allowed(SessionOperation::ShortPick)?;
        let index = self.instruction_index(instruction_id)?;
        let reason = reason.into();

        let mut updated = self.instructions[index].clone();
        if updated.status() == InstructionStatus::Pending {
            updated.start()?;
        }
        updated.short_pick(actual_quantity, reason.clone())?;

        let mut events = vec![SessionEvent::ShortPick(ShortPickRecorded {
            session_id: self.session_id.clone(),
            instruction_id: instruction_id.clone(),
            sku: updated.sku().clone(),
            expected_quantity: updated.expected_quantity(),
            actual_quantity,
            location: updated.location().clone(),
            reason,
            worker_id: self.worker_id.clone(),
            occurred_at: Timestamp::now(),
        })];
        self.instructions[index] = updated;
        events.extend(self.move_to_next_instruction()?);
        Ok(events)
    }

    /// Skips an open instruction, e.g. when its location is blocked.
    pub fn skip(
        &mut self,
        instruction_id: &InstructionId,
        reason: impl Into<String>,
    ) -> Result<Vec<SessionEvent>> {
        self.ensure_allowed(SessionOperation::Skip)?;
        let index = self.instruction_index(instruction_id)?;
        let reason = reason.into();

        let mut updated = self.instructions[index].clone();
        updated.skip(reason.clone())?;

        let mut events = vec![SessionEvent::InstructionSkipped(InstructionSkipped {
            session_id: self.session_id.clone(),
            instruction_id: instruction_id.clone(),
            sku: updated.sku().clone(),
            location: updated.location().clone(),
            reason,
            worker_id: self.worker_id.clone(),
            occurred_at: Timestamp::now(),
        })];
        self.instructions[index] = updated;
        events.extend(self.move_to_next_instruction()?);
        Ok(events)
    }

    /// Suspends an IN_PROGRESS session and stamps `paused_at`.
    pub fn pause(&mut self) -> Result<Vec<SessionEvent>> {
        self.ensure_allowed(SessionOperation::Pause)?;
        self.status = SessionStatus::Paused;
        self.paused_at = Some(Timestamp::now());
        Ok(Vec::new())
    }

    /// Returns a PAUSED session to IN_PROGRESS and clears `paused_at`.
    pub fn resume(&mut self) -> Result<Vec<SessionEvent>> {
        self.ensure_allowed(SessionOperation::Resume)?;
        self.status = SessionStatus::InProgress;
        self.paused_at = None;
        Ok(Vec::new())
    }

    /// Moves an IN_PROGRESS session with no open instructions to COMPLETED.
    pub fn complete(&mut self) -> Result<Vec<SessionEvent>> {
        self.ensure_allowed(SessionOperation::Complete)?;
        let pending = self.instructions.len() - self.completed_count();
        if pending > 0 {
            return Err(PickError::InvalidState {
                entity: format!("session {}", self.session_id),
                operation: SessionOperation::Complete.to_string(),
                current: format!("{} with {pending} pending instructions", self.status),
                allowed: "IN_PROGRESS with every instruction complete".to_string(),
            });
        }

        let now = Timestamp::now();
        self.status = SessionStatus::Completed;
        self.completed_at = Some(now);

        debug!(session_id = %self.session_id, "Pick session completed");

        Ok(vec![SessionEvent::SessionCompleted(SessionCompleted {
            session_id: self.session_id.clone(),
            task_id: self.task_id.clone(),
            worker_id: self.worker_id.clone(),
            warehouse_id: self.warehouse_id.clone(),
            total_instructions: self.instructions.len(),
            completed_instructions: self.completed_count(),
            short_picks: self.short_pick_count(),
            accuracy: self.calculate_accuracy(),
            duration: self.duration(),
            occurred_at: now,
        })])
    }

    /// Ends a non-terminal session without completing it.
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<Vec<SessionEvent>> {
        self.ensure_allowed(SessionOperation::Cancel)?;
        let reason = reason.into();
        let now = Timestamp::now();
        self.status = SessionStatus::Cancelled;
        self.completed_at = Some(now);
        self.cancellation_reason = Some(reason.clone());

        Ok(vec![SessionEvent::SessionCancelled(SessionCancelled {
            session_id: self.session_id.clone(),
            task_id: self.task_id.clone(),
            worker_id: self.worker_id.clone(),
            warehouse_id: self.warehouse_id.clone(),
            reason,
            completed_instructions: self.completed_count(),
            total_instructions: self.instructions.len(),
            occurred_at: now,
        })])
    }

    /// Abandons an active session because of an operational fault.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<Vec<SessionEvent>> {
        self.ensure_allowed(SessionOperation::Fail)?;
        let reason = reason.into();
        let now = Timestamp::now();
        self.status = SessionStatus::Failed;
        self.completed_at = Some(now);
        self.failure_reason = Some(reason.clone());

        Ok(vec![SessionEvent::SessionFailed(SessionFailed {
            session_id: self.session_id.clone(),
            task_id: self.task_id.clone(),
            worker_id: self.worker_id.clone(),
            warehouse_id: self.warehouse_id.clone(),
            reason,
            completed_instructions: self.completed_count(),
            total_instructions: self.instructions.len(),
            occurred_at: now,
        })])
    }

    /// Records the version assigned by a repository after a successful save.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Appends raised events to the outbox so they are persisted with the
    /// next save.
    pub fn stage_events(&mut self, events: impl IntoIterator<Item = SessionEvent>) {
        self.pending_events.extend(events);
    }

    /// Drops the oldest `count` staged events once they have been published.
    pub fn acknowledge_events(&mut self, count: usize) {
        let count = count.min(self.pending_events.len());
        self.pending_events.drain(..count);
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ensure_allowed(&self, operation: SessionOperation) -> Result<()> {
        if self.status.allows(operation) {
            return Ok(());
        }
        let allowed = SessionStatus::accepting(operation);
        Err(PickError::InvalidState {
            entity: format!("session {}", self.session_id),
            operation: operation.to_string(),
            current: self.status.to_string(),
            allowed: if allowed.is_empty() {
                "none".to_string()
            } else {
                allowed
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        })
    }

    fn instruction_index(&self, instruction_id: &InstructionId) -> Result<usize> {
        self.instructions
            .iter()
            .position(|i| i.instruction_id() == instruction_id)
            .ok_or_else(|| PickError::not_found("instruction", instruction_id.as_str()))
    }

    /// Advances the cursor past complete instructions and completes the
    /// session once the cursor runs off the end.
    fn move_to_next_instruction(&mut self) -> Result<Vec<SessionEvent>> {
        while self
            .instructions
            .get(self.current_instruction_index)
            .is_some_and(PickInstruction::is_complete)
        {
            self.current_instruction_index += 1;
        }

        if self.current_instruction_index >= self.instructions.len()
            && self.status == SessionStatus::InProgress
        {
            return self.complete();
        }
        Ok(Vec::new())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Unique id, generated at creation.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Optimistic-concurrency stamp; 0 until first saved.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Upstream task this session executes.
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Worker holding the session.
    pub fn worker_id(&self) -> &WorkerId {
        &self.worker_id
    }

    /// Warehouse the picks happen in.
    pub fn warehouse_id(&self) -> &WarehouseId {
        &self.warehouse_id
    }

    /// Picking strategy requested by the task.
    pub fn strategy(&self) -> PickStrategy {
        self.strategy
    }

    /// Cart the picked items go into.
    pub fn cart_id(&self) -> &CartId {
        &self.cart_id
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Instructions in visiting order (input order before the session starts).
    pub fn instructions(&self) -> &[PickInstruction] {
        &self.instructions
    }

    /// Looks up an instruction by id.
    pub fn instruction(&self, instruction_id: &InstructionId) -> Option<&PickInstruction> {
        self.instructions
            .iter()
            .find(|i| i.instruction_id() == instruction_id)
    }

    /// Instructions currently in `status`, in visiting order.
    pub fn instructions_by_status(&self, status: InstructionStatus) -> Vec<&PickInstruction> {
        self.instructions
            .iter()
            .filter(|i| i.status() == status)
            .collect()
    }

    /// Route applied by [`start`](Self::start), if started.
    pub fn optimized_path(&self) -> Option<&PickPath> {
        self.optimized_path.as_ref()
    }

    /// When the session was created.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// When the session moved to IN_PROGRESS.
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    /// Set on completion, cancellation, or failure.
    pub fn completed_at(&self) -> Option<Timestamp> {
        self.completed_at
    }

    /// Set while the session is PAUSED.
    pub fn paused_at(&self) -> Option<Timestamp> {
        self.paused_at
    }

    /// Cursor into [`instructions`](Self::instructions).
    pub fn current_instruction_index(&self) -> usize {
        self.current_instruction_index
    }

    /// Reason given to [`cancel`](Self::cancel).
    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// Reason given to [`fail`](Self::fail).
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Staged events, oldest first, that no publisher has accepted yet.
    pub fn pending_events(&self) -> &[SessionEvent] {
        &self.pending_events
    }

    /// The first open instruction, or `None` once every instruction is done.
    pub fn current_instruction(&self) -> Option<&PickInstruction> {
        self.instructions.get(self.current_instruction_index)
    }

    /// The instruction after the cursor, regardless of its status.
    pub fn next_instruction(&self) -> Option<&PickInstruction> {
        self.instructions.get(self.current_instruction_index + 1)
    }

    /// Instructions in a terminal state.
    pub fn completed_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_complete()).count()
    }

    /// Instructions that ended SHORT_PICKED.
    pub fn short_pick_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_short_pick()).count()
    }

    /// Returns `true` while any instruction still needs work.
    pub fn has_pending_instructions(&self) -> bool {
        self.instructions.iter().any(|i| !i.is_complete())
    }

    /// Completed instructions as a percentage of all instructions.
    pub fn progress(&self) -> f64 {
        if self.instructions.is_empty() {
            return 100.0;
        }
        self.completed_count() as f64 / self.instructions.len() as f64 * 100.0
    }

    /// Units picked on complete instructions as a percentage of all expected units.
    pub fn calculate_accuracy(&self) -> f64 {
        let expected: u64 = self
            .instructions
            .iter()
            .map(|i| u64::from(i.expected_quantity()))
            .sum();
        if expected == 0 {
            return 100.0;
        }
        let picked: u64 = self
            .instructions
            .iter()
            .filter(|i| i.is_complete())
            .map(|i| u64::from(i.picked_quantity()))
            .sum();
        picked as f64 / expected as f64 * 100.0
    }

    /// Time since start, frozen once the session ends; zero before start.
    pub fn duration(&self) -> Duration {
        match self.started_at {
            Some(started) => self
                .completed_at
                .unwrap_or_else(Timestamp::now)
                .duration_since(started),
            None => Duration::ZERO,
        }
    }

    /// Read-model view of [`progress`](Self::progress), accuracy and duration.
    pub fn progress_snapshot(&self) -> SessionProgress {
        SessionProgress {
            session_id: self.session_id.clone(),
            status: self.status,
            progress_percentage: self.progress(),
            completed_instructions: self.completed_count(),
            total_instructions: self.instructions.len(),
            short_picks: self.short_pick_count(),
            accuracy: self.calculate_accuracy(),
            duration: self.duration(),
        }
    }
}
