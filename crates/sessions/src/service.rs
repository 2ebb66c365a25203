use std::sync::Arc;

use picking::{
    CreateSession, EventPublisher, InstructionId, PathOptimizationService, PickError,
    PickInstruction, PickSession, Result, SessionCommand, SessionId, SessionProgress,
    SessionEvent, SessionRepository, SessionRequest, SessionStatus, WarehouseId, WorkerId,
};
use tracing::{debug, info, instrument, warn};

use crate::config::ServiceConfig;

/// Drives pick sessions through their lifecycle against a repository and an
/// event publisher.
pub struct PickSessionService {
    repository: Arc<dyn SessionRepository>,
    publisher: Arc<dyn EventPublisher>,
    optimizer: PathOptimizationService,
    config: ServiceConfig,
}

impl PickSessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        publisher: Arc<dyn EventPublisher>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repository,
            publisher,
            optimizer: PathOptimizationService::new(),
            config,
        }
    }

    /// Creates a session, optimizes its route, and starts it.
    ///
    /// Fails with [`PickError::AlreadyActive`] when the worker already holds
    /// an IN_PROGRESS or PAUSED session.
    #[instrument(skip_all, fields(task_id = %command.task_id, worker_id = %command.worker_id))]
    pub async fn create_session(&self, command: CreateSession) -> Result<PickSession> {
        info!(
            instructions = command.instructions.len(),
            strategy = %command.strategy,
            "Creating pick session"
        );

        let mut session = PickSession::create(command)?;
        if let Some(existing) = self
            .repository
            .find_active_by_worker(session.worker_id())
            .await?
        {
            return Err(PickError::AlreadyActive {
                worker_id: session.worker_id().to_string(),
                session_id: existing.session_id().to_string(),
            });
        }

        let path = self
            .optimizer
            .optimize_path(session.instructions(), &self.config.start_location)?;
        info!(
            algorithm = %path.algorithm(),
            picks = path.total_picks(),
            distance = path.total_distance(),
            duration_secs = path.estimated_duration().as_secs(),
            "Path optimized"
        );

        let events = session.start(path)?;
        session.stage_events(events);
        let version = self.repository.save(&session, session.version()).await?;
        session.set_version(version);
        self.deliver_or_defer(&mut session).await;

        info!(session_id = %session.session_id(), "Pick session created");
        Ok(session)
    }

    /// Applies any [`SessionCommand`] to the addressed session.
    ///
    /// The raised events are saved with the new state. Once the state is
    /// saved the command has succeeded: if the publisher then fails, the
    /// events stay staged on the session (see
    /// [`PickSession::pending_events`]) and go out with the next delivery.
    #[instrument(skip_all, fields(session_id = %request.session_id, command = %request.command.operation()))]
    pub async fn execute(&self, request: SessionRequest) -> Result<PickSession> {
        let SessionRequest {
            session_id,
            command,
        } = request;

        let mut session = self.load(&session_id).await?;
        let loaded_version = session.version();
        let events = session.handle(command).inspect_err(|err| {
            debug!(error = %err, "Command rejected");
        })?;

        session.stage_events(events.iter().cloned());
        let version = self.repository.save(&session, loaded_version).await?;
        session.set_version(version);
        self.deliver_or_defer(&mut session).await;

        debug!(
            status = %session.status(),
            version,
            events = events.len(),
            "Command applied"
        );
        for event in &events {
            if let SessionEvent::SessionCompleted(completed) = event {
                info!(
                    accuracy = completed.accuracy,
                    short_picks = completed.short_picks,
                    "Session completed"
                );
            }
        }
        Ok(session)
    }

    pub async fn confirm_pick(
        &self,
        session_id: &SessionId,
        instruction_id: &InstructionId,
        quantity: u32,
    ) -> Result<PickSession> {
        debug!(%session_id, %instruction_id, quantity, "Confirming pick");
        self.execute(SessionRequest {
            session_id: session_id.clone(),
            command: SessionCommand::ConfirmPick {
                instruction_id: instruction_id.clone(),
                quantity,
            },
        })
        .await
    }

    pub async fn short_pick(
        &self,
        session_id: &SessionId,
        instruction_id: &InstructionId,
        actual_quantity: u32,
        reason: impl Into<String>,
    ) -> Result<PickSession> {
        let reason = reason.into();
        warn!(%session_id, %instruction_id, actual_quantity, %reason, "Short pick");
        self.execute(SessionRequest {
            session_id: session_id.clone(),
            command: SessionCommand::ShortPick {
                instruction_id: instruction_id.clone(),
                actual_quantity,
                reason,
            },
        })
        .await
    }

    pub async fn skip_instruction(
        &self,
        session_id: &SessionId,
        instruction_id: &InstructionId,
        reason: impl Into<String>,
    ) -> Result<PickSession> {
        let reason = reason.into();
        warn!(%session_id, %instruction_id, %reason, "Skipping instruction");
        self.execute(SessionRequest {
            session_id: session_id.clone(),
            command: SessionCommand::Skip {
                instruction_id: instruction_id.clone(),
                reason,
            },
        })
        .await
    }

    pub async fn pause(&self, session_id: &SessionId) -> Result<PickSession> {
        info!(%session_id, "Pausing session");
        self.simple(session_id, SessionCommand::Pause).await
    }

    pub async fn resume(&self, session_id: &SessionId) -> Result<PickSession> {
        info!(%session_id, "Resuming session");
        self.simple(session_id, SessionCommand::Resume).await
    }

    pub async fn complete(&self, session_id: &SessionId) -> Result<PickSession> {
        info!(%session_id, "Completing session");
        self.simple(session_id, SessionCommand::Complete).await
    }

    pub async fn cancel(
        &self,
        session_id: &SessionId,
        reason: impl Into<String>,
    ) -> Result<PickSession> {
        let reason = reason.into();
        warn!(%session_id, %reason, "Cancelling session");
        self.simple(session_id, SessionCommand::Cancel { reason }).await
    }

    pub async fn fail(
        &self,
        session_id: &SessionId,
        reason: impl Into<String>,
    ) -> Result<PickSession> {
        let reason = reason.into();
        warn!(%session_id, %reason, "Failing session");
        self.simple(session_id, SessionCommand::Fail { reason }).await
    }

    /// Publishes events that an earlier call saved but could not deliver.
    ///
    /// Returns the number of events published. Publisher failures are
    /// returned as-is and leave the events staged, so the call can be retried.
    #[instrument(skip_all, fields(%session_id))]
    pub async fn publish_pending_events(&self, session_id: &SessionId) -> Result<usize> {
        let mut session = self.load(session_id).await?;
        self.deliver(&mut session).await
    }

    pub async fn get_session(&self, session_id: &SessionId) -> Result<PickSession> {
        self.load(session_id).await
    }

    /// The instruction the worker should pick next.
    pub async fn current_instruction(&self, session_id: &SessionId) -> Result<PickInstruction> {
        let session = self.load(session_id).await?;
        session
            .current_instruction()
            .cloned()
            .ok_or_else(|| PickError::not_found("current instruction", session_id.as_str()))
    }

    pub async fn active_session_for_worker(
        &self,
        worker_id: &WorkerId,
    ) -> Result<Option<PickSession>> {
        self.repository.find_active_by_worker(worker_id).await
    }

    pub async fn session_progress(&self, session_id: &SessionId) -> Result<SessionProgress> {
        Ok(self.load(session_id).await?.progress_snapshot())
    }

    /// Sessions currently IN_PROGRESS. Paused sessions are not included.
    pub async fn active_sessions(&self) -> Result<Vec<PickSession>> {
        self.repository.find_by_status(SessionStatus::InProgress).await
    }

    pub async fn sessions_by_warehouse(
        &self,
        warehouse_id: &WarehouseId,
    ) -> Result<Vec<PickSession>> {
        self.repository.find_by_warehouse(warehouse_id).await
    }

    async fn simple(&self, session_id: &SessionId, command: SessionCommand) -> Result<PickSession> {
        self.execute(SessionRequest {
            session_id: session_id.clone(),
            command,
        })
        .await
    }

    async fn deliver(&self, session: &mut PickSession) -> Result<usize> {
        let count = session.pending_events().len();
        if count == 0 {
            return Ok(0);
        }
        self.publisher.publish(session.pending_events()).await?;
        self.repository
            .mark_events_published(session.session_id(), count)
            .await?;
        session.acknowledge_events(count);
        Ok(count)
    }

    async fn deliver_or_defer(&self, session: &mut PickSession) {
        if let Err(err) = self.deliver(session).await {
            warn!(
                session_id = %session.session_id(),
                error = %err,
                pending = session.pending_events().len(),
                "Event delivery deferred"
            );
        }
    }

    async fn load(&self, session_id: &SessionId) -> Result<PickSession> {
        self.repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| PickError::not_found("session", session_id.as_str()))
    }
}
