use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use messaging::{ChannelEventPublisher, TaskEvent, TaskEventTranslator};
use picking::{CreateSession, PathOptimizationService, PickInstruction};
use sessions::PickSessionService;
use store::InMemorySessionRepository;
use tracing::info;

use crate::config::CliConfig;

const EVENT_CHANNEL_CAPACITY: usize = 64;

pub fn plan(config: &CliConfig, task_event: &Path) -> Result<()> {
    let command = read_task_event(task_event)?;
    let start = config.service_config()?.start_location;
    let optimizer = PathOptimizationService::new();

    let path = optimizer.optimize_path(&command.instructions, &start)?;
    let savings = optimizer.calculate_savings(&path, &command.instructions)?;

    let mut out = std::io::stdout().lock();
    writeln!(
        out,
        "{} picks via {} from {}",
        path.total_picks(),
        path.algorithm(),
        start
    )?;
    for node in path.nodes() {
        writeln!(
            out,
            "{:>4}  {:<12} {:<16} +{:.0}",
            node.sequence_number,
            node.instruction_id.as_str(),
            node.location.display_string(),
            node.distance_from_previous
        )?;
    }
    writeln!(
        out,
        "distance {:.0}, estimated {}s, savings {:.1}% vs input order",
        path.total_distance(),
        path.estimated_duration().as_secs(),
        savings
    )?;
    Ok(())
}

pub async fn simulate(config: &CliConfig, task_event: &Path) -> Result<()> {
    let command = read_task_event(task_event)?;

    let (sender, mut receiver) = tokio::sync::mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let publisher = ChannelEventPublisher::new(sender, config.event_source.clone());
    let printer = tokio::spawn(async move {
        let mut printed = 0usize;
        while let Some(envelope) = receiver.recv().await {
            match serde_json::to_string(&envelope) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::error!(error = %err, "Failed to encode envelope"),
            }
            printed += 1;
        }
        printed
    });

    let service = PickSessionService::new(
        Arc::new(InMemorySessionRepository::new()),
        Arc::new(publisher),
        config.service_config()?,
    );

    let session = service.create_session(command).await?;
    let session_id = session.session_id().clone();
    let mut current = session.current_instruction().cloned();
    while let Some(instruction) = current {
        let updated = confirm_in_full(&service, &session_id, &instruction).await?;
        current = updated.current_instruction().cloned();
    }

    let progress = service.session_progress(&session_id).await?;
    drop(service);
    let published = printer.await.context("Event printer task failed")?;

    info!(
        %session_id,
        status = %progress.status,
        accuracy = progress.accuracy,
        published,
        "Simulation finished"
    );
    Ok(())
}

async fn confirm_in_full(
    service: &PickSessionService,
    session_id: &picking::SessionId,
    instruction: &PickInstruction,
) -> Result<picking::PickSession> {
    Ok(service
        .confirm_pick(
            session_id,
            instruction.instruction_id(),
            instruction.expected_quantity(),
        )
        .await?)
}

fn read_task_event(path: &Path) -> Result<CreateSession> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read task event {}", path.display()))?;
    let event: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Task event {} is not valid JSON", path.display()))?;

    match TaskEventTranslator::new().translate(&event) {
        Some(TaskEvent::Created(command)) => Ok(command),
        Some(TaskEvent::Assigned(assignment)) => bail!(
            "{} is an assignment of task {} to {}; expected a TaskCreatedEvent",
            path.display(),
            assignment.task_id,
            assignment.assigned_to
        ),
        None => bail!("{} does not describe a usable PICK task", path.display()),
    }
}
