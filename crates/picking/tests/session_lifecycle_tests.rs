//! End-to-end behaviour of a pick session driven through the public API.

use picking::{
    Algorithm, CreateSession, InstructionId, InstructionStatus, Location, PathOptimizationService,
    PickError, PickInstruction, PickSession, PickStrategy, Priority, SessionCommand,
    SessionEvent, SessionStatus, Sku,
};

fn loc(aisle: &str, bay: &str, level: &str) -> Location {
    Location::new(aisle, bay, level, None).unwrap()
}

fn pick(id: &str, location: Location, expected: u32) -> PickInstruction {
    PickInstruction::new(
        InstructionId::new(id).unwrap(),
        Sku::new(format!("SKU-{id}")).unwrap(),
        expected,
        location,
        Priority::Normal,
    )
    .unwrap()
}

fn create(instructions: Vec<PickInstruction>) -> PickSession {
    PickSession::create(CreateSession {
        task_id: "TASK-42".into(),
        worker_id: "WORKER-7".into(),
        warehouse_id: "WH-EAST".into(),
        strategy: PickStrategy::Batch,
        cart_id: "CART-9".into(),
        instructions,
    })
    .unwrap()
}

fn warehouse_picks(count: usize) -> Vec<PickInstruction> {
    (0..count)
        .map(|n| {
            let aisle = if n % 2 == 0 { "A1" } else { "A3" };
            pick(
                &format!("I-{n:02}"),
                loc(aisle, &format!("{:02}", (n * 7) % 13 + 1), "02"),
                2,
            )
        })
        .collect()
}

#[test]
fn given_optimized_path_when_session_starts_then_sequence_numbers_follow_the_path() {
    let optimizer = PathOptimizationService::new();
    let start = loc("A0", "00", "00");
    for count in [1, 4, 10, 11, 25] {
        let mut session = create(warehouse_picks(count));
        let path = optimizer.optimize_path(session.instructions(), &start).unwrap();
        let expected_order: Vec<InstructionId> =
            path.nodes().iter().map(|n| n.instruction_id.clone()).collect();
        let expected_algorithm = if count <= 10 {
            Algorithm::NearestNeighbor
        } else {
            Algorithm::SShape
        };
        assert_eq!(path.algorithm(), expected_algorithm);

        session.start(path).unwrap();

        let actual_order: Vec<InstructionId> = session
            .instructions()
            .iter()
            .map(|i| i.instruction_id().clone())
            .collect();
        assert_eq!(actual_order, expected_order);
        for (index, instruction) in session.instructions().iter().enumerate() {
            assert_eq!(instruction.sequence_number() as usize, index);
        }
    }
}

#[test]
fn given_path_when_built_then_distances_sum_to_total() {
    let optimizer = PathOptimizationService::new();
    let instructions = warehouse_picks(15);
    let path = optimizer
        .optimize_path(&instructions, &loc("A0", "00", "00"))
        .unwrap();
    let sum: f64 = path.nodes().iter().map(|n| n.distance_from_previous).sum();
    assert!((sum - path.total_distance()).abs() < 1e-9);
    assert_eq!(path.total_picks(), 15);
}

#[test]
fn given_started_session_when_every_instruction_is_handled_then_it_completes() {
    let optimizer = PathOptimizationService::new();
    let mut session = create(warehouse_picks(6));
    let path = optimizer
        .optimize_path(session.instructions(), &loc("A0", "00", "00"))
        .unwrap();
    session.start(path).unwrap();

    let mut events = Vec::new();
    let mut step = 0;
    while let Some(current) = session.current_instruction().cloned() {
        let command = match step % 3 {
            0 => SessionCommand::ConfirmPick {
                instruction_id: current.instruction_id().clone(),
                quantity: current.expected_quantity(),
            },
            1 => SessionCommand::ShortPick {
                instruction_id: current.instruction_id().clone(),
                actual_quantity: 1,
                reason: "bin short".into(),
            },
            _ => SessionCommand::Skip {
                instruction_id: current.instruction_id().clone(),
                reason: "blocked".into(),
            },
        };
        events.extend(session.handle(command).unwrap());
        step += 1;
    }

    assert_eq!(session.status(), SessionStatus::Completed);
    assert!(!session.has_pending_instructions());
    assert_eq!(session.instructions_by_status(InstructionStatus::Picked).len(), 2);
    assert_eq!(session.instructions_by_status(InstructionStatus::ShortPicked).len(), 2);
    assert_eq!(session.instructions_by_status(InstructionStatus::Skipped).len(), 2);
    // 2 full picks of 2 + 2 short picks of 1 over 12 expected units.
    assert!((session.calculate_accuracy() - 50.0).abs() < 1e-9);

    let completed = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::SessionCompleted(_)))
        .count();
    assert_eq!(completed, 1);
    assert!(matches!(events.last(), Some(SessionEvent::SessionCompleted(_))));
}

#[test]
fn given_completed_session_when_any_command_arrives_then_it_is_rejected() {
    let mut session = create(vec![pick("I-1", loc("A1", "01", "01"), 1)]);
    let path = PathOptimizationService::new()
        .create_sequential_path(session.instructions())
        .unwrap();
    session.start(path).unwrap();
    session.confirm_pick(&InstructionId::new("I-1").unwrap(), 1).unwrap();
    assert_eq!(session.status(), SessionStatus::Completed);

    for command in [
        SessionCommand::Pause,
        SessionCommand::Resume,
        SessionCommand::Complete,
        SessionCommand::Cancel { reason: "late".into() },
        SessionCommand::Fail { reason: "late".into() },
    ] {
        let before = session.clone();
        assert!(matches!(
            session.handle(command),
            Err(PickError::InvalidState { .. })
        ));
        assert_eq!(session, before);
    }
}

#[test]
fn given_session_when_serialized_then_it_round_trips() {
    let mut session = create(warehouse_picks(3));
    let path = PathOptimizationService::new()
        .optimize_path(session.instructions(), &loc("A0", "00", "00"))
        .unwrap();
    session.start(path).unwrap();

    let json = serde_json::to_string(&session).unwrap();
    let restored: PickSession = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, session);
}
