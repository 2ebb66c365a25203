use messaging::{TaskAssignment, TaskEvent, TaskEventTranslator};
use picking::{PickStrategy, Priority};
use serde_json::{json, Value};

fn task_created(context: Value) -> Value {
    json!({
        "type": "TaskCreatedEvent",
        "taskType": "PICK",
        "taskId": "TASK-100",
        "warehouseId": "WH-1",
        "referenceId": "WAVE-7",
        "context": context,
    })
}

fn instruction(id: &str, quantity: Value) -> Value {
    json!({
        "instructionId": id,
        "itemSku": format!("SKU-{id}"),
        "itemDescription": "Blue widget",
        "expectedQuantity": quantity,
        "orderId": "ORDER-1",
        "priority": "high",
        "location": { "aisle": "A3", "bay": "04", "level": "02", "position": "01" },
    })
}

fn created(event: &Value) -> picking::CreateSession {
    match TaskEventTranslator::new().translate(event) {
        Some(TaskEvent::Created(command)) => command,
        other => panic!("expected a create command, got {other:?}"),
    }
}

#[test]
fn given_full_pick_task_when_translated_then_command_carries_every_field() {
    let event = task_created(json!({
        "strategy": "batch",
        "workerId": "WORKER-9",
        "cartId": "CART-3",
        "instructions": [instruction("I-1", json!(4)), instruction("I-2", json!("6"))],
    }));

    let command = created(&event);

    assert_eq!(command.task_id, "TASK-100");
    assert_eq!(command.warehouse_id, "WH-1");
    assert_eq!(command.worker_id, "WORKER-9");
    assert_eq!(command.cart_id, "CART-3");
    assert_eq!(command.strategy, PickStrategy::Batch);
    assert_eq!(command.instructions.len(), 2);

    let second = &command.instructions[1];
    assert_eq!(second.expected_quantity(), 6);
    assert_eq!(second.priority(), Priority::High);
    assert_eq!(second.description(), Some("Blue widget"));
    assert_eq!(second.order_id().map(|o| o.as_str()), Some("ORDER-1"));
    assert_eq!(second.location().display_string(), "A3-04-02-01");
}

#[test]
fn given_sparse_context_when_translated_then_defaults_apply() {
    let event = task_created(json!({
        "instructions": [instruction("I-1", json!(1))],
    }));

    let command = created(&event);

    assert_eq!(command.strategy, PickStrategy::Single);
    assert_eq!(command.worker_id, "UNASSIGNED");
    assert_eq!(command.cart_id, "WAVE-7");
}

#[test]
fn given_no_wave_or_cart_then_system_cart_is_used() {
    let mut event = task_created(json!({
        "instructions": [instruction("I-1", json!(1))],
    }));
    event["referenceId"] = Value::Null;

    assert_eq!(created(&event).cart_id, "SYSTEM-CART");
}

#[test]
fn given_bad_instructions_then_only_those_are_dropped() {
    let mut missing_location = instruction("I-2", json!(3));
    missing_location["location"] = Value::Null;
    let event = task_created(json!({
        "instructions": [
            instruction("I-1", json!(2)),
            missing_location,
            instruction("I-3", json!(0)),
            instruction("I-4", json!(-5)),
            instruction("I-5", json!("lots")),
            "not an object",
        ],
    }));

    let command = created(&event);

    let ids: Vec<&str> = command
        .instructions
        .iter()
        .map(|i| i.instruction_id().as_str())
        .collect();
    assert_eq!(ids, vec!["I-1"]);
}

#[test]
fn given_missing_context_or_no_usable_instructions_then_nothing_is_produced() {
    let translator = TaskEventTranslator::new();

    let mut no_context = task_created(json!({}));
    no_context.as_object_mut().unwrap().remove("context");
    assert_eq!(translator.translate(&no_context), None);

    let empty = task_created(json!({ "instructions": [] }));
    assert_eq!(translator.translate(&empty), None);

    let all_bad = task_created(json!({ "instructions": [instruction("I-1", json!(0))] }));
    assert_eq!(translator.translate(&all_bad), None);
}

#[test]
fn given_other_task_types_or_events_then_they_are_ignored() {
    let translator = TaskEventTranslator::new();

    let mut putaway = task_created(json!({ "instructions": [instruction("I-1", json!(1))] }));
    putaway["taskType"] = json!("PUTAWAY");
    assert_eq!(translator.translate(&putaway), None);

    let completed = json!({ "type": "TaskCompletedEvent", "taskType": "PICK", "taskId": "T-1" });
    assert_eq!(translator.translate(&completed), None);

    assert_eq!(translator.translate(&json!("garbage")), None);
}

#[test]
fn given_assignment_then_picker_is_extracted() {
    let translator = TaskEventTranslator::new();
    let event = json!({
        "type": "TaskAssignedEvent",
        "taskType": "PICK",
        "taskId": "TASK-100",
        "assignedTo": "WORKER-9",
    });

    assert_eq!(
        translator.translate(&event),
        Some(TaskEvent::Assigned(TaskAssignment {
            task_id: "TASK-100".into(),
            assigned_to: "WORKER-9".into(),
        }))
    );

    let unassigned = json!({ "type": "TaskAssignedEvent", "taskType": "PICK", "taskId": "T", "assignedTo": " " });
    assert_eq!(translator.translate(&unassigned), None);
}
