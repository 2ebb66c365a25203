//! Anti-corruption layer for upstream task notifications.
//!
//! Upstream events are loosely typed: quantities arrive as numbers or
//! numeric strings, optional fields may be absent or blank, and enums may be
//! in any case. Everything is normalised here so the domain only ever sees a
//! well-formed [`CreateSession`].

use picking::{
    CreateSession, InstructionId, Location, OrderId, PickInstruction, PickStrategy, Priority,
    Sku,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const TASK_CREATED: &str = "TaskCreatedEvent";
const TASK_ASSIGNED: &str = "TaskAssignedEvent";
const PICK_TASK: &str = "PICK";
const UNASSIGNED_WORKER: &str = "UNASSIGNED";
const SYSTEM_CART: &str = "SYSTEM-CART";

/// A picker was assigned to an existing pick task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub task_id: String,
    pub assigned_to: String,
}

/// A recognised upstream notification.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Created(CreateSession),
    Assigned(TaskAssignment),
}

/// Maps task-service JSON onto pick execution commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskEventTranslator;

impl TaskEventTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Translates one notification. Non-PICK tasks, unknown event types, and
    /// unusable payloads yield `None`.
    pub fn translate(&self, event: &Value) -> Option<TaskEvent> {
        let event_type = event.get("type").and_then(Value::as_str)?;
        if event.get("taskType").and_then(Value::as_str) != Some(PICK_TASK) {
            debug!(event_type, "Ignoring non-pick task event");
            return None;
        }
        match event_type {
            TASK_CREATED => self.task_created(event).map(TaskEvent::Created),
            TASK_ASSIGNED => self.task_assigned(event).map(TaskEvent::Assigned),
            other => {
                debug!(event_type = other, "Ignoring task event type");
                None
            }
        }
    }

    fn task_created(&self, event: &Value) -> Option<CreateSession> {
        let task_id = string_field(event, "taskId").unwrap_or_default();
        let warehouse_id = string_field(event, "warehouseId").unwrap_or_default();
        let wave_id = string_field(event, "referenceId");
        info!(%task_id, %warehouse_id, "Received pick task");

        let Some(context) = event.get("context").and_then(Value::as_object) else {
            warn!(%task_id, "Ignoring task creation event: missing context payload");
            return None;
        };

        let strategy = parse_strategy(context.get("strategy"));
        let instructions = extract_instructions(context);
        if instructions.is_empty() {
            warn!(%task_id, "Ignoring task creation event: no pick instructions provided");
            return None;
        }

        let worker_id = string_value(context.get("workerId"))
            .unwrap_or_else(|| UNASSIGNED_WORKER.to_string());
        let cart_id = string_value(context.get("cartId"))
            .or(wave_id)
            .unwrap_or_else(|| SYSTEM_CART.to_string());

        Some(CreateSession {
            task_id,
            worker_id,
            warehouse_id,
            strategy,
            cart_id,
            instructions,
        })
    }

    fn task_assigned(&self, event: &Value) -> Option<TaskAssignment> {
        let task_id = string_field(event, "taskId").unwrap_or_default();
        let Some(assigned_to) = string_field(event, "assignedTo") else {
            warn!(%task_id, "Ignoring task assignment: missing assigned picker");
            return None;
        };
        Some(TaskAssignment {
            task_id,
            assigned_to,
        })
    }
}

fn extract_instructions(context: &Map<String, Value>) -> Vec<PickInstruction> {
    let Some(raw) = context.get("instructions").and_then(Value::as_array) else {
        return Vec::new();
    };
    raw.iter()
        .filter_map(Value::as_object)
        .filter_map(parse_instruction)
        .collect()
}

fn parse_instruction(raw: &Map<String, Value>) -> Option<PickInstruction> {
    let instruction_id = string_value(raw.get("instructionId")).and_then(InstructionId::new);
    let sku = string_value(raw.get("itemSku")).and_then(Sku::new);
    let quantity = integer_value(raw.get("expectedQuantity"));
    let location = raw.get("location").and_then(Value::as_object).and_then(parse_location);

    let (Some(instruction_id), Some(sku), Some(quantity), Some(location)) =
        (instruction_id, sku, quantity, location)
    else {
        warn!(instruction = %serde_json::Value::Object(raw.clone()), "Skipping instruction with missing required fields");
        return None;
    };

    let expected_quantity = match u32::try_from(quantity) {
        Ok(q) if q > 0 => q,
        _ => {
            warn!(%instruction_id, quantity, "Skipping instruction with invalid quantity");
            return None;
        }
    };

    let mut instruction = PickInstruction::new(
        instruction_id,
        sku,
        expected_quantity,
        location,
        parse_priority(raw.get("priority")),
    )
    .ok()?;
    if let Some(description) = string_value(raw.get("itemDescription")) {
        instruction = instruction.with_description(description);
    }
    if let Some(order_id) = string_value(raw.get("orderId")).and_then(OrderId::new) {
        instruction = instruction.with_order(order_id);
    }
    Some(instruction)
}

fn parse_location(raw: &Map<String, Value>) -> Option<Location> {
    let aisle = string_value(raw.get("aisle"))?;
    let bay = string_value(raw.get("bay"))?;
    let level = string_value(raw.get("level"))?;
    Location::new(aisle, bay, level, string_value(raw.get("position"))).ok()
}

fn parse_strategy(raw: Option<&Value>) -> PickStrategy {
    match string_value(raw) {
        Some(name) => name.parse().unwrap_or_else(|_| {
            warn!(strategy = %name, "Unknown pick strategy, falling back to SINGLE");
            PickStrategy::default()
        }),
        None => PickStrategy::default(),
    }
}

fn parse_priority(raw: Option<&Value>) -> Priority {
    match string_value(raw) {
        Some(name) => name.parse().unwrap_or_else(|_| {
            warn!(priority = %name, "Unknown priority, defaulting to NORMAL");
            Priority::default()
        }),
        None => Priority::default(),
    }
}

fn string_field(event: &Value, key: &str) -> Option<String> {
    string_value(event.get(key))
}

/// Non-blank strings pass through; numbers and booleans are stringified.
fn string_value(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

/// Integers, floats (truncated), or numeric strings.
fn integer_value(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) if !s.trim().is_empty() => match s.trim().parse() {
            Ok(n) => Some(n),
            Err(_) => {
                warn!(value = %s, "Unable to parse numeric value");
                None
            }
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_values_ignore_blanks_and_stringify_numbers() {
        assert_eq!(string_value(Some(&json!("  "))), None);
        assert_eq!(string_value(Some(&json!(7))), Some("7".to_string()));
        assert_eq!(string_value(Some(&json!(null))), None);
        assert_eq!(string_value(None), None);
    }

    #[test]
    fn integers_accept_numeric_strings() {
        assert_eq!(integer_value(Some(&json!(" 12 "))), Some(12));
        assert_eq!(integer_value(Some(&json!(3.9))), Some(3));
        assert_eq!(integer_value(Some(&json!("three"))), None);
        assert_eq!(integer_value(Some(&json!(-2))), Some(-2));
    }

    #[test]
    fn unknown_enums_fall_back_to_defaults() {
        assert_eq!(parse_strategy(Some(&json!("teleport"))), PickStrategy::Single);
        assert_eq!(parse_strategy(Some(&json!("wave"))), PickStrategy::Wave);
        assert_eq!(parse_priority(Some(&json!("whenever"))), Priority::Normal);
        assert_eq!(parse_priority(Some(&json!("urgent"))), Priority::Urgent);
    }
}
