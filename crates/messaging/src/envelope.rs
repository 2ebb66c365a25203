use picking::{SessionEvent, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source URI stamped on envelopes when none is configured.
pub const DEFAULT_EVENT_SOURCE: &str = "paklog://pick-execution-service";

const SPEC_VERSION: &str = "1.0";
const JSON_CONTENT_TYPE: &str = "application/json";

/// A CloudEvents 1.0 structured-mode envelope around one [`SessionEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEventEnvelope {
    pub specversion: String,
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// The session the event belongs to; brokers use it as the partition key.
    pub subject: String,
    pub time: Timestamp,
    pub datacontenttype: String,
    pub data: serde_json::Value,
}

impl CloudEventEnvelope {
    pub fn wrap(event: &SessionEvent, source: &str) -> serde_json::Result<Self> {
        Ok(Self {
            specversion: SPEC_VERSION.to_string(),
            id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            event_type: event.event_type().to_string(),
            subject: event.session_id().to_string(),
            time: event.occurred_at(),
            datacontenttype: JSON_CONTENT_TYPE.to_string(),
            data: event.payload()?,
        })
    }
}
