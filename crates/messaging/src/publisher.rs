use async_trait::async_trait;
use picking::{EventPublisher, PickError, Result, SessionEvent};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::envelope::{CloudEventEnvelope, DEFAULT_EVENT_SOURCE};

const COMPONENT: &str = "event publisher";

/// Publishes session events as [`CloudEventEnvelope`]s into an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::Sender<CloudEventEnvelope>,
    source: String,
}

impl ChannelEventPublisher {
    pub fn new(sender: mpsc::Sender<CloudEventEnvelope>, source: impl Into<String>) -> Self {
        Self {
            sender,
            source: source.into(),
        }
    }

    /// Creates a publisher and the receiving half of its channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<CloudEventEnvelope>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender, DEFAULT_EVENT_SOURCE), receiver)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[async_trait]
impl EventPublisher for ChannelEventPublisher {
    async fn publish(&self, events: &[SessionEvent]) -> Result<()> {
        for event in events {
            let envelope = CloudEventEnvelope::wrap(event, &self.source).map_err(|err| {
                PickError::Unavailable {
                    component: COMPONENT.to_string(),
                    message: format!("cannot encode {}: {err}", event.event_type()),
                }
            })?;
            let event_type = envelope.event_type.clone();

            self.sender.send(envelope).await.map_err(|_| {
                error!(%event_type, session_id = %event.session_id(), "Event channel closed");
                PickError::Unavailable {
                    component: COMPONENT.to_string(),
                    message: "event channel closed".to_string(),
                }
            })?;
            debug!(%event_type, session_id = %event.session_id(), "Event published");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picking::{SessionFailed, SessionId, TaskId, Timestamp, WarehouseId, WorkerId};

    fn failed() -> SessionEvent {
        SessionEvent::SessionFailed(SessionFailed {
            session_id: SessionId::new("SESSION-00AA11BB").unwrap(),
            task_id: TaskId::new("T-1").unwrap(),
            worker_id: WorkerId::new("W-1").unwrap(),
            warehouse_id: WarehouseId::new("WH-1").unwrap(),
            reason: "scanner offline".into(),
            completed_instructions: 0,
            total_instructions: 2,
            occurred_at: Timestamp::now(),
        })
    }

    #[tokio::test]
    async fn envelopes_carry_type_and_subject() {
        let (publisher, mut receiver) = ChannelEventPublisher::channel(4);
        publisher.publish(&[failed()]).await.unwrap();

        let envelope = receiver.recv().await.unwrap();
        assert_eq!(envelope.specversion, "1.0");
        assert_eq!(envelope.event_type, "pick.session.failed");
        assert_eq!(envelope.subject, "SESSION-00AA11BB");
        assert_eq!(envelope.source, DEFAULT_EVENT_SOURCE);
        assert_eq!(envelope.datacontenttype, "application/json");
        assert_eq!(envelope.data["reason"], "scanner offline");
    }

    #[tokio::test]
    async fn closed_channel_is_reported_as_unavailable() {
        let (publisher, receiver) = ChannelEventPublisher::channel(1);
        drop(receiver);

        let err = publisher.publish(&[failed()]).await.unwrap_err();
        assert!(matches!(err, PickError::Unavailable { .. }));
        assert!(matches!(
            err.retry_policy(),
            picking::RetryPolicy::Retryable { .. }
        ));
    }

    #[tokio::test]
    async fn empty_batches_send_nothing() {
        let (publisher, mut receiver) = ChannelEventPublisher::channel(1);
        publisher.publish(&[]).await.unwrap();
        drop(publisher);
        assert!(receiver.recv().await.is_none());
    }
}
