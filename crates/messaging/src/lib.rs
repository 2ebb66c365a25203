//! Pick execution messaging infrastructure.
//!
//! Two directions:
//!
//! - **Inbound.** [`TaskEventTranslator`] turns upstream task notifications
//!   (loosely typed JSON from the task execution service) into
//!   [`picking::CreateSession`] commands. Malformed input is logged and
//!   dropped, never propagated as an error.
//!
//! - **Outbound.** [`ChannelEventPublisher`] implements
//!   [`picking::EventPublisher`] by wrapping each domain event in a
//!   [`CloudEventEnvelope`] and sending it down a `tokio::sync::mpsc` channel.
//!   Whatever drains the channel (a broker producer, a test, the CLI printer)
//!   owns delivery.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Wire formats and transport live here. The [`picking`]
//! crate sees only [`picking::EventPublisher`] and the commands it accepts.

mod envelope;
mod publisher;
mod translator;

pub use envelope::{CloudEventEnvelope, DEFAULT_EVENT_SOURCE};
pub use publisher::ChannelEventPublisher;
pub use translator::{TaskAssignment, TaskEvent, TaskEventTranslator};
