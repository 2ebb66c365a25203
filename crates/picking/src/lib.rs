//! Pick execution domain.
//!
//! This crate holds every domain concept of warehouse pick execution: the
//! [`PickSession`] aggregate, its [`PickInstruction`]s, warehouse
//! [`Location`]s, and the route heuristics that order a session's picks.
//! Infrastructure crates implement the traits in [`ports`]; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `store` and `messaging` crates define
//! *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`SessionId`, `InstructionId`, `Sku`, etc.) |
//! | [`types`] | Shared value types (`Timestamp`, `Priority`, `PickStrategy`, `InstructionStatus`) |
//! | [`errors`] | Domain error and retry-policy types |
//! | [`location`] | Aisle/bay/level coordinates and the walking-distance metric |
//! | [`instruction`] | One SKU pick and its status machine |
//! | [`path`] | Optimized visiting orders |
//! | [`optimizer`] | Route heuristics and the path optimization service |
//! | [`session`] | The session aggregate and its transition table |
//! | [`events`] | Events raised by session transitions |
//! | [`commands`] | Commands accepted by sessions |
//! | [`ports`] | Repository and publisher traits |

pub mod commands;
pub mod errors;
pub mod events;
pub mod identifiers;
pub mod instruction;
pub mod location;
pub mod optimizer;
pub mod path;
pub mod ports;
pub mod session;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use commands::{CreateSession, SessionCommand, SessionRequest};
pub use errors::{PickError, Result, RetryPolicy};
pub use events::{
    InstructionSkipped, PickConfirmed, SessionCancelled, SessionCompleted, SessionEvent,
    SessionFailed, SessionStarted, ShortPickRecorded,
};
pub use identifiers::{
    CartId, InstructionId, OrderId, SessionId, Sku, TaskId, WarehouseId, WorkerId,
};
pub use instruction::PickInstruction;
pub use location::Location;
pub use optimizer::{
    estimate_duration, select_heuristic, NearestNeighbor, PathOptimizationService,
    RouteHeuristic, SShape, Sequential,
};
pub use path::{Algorithm, PathNode, PickPath};
pub use ports::{EventPublisher, SessionRepository};
pub use session::{PickSession, SessionOperation, SessionProgress, SessionStatus};
pub use types::{InstructionStatus, PickStrategy, Priority, Timestamp};
