//! Pick session application service.
//!
//! [`PickSessionService`] is the single entry point for commands addressed to
//! pick sessions. Every mutation follows the same sequence:
//!
//! 1. load the session from the [`picking::SessionRepository`];
//! 2. apply the command to the aggregate and stage the events it returned;
//! 3. save it, events included, with the version it was loaded at;
//! 4. publish the staged events and mark them published.
//!
//! A rejected command never reaches step 3, so nothing is saved or published.
//! A failed publish in step 4 leaves the events staged on the stored session
//! for the next delivery.
//! A concurrent writer surfaces as [`picking::PickError::Conflict`].
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The service sequences calls between the domain in
//! [`picking`] and the repository and publisher ports. It contains no domain
//! rules of its own.

mod config;
mod service;

pub use config::ServiceConfig;
pub use service::PickSessionService;
