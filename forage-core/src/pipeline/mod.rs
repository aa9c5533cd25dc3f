//! Recipe generation and persistence pipeline.
//!
//! - [`Orchestrator`] runs the generation stages (title, image, description,
//!   body) strictly in order and fills the session's draft as it goes
//! - [`PersistenceGateway`] saves a complete draft: create the record, move the
//!   image to blob storage, back-fill the durable reference
//! - [`Kitchen`] chains the two and records the outcome on the session

mod gateway;
mod kitchen;
mod orchestrator;

pub use gateway::PersistenceGateway;
pub use kitchen::{CookOutcome, Kitchen};
pub use orchestrator::{GenerationReport, Orchestrator, StageTiming};
