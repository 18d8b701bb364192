use crate::core::entity::{EntityId, EntityStatus};
use crate::simulation::clock::ClockState;
use thiserror::Error;

/// Errors surfaced by the simulation engine.
///
/// None of these are fatal: a failed command or tick leaves the engine in
/// the state it had before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// No unused catalog name is left to draw a new entity from.
    #[error("catalog exhausted: {active} active entities, {catalog} names in catalog")]
    CatalogExhausted { active: usize, catalog: usize },

    /// The command is not permitted from the entity's current status.
    #[error("cannot {command} {entity} while {status}: {reason}")]
    InvalidTransition {
        entity: EntityId,
        status: EntityStatus,
        command: &'static str,
        reason: &'static str,
    },

    #[error("no active entity named {0}")]
    UnknownEntity(EntityId),

    #[error("clock is {0}, ticks only run while RUNNING")]
    ClockNotRunning(ClockState),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
