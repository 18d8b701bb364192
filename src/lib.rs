//! # netrisk-nexus
//!
//! A small clearing network simulator: borrowing entities, lending banks and
//! a central counterparty (CCP) that absorbs losses when an entity defaults.
//!
//! Losses run through the waterfall: the defaulter's margin, then its
//! collateral sold at a haircut, then the CCP's mutual default fund.
//!
//! ## Architecture
//!
//! - **core** — Entities, banks, the market feed, errors
//! - **market** — Entity pool rotation and synthetic settlements
//! - **risk** — Aggregate risk score, margin tiers, the AI predictor seam
//! - **ccp** — Default fund and the loss waterfall
//! - **simulation** — Config, clock, the engine and its command interface
//! - **graph** — Bank/entity market map for visualisation

pub mod ccp;
pub mod core;
pub mod graph;
pub mod market;
pub mod risk;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::ccp::waterfall::{CentralCounterparty, WaterfallReport};
    pub use crate::core::bank::BankId;
    pub use crate::core::entity::{Entity, EntityId, EntityStatus};
    pub use crate::core::error::SimulationError;
    pub use crate::core::feed::LogEntry;
    pub use crate::graph::market_map::MarketMap;
    pub use crate::risk::predictor::{FixedPredictor, RiskAssessment, RiskPredictor};
    pub use crate::risk::scorer::{RiskScorer, Sentiment};
    pub use crate::simulation::clock::ClockState;
    pub use crate::simulation::command::{Command, CommandOutcome};
    pub use crate::simulation::config::SimulationConfig;
    pub use crate::simulation::engine::{MarketSnapshot, SimulationEngine, TickReport};
    pub use crate::simulation::runner::{Runner, StopReason};
}
