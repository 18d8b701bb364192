//! The simulation engine.
//!
//! One owned object holds the entity pool, market feed, CCP and clock.
//! Ticks and operator commands are both `&mut self` calls, so each runs to
//! completion before the next begins and derived risk is always computed
//! from the current state.

use crate::ccp::waterfall::{CentralCounterparty, WaterfallReport};
use crate::core::bank::BankId;
use crate::core::entity::{Entity, EntityId, EntityStatus};
use crate::core::error::SimulationError;
use crate::core::feed::{LogEntry, MarketLog};
use crate::market::pool::{EntityPool, Rotation};
use crate::market::transactions::TransactionGenerator;
use crate::risk::predictor::{BoundedPredictor, RiskAssessment, RiskPredictor};
use crate::risk::scorer::{RiskScorer, Sentiment};
use crate::simulation::clock::{ClockState, SimulationClock};
use crate::simulation::command::{Command, CommandOutcome};
use crate::simulation::config::SimulationConfig;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An AI scan that flagged an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    pub entity: EntityId,
    pub assessment: RiskAssessment,
    pub new_margin: Decimal,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub iteration: u64,
    pub rotation: Option<Rotation>,
    pub alert: Option<RiskAlert>,
    pub risk_score: f64,
    pub global_margin_rate: Decimal,
    pub clock_state: ClockState,
}

/// Read-only view handed to renderers and graph builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub iteration: u64,
    pub clock_state: ClockState,
    pub system_status: String,
    /// Feed lines, newest first.
    pub log: Vec<String>,
    pub entities: Vec<Entity>,
    pub banks: Vec<BankId>,
    pub risk_score: f64,
    pub global_margin_rate: Decimal,
    pub sentiment: Sentiment,
    pub ccp_stress: u32,
    pub default_fund_drawn: Decimal,
}

pub struct SimulationEngine {
    config: SimulationConfig,
    clock: SimulationClock,
    pool: EntityPool,
    generator: TransactionGenerator,
    ccp: CentralCounterparty,
    log: MarketLog,
    predictor: Box<dyn RiskPredictor>,
    rng: StdRng,
}

impl SimulationEngine {
    /// Validate the config and draw the initial pool.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut rng = Self::rng_for(&config);
        let pool = EntityPool::initialize(config.catalog.clone(), config.pool_size, &mut rng)?;
        Ok(Self::assemble(config, pool, rng))
    }

    /// Start from explicit entities instead of a random draw.
    ///
    /// Exactly `config.pool_size` entities are required. The pool keeps the
    /// given order, so `entities[0]` is the first to be
    /// rotated out.
    pub fn with_entities(
        config: SimulationConfig,
        entities: Vec<Entity>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        if entities.len() != config.pool_size {
            return Err(SimulationError::InvalidConfig(format!(
                "pool_size is {} but {} entities were given",
                config.pool_size,
                entities.len()
            )));
        }
        let rng = Self::rng_for(&config);
        let pool = EntityPool::from_entities(config.catalog.clone(), entities)?;
        Ok(Self::assemble(config, pool, rng))
    }

    /// Replace the default bounded predictor.
    pub fn with_predictor(mut self, predictor: impl RiskPredictor + 'static) -> Self {
        self.predictor = Box::new(predictor);
        self
    }

    fn rng_for(config: &SimulationConfig) -> StdRng {
        match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn assemble(config: SimulationConfig, pool: EntityPool, rng: StdRng) -> Self {
        let generator =
            TransactionGenerator::new(config.banks.iter().map(|b| BankId::new(b.as_str())).collect());
        let predictor = BoundedPredictor {
            min_percent: config.predictor_min_percent,
            max_percent: config.predictor_max_percent,
        };
        info!(
            "simulation ready: {} entities, {} banks, seed {:?}",
            pool.len(),
            generator.banks().len(),
            config.seed
        );
        Self {
            log: MarketLog::new(config.log_capacity),
            clock: SimulationClock::new(),
            ccp: CentralCounterparty::new(),
            predictor: Box::new(predictor),
            config,
            pool,
            generator,
            rng,
        }
    }

    /// Advance one step. Only valid while the clock is running.
    ///
    /// Only a failed rotation fails a tick, and it leaves the engine exactly
    /// as it was.
    pub fn tick(&mut self) -> Result<TickReport, SimulationError> {
        let state = self.clock.state();
        if !state.is_running() {
            return Err(SimulationError::ClockNotRunning(state));
        }

        let iteration = self.clock.iteration() + 1;
        let rotation = if iteration % self.config.rotation_interval == 0 {
            match self.pool.rotate(&mut self.rng) {
                Ok(rotation) => Some(rotation),
                Err(e) => {
                    warn!("tick {} aborted: {}", iteration, e);
                    return Err(e);
                }
            }
        } else {
            None
        };
        self.clock.advance_to(iteration);

        if let Some(rotation) = &rotation {
            self.log.push(LogEntry::MarketUpdate {
                entered: rotation.entered.clone(),
                exited: rotation.exited.id().clone(),
            });
        }

        for _ in 0..self.config.transactions_per_tick {
            let entry = self.generator.generate(&self.pool, &mut self.rng);
            self.log.push(entry);
        }

        let alert = if self.rng.gen_bool(self.config.scan_probability) {
            match self.pick_scan_target() {
                Some(target) => match self.risk_scan(&target) {
                    Ok(alert) => Some(alert),
                    Err(e) => {
                        warn!("tick {}: risk scan skipped: {}", iteration, e);
                        None
                    }
                },
                None => {
                    info!("tick {}: AI alert skipped, every entity has defaulted", iteration);
                    None
                }
            }
        } else {
            None
        };

        let risk_score = self.risk_score();
        if self.rng.gen_bool(self.config.sentiment_probability) {
            self.log.push(LogEntry::Sentiment {
                sentiment: RiskScorer::sentiment(risk_score),
            });
        }

        debug!(
            "tick {}: risk {:.1}, margin {}%, clock {}",
            iteration,
            risk_score,
            RiskScorer::global_margin(risk_score),
            self.clock.state()
        );
        Ok(TickReport {
            iteration,
            rotation,
            alert,
            risk_score,
            global_margin_rate: RiskScorer::global_margin(risk_score),
            clock_state: self.clock.state(),
        })
    }

    /// A defaulted entity keeps its status until recovered, so it is never
    /// a scan target.
    fn pick_scan_target(&mut self) -> Option<EntityId> {
        let eligible: Vec<EntityId> = self
            .pool
            .entities()
            .filter(|e| !e.status().is_defaulted())
            .map(|e| e.id().clone())
            .collect();
        if eligible.is_empty() {
            return None;
        }
        Some(eligible[self.rng.gen_range(0..eligible.len())].clone())
    }

    /// Run an AI risk scan on one entity: reprice its margin from the
    /// predictor, flag it, and pause the clock.
    pub fn risk_scan(&mut self, id: &EntityId) -> Result<RiskAlert, SimulationError> {
        let assessment = {
            let entity = self
                .pool
                .get(id)
                .ok_or_else(|| SimulationError::UnknownEntity(id.clone()))?;
            if entity.status().is_defaulted() {
                return Err(SimulationError::InvalidTransition {
                    entity: id.clone(),
                    status: entity.status(),
                    command: "scan",
                    reason: "entity is already in default",
                });
            }
            self.predictor.assess(&mut self.rng)
        };

        let new_margin = match self.pool.get_mut(id) {
            Some(entity) => {
                entity.flag_risk(assessment.recommended_margin_percent);
                entity.margin()
            }
            None => return Err(SimulationError::UnknownEntity(id.clone())),
        };
        self.log.push(LogEntry::AiAlert {
            entity: id.clone(),
            recommended_margin_percent: assessment.recommended_margin_percent,
        });
        self.clock.pause();

        info!(
            "AI alert: {} flagged, margin now {} Cr. Simulation paused.",
            id, new_margin
        );
        Ok(RiskAlert {
            entity: id.clone(),
            assessment,
            new_margin,
        })
    }

    /// Apply an operator command.
    ///
    /// Rejected commands change nothing and report why.
    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome, SimulationError> {
        let result = match &command {
            Command::Start => Ok(self.start()),
            Command::Pause => Ok(self.pause()),
            Command::Crash(id) => self.crash(id).map(|()| CommandOutcome::Defaulted {
                entity: id.clone(),
            }),
            Command::Recover(id) => self
                .recover(id)
                .map(|report| CommandOutcome::Recovered { report }),
        };
        if let Err(e) = &result {
            debug!("rejected {}: {}", command, e);
        }
        result
    }

    pub fn start(&mut self) -> CommandOutcome {
        let previous = self.clock.start();
        if previous != ClockState::Running {
            info!("simulation {}", if previous == ClockState::Stopped { "started" } else { "resumed" });
        }
        CommandOutcome::Clock {
            previous,
            current: self.clock.state(),
        }
    }

    pub fn pause(&mut self) -> CommandOutcome {
        let previous = self.clock.pause();
        if previous == ClockState::Running {
            info!("simulation paused at iteration {}", self.clock.iteration());
        }
        CommandOutcome::Clock {
            previous,
            current: self.clock.state(),
        }
    }

    /// Move an alerted entity into default.
    pub fn crash(&mut self, id: &EntityId) -> Result<(), SimulationError> {
        let entity = self
            .pool
            .get_mut(id)
            .ok_or_else(|| SimulationError::UnknownEntity(id.clone()))?;

        let reject = |reason| SimulationError::InvalidTransition {
            entity: id.clone(),
            status: entity.status(),
            command: "crash",
            reason,
        };
        match entity.status() {
            EntityStatus::Defaulted => return Err(reject("entity is already in default")),
            EntityStatus::SafeRecovered | EntityStatus::SafeCcpFundUsed => {
                return Err(reject("entity has already been resolved"))
            }
            EntityStatus::Healthy | EntityStatus::RiskDetected if !entity.alert_flag() => {
                return Err(reject("no AI alert raised"))
            }
            EntityStatus::Healthy | EntityStatus::RiskDetected => {}
        }

        entity.mark_defaulted();
        self.log.push(LogEntry::Default { entity: id.clone() });
        info!("{} defaulted, risk now {:.1}", id, self.risk_score());
        Ok(())
    }

    /// Resolve a defaulted entity through the CCP waterfall.
    pub fn recover(&mut self, id: &EntityId) -> Result<WaterfallReport, SimulationError> {
        let entity = self
            .pool
            .get_mut(id)
            .ok_or_else(|| SimulationError::UnknownEntity(id.clone()))?;
        let report = self.ccp.resolve_default(entity)?;

        self.log.push(LogEntry::Recovery {
            entity: id.clone(),
            outcome: report.outcome,
            final_gap: report.final_gap,
        });
        Ok(report)
    }

    // --- Derived risk, computed from current state on every call ---

    pub fn risk_score(&self) -> f64 {
        RiskScorer::score(self.pool.entities(), self.ccp.stress_counter())
    }

    pub fn global_margin_rate(&self) -> Decimal {
        RiskScorer::global_margin(self.risk_score())
    }

    pub fn sentiment(&self) -> Sentiment {
        RiskScorer::sentiment(self.risk_score())
    }

    // --- Accessors ---

    pub fn snapshot(&self) -> MarketSnapshot {
        let risk_score = self.risk_score();
        let clock_state = self.clock.state();
        MarketSnapshot {
            iteration: self.clock.iteration(),
            clock_state,
            system_status: if clock_state.is_running() {
                "Stable".to_string()
            } else {
                "Intervention Required".to_string()
            },
            log: self.log.lines(),
            entities: self.pool.entities().cloned().collect(),
            banks: self.generator.banks().to_vec(),
            risk_score,
            global_margin_rate: RiskScorer::global_margin(risk_score),
            sentiment: RiskScorer::sentiment(risk_score),
            ccp_stress: self.ccp.stress_counter(),
            default_fund_drawn: self.ccp.default_fund_drawn(),
        }
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn iteration(&self) -> u64 {
        self.clock.iteration()
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.pool.get(id)
    }

    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }

    pub fn ccp(&self) -> &CentralCounterparty {
        &self.ccp
    }

    pub fn log(&self) -> &MarketLog {
        &self.log
    }

    pub fn banks(&self) -> &[BankId] {
        self.generator.banks()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The engine's random source, for collaborators that must stay on the
    /// seeded sequence.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

#[cfg(test)]
impl SimulationEngine {
    pub(crate) fn replace_pool(&mut self, pool: EntityPool) {
        self.pool = pool;
    }
}
