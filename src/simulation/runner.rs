use crate::core::error::SimulationError;
use crate::simulation::engine::{SimulationEngine, TickReport};
use log::{info, warn};
use std::thread;
use std::time::Duration;

/// Why a run came to an end.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// The tick budget was used up.
    Budget,
    /// The clock left `Running`, usually an AI alert.
    Paused,
    /// A tick failed; the clock was paused and the engine is unchanged.
    Failed(SimulationError),
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks: Vec<TickReport>,
    pub stop: StopReason,
}

impl RunSummary {
    pub fn alerts(&self) -> usize {
        self.ticks.iter().filter(|t| t.alert.is_some()).count()
    }

    fn log_end(self) -> Self {
        info!(
            "run ended after {} ticks ({:?}), {} alerts",
            self.ticks.len(),
            self.stop,
            self.alerts()
        );
        self
    }
}

/// Drives ticks with real-time pacing while the clock runs.
///
/// The pause between ticks is not interruptible; a pause issued during it
/// takes effect before the next tick.
#[derive(Debug, Clone, Copy)]
pub struct Runner {
    interval: Duration,
}

impl Runner {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_engine(engine: &SimulationEngine) -> Self {
        Self::new(Duration::from_millis(engine.config().tick_interval_ms))
    }

    /// Tick until the clock stops running or `max_ticks` ticks have run.
    pub fn run(&self, engine: &mut SimulationEngine, max_ticks: Option<u64>) -> RunSummary {
        let mut ticks = Vec::new();
        let summary = loop {
            if !engine.clock_state().is_running() {
                break RunSummary {
                    ticks,
                    stop: StopReason::Paused,
                };
            }
            if max_ticks.map_or(false, |max| ticks.len() as u64 >= max) {
                break RunSummary {
                    ticks,
                    stop: StopReason::Budget,
                };
            }

            match engine.tick() {
                Ok(report) => ticks.push(report),
                Err(e) => {
                    warn!("stopping run after failed tick: {}", e);
                    engine.pause();
                    break RunSummary {
                        ticks,
                        stop: StopReason::Failed(e),
                    };
                }
            }

            let more = max_ticks.map_or(true, |max| (ticks.len() as u64) < max);
            if engine.clock_state().is_running() && more && !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        };
        summary.log_end()
    }
}
