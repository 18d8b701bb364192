use serde::{Deserialize, Serialize};
use std::fmt;

/// Autoplay state of the simulation.
///
/// `Stopped` only before the first start; afterwards the clock moves
/// between `Running` and `Paused`. There is no terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl ClockState {
    pub fn is_running(self) -> bool {
        self == ClockState::Running
    }
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ClockState::Stopped => "STOPPED",
            ClockState::Running => "RUNNING",
            ClockState::Paused => "PAUSED",
        };
        f.write_str(label)
    }
}

/// Discrete simulation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationClock {
    state: ClockState,
    iteration: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Start from `Stopped`, or resume from `Paused`. Returns the previous state.
    pub fn start(&mut self) -> ClockState {
        std::mem::replace(&mut self.state, ClockState::Running)
    }

    /// Halt autoplay. Returns the previous state.
    ///
    /// Pausing a clock that never started leaves it `Stopped`.
    pub fn pause(&mut self) -> ClockState {
        let previous = self.state;
        if previous == ClockState::Running {
            self.state = ClockState::Paused;
        }
        previous
    }

    pub(crate) fn advance_to(&mut self, iteration: u64) {
        debug_assert_eq!(iteration, self.iteration + 1);
        self.iteration = iteration;
    }
}
