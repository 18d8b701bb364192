//! The AI risk model seam.
//!
//! The engine only needs a bounded margin recommendation when a risk scan
//! fires; how that number is produced is up to the implementation.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// A margin recommendation for a flagged entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Percent of exposure to hold as margin, in [0, 100].
    pub recommended_margin_percent: f64,
}

impl RiskAssessment {
    /// Clamps the recommendation into [0, 100]; NaN becomes 0.
    pub fn new(recommended_margin_percent: f64) -> Self {
        let percent = if recommended_margin_percent.is_nan() {
            0.0
        } else {
            recommended_margin_percent.clamp(0.0, 100.0)
        };
        Self {
            recommended_margin_percent: percent,
        }
    }
}

/// Supplies a margin recommendation when a risk scan fires.
///
/// Implementations receive the engine's random source so that a seeded run
/// stays reproducible. They must not touch simulation state.
pub trait RiskPredictor: Send {
    fn assess(&self, rng: &mut dyn RngCore) -> RiskAssessment;
}

/// Always recommends the same margin.
#[derive(Debug, Clone, Copy)]
pub struct FixedPredictor(pub f64);

impl RiskPredictor for FixedPredictor {
    fn assess(&self, _rng: &mut dyn RngCore) -> RiskAssessment {
        RiskAssessment::new(self.0)
    }
}

/// Recommends a margin uniformly drawn from `[min_percent, max_percent]`.
#[derive(Debug, Clone, Copy)]
pub struct BoundedPredictor {
    pub min_percent: f64,
    pub max_percent: f64,
}

impl Default for BoundedPredictor {
    fn default() -> Self {
        Self {
            min_percent: 20.0,
            max_percent: 40.0,
        }
    }
}

impl RiskPredictor for BoundedPredictor {
    fn assess(&self, rng: &mut dyn RngCore) -> RiskAssessment {
        if self.max_percent <= self.min_percent {
            return RiskAssessment::new(self.min_percent);
        }
        RiskAssessment::new(rng.gen_range(self.min_percent..=self.max_percent))
    }
}
