use crate::core::bank::DEFAULT_BANKS;
use crate::core::error::SimulationError;
use crate::market::pool::DEFAULT_CATALOG;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Parameters of a simulation run.
///
/// Missing fields take their default when deserialized, so a config file
/// only needs to list what it changes:
///
/// ```
/// use netrisk_nexus::simulation::config::SimulationConfig;
///
/// let config: SimulationConfig =
///     serde_json::from_str(r#"{ "seed": 42, "scan_probability": 0.5 }"#).unwrap();
/// assert_eq!(config.seed, Some(42));
/// assert_eq!(config.pool_size, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Number of active entities.
    pub pool_size: usize,
    /// Rotate the pool every this many ticks.
    pub rotation_interval: u64,
    pub transactions_per_tick: usize,
    /// Maximum lines kept in the market feed.
    pub log_capacity: usize,
    /// Chance per tick that an AI risk scan fires.
    pub scan_probability: f64,
    /// Chance per tick that a sentiment line is logged.
    pub sentiment_probability: f64,
    /// Real-time pause between ticks.
    pub tick_interval_ms: u64,
    pub catalog: Vec<String>,
    pub banks: Vec<String>,
    pub predictor_min_percent: f64,
    pub predictor_max_percent: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            pool_size: 4,
            rotation_interval: 3,
            transactions_per_tick: 2,
            log_capacity: 10,
            scan_probability: 0.05,
            sentiment_probability: 0.2,
            tick_interval_ms: 1_000,
            catalog: DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect(),
            banks: DEFAULT_BANKS.iter().map(|s| s.to_string()).collect(),
            predictor_min_percent: 20.0,
            predictor_max_percent: 40.0,
        }
    }
}

impl SimulationConfig {
    /// Same defaults with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |msg: String| Err(SimulationError::InvalidConfig(msg));

        if self.pool_size == 0 {
            return invalid("pool_size must be at least 1".into());
        }
        if self.pool_size > self.catalog.len() {
            return invalid(format!(
                "pool_size {} exceeds catalog of {} names",
                self.pool_size,
                self.catalog.len()
            ));
        }
        let unique: HashSet<&str> = self.catalog.iter().map(String::as_str).collect();
        if unique.len() != self.catalog.len() {
            return invalid("catalog names must be unique".into());
        }
        if self.banks.is_empty() {
            return invalid("at least one bank is required".into());
        }
        if self.rotation_interval == 0 {
            return invalid("rotation_interval must be at least 1".into());
        }
        for (name, p) in [
            ("scan_probability", self.scan_probability),
            ("sentiment_probability", self.sentiment_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{} must be within [0, 1], got {}", name, p));
            }
        }
        let range = 0.0..=100.0;
        if !range.contains(&self.predictor_min_percent)
            || !range.contains(&self.predictor_max_percent)
        {
            return invalid("predictor bounds must be within [0, 100]".into());
        }
        if self.predictor_min_percent > self.predictor_max_percent {
            return invalid("predictor_min_percent exceeds predictor_max_percent".into());
        }
        Ok(())
    }
}
