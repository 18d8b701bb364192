use crate::core::entity::Entity;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BASE_RISK: f64 = 1.0;
pub const ALERT_PENALTY: f64 = 2.0;
pub const DEFAULT_PENALTY: f64 = 4.0;
pub const STRESS_PENALTY: f64 = 1.5;
pub const MAX_RISK: f64 = 9.9;

/// Market mood derived from the system risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Bullish,
    Neutral,
    Nervous,
    Panic,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Bullish => "BULLISH",
            Sentiment::Neutral => "NEUTRAL",
            Sentiment::Nervous => "NERVOUS",
            Sentiment::Panic => "PANIC",
        };
        f.write_str(label)
    }
}

/// The inputs of the additive risk model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    /// Entities carrying an AI alert.
    pub alerted: usize,
    /// Entities currently in default.
    pub defaulted: usize,
    /// Number of default fund draws so far.
    pub ccp_stress: u32,
}

impl RiskFactors {
    pub fn from_entities<'a>(
        entities: impl IntoIterator<Item = &'a Entity>,
        ccp_stress: u32,
    ) -> Self {
        let mut factors = RiskFactors {
            ccp_stress,
            ..Default::default()
        };
        for entity in entities {
            if entity.alert_flag() {
                factors.alerted += 1;
            }
            if entity.status().is_defaulted() {
                factors.defaulted += 1;
            }
        }
        factors
    }

    /// `1 + 2*alerted + 4*defaulted + 1.5*stress`, rounded to one decimal
    /// and capped at 9.9.
    pub fn score(&self) -> f64 {
        let total = BASE_RISK
            + ALERT_PENALTY * self.alerted as f64
            + DEFAULT_PENALTY * self.defaulted as f64
            + STRESS_PENALTY * f64::from(self.ccp_stress);
        ((total * 10.0).round() / 10.0).clamp(BASE_RISK, MAX_RISK)
    }
}

/// Aggregate system risk, and the margin tier and sentiment derived from it.
///
/// Everything here is a pure function of its inputs.
///
/// # Examples
///
/// ```
/// use netrisk_nexus::risk::scorer::{RiskScorer, Sentiment};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(RiskScorer::global_margin(3.0), dec!(15));
/// assert_eq!(RiskScorer::sentiment(7.0), Sentiment::Panic);
/// ```
pub struct RiskScorer;

impl RiskScorer {
    /// System risk score in [1.0, 9.9]. An empty pool with no stress scores 1.0.
    pub fn score<'a>(entities: impl IntoIterator<Item = &'a Entity>, ccp_stress: u32) -> f64 {
        RiskFactors::from_entities(entities, ccp_stress).score()
    }

    /// Global margin rate, in percent, for a risk score.
    pub fn global_margin(score: f64) -> Decimal {
        if score < 3.0 {
            dec!(10)
        } else if score < 6.0 {
            dec!(15)
        } else if score < 8.0 {
            dec!(20)
        } else {
            dec!(25)
        }
    }

    pub fn sentiment(score: f64) -> Sentiment {
        if score < 3.0 {
            Sentiment::Bullish
        } else if score < 5.0 {
            Sentiment::Neutral
        } else if score < 7.0 {
            Sentiment::Nervous
        } else {
            Sentiment::Panic
        }
    }
}
