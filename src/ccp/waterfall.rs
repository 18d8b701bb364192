//! Default resolution through the CCP waterfall.
//!
//! Losses on a defaulted loan are absorbed in order: the margin held
//! against it, then its collateral sold at a 10% haircut, then the CCP's
//! mutual default fund. Every draw on the fund raises CCP stress.

use crate::core::entity::{Entity, EntityId, EntityStatus};
use crate::core::error::SimulationError;
use chrono::{DateTime, Utc};
use log::{info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Share of collateral value recovered in a forced sale.
pub const LIQUIDATION_RECOVERY: Decimal = dec!(0.9);

/// Breakdown of a single default resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallReport {
    pub id: Uuid,
    pub entity: EntityId,
    pub exposure: Decimal,
    pub margin_applied: Decimal,
    /// Exposure left after the margin is consumed.
    pub remaining_debt: Decimal,
    /// Collateral proceeds after the haircut.
    pub assets_sold_value: Decimal,
    /// Remaining debt less asset proceeds. Positive means the fund pays.
    pub final_gap: Decimal,
    pub default_fund_draw: Decimal,
    pub outcome: EntityStatus,
    pub resolved_at: DateTime<Utc>,
}

impl WaterfallReport {
    pub fn used_default_fund(&self) -> bool {
        self.outcome == EntityStatus::SafeCcpFundUsed
    }
}

/// Pure waterfall arithmetic for an entity's balances.
///
/// # Examples
///
/// ```
/// use netrisk_nexus::ccp::waterfall::compute_gap;
/// use rust_decimal_macros::dec;
///
/// let (remaining, sold, gap) = compute_gap(dec!(200), dec!(20), dec!(150));
/// assert_eq!(remaining, dec!(180));
/// assert_eq!(sold, dec!(135));
/// assert_eq!(gap, dec!(45));
/// ```
pub fn compute_gap(
    exposure: Decimal,
    margin: Decimal,
    collateral: Decimal,
) -> (Decimal, Decimal, Decimal) {
    let remaining_debt = exposure - margin;
    let assets_sold_value = (collateral * LIQUIDATION_RECOVERY).round_dp(2);
    (remaining_debt, assets_sold_value, remaining_debt - assets_sold_value)
}

/// The central counterparty guaranteeing every cleared loan.
///
/// Tracks how often and how much the default fund has been drawn. Neither
/// figure ever decreases within a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CentralCounterparty {
    stress_counter: u32,
    default_fund_drawn: Decimal,
    history: Vec<WaterfallReport>,
}

impl CentralCounterparty {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a defaulted entity in place.
    ///
    /// Rejected with no state change unless the entity is `DEFAULTED`.
    pub fn resolve_default(
        &mut self,
        entity: &mut Entity,
    ) -> Result<WaterfallReport, SimulationError> {
        if entity.status() != EntityStatus::Defaulted {
            return Err(SimulationError::InvalidTransition {
                entity: entity.id().clone(),
                status: entity.status(),
                command: "recover",
                reason: "only a defaulted entity can be recovered",
            });
        }

        let (remaining_debt, assets_sold_value, final_gap) =
            compute_gap(entity.exposure(), entity.margin(), entity.collateral());

        let (outcome, default_fund_draw) = if final_gap > Decimal::ZERO {
            self.stress_counter += 1;
            self.default_fund_drawn += final_gap;
            warn!(
                "default fund drawn for {}: {} Cr (stress {})",
                entity.id(),
                final_gap,
                self.stress_counter
            );
            entity.mark_resolved(
                EntityStatus::SafeCcpFundUsed,
                format!(
                    "RECOVERED: Margin + Assets + CCP Default Fund (\u{20b9}{} Cr) covered debt.",
                    final_gap.round_dp(2)
                ),
            );
            (EntityStatus::SafeCcpFundUsed, final_gap)
        } else {
            entity.mark_resolved(
                EntityStatus::SafeRecovered,
                "RECOVERED: Margin + Assets were sufficient.".to_string(),
            );
            (EntityStatus::SafeRecovered, Decimal::ZERO)
        };
        info!("{} resolved as {}", entity.id(), outcome);

        let report = WaterfallReport {
            id: Uuid::new_v4(),
            entity: entity.id().clone(),
            exposure: entity.exposure(),
            margin_applied: entity.margin(),
            remaining_debt,
            assets_sold_value,
            final_gap,
            default_fund_draw,
            outcome,
            resolved_at: Utc::now(),
        };
        self.history.push(report.clone());
        Ok(report)
    }

    pub fn stress_counter(&self) -> u32 {
        self.stress_counter
    }

    /// Total paid out of the default fund so far.
    pub fn default_fund_drawn(&self) -> Decimal {
        self.default_fund_drawn
    }

    /// Every resolution, oldest first.
    pub fn history(&self) -> &[WaterfallReport] {
        &self.history
    }
}
