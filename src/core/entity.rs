use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Headlines attached to freshly listed entities.
pub const NEWS_TEMPLATES: [&str; 5] = [
    "reports record quarterly growth",
    "announces new merger talks",
    "expands into European markets",
    "faces minor supply chain delay",
    "launches new AI product line",
];

/// Initial margin posted against a new loan.
pub const INITIAL_MARGIN_RATE: Decimal = dec!(0.10);

/// Identifier of a borrowing entity. Doubles as its display name.
///
/// # Examples
///
/// ```
/// use netrisk_nexus::core::entity::EntityId;
///
/// let a = EntityId::new("TechCorp");
/// let b = EntityId::new("BioHealth");
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new entity identifier from its catalog name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this entity ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Lifecycle of a borrowing entity.
///
/// ```text
/// HEALTHY -> RISK_DETECTED -> DEFAULTED -> SAFE_RECOVERED
///                                       \-> SAFE_CCP_FUND_USED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Healthy,
    RiskDetected,
    Defaulted,
    SafeRecovered,
    SafeCcpFundUsed,
}

impl EntityStatus {
    pub fn is_defaulted(self) -> bool {
        matches!(self, EntityStatus::Defaulted)
    }

    /// Resolved through the waterfall, by either outcome.
    pub fn is_safe(self) -> bool {
        matches!(
            self,
            EntityStatus::SafeRecovered | EntityStatus::SafeCcpFundUsed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Healthy => "HEALTHY",
            EntityStatus::RiskDetected => "RISK_DETECTED",
            EntityStatus::Defaulted => "DEFAULTED",
            EntityStatus::SafeRecovered => "SAFE_RECOVERED",
            EntityStatus::SafeCcpFundUsed => "SAFE_CCP_FUND_USED",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A borrowing company cleared through the CCP.
///
/// Amounts are in crore (Cr). `collateral` is always below `exposure` at
/// creation, so a default normally reaches the CCP default fund.
///
/// # Examples
///
/// ```
/// use netrisk_nexus::core::entity::{Entity, EntityStatus};
/// use rust_decimal_macros::dec;
///
/// let entity = Entity::new("TechCorp", dec!(200), dec!(20), dec!(150));
/// assert_eq!(entity.status(), EntityStatus::Healthy);
/// assert!(!entity.alert_flag());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    /// Loan amount.
    exposure: Decimal,
    /// Margin held against the exposure.
    margin: Decimal,
    /// Liquidatable assets, sold at a haircut on default.
    collateral: Decimal,
    status: EntityStatus,
    alert_flag: bool,
    news: String,
}

impl Entity {
    /// Create a healthy entity with explicit balances.
    ///
    /// # Panics
    ///
    /// Panics if `exposure` is not positive, if `margin` or `collateral` is
    /// negative, or if `collateral` is not strictly below `exposure`.
    pub fn new(
        id: impl Into<EntityId>,
        exposure: Decimal,
        margin: Decimal,
        collateral: Decimal,
    ) -> Self {
        assert!(
            exposure > Decimal::ZERO,
            "Entity exposure must be positive, got {}",
            exposure
        );
        assert!(
            margin >= Decimal::ZERO && collateral >= Decimal::ZERO,
            "Entity margin and collateral must be non-negative"
        );
        assert!(
            collateral < exposure,
            "Entity collateral {} must be below exposure {}",
            collateral,
            exposure
        );
        let id = id.into();
        Self {
            news: format!("{} {}", id, NEWS_TEMPLATES[0]),
            id,
            exposure,
            margin,
            collateral,
            status: EntityStatus::Healthy,
            alert_flag: false,
        }
    }

    /// Draw a fresh entity: exposure in [100, 300], 10% margin, collateral
    /// at 70-90% of exposure.
    pub fn generate<R: Rng + ?Sized>(id: impl Into<EntityId>, rng: &mut R) -> Self {
        let id = id.into();
        let exposure = Decimal::from(rng.gen_range(100u32..=300));
        let margin = (exposure * INITIAL_MARGIN_RATE).round_dp(2);
        let ratio = Decimal::from_f64_retain(rng.gen_range(0.7..0.9)).unwrap_or(dec!(0.8));
        let collateral = (exposure * ratio).round_dp(2);
        let template = NEWS_TEMPLATES.choose(rng).copied().unwrap_or(NEWS_TEMPLATES[0]);

        Self {
            news: format!("{} {}", id, template),
            id,
            exposure,
            margin,
            collateral,
            status: EntityStatus::Healthy,
            alert_flag: false,
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn exposure(&self) -> Decimal {
        self.exposure
    }

    pub fn margin(&self) -> Decimal {
        self.margin
    }

    pub fn collateral(&self) -> Decimal {
        self.collateral
    }

    pub fn status(&self) -> EntityStatus {
        self.status
    }

    /// Set by an AI scan, cleared by CCP recovery.
    pub fn alert_flag(&self) -> bool {
        self.alert_flag
    }

    /// Latest headline shown for this entity.
    pub fn news(&self) -> &str {
        &self.news
    }

    // --- Transitions, driven by the engine and the CCP ---

    /// AI scan result: flag the entity and reprice its margin.
    pub(crate) fn flag_risk(&mut self, recommended_margin_percent: f64) {
        let percent =
            Decimal::from_f64_retain(recommended_margin_percent.clamp(0.0, 100.0))
                .unwrap_or(Decimal::ZERO);
        self.margin = (self.exposure * percent / dec!(100)).round_dp(2);
        self.status = EntityStatus::RiskDetected;
        self.alert_flag = true;
        self.news = format!("BREAKING: {} CFO resigns amid scandal!", self.id);
    }

    pub(crate) fn mark_defaulted(&mut self) {
        self.status = EntityStatus::Defaulted;
        self.news = "CRITICAL: Company defaulted on loan payment.".to_string();
    }

    pub(crate) fn mark_resolved(&mut self, status: EntityStatus, news: String) {
        debug_assert!(status.is_safe());
        self.status = status;
        self.alert_flag = false;
        self.news = news;
    }
}
