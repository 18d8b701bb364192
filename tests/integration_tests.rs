use approx::assert_relative_eq;
use netrisk_nexus::core::entity::{Entity, EntityId, EntityStatus};
use netrisk_nexus::core::error::SimulationError;
use netrisk_nexus::graph::market_map::{MarketMap, NodeHealth};
use netrisk_nexus::risk::predictor::FixedPredictor;
use netrisk_nexus::simulation::clock::ClockState;
use netrisk_nexus::simulation::command::{Command, CommandOutcome};
use netrisk_nexus::simulation::config::SimulationConfig;
use netrisk_nexus::simulation::engine::SimulationEngine;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn four_entities() -> Vec<Entity> {
    vec![
        Entity::new("TechCorp", dec!(200), dec!(20), dec!(150)),
        Entity::new("BioHealth", dec!(100), dec!(10), dec!(95)),
        Entity::new("SolarSys", dec!(300), dec!(30), dec!(240)),
        Entity::new("FinServe", dec!(150), dec!(15), dec!(120)),
    ]
}

fn quiet() -> SimulationConfig {
    SimulationConfig {
        scan_probability: 0.0,
        sentiment_probability: 0.0,
        tick_interval_ms: 0,
        ..SimulationConfig::seeded(2024)
    }
}

/// Full lifecycle: healthy pool → AI alert pauses the clock → crash → CCP recovery.
#[test]
fn alert_crash_recover_lifecycle() {
    let config = SimulationConfig {
        scan_probability: 1.0,
        ..quiet()
    };
    let mut engine = SimulationEngine::with_entities(config, four_entities())
        .unwrap()
        .with_predictor(FixedPredictor(30.0));

    assert!(engine
        .pool()
        .entities()
        .all(|e| e.status() == EntityStatus::Healthy && !e.alert_flag()));
    assert_relative_eq!(engine.risk_score(), 1.0);
    assert_eq!(engine.global_margin_rate(), dec!(10));

    engine.execute(Command::Start).unwrap();
    let report = engine.tick().unwrap();
    let alert = report.alert.expect("certain scan must fire");
    assert_eq!(engine.clock_state(), ClockState::Paused);
    assert_eq!(alert.assessment.recommended_margin_percent, 30.0);

    let id = alert.entity.clone();
    engine.execute(Command::Crash(id.clone())).unwrap();
    assert_eq!(engine.entity(&id).unwrap().status(), EntityStatus::Defaulted);
    assert_relative_eq!(engine.risk_score(), 7.0);
    assert_eq!(engine.global_margin_rate(), dec!(20));

    let outcome = engine.execute(Command::Recover(id.clone())).unwrap();
    let waterfall = match outcome {
        CommandOutcome::Recovered { report } => report,
        other => panic!("expected a recovery, got {:?}", other),
    };

    let entity = engine.entity(&id).unwrap();
    assert!(entity.status().is_safe());
    assert!(!entity.alert_flag());
    assert_eq!(
        waterfall.final_gap,
        entity.exposure() - entity.margin() - (entity.collateral() * dec!(0.9)).round_dp(2)
    );
    let expected_stress = u32::from(waterfall.used_default_fund());
    assert_eq!(engine.ccp().stress_counter(), expected_stress);
    assert_relative_eq!(engine.risk_score(), 1.0 + 1.5 * f64::from(expected_stress));
}

/// A forced scan with a 30% recommendation on a 200 Cr loan holds 60 Cr margin.
#[test]
fn forced_scan_reprices_margin_and_pauses() {
    let mut engine = SimulationEngine::with_entities(quiet(), four_entities())
        .unwrap()
        .with_predictor(FixedPredictor(30.0));
    engine.execute(Command::Start).unwrap();

    let id = EntityId::new("TechCorp");
    let alert = engine.risk_scan(&id).unwrap();

    assert_eq!(alert.new_margin, dec!(60));
    let e = engine.entity(&id).unwrap();
    assert_eq!(e.margin(), dec!(60.0));
    assert_eq!(e.status(), EntityStatus::RiskDetected);
    assert!(e.alert_flag());
    assert_eq!(engine.clock_state(), ClockState::Paused);
}

/// 200 loan, 20 margin, 150 collateral: the fund covers a 45 Cr gap.
#[test]
fn waterfall_draws_default_fund() {
    let mut engine = SimulationEngine::with_entities(quiet(), four_entities())
        .unwrap()
        .with_predictor(FixedPredictor(10.0));
    let id = EntityId::new("TechCorp");

    engine.risk_scan(&id).unwrap();
    engine.crash(&id).unwrap();
    let report = engine.recover(&id).unwrap();

    assert_eq!(report.remaining_debt, dec!(180));
    assert_eq!(report.assets_sold_value, dec!(135));
    assert_eq!(report.final_gap, dec!(45));
    assert_eq!(
        engine.entity(&id).unwrap().status(),
        EntityStatus::SafeCcpFundUsed
    );
    assert_eq!(engine.ccp().stress_counter(), 1);
    assert_eq!(engine.ccp().default_fund_drawn(), dec!(45));
}

/// Collateral at 95% of exposure with an AI-inflated margin needs no fund.
#[test]
fn waterfall_covered_without_fund() {
    let mut engine = SimulationEngine::with_entities(quiet(), four_entities())
        .unwrap()
        .with_predictor(FixedPredictor(30.0));
    let id = EntityId::new("BioHealth");

    engine.risk_scan(&id).unwrap();
    engine.crash(&id).unwrap();
    let report = engine.recover(&id).unwrap();

    assert_eq!(report.assets_sold_value, dec!(85.5));
    assert_eq!(report.remaining_debt, dec!(70));
    assert!(report.final_gap <= Decimal::ZERO);
    assert_eq!(
        engine.entity(&id).unwrap().status(),
        EntityStatus::SafeRecovered
    );
    assert_eq!(engine.ccp().stress_counter(), 0);
}

/// Same loan at the initial 10% margin still reaches the fund by 4.5 Cr.
#[test]
fn waterfall_small_gap_reaches_fund() {
    let mut engine = SimulationEngine::with_entities(quiet(), four_entities())
        .unwrap()
        .with_predictor(FixedPredictor(10.0));
    let id = EntityId::new("BioHealth");

    engine.risk_scan(&id).unwrap();
    engine.crash(&id).unwrap();
    let report = engine.recover(&id).unwrap();

    assert_eq!(report.remaining_debt, dec!(90));
    assert_eq!(report.final_gap, dec!(4.5));
    assert!(report.used_default_fund());
}

/// Rejected commands report why and leave everything untouched.
#[test]
fn invalid_transitions_are_rejected() {
    let mut engine = SimulationEngine::with_entities(quiet(), four_entities())
        .unwrap()
        .with_predictor(FixedPredictor(30.0));
    let id = EntityId::new("SolarSys");
    let before = engine.snapshot();

    // No alert yet.
    assert!(matches!(
        engine.execute(Command::Crash(id.clone())),
        Err(SimulationError::InvalidTransition { .. })
    ));
    // Not defaulted.
    assert!(matches!(
        engine.execute(Command::Recover(id.clone())),
        Err(SimulationError::InvalidTransition { .. })
    ));
    assert_eq!(engine.snapshot(), before);

    engine.risk_scan(&id).unwrap();
    engine.crash(&id).unwrap();
    // Already defaulted.
    assert!(engine.crash(&id).is_err());

    engine.recover(&id).unwrap();
    // Already resolved.
    let resolved = engine.snapshot();
    assert!(engine.crash(&id).is_err());
    assert!(engine.recover(&id).is_err());
    assert_eq!(engine.snapshot(), resolved);
}

/// Defaulted entities are repaired in place, but FIFO rotation still evicts them.
#[test]
fn rotation_is_fifo_regardless_of_status() {
    let mut engine = SimulationEngine::with_entities(quiet(), four_entities())
        .unwrap()
        .with_predictor(FixedPredictor(30.0));
    let oldest = EntityId::new("TechCorp");
    engine.risk_scan(&oldest).unwrap();
    engine.crash(&oldest).unwrap();

    engine.execute(Command::Start).unwrap();
    for _ in 0..3 {
        engine.tick().unwrap();
    }

    assert!(engine.entity(&oldest).is_none());
    assert_eq!(engine.pool().len(), 4);
    assert_relative_eq!(engine.risk_score(), 1.0);
    assert!(engine
        .log()
        .lines()
        .iter()
        .any(|l| l.starts_with("MARKET UPDATE:")));
}

/// Pausing between ticks stops the next one.
#[test]
fn pause_takes_effect_before_next_tick() {
    let mut engine = SimulationEngine::with_entities(quiet(), four_entities()).unwrap();
    engine.execute(Command::Start).unwrap();
    engine.tick().unwrap();
    engine.execute(Command::Pause).unwrap();

    assert_eq!(
        engine.tick().unwrap_err(),
        SimulationError::ClockNotRunning(ClockState::Paused)
    );
    assert_eq!(engine.iteration(), 1);

    engine.execute(Command::Start).unwrap();
    assert_eq!(engine.tick().unwrap().iteration, 2);
}

/// The market map colours nodes from the snapshot.
#[test]
fn market_map_reflects_snapshot() {
    let mut engine = SimulationEngine::with_entities(quiet(), four_entities())
        .unwrap()
        .with_predictor(FixedPredictor(30.0));
    let alerted = EntityId::new("FinServe");
    let defaulted = EntityId::new("SolarSys");
    engine.risk_scan(&alerted).unwrap();
    engine.risk_scan(&defaulted).unwrap();
    engine.crash(&defaulted).unwrap();

    let snapshot = engine.snapshot();
    let map = MarketMap::from_snapshot(&snapshot, engine.rng_mut());

    assert_eq!(map.node_count(), 8);
    assert_eq!(map.edge_count(), 4);
    assert_eq!(map.health(&alerted), Some(NodeHealth::Alerted));
    assert_eq!(map.health(&defaulted), Some(NodeHealth::Defaulted));
    assert_eq!(map.health(&EntityId::new("TechCorp")), Some(NodeHealth::Healthy));
}

/// Snapshots serialize for renderers.
#[test]
fn snapshot_serializes() {
    let engine = SimulationEngine::new(SimulationConfig::seeded(5)).unwrap();
    let json = serde_json::to_value(engine.snapshot()).unwrap();

    assert_eq!(json["clock_state"], "STOPPED");
    assert_eq!(json["iteration"], 0);
    assert_eq!(json["entities"].as_array().unwrap().len(), 4);
    assert_eq!(json["entities"][0]["status"], "HEALTHY");
    assert!(json.get("global_margin_rate").is_some());
}

/// An invalid config is rejected up front.
#[test]
fn invalid_config_rejected() {
    let config = SimulationConfig {
        pool_size: 0,
        ..Default::default()
    };
    assert!(matches!(
        SimulationEngine::new(config),
        Err(SimulationError::InvalidConfig(_))
    ));
}
