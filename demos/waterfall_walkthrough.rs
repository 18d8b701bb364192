//! CCP default waterfall walkthrough.
//!
//! Two defaults on the same market: one where margin and collateral fall
//! short and the default fund pays, one where an AI-raised margin covers
//! the loss on its own.

use netrisk_nexus::core::entity::{Entity, EntityId};
use netrisk_nexus::risk::predictor::FixedPredictor;
use netrisk_nexus::simulation::command::Command;
use netrisk_nexus::simulation::config::SimulationConfig;
use netrisk_nexus::simulation::engine::SimulationEngine;
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  netrisk-nexus: Default Waterfall Example ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let entities = vec![
        Entity::new("TechCorp", dec!(200), dec!(20), dec!(150)),
        Entity::new("BioHealth", dec!(100), dec!(10), dec!(95)),
        Entity::new("SolarSys", dec!(250), dec!(25), dec!(200)),
        Entity::new("NanoMed", dec!(120), dec!(12), dec!(100)),
    ];
    let mut engine = SimulationEngine::with_entities(SimulationConfig::seeded(7), entities)
        .expect("valid scenario")
        .with_predictor(FixedPredictor(30.0));

    for name in ["TechCorp", "BioHealth"] {
        let id = EntityId::new(name);
        println!("━━━ {} ━━━\n", name);

        let alert = engine.risk_scan(&id).expect("scan");
        println!(
            "AI alert: margin raised to {:.0}% → ₹{} Cr",
            alert.assessment.recommended_margin_percent, alert.new_margin
        );

        engine.execute(Command::Crash(id.clone())).expect("crash");
        println!(
            "Defaulted. Risk {:.1}/10, global margin {}%",
            engine.risk_score(),
            engine.global_margin_rate()
        );

        let report = engine.recover(&id).expect("recover");
        println!("  Exposure:          ₹{} Cr", report.exposure);
        println!("  Margin applied:    ₹{} Cr", report.margin_applied);
        println!("  Remaining debt:    ₹{} Cr", report.remaining_debt);
        println!("  Assets sold (90%): ₹{} Cr", report.assets_sold_value);
        println!("  Final gap:         ₹{} Cr", report.final_gap);
        println!("  Outcome:           {}", report.outcome);
        println!(
            "Risk {:.1}/10, CCP stress {}\n",
            engine.risk_score(),
            engine.ccp().stress_counter()
        );
    }

    println!("Default fund drawn in total: ₹{} Cr", engine.ccp().default_fund_drawn());
}
