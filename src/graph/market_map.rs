use crate::core::bank::BankId;
use crate::core::entity::{Entity, EntityId};
use crate::simulation::engine::MarketSnapshot;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::fmt;

/// Colour class of a node on the market map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeHealth {
    Bank,
    Healthy,
    Alerted,
    Defaulted,
}

impl NodeHealth {
    /// A default outranks an alert.
    pub fn of(entity: &Entity) -> Self {
        if entity.status().is_defaulted() {
            NodeHealth::Defaulted
        } else if entity.alert_flag() {
            NodeHealth::Alerted
        } else {
            NodeHealth::Healthy
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            NodeHealth::Bank => "#E67E22",
            NodeHealth::Healthy => "#27AE60",
            NodeHealth::Alerted => "#E74C3C",
            NodeHealth::Defaulted => "#C0392B",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketNode {
    pub label: String,
    pub health: NodeHealth,
}

impl fmt::Display for MarketNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Edge from a bank to an entity it lends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lends;

impl fmt::Display for Lends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("lends")
    }
}

/// Lending graph of banks and active entities.
///
/// Each entity hangs off one randomly chosen bank. The map is rebuilt from a
/// snapshot and never feeds back into the simulation.
#[derive(Debug, Clone)]
pub struct MarketMap {
    graph: DiGraph<MarketNode, Lends>,
    banks: HashMap<BankId, NodeIndex>,
    entities: HashMap<EntityId, NodeIndex>,
}

impl MarketMap {
    pub fn build<R: Rng + ?Sized>(banks: &[BankId], entities: &[Entity], rng: &mut R) -> Self {
        let mut graph = DiGraph::new();
        let mut bank_nodes = HashMap::new();
        let mut entity_nodes = HashMap::new();

        for bank in banks {
            let idx = graph.add_node(MarketNode {
                label: bank.to_string(),
                health: NodeHealth::Bank,
            });
            bank_nodes.insert(bank.clone(), idx);
        }
        for entity in entities {
            let idx = graph.add_node(MarketNode {
                label: entity.id().to_string(),
                health: NodeHealth::of(entity),
            });
            entity_nodes.insert(entity.id().clone(), idx);
            if let Some(lender) = banks.choose(rng) {
                graph.add_edge(bank_nodes[lender], idx, Lends);
            }
        }

        Self {
            graph,
            banks: bank_nodes,
            entities: entity_nodes,
        }
    }

    pub fn from_snapshot<R: Rng + ?Sized>(snapshot: &MarketSnapshot, rng: &mut R) -> Self {
        Self::build(&snapshot.banks, &snapshot.entities, rng)
    }

    pub fn graph(&self) -> &DiGraph<MarketNode, Lends> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn health(&self, id: &EntityId) -> Option<NodeHealth> {
        self.entities.get(id).map(|&idx| self.graph[idx].health)
    }

    /// The bank lending to an entity.
    pub fn lender_of(&self, id: &EntityId) -> Option<&str> {
        let idx = *self.entities.get(id)?;
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
            .map(|bank| self.graph[bank].label.as_str())
    }

    /// Entities lent to by a bank.
    pub fn borrowers_of(&self, bank: &BankId) -> Vec<&str> {
        match self.banks.get(bank) {
            Some(&idx) => self
                .graph
                .neighbors(idx)
                .map(|n| self.graph[n].label.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Graphviz rendering, nodes coloured by health.
    pub fn to_dot(&self) -> String {
        format!(
            "{}",
            Dot::with_attr_getters(
                &self.graph,
                &[Config::EdgeNoLabel],
                &|_, _| String::new(),
                &|_, (_, node): (NodeIndex, &MarketNode)| format!(
                    "style=filled, fillcolor=\"{}\"",
                    node.health.color()
                ),
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bank::DEFAULT_BANKS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn banks() -> Vec<BankId> {
        DEFAULT_BANKS.iter().map(|b| BankId::from(*b)).collect()
    }

    #[test]
    fn test_one_edge_per_entity() {
        let mut rng = StdRng::seed_from_u64(2);
        let entities = vec![
            Entity::new("TechCorp", dec!(200), dec!(20), dec!(150)),
            Entity::new("NanoMed", dec!(120), dec!(12), dec!(100)),
        ];
        let map = MarketMap::build(&banks(), &entities, &mut rng);

        assert_eq!(map.node_count(), 6);
        assert_eq!(map.edge_count(), 2);
        let lender = map.lender_of(&EntityId::new("TechCorp")).unwrap();
        assert!(DEFAULT_BANKS.contains(&lender));
        let total: usize = banks().iter().map(|b| map.borrowers_of(b).len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_health_classes() {
        let mut alerted = Entity::new("TechCorp", dec!(200), dec!(20), dec!(150));
        alerted.flag_risk(30.0);
        let mut defaulted = Entity::new("NanoMed", dec!(120), dec!(12), dec!(100));
        defaulted.flag_risk(30.0);
        defaulted.mark_defaulted();
        let healthy = Entity::new("SolarSys", dec!(250), dec!(25), dec!(200));

        assert_eq!(NodeHealth::of(&alerted), NodeHealth::Alerted);
        assert_eq!(NodeHealth::of(&defaulted), NodeHealth::Defaulted);
        assert_eq!(NodeHealth::of(&healthy), NodeHealth::Healthy);
    }

    #[test]
    fn test_dot_output_colours_nodes() {
        let mut rng = StdRng::seed_from_u64(2);
        let entities = vec![Entity::new("TechCorp", dec!(200), dec!(20), dec!(150))];
        let dot = MarketMap::build(&banks(), &entities, &mut rng).to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("TechCorp"));
        assert!(dot.contains(NodeHealth::Healthy.color()));
    }

    #[test]
    fn test_no_banks_no_edges() {
        let mut rng = StdRng::seed_from_u64(2);
        let entities = vec![Entity::new("TechCorp", dec!(200), dec!(20), dec!(150))];
        let map = MarketMap::build(&[], &entities, &mut rng);
        assert_eq!(map.edge_count(), 0);
        assert!(map.lender_of(&EntityId::new("TechCorp")).is_none());
    }
}
