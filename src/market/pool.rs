use crate::core::entity::{Entity, EntityId};
use crate::core::error::SimulationError;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The 15 listed companies new entities are drawn from.
pub const DEFAULT_CATALOG: [&str; 15] = [
    "TechCorp",
    "BioHealth",
    "SolarSys",
    "AutoMotive X",
    "FinServe",
    "AgriGrow",
    "CyberDyne",
    "BlueOcean",
    "OmegaRetail",
    "QuantumSoft",
    "Constructo",
    "MediaGiant",
    "LogiTrans",
    "EcoPower",
    "NanoMed",
];

/// Outcome of one pool rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub exited: Entity,
    pub entered: EntityId,
}

/// The active borrowing entities, oldest first.
///
/// Names are unique within the pool and drawn without replacement from a
/// fixed catalog. The pool size never changes after initialization.
///
/// # Examples
///
/// ```
/// use netrisk_nexus::market::pool::{EntityPool, DEFAULT_CATALOG};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let catalog: Vec<String> = DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect();
/// let mut pool = EntityPool::initialize(catalog, 4, &mut rng).unwrap();
/// assert_eq!(pool.len(), 4);
///
/// pool.rotate(&mut rng).unwrap();
/// assert_eq!(pool.len(), 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool {
    catalog: Vec<String>,
    active: VecDeque<Entity>,
}

impl EntityPool {
    /// Draw `sample_size` distinct names and create a fresh entity for each.
    pub fn initialize<R: Rng + ?Sized>(
        catalog: Vec<String>,
        sample_size: usize,
        rng: &mut R,
    ) -> Result<Self, SimulationError> {
        if sample_size > catalog.len() {
            return Err(SimulationError::CatalogExhausted {
                active: sample_size,
                catalog: catalog.len(),
            });
        }
        let active = catalog
            .choose_multiple(rng, sample_size)
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
            .map(|name| Entity::generate(name, rng))
            .collect();
        Ok(Self { catalog, active })
    }

    /// Build a pool from explicit entities, e.g. a scripted scenario.
    ///
    /// Every entity name must appear once in the catalog.
    pub fn from_entities(
        catalog: Vec<String>,
        entities: Vec<Entity>,
    ) -> Result<Self, SimulationError> {
        for (i, entity) in entities.iter().enumerate() {
            if !catalog.iter().any(|n| n == entity.id().as_str()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} is not in the catalog",
                    entity.id()
                )));
            }
            if entities[..i].iter().any(|e| e.id() == entity.id()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} appears twice in the pool",
                    entity.id()
                )));
            }
        }
        Ok(Self {
            catalog,
            active: entities.into(),
        })
    }

    /// Evict the oldest entity and list a fresh one under an unused name.
    ///
    /// Eviction is FIFO regardless of status, and the evicted name is
    /// eligible again. The pool is left untouched if no catalog name is free.
    pub fn rotate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Rotation, SimulationError> {
        let catalog = self.catalog.len();
        let exited = self
            .active
            .pop_front()
            .ok_or(SimulationError::CatalogExhausted { active: 0, catalog })?;
        let drawn = self.unused_names().choose(rng).map(|n| n.to_string());
        let name = match drawn {
            Some(name) => name,
            None => {
                self.active.push_front(exited);
                return Err(SimulationError::CatalogExhausted {
                    active: self.active.len(),
                    catalog,
                });
            }
        };
        let entered = Entity::generate(name, rng);
        let entered_id = entered.id().clone();
        self.active.push_back(entered);

        info!("{} left the market, {} entered", exited.id(), entered_id);
        debug!("pool after rotation: {:?}", self.ids());
        Ok(Rotation {
            exited,
            entered: entered_id,
        })
    }

    /// Catalog names not held by an active entity.
    pub fn unused_names(&self) -> Vec<&str> {
        self.catalog
            .iter()
            .map(String::as_str)
            .filter(|name| !self.active.iter().any(|e| e.id().as_str() == *name))
            .collect()
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.active.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut Entity> {
        self.active.iter_mut().find(|e| e.id() == id)
    }

    /// Active entities, oldest first.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.active.iter()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.active.iter().map(|e| e.id().clone()).collect()
    }

    /// Uniformly pick an active entity.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Entity> {
        if self.active.is_empty() {
            return None;
        }
        self.active.get(rng.gen_range(0..self.active.len()))
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn catalog() -> Vec<String> {
        DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_initialize_distinct_names() {
        let mut rng = StdRng::seed_from_u64(11);
        let pool = EntityPool::initialize(catalog(), 4, &mut rng).unwrap();
        let mut ids = pool.ids();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert_eq!(pool.unused_names().len(), 11);
    }

    #[test]
    fn test_initialize_larger_than_catalog() {
        let mut rng = StdRng::seed_from_u64(11);
        let result = EntityPool::initialize(vec!["A".into(), "B".into()], 3, &mut rng);
        assert_eq!(
            result.unwrap_err(),
            SimulationError::CatalogExhausted {
                active: 3,
                catalog: 2
            }
        );
    }

    #[test]
    fn test_rotation_evicts_oldest() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pool = EntityPool::initialize(catalog(), 4, &mut rng).unwrap();
        let before = pool.ids();

        let rotation = pool.rotate(&mut rng).unwrap();
        let after = pool.ids();

        assert_eq!(rotation.exited.id(), &before[0]);
        assert_eq!(&after[..3], &before[1..]);
        assert_eq!(after[3], rotation.entered);
        assert!(!before[1..].contains(&rotation.entered));
    }

    #[test]
    fn test_rotation_of_empty_pool_is_reported() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pool = EntityPool::from_entities(catalog(), Vec::new()).unwrap();

        let err = pool.rotate(&mut rng).unwrap_err();
        assert_eq!(
            err,
            SimulationError::CatalogExhausted {
                active: 0,
                catalog: 15
            }
        );
        assert!(pool.is_empty());
    }

    #[test]
    fn test_full_catalog_rotation_readmits_evicted_name() {
        let mut rng = StdRng::seed_from_u64(5);
        let names: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let mut pool = EntityPool::initialize(names, 4, &mut rng).unwrap();
        let before = pool.ids();

        let rotation = pool.rotate(&mut rng).unwrap();
        assert_eq!(rotation.exited.id(), &before[0]);
        assert_eq!(rotation.entered, before[0]);
        assert_eq!(&pool.ids()[..3], &before[1..]);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn test_rotation_can_reuse_evicted_name_later() {
        let mut rng = StdRng::seed_from_u64(9);
        let names: Vec<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        let mut pool = EntityPool::initialize(names, 1, &mut rng).unwrap();
        let mut readmitted = false;
        for _ in 0..40 {
            let rotation = pool.rotate(&mut rng).unwrap();
            readmitted |= rotation.exited.id() == &rotation.entered;
            assert_eq!(pool.len(), 1);
        }
        assert!(readmitted);
    }

    #[test]
    fn test_from_entities_rejects_duplicates() {
        let e = Entity::new("TechCorp", dec!(200), dec!(20), dec!(150));
        let result = EntityPool::from_entities(catalog(), vec![e.clone(), e]);
        assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_entities_rejects_unknown_name() {
        let e = Entity::new("Initech", dec!(200), dec!(20), dec!(150));
        let result = EntityPool::from_entities(catalog(), vec![e]);
        assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
    }
}
