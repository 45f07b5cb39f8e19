use crate::ant::AntId;
use crate::grid::Coord;
use crate::pheromone::{PheromoneKind, TrailMaps};
use serde::{Deserialize, Serialize};

/// Tribe identity; doubles as the index into the world's tribe arena,
/// which is sized once at setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TribeId(pub u16);

/// One colony: a home cell, the three trail fields, resource counters and
/// the registry of live ants. Tribes never merge, split or move home.
#[derive(Clone, Debug)]
pub struct Tribe {
    pub id: TribeId,
    pub home: Coord,
    pub trails: TrailMaps,
    /// Resources currently banked at the nest (spendable on spawns).
    pub resources_stored: u64,
    /// Lifetime total delivered, never decremented.
    pub total_collected: u64,
    ants: Vec<AntId>,
}

impl Tribe {
    pub fn new(id: TribeId, home: Coord, width: usize, height: usize, initial_resources: u64) -> Self {
        Self {
            id,
            home,
            trails: TrailMaps::new(width, height),
            resources_stored: initial_resources,
            total_collected: 0,
            ants: Vec::new(),
        }
    }

    pub fn population(&self) -> usize {
        self.ants.len()
    }

    pub fn ants(&self) -> &[AntId] {
        &self.ants
    }

    pub fn register(&mut self, id: AntId) {
        match self.ants.binary_search(&id) {
            Ok(_) => panic!("ant {id:?} already registered with tribe {:?}", self.id),
            Err(pos) => self.ants.insert(pos, id),
        }
    }

    pub fn remove(&mut self, id: AntId) {
        match self.ants.binary_search(&id) {
            Ok(pos) => {
                self.ants.remove(pos);
            }
            Err(_) => panic!("ant {id:?} missing from tribe {:?} registry", self.id),
        }
    }

    pub fn deposit(&mut self, kind: PheromoneKind, coord: Coord, amount: f64) {
        self.trails.field_mut(kind).deposit(coord, amount);
    }

    /// Bank a delivered load.
    pub fn deliver(&mut self, amount: u32) {
        self.resources_stored += amount as u64;
        self.total_collected += amount as u64;
    }

    /// Whether the stored counter has crossed the spawn threshold.
    pub fn can_spawn(&self, threshold: u64) -> bool {
        self.resources_stored >= threshold
    }

    /// Pay for one spawn. Callers must have checked `can_spawn`.
    pub fn pay_spawn_cost(&mut self, cost: u64) {
        debug_assert!(self.resources_stored >= cost);
        self.resources_stored -= cost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_stays_sorted_and_counts_population() {
        let mut tribe = Tribe::new(TribeId(0), Coord::new(1, 1), 8, 8, 0);
        tribe.register(AntId(5));
        tribe.register(AntId(2));
        tribe.register(AntId(9));
        assert_eq!(tribe.ants(), &[AntId(2), AntId(5), AntId(9)]);
        assert_eq!(tribe.population(), 3);

        tribe.remove(AntId(5));
        assert_eq!(tribe.ants(), &[AntId(2), AntId(9)]);
        assert_eq!(tribe.population(), 2);
    }

    #[test]
    fn delivery_feeds_both_counters() {
        let mut tribe = Tribe::new(TribeId(1), Coord::new(0, 0), 4, 4, 10);
        tribe.deliver(7);
        assert_eq!(tribe.resources_stored, 17);
        assert_eq!(tribe.total_collected, 7);

        assert!(tribe.can_spawn(15));
        tribe.pay_spawn_cost(15);
        assert_eq!(tribe.resources_stored, 2);
        assert_eq!(tribe.total_collected, 7, "spawning never touches the lifetime total");
    }
}
