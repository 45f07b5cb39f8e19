//! Serialisable views of engine state for drivers, renderers, and run
//! summaries. Everything here is a copy; holding a view never blocks the
//! engine from stepping.

use crate::ant::AntState;
use crate::pheromone::PheromoneKind;
use crate::world::World;
use serde::{Deserialize, Serialize};

/// One ant as an external observer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntView {
    pub id: u32,
    pub tribe: u16,
    pub x: u16,
    pub y: u16,
    pub state: AntState,
    pub health: u32,
    pub carrying: u32,
}

/// A dense row-major copy of one scalar field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldView<T> {
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` entries.
    pub values: Vec<T>,
}

impl<T: Copy> FieldView<T> {
    pub fn at(&self, x: usize, y: usize) -> T {
        assert!(x < self.width && y < self.height, "coordinate out of range");
        self.values[y * self.width + x]
    }
}

/// Per-tribe scoreboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TribeStats {
    pub tribe: u16,
    pub population: usize,
    pub resources_stored: u64,
    pub total_collected: u64,
}

/// One sampled tick of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMetrics {
    pub tick: u64,
    pub population: usize,
    pub births: usize,
    pub deaths: usize,
    pub tribes: Vec<TribeStats>,
    /// Total harvestable resource left on the grid.
    pub resource_total: u64,
    /// Mean trail levels across all tribes, one entry per pheromone kind
    /// in `PheromoneKind::ALL` order.
    pub mean_trail_levels: [f64; 3],
}

/// Output of `try_run_experiment`, stable enough to serialise and diff
/// across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "RunSummary::schema_version_default")]
    pub schema_version: u32,
    pub steps: usize,
    pub sample_every: usize,
    pub final_population: usize,
    pub total_births: usize,
    pub total_deaths: usize,
    pub samples: Vec<TickMetrics>,
}

impl RunSummary {
    pub const SCHEMA_VERSION: u32 = 1;

    fn schema_version_default() -> u32 {
        Self::SCHEMA_VERSION
    }
}

impl World {
    pub fn collect_tick_metrics(&self) -> TickMetrics {
        let cells = (self.config.width * self.config.height) as f64;
        let mut mean_trail_levels = [0.0; 3];
        if !self.tribes.is_empty() {
            for (slot, kind) in mean_trail_levels.iter_mut().zip(PheromoneKind::ALL) {
                let sum: f64 = self
                    .tribes
                    .iter()
                    .map(|t| t.trails.field(kind).total())
                    .sum();
                *slot = sum / (cells * self.tribes.len() as f64);
            }
        }
        TickMetrics {
            tick: self.tick_index,
            population: self.population(),
            births: self.births_last_tick,
            deaths: self.deaths_last_tick,
            tribes: self.tribe_stats(),
            resource_total: self.resources.total(),
            mean_trail_levels,
        }
    }
}
