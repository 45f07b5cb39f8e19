pub mod metrics;
pub mod tick;
#[cfg(test)]
mod tests;

pub use metrics::*;

use crate::ant::{Ant, AntId};
use crate::config::{SimConfig, SimConfigError};
use crate::grid::{Coord, Grid};
use crate::pheromone::PheromoneKind;
use crate::resource::ResourceField;
use crate::tribe::{Tribe, TribeId};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::{error::Error, fmt};

/// The simulation core: owns the grid, the world resource field, every
/// tribe (and through them all ants and trail fields) and the seeded RNG.
///
/// External layers drive it through `step`/`try_run_experiment` and read
/// it through the snapshot methods, which copy state out at tick
/// boundaries; nothing outside the crate can alias live engine state.
pub struct World {
    pub(crate) config: SimConfig,
    pub(crate) grid: Grid,
    pub(crate) resources: ResourceField,
    pub(crate) tribes: Vec<Tribe>,
    /// All live ants, kept sorted by ascending id; this is the fixed agent
    /// update order.
    pub(crate) ants: Vec<Ant>,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) tick_index: u64,
    pub(crate) next_ant_id: u32,
    pub(crate) births_last_tick: usize,
    pub(crate) deaths_last_tick: usize,
    pub(crate) total_births: usize,
    pub(crate) total_deaths: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldInitError {
    Config(SimConfigError),
    AntCountOverflow,
    TooManyAnts { max: usize, actual: usize },
}

impl fmt::Display for WorldInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldInitError::Config(e) => write!(f, "{}", e),
            WorldInitError::AntCountOverflow => {
                write!(f, "tribe count * initial_ants_per_tribe overflows usize")
            }
            WorldInitError::TooManyAnts { max, actual } => {
                write!(f, "total initial ants ({actual}) exceeds supported maximum ({max})")
            }
        }
    }
}

impl From<SimConfigError> for WorldInitError {
    fn from(err: SimConfigError) -> Self {
        WorldInitError::Config(err)
    }
}

impl Error for WorldInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldInitError::Config(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    InvalidSampleEvery,
    TooManySteps { max: usize, actual: usize },
    TooManySamples { max: usize, actual: usize },
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            ExperimentError::TooManySteps { max, actual } => {
                write!(f, "steps ({actual}) exceed supported maximum ({max})")
            }
            ExperimentError::TooManySamples { max, actual } => {
                write!(f, "sample count ({actual}) exceeds supported maximum ({max})")
            }
        }
    }
}

impl Error for ExperimentError {}

impl World {
    pub const MAX_TOTAL_ANTS: usize = 1_000_000;
    pub const MAX_EXPERIMENT_STEPS: usize = 1_000_000;
    pub const MAX_EXPERIMENT_SAMPLES: usize = 50_000;

    pub fn new(config: SimConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(config: SimConfig) -> Result<Self, WorldInitError> {
        config.validate()?;
        let initial_ants = config
            .num_tribes()
            .checked_mul(config.initial_ants_per_tribe)
            .ok_or(WorldInitError::AntCountOverflow)?;
        if initial_ants > Self::MAX_TOTAL_ANTS {
            return Err(WorldInitError::TooManyAnts {
                max: Self::MAX_TOTAL_ANTS,
                actual: initial_ants,
            });
        }

        let mut grid = Grid::new(config.width, config.height);

        // Environment layout draws from its own stream so behavioural RNG
        // consumption stays independent of the site count.
        let mut layout_rng = ChaCha12Rng::seed_from_u64(config.seed.wrapping_add(1));
        let mut resources = ResourceField::new(config.width, config.height, config.max_res_amount);
        resources.seed_sites(config.resource_sites, &mut layout_rng);

        let mut tribes = Vec::with_capacity(config.num_tribes());
        let mut ants = Vec::with_capacity(initial_ants);
        let mut next_ant_id = 0u32;
        for (idx, &(hx, hy)) in config.tribe_homes.iter().enumerate() {
            let id = TribeId(idx as u16);
            let home = Coord::new(hx, hy);
            let mut tribe = Tribe::new(
                id,
                home,
                config.width,
                config.height,
                config.initial_tribe_resources,
            );
            for _ in 0..config.initial_ants_per_tribe {
                let ant_id = AntId(next_ant_id);
                next_ant_id += 1;
                grid.insert(ant_id, home);
                tribe.register(ant_id);
                ants.push(Ant::new(ant_id, id, home, config.initial_health));
            }
            tribes.push(tribe);
        }

        let rng = ChaCha12Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            grid,
            resources,
            tribes,
            ants,
            rng,
            tick_index: 0,
            next_ant_id,
            births_last_tick: 0,
            deaths_last_tick: 0,
            total_births: 0,
            total_deaths: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick_index
    }

    pub fn population(&self) -> usize {
        self.ants.len()
    }

    pub fn num_tribes(&self) -> usize {
        self.tribes.len()
    }

    pub fn births_last_tick(&self) -> usize {
        self.births_last_tick
    }

    pub fn deaths_last_tick(&self) -> usize {
        self.deaths_last_tick
    }

    pub(crate) fn ant_index(&self, id: AntId) -> usize {
        self.ants
            .binary_search_by_key(&id, |a| a.id)
            .unwrap_or_else(|_| panic!("ant {id:?} not found in live registry"))
    }

    // ---- read-only snapshot surface -------------------------------------

    /// Every live ant in ascending-id order, copied out for rendering.
    pub fn ant_snapshot(&self) -> Vec<AntView> {
        self.ants
            .iter()
            .map(|a| AntView {
                id: a.id.0,
                tribe: a.tribe.0,
                x: a.pos.x,
                y: a.pos.y,
                state: a.state,
                health: a.health,
                carrying: a.carrying,
            })
            .collect()
    }

    pub fn try_pheromone_snapshot(
        &self,
        tribe: TribeId,
        kind: PheromoneKind,
    ) -> Option<FieldView<f64>> {
        self.tribes.get(tribe.0 as usize).map(|t| FieldView {
            width: self.config.width,
            height: self.config.height,
            values: t.trails.field(kind).values().to_vec(),
        })
    }

    pub fn pheromone_snapshot(&self, tribe: TribeId, kind: PheromoneKind) -> FieldView<f64> {
        self.try_pheromone_snapshot(tribe, kind)
            .unwrap_or_else(|| panic!("tribe {:?} out of range for pheromone snapshot", tribe))
    }

    pub fn resource_snapshot(&self) -> FieldView<u32> {
        FieldView {
            width: self.config.width,
            height: self.config.height,
            values: self.resources.values().to_vec(),
        }
    }

    pub fn tribe_stats(&self) -> Vec<TribeStats> {
        self.tribes
            .iter()
            .map(|t| TribeStats {
                tribe: t.id.0,
                population: t.population(),
                resources_stored: t.resources_stored,
                total_collected: t.total_collected,
            })
            .collect()
    }

    // ---- experiment driver ----------------------------------------------

    pub fn run_experiment(&mut self, steps: usize, sample_every: usize) -> RunSummary {
        self.try_run_experiment(steps, sample_every)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_run_experiment(
        &mut self,
        steps: usize,
        sample_every: usize,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if steps > Self::MAX_EXPERIMENT_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: Self::MAX_EXPERIMENT_STEPS,
                actual: steps,
            });
        }
        let estimated_samples = if steps == 0 {
            0
        } else {
            ((steps - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_EXPERIMENT_SAMPLES {
            return Err(ExperimentError::TooManySamples {
                max: Self::MAX_EXPERIMENT_SAMPLES,
                actual: estimated_samples,
            });
        }

        let births_before = self.total_births;
        let deaths_before = self.total_deaths;
        let mut samples = Vec::with_capacity(estimated_samples);
        for step in 1..=steps {
            self.step();
            if step % sample_every == 0 || step == steps {
                samples.push(self.collect_tick_metrics());
            }
        }
        Ok(RunSummary {
            schema_version: RunSummary::SCHEMA_VERSION,
            steps,
            sample_every,
            final_population: self.population(),
            samples,
            total_births: self.total_births - births_before,
            total_deaths: self.total_deaths - deaths_before,
        })
    }

    /// Debug-build consistency check run after every bookkeeping phase.
    #[cfg(debug_assertions)]
    pub(crate) fn check_invariants(&self) {
        let mut registered = 0;
        for tribe in &self.tribes {
            registered += tribe.population();
            for &id in tribe.ants() {
                let ant = &self.ants[self.ant_index(id)];
                assert_eq!(ant.tribe, tribe.id);
                assert_ne!(ant.state, crate::ant::AntState::Dead);
                assert!(
                    self.grid.occupants_at(ant.pos).contains(&id),
                    "ant {id:?} missing from occupancy index"
                );
            }
        }
        assert_eq!(registered, self.ants.len());
        assert!(self.ants.windows(2).all(|w| w[0].id < w[1].id));
    }
}
