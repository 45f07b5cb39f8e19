use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Simulation parameters, fixed before the first tick.
///
/// All fields are plain data so a config can be loaded from JSON by an
/// external driver. `validate` must pass before a `World` is built;
/// mutating the config of a running world is unsupported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// One home coordinate per tribe; the tribe count is the length.
    pub tribe_homes: Vec<(u16, u16)>,
    pub initial_ants_per_tribe: usize,
    pub initial_tribe_resources: u64,

    /// Per-kind multiplicative evaporation factors, applied once per
    /// maintenance phase. Must lie in (0, 1].
    pub home_evaporation: f64,
    pub resource_evaporation: f64,
    pub war_evaporation: f64,
    /// Fraction of each cell's level spread to its 8 neighbours per
    /// maintenance phase. 0 disables diffusion.
    pub diffusion_rate: f64,
    pub home_deposit: f64,
    pub resource_deposit: f64,
    pub war_deposit: f64,
    /// Toroidal Manhattan radius around the home inside which exploring
    /// ants lay home pheromone.
    pub home_trail_radius: u32,
    /// Trail levels at or below this read as "no signal" for gradient
    /// following.
    pub gradient_threshold: f64,

    /// Number of resource deposits seeded at setup. 0 yields a barren world.
    pub resource_sites: usize,
    /// Per-cell resource cap and regeneration target for seeded sites.
    pub max_res_amount: u32,
    /// Amount a depleted cell recovers toward its target per maintenance
    /// phase.
    pub regeneration_rate: u32,

    /// Harvest request per foraging trip.
    pub carry_capacity: u32,
    pub initial_health: u32,
    /// Damage dealt per combatant per fighting tick.
    pub combat_damage: u32,
    /// Stored resources at which a tribe spawns a new ant.
    pub spawn_threshold: u64,
    /// Stored resources consumed by one spawn.
    pub spawn_cost: u64,

    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            tribe_homes: vec![(8, 8), (55, 55)],
            initial_ants_per_tribe: 20,
            initial_tribe_resources: 0,
            home_evaporation: 0.995,
            resource_evaporation: 0.98,
            war_evaporation: 0.95,
            diffusion_rate: 0.05,
            home_deposit: 0.03,
            resource_deposit: 0.05,
            war_deposit: 0.5,
            home_trail_radius: 24,
            gradient_threshold: 0.01,
            resource_sites: 12,
            max_res_amount: 100,
            regeneration_rate: 1,
            carry_capacity: 10,
            initial_health: 50,
            combat_damage: 10,
            spawn_threshold: 40,
            spawn_cost: 30,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimConfigError {
    ZeroGridDimension,
    GridTooLarge { max: usize, actual: usize },
    NoTribes,
    TooManyTribes { max: usize, actual: usize },
    HomeOutOfRange { tribe: usize, home: (u16, u16) },
    EvaporationOutOfRange { kind: &'static str, value: f64 },
    DiffusionOutOfRange { value: f64 },
    NegativeDeposit { kind: &'static str, value: f64 },
    NegativeGradientThreshold { value: f64 },
    ZeroMaxResAmount,
    ZeroCarryCapacity,
    ZeroInitialHealth,
    ZeroCombatDamage,
    ZeroSpawnCost,
    SpawnCostExceedsThreshold { cost: u64, threshold: u64 },
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimConfigError::ZeroGridDimension => {
                write!(f, "grid width and height must be positive")
            }
            SimConfigError::GridTooLarge { max, actual } => {
                write!(f, "grid dimension ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::NoTribes => write!(f, "at least one tribe home is required"),
            SimConfigError::TooManyTribes { max, actual } => {
                write!(f, "tribe count ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::HomeOutOfRange { tribe, home } => {
                write!(
                    f,
                    "home ({}, {}) of tribe {tribe} lies outside the grid",
                    home.0, home.1
                )
            }
            SimConfigError::EvaporationOutOfRange { kind, value } => {
                write!(f, "{kind} evaporation factor ({value}) must lie in (0, 1]")
            }
            SimConfigError::DiffusionOutOfRange { value } => {
                write!(f, "diffusion rate ({value}) must lie in [0, 1)")
            }
            SimConfigError::NegativeDeposit { kind, value } => {
                write!(f, "{kind} deposit amount ({value}) must be finite and >= 0")
            }
            SimConfigError::NegativeGradientThreshold { value } => {
                write!(f, "gradient threshold ({value}) must be finite and >= 0")
            }
            SimConfigError::ZeroMaxResAmount => write!(f, "max_res_amount must be positive"),
            SimConfigError::ZeroCarryCapacity => write!(f, "carry_capacity must be positive"),
            SimConfigError::ZeroInitialHealth => write!(f, "initial_health must be positive"),
            SimConfigError::ZeroCombatDamage => write!(f, "combat_damage must be positive"),
            SimConfigError::ZeroSpawnCost => write!(f, "spawn_cost must be positive"),
            SimConfigError::SpawnCostExceedsThreshold { cost, threshold } => {
                write!(f, "spawn_cost ({cost}) must not exceed spawn_threshold ({threshold})")
            }
        }
    }
}

impl Error for SimConfigError {}

impl SimConfig {
    pub const MAX_GRID_DIM: usize = 2048;
    pub const MAX_TRIBES: usize = 16;

    pub fn num_tribes(&self) -> usize {
        self.tribe_homes.len()
    }

    pub fn validate(&self) -> Result<(), SimConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimConfigError::ZeroGridDimension);
        }
        let largest = self.width.max(self.height);
        if largest > Self::MAX_GRID_DIM {
            return Err(SimConfigError::GridTooLarge {
                max: Self::MAX_GRID_DIM,
                actual: largest,
            });
        }
        if self.tribe_homes.is_empty() {
            return Err(SimConfigError::NoTribes);
        }
        if self.tribe_homes.len() > Self::MAX_TRIBES {
            return Err(SimConfigError::TooManyTribes {
                max: Self::MAX_TRIBES,
                actual: self.tribe_homes.len(),
            });
        }
        for (tribe, &home) in self.tribe_homes.iter().enumerate() {
            if home.0 as usize >= self.width || home.1 as usize >= self.height {
                return Err(SimConfigError::HomeOutOfRange { tribe, home });
            }
        }
        for (kind, value) in [
            ("home", self.home_evaporation),
            ("resource", self.resource_evaporation),
            ("war", self.war_evaporation),
        ] {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(SimConfigError::EvaporationOutOfRange { kind, value });
            }
        }
        if !self.diffusion_rate.is_finite() || self.diffusion_rate < 0.0 || self.diffusion_rate >= 1.0
        {
            return Err(SimConfigError::DiffusionOutOfRange {
                value: self.diffusion_rate,
            });
        }
        for (kind, value) in [
            ("home", self.home_deposit),
            ("resource", self.resource_deposit),
            ("war", self.war_deposit),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimConfigError::NegativeDeposit { kind, value });
            }
        }
        if !self.gradient_threshold.is_finite() || self.gradient_threshold < 0.0 {
            return Err(SimConfigError::NegativeGradientThreshold {
                value: self.gradient_threshold,
            });
        }
        if self.max_res_amount == 0 {
            return Err(SimConfigError::ZeroMaxResAmount);
        }
        if self.carry_capacity == 0 {
            return Err(SimConfigError::ZeroCarryCapacity);
        }
        if self.initial_health == 0 {
            return Err(SimConfigError::ZeroInitialHealth);
        }
        if self.combat_damage == 0 {
            return Err(SimConfigError::ZeroCombatDamage);
        }
        if self.spawn_cost == 0 {
            return Err(SimConfigError::ZeroSpawnCost);
        }
        if self.spawn_cost > self.spawn_threshold {
            return Err(SimConfigError::SpawnCostExceedsThreshold {
                cost: self.spawn_cost,
                threshold: self.spawn_threshold,
            });
        }
        Ok(())
    }
}
