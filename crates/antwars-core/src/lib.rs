//! Deterministic multi-tribe ant warfare simulation engine.
//!
//! Tribes of ants forage a toroidal grid for resources, mark it with
//! per-tribe pheromone trails, fight ants of other tribes, and spawn new
//! workers from delivered stock. The engine is a pure stepped core: build
//! a [`world::World`] from a validated [`config::SimConfig`], call
//! [`world::World::step`] (or drive a whole run with
//! [`world::World::try_run_experiment`]), and read state back through the
//! snapshot types in [`world::metrics`].
//!
//! Two worlds built from equal configs produce identical histories; all
//! randomness flows from the config seed.

pub mod ant;
pub mod config;
pub mod grid;
pub mod pheromone;
pub mod resource;
pub mod tribe;
pub mod world;

pub use ant::{AntId, AntState};
pub use config::{SimConfig, SimConfigError};
pub use grid::Coord;
pub use pheromone::PheromoneKind;
pub use tribe::TribeId;
pub use world::{ExperimentError, RunSummary, World, WorldInitError};
