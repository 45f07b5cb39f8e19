use super::*;
use crate::ant::AntState;
use crate::config::SimConfig;
use crate::grid::Coord;
use crate::pheromone::PheromoneKind;
use crate::tribe::TribeId;

fn small_config(seed: u64) -> SimConfig {
    SimConfig {
        width: 32,
        height: 32,
        tribe_homes: vec![(4, 4), (27, 27)],
        initial_ants_per_tribe: 8,
        resource_sites: 6,
        seed,
        ..SimConfig::default()
    }
}

#[test]
fn rejects_invalid_config() {
    let config = SimConfig {
        width: 0,
        ..SimConfig::default()
    };
    assert!(matches!(
        World::try_new(config),
        Err(WorldInitError::Config(_))
    ));
}

#[test]
fn rejects_oversized_initial_population() {
    let config = SimConfig {
        tribe_homes: vec![(1, 1)],
        initial_ants_per_tribe: World::MAX_TOTAL_ANTS + 1,
        ..SimConfig::default()
    };
    assert!(matches!(
        World::try_new(config),
        Err(WorldInitError::TooManyAnts { .. })
    ));
}

#[test]
fn equal_seeds_produce_identical_histories() {
    let mut a = World::new(small_config(42));
    let mut b = World::new(small_config(42));
    for _ in 0..40 {
        a.step();
        b.step();
    }
    assert_eq!(a.ant_snapshot(), b.ant_snapshot());
    assert_eq!(a.tribe_stats(), b.tribe_stats());
    assert_eq!(a.resource_snapshot(), b.resource_snapshot());
    for tribe in 0..a.num_tribes() {
        for kind in PheromoneKind::ALL {
            assert_eq!(
                a.pheromone_snapshot(TribeId(tribe as u16), kind),
                b.pheromone_snapshot(TribeId(tribe as u16), kind)
            );
        }
    }
    assert_eq!(a.collect_tick_metrics(), b.collect_tick_metrics());
}

#[test]
fn snapshots_do_not_perturb_the_run() {
    let mut observed = World::new(small_config(7));
    let mut untouched = World::new(small_config(7));
    for _ in 0..20 {
        let before = observed.ant_snapshot();
        assert_eq!(before, observed.ant_snapshot());
        let _ = observed.resource_snapshot();
        let _ = observed.pheromone_snapshot(TribeId(0), PheromoneKind::Home);
        observed.step();
        untouched.step();
    }
    assert_eq!(observed.ant_snapshot(), untouched.ant_snapshot());
    assert_eq!(observed.tribe_stats(), untouched.tribe_stats());
}

#[test]
fn registries_and_grid_stay_consistent() {
    let mut world = World::new(small_config(11));
    for _ in 0..60 {
        world.step();
    }
    let tribal_total: usize = world.tribe_stats().iter().map(|t| t.population).sum();
    assert_eq!(tribal_total, world.population());
    let grid_total: usize = world
        .grid
        .occupied_cells()
        .map(|(_, occupants)| occupants.len())
        .sum();
    assert_eq!(grid_total, world.population());
}

#[test]
fn forage_round_trip_delivers_and_conserves_resource() {
    let config = SimConfig {
        width: 10,
        height: 10,
        tribe_homes: vec![(5, 5)],
        initial_ants_per_tribe: 4,
        resource_sites: 0,
        regeneration_rate: 0,
        spawn_threshold: 1_000_000,
        spawn_cost: 30,
        seed: 3,
        ..SimConfig::default()
    };
    let mut world = World::new(config.clone());
    let full = config.max_res_amount;
    for y in 0..10u16 {
        for x in 0..10u16 {
            world.resources.set_site(Coord::new(x, y), full);
        }
    }
    let initial_stock = world.resources.total();

    for _ in 0..30 {
        world.step();
    }

    let stats = world.tribe_stats().remove(0);
    assert!(stats.total_collected > 0, "nothing was ever delivered");
    // No spawns at this threshold, so stored stock equals deliveries.
    assert_eq!(stats.resources_stored, stats.total_collected);

    let in_transit: u64 = world
        .ant_snapshot()
        .iter()
        .map(|a| u64::from(a.carrying))
        .sum();
    assert_eq!(
        stats.total_collected + in_transit + world.resources.total(),
        initial_stock
    );
}

#[test]
fn barren_world_never_feeds_anyone() {
    let config = SimConfig {
        tribe_homes: vec![(8, 8)],
        initial_ants_per_tribe: 10,
        resource_sites: 0,
        initial_tribe_resources: 0,
        seed: 5,
        ..SimConfig::default()
    };
    let mut world = World::new(config);
    for _ in 0..80 {
        world.step();
        assert!(world.ant_snapshot().iter().all(|a| a.carrying == 0));
    }
    assert_eq!(world.population(), 10);
    let stats = world.tribe_stats().remove(0);
    assert_eq!(stats.resources_stored, 0);
    assert_eq!(stats.total_collected, 0);
    assert_eq!(world.resources.total(), 0);
}

#[test]
fn adjacent_enemies_trade_blows_and_mark_war_trails() {
    let config = SimConfig {
        width: 8,
        height: 8,
        tribe_homes: vec![(3, 3), (4, 4)],
        initial_ants_per_tribe: 1,
        initial_health: 25,
        combat_damage: 10,
        resource_sites: 0,
        seed: 0,
        ..SimConfig::default()
    };
    let mut world = World::new(config);
    world.step();

    let ants = world.ant_snapshot();
    assert_eq!(ants.len(), 2);
    for ant in &ants {
        assert_eq!(ant.state, AntState::Fighting);
        assert_eq!(ant.health, 15);
    }
    // Each side laid war pheromone on its own cell, on its own map.
    let war0 = world.pheromone_snapshot(TribeId(0), PheromoneKind::War);
    let war1 = world.pheromone_snapshot(TribeId(1), PheromoneKind::War);
    assert!(war0.at(3, 3) > 0.4);
    assert!(war1.at(4, 4) > 0.4);
}

#[test]
fn mutual_lethal_exchange_kills_both() {
    let config = SimConfig {
        width: 8,
        height: 8,
        tribe_homes: vec![(3, 3), (4, 4)],
        initial_ants_per_tribe: 1,
        initial_health: 10,
        combat_damage: 10,
        resource_sites: 0,
        seed: 0,
        ..SimConfig::default()
    };
    let mut world = World::new(config);
    world.step();
    assert_eq!(world.population(), 0);
    assert_eq!(world.deaths_last_tick(), 2);
    assert!(world.tribe_stats().iter().all(|t| t.population == 0));
}

#[test]
fn spawning_drains_stored_resources_one_ant_per_tick() {
    let config = SimConfig {
        tribe_homes: vec![(8, 8)],
        initial_ants_per_tribe: 2,
        initial_tribe_resources: 100,
        spawn_threshold: 40,
        spawn_cost: 30,
        resource_sites: 0,
        seed: 1,
        ..SimConfig::default()
    };
    let mut world = World::new(config);
    // 100 -> 70 -> 40 -> 10: exactly three spawns, one per tick.
    let expected = [3, 4, 5, 5, 5];
    for &pop in &expected {
        world.step();
        assert_eq!(world.population(), pop);
    }
    assert_eq!(world.tribe_stats()[0].resources_stored, 10);
}

#[test]
fn experiment_samples_on_cadence_and_at_the_end() {
    let mut world = World::new(small_config(9));
    let summary = world.run_experiment(10, 3);
    assert_eq!(summary.schema_version, RunSummary::SCHEMA_VERSION);
    let ticks: Vec<u64> = summary.samples.iter().map(|s| s.tick).collect();
    assert_eq!(ticks, vec![3, 6, 9, 10]);
    assert_eq!(summary.final_population, world.population());
}

#[test]
fn experiment_guards_reject_bad_parameters() {
    let mut world = World::new(small_config(9));
    assert_eq!(
        world.try_run_experiment(5, 0),
        Err(ExperimentError::InvalidSampleEvery)
    );
    assert!(matches!(
        world.try_run_experiment(World::MAX_EXPERIMENT_STEPS + 1, 1),
        Err(ExperimentError::TooManySteps { .. })
    ));
    assert!(matches!(
        world.try_run_experiment(World::MAX_EXPERIMENT_STEPS, 1),
        Err(ExperimentError::TooManySamples { .. })
    ));
    // The guards fire before any stepping happens.
    assert_eq!(world.tick(), 0);
}

#[test]
fn run_summary_survives_json() {
    let mut world = World::new(small_config(13));
    let summary = world.run_experiment(6, 2);
    let json = serde_json::to_string(&summary).unwrap();
    let back: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}
