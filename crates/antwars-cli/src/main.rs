//! Command-line driver for the ant warfare engine: load a config, run a
//! seeded experiment, and emit the sampled metrics as JSON.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use antwars_core::world::World;
use antwars_core::SimConfig;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "antwars")]
#[command(author, version, about = "Deterministic ant warfare simulation runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an experiment and report sampled metrics
    Run {
        /// JSON config file; defaults apply for absent fields
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "1000")]
        steps: usize,

        /// Sample metrics every N ticks
        #[arg(long, default_value = "50")]
        sample_every: usize,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the full run summary as JSON to this file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the per-tribe scoreboard after the run
        #[arg(long)]
        stats: bool,
    },

    /// Print the default config as JSON, as a template to edit
    PrintConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            steps,
            sample_every,
            seed,
            out,
            stats,
        } => run(config, steps, sample_every, seed, out, stats),
        Commands::PrintConfig => {
            let json = serde_json::to_string_pretty(&SimConfig::default())?;
            println!("{json}");
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(SimConfig::default()),
    }
}

fn run(
    config: Option<PathBuf>,
    steps: usize,
    sample_every: usize,
    seed: Option<u64>,
    out: Option<PathBuf>,
    stats: bool,
) -> Result<()> {
    let mut config = load_config(config.as_ref())?;
    if let Some(seed) = seed {
        config.seed = seed;
    }

    let mut world = World::try_new(config.clone()).context("building world")?;
    println!(
        "{}x{} grid, {} tribes, {} ants, seed {}",
        config.width,
        config.height,
        world.num_tribes(),
        world.population(),
        config.seed
    );

    let start = Instant::now();
    let summary = world
        .try_run_experiment(steps, sample_every)
        .context("running experiment")?;
    let elapsed = start.elapsed();
    println!(
        "{} ticks in {:?} ({:?}/tick), {} samples",
        summary.steps,
        elapsed,
        elapsed / summary.steps.max(1) as u32,
        summary.samples.len()
    );
    println!(
        "final population {} (+{} born, -{} died)",
        summary.final_population, summary.total_births, summary.total_deaths
    );

    if stats {
        println!("tribe  population  stored  collected");
        for t in world.tribe_stats() {
            println!(
                "{:>5}  {:>10}  {:>6}  {:>9}",
                t.tribe, t.population, t.resources_stored, t.total_collected
            );
        }
    }

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("summary written to {}", path.display());
    }
    Ok(())
}
