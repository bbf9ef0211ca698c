//! GroupsNet - Contact Simulation
//!
//! Runs scenario files against the static-route forwarding policy and checks
//! route files.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use groupsnet_routing::RouteTable;
use groupsnet_simulation::{ScenarioConfig, Simulation};

#[derive(Parser)]
#[command(
    name = "groupsnet",
    about = "Contact simulation with static-route forwarding",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file
    Run {
        /// Path to the scenario TOML file
        scenario: PathBuf,

        /// Number of ticks to run instead of the scenario duration
        #[arg(short, long)]
        ticks: Option<u64>,
    },

    /// Load a route file and print its routes
    Routes {
        /// Path to the route file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { scenario, ticks } => run_scenario(scenario, ticks),
        Commands::Routes { file } => print_routes(file),
    }
}

fn run_scenario(path: PathBuf, ticks: Option<u64>) -> anyhow::Result<()> {
    let config = match ScenarioConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            error!(scenario = %path.display(), error = %e, "Invalid scenario");
            return Err(e.into());
        }
    };
    let mut sim = match Simulation::from_config(&config) {
        Ok(sim) => sim,
        Err(e) => {
            error!(scenario = %path.display(), error = %e, "Cannot start simulation");
            return Err(e.into());
        }
    };

    match ticks {
        Some(ticks) => sim.run_ticks(ticks)?,
        None => sim.run()?,
    }

    println!("\n=== Transfer log ===");
    for record in sim.log() {
        println!("{record}");
    }

    let delivered = sim.deliveries().count();
    println!(
        "\n{} of {} messages delivered by tick {}",
        delivered,
        config.messages.len(),
        sim.tick()
    );
    Ok(())
}

fn print_routes(path: PathBuf) -> anyhow::Result<()> {
    let table = match RouteTable::load(&path) {
        Ok(table) => table,
        Err(e) => {
            error!(error = %e, "Invalid route file");
            return Err(e.into());
        }
    };

    println!("{} routes in {}", table.len(), path.display());
    for origin in table.origins() {
        if let Some(route) = table.lookup(origin) {
            println!("  {origin}: {route}");
        }
    }
    Ok(())
}
