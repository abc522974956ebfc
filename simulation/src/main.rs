//! distvec - Distance-Vector Routing on a Ring
//!
//! Runs RIP-style routing nodes on a ring, either in lock-step rounds or as
//! concurrent tokio tasks, and routes payloads across the converged ring.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use distvec_simulation::{
    AsyncConfig, ConvergenceCheck, NodeId, Ring, SimConfig, scenarios,
};

#[derive(Parser)]
#[command(
    name = "distvec",
    about = "Distance-vector routing simulation on a ring",
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
    /// Converge a ring and print every routing table
    Converge {
        /// Number of nodes in the ring
        #[arg(short, long, default_value = "5")]
        nodes: usize,

        /// Run every node as its own tokio task
        #[arg(long = "async")]
        run_async: bool,

        /// Only bound the first table entry when checking completeness
        #[arg(long)]
        first_entry: bool,

        /// Randomize the scheduling order of each round
        #[arg(long)]
        shuffle: bool,

        /// Seed for the scheduling order
        #[arg(long)]
        seed: Option<u64>,

        /// Give up after this many rounds
        #[arg(long, default_value = "1000")]
        max_rounds: u64,

        /// Give up an asynchronous run after this many seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Converge a ring, then route one payload across it
    Route {
        /// Number of nodes in the ring
        #[arg(short, long, default_value = "5")]
        nodes: usize,

        /// Originating node
        #[arg(short, long, default_value = "0")]
        from: u32,

        /// Destination node
        #[arg(short, long, default_value = "3")]
        to: u32,

        /// Payload text
        #[arg(short, long, default_value = "X")]
        payload: String,
    },

    /// Converge a ring, then route random payloads across it
    Traffic {
        /// Number of nodes in the ring
        #[arg(short, long, default_value = "8")]
        nodes: usize,

        /// Number of payloads to route
        #[arg(short, long, default_value = "20")]
        messages: usize,

        /// Seed for picking endpoints
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the 4-ring table scenario
    ScenarioA,

    /// Run the 5-ring routed message scenario
    ScenarioB,

    /// Run the identical-table merge scenario
    ScenarioC,

    /// Visualize a ring
    Topology {
        /// Number of nodes in the ring
        #[arg(short, long, default_value = "6")]
        nodes: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Converge {
            nodes,
            run_async,
            first_entry,
            shuffle,
            seed,
            max_rounds,
            timeout,
        } => {
            let convergence = if first_entry {
                ConvergenceCheck::FirstEntry
            } else {
                ConvergenceCheck::AllEntries
            };

            if run_async {
                let config = AsyncConfig {
                    timeout: Duration::from_secs(timeout),
                    convergence,
                };
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()?;
                runtime.block_on(scenarios::run_async_convergence_scenario(nodes, config))?;
            } else {
                let config = SimConfig {
                    max_rounds,
                    convergence,
                    shuffle,
                    seed,
                    ..Default::default()
                };
                scenarios::run_convergence_scenario(nodes, config)?;
            }
        }
        Commands::Route {
            nodes,
            from,
            to,
            payload,
        } => {
            scenarios::run_route_scenario(nodes, NodeId(from), NodeId(to), &payload)?;
        }
        Commands::Traffic {
            nodes,
            messages,
            seed,
        } => {
            scenarios::run_traffic_scenario(nodes, messages, seed)?;
        }
        Commands::ScenarioA => {
            scenarios::run_scenario_a()?;
        }
        Commands::ScenarioB => {
            scenarios::run_scenario_b()?;
        }
        Commands::ScenarioC => {
            scenarios::run_scenario_c()?;
        }
        Commands::Topology { nodes } => {
            println!("{}", Ring::new(nodes).visualize());
        }
    }

    Ok(())
}
