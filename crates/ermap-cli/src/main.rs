mod distances;
mod plan;
mod warehouses;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ermap")]
#[command(about = "Emergency resource dispatch planning over a map oracle")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the warehouse inventory, optionally rated against a crew size
    Warehouses {
        /// Responders to rate protective gear against
        #[arg(long)]
        personnel: Option<u32>,
    },
    /// Resolve driving distances from a place to every warehouse
    Distances {
        /// Place name or `longitude,latitude`
        #[arg(long)]
        from: String,
        /// Total attempts per warehouse (overrides `ERMAP_ORACLE_MAX_RETRIES`)
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Recompute the inter-warehouse distance table and save the dataset
    Matrix {
        /// Where to write the updated dataset (defaults to the input file)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Draft a dispatch plan for an incident
    Plan {
        /// Incident location, name or `longitude,latitude`
        #[arg(long)]
        incident: String,
        /// Where the crew departs from
        #[arg(long)]
        departure: String,
        #[arg(long)]
        personnel: u32,
        #[arg(long)]
        vehicles: u32,
        /// Free-text description of the fire
        #[arg(long)]
        description: String,
        /// Also write the plan to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ermap_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Warehouses { personnel }) => {
            warehouses::run_warehouses(&config, personnel)?;
        }
        Some(Commands::Distances { from, max_retries }) => {
            distances::run_distances(&config, &from, max_retries).await?;
        }
        Some(Commands::Matrix { output }) => {
            distances::run_matrix(&config, output.as_deref()).await?;
        }
        Some(Commands::Plan {
            incident,
            departure,
            personnel,
            vehicles,
            description,
            output,
        }) => {
            let incident = plan::IncidentInput {
                incident,
                departure,
                personnel,
                vehicles,
                description,
            };
            plan::run_plan(&config, &incident, output.as_deref()).await?;
        }
        None => println!("ermap ready; run `ermap --help` for commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
