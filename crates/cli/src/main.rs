//! pickexec: pick execution from the command line.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration**: load `pickexec.toml` (optional) and validate it.
//! 2. **Wire observability**: install the `tracing-subscriber` stack and, if
//!    configured, the OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: an in-memory session store and a channel
//!    event publisher, injected into `PickSessionService`.
//! 4. **Run a command** against an upstream task event read from disk:
//!    - `plan` prints the optimized route and its savings.
//!    - `simulate` drives a session to completion and prints every published
//!      CloudEvents envelope as a JSON line.

mod commands;
mod config;
mod telemetry;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "pickexec", version, about = "Warehouse pick execution")]
struct Cli {
    /// Configuration file.
    #[arg(long, global = true, env = "PICKEXEC_CONFIG", default_value = "pickexec.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the optimized pick path for a task event.
    Plan {
        /// JSON file holding one TaskCreatedEvent.
        task_event: PathBuf,
    },
    /// Create a session from a task event and confirm every pick in route order.
    Simulate {
        /// JSON file holding one TaskCreatedEvent.
        task_event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(&cli.config)?;
    let telemetry = telemetry::init(config.log_format, config.otlp_endpoint.as_deref())?;

    let result = match cli.command {
        Command::Plan { task_event } => commands::plan(&config, &task_event),
        Command::Simulate { task_event } => commands::simulate(&config, &task_event).await,
    };

    telemetry.shutdown();
    result
}
