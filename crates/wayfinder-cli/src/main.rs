//! Wayfinder CLI - plan pedestrian routes over a world snapshot

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{batch, completions, inspect, route};
use config::Config;
use output::OutputFormat;
use wayfinder_core::World;

pub const BIN_NAME: &str = "wayfinder";

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(author, version, about = "Pedestrian route-choice planner")]
pub struct Cli {
    /// World snapshot (JSON); defaults to the configured world
    #[arg(short, long, global = true, env = "WAYFINDER_WORLD")]
    pub world: Option<PathBuf>,

    /// Output format: table, json
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Output format from the flag, else from the config file
    pub fn output_format(&self, config: &Config) -> OutputFormat {
        OutputFormat::from(self.format.as_deref().unwrap_or(&config.format))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan a route for one trip
    Route(route::RouteArgs),
    /// Plan a batch of trips and count edge traffic
    Batch(batch::BatchArgs),
    /// Summarise a world snapshot
    Inspect(inspect::InspectArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context shared by the commands
pub struct AppContext {
    pub config: Config,
}

impl AppContext {
    pub fn new() -> Self {
        Self { config: Config::load() }
    }

    /// Load the world named on the command line or in the config
    pub fn load_world(&self, cli: &Cli) -> anyhow::Result<World> {
        let path = cli
            .world
            .as_ref()
            .or(self.config.world.as_ref())
            .ok_or_else(|| anyhow::anyhow!("No world given: pass --world or set one with `wayfinder config set world <file>`"))?;
        commands::io::load_world(path)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting wayfinder CLI");

    let ctx = AppContext::new();

    match &cli.command {
        Commands::Route(args) => route::run(args, &cli, &ctx)?,
        Commands::Batch(args) => batch::run(args, &cli, &ctx)?,
        Commands::Inspect(args) => inspect::run(args, &cli, &ctx)?,
        Commands::Config(args) => commands::config::run(args, &cli, &ctx.config)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
