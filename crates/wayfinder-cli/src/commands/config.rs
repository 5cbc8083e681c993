//! `wayfinder config`: inspect and edit the TOML config file
//!
//! Keys are either top-level settings (`world`, `format`, `seed`, `exact`)
//! or planner constants addressed as `planner.<name>`.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config};
use crate::output::{to_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one setting, e.g. `planner.gateway_cone`
    Get { key: String },
    /// Change one setting; planner values are re-validated before saving
    Set { key: String, value: String },
    /// Restore one setting to its default
    Unset { key: String },
    /// Print every setting, planner constants last
    List,
    /// Print where the config file lives
    Path,
    /// Write a config file holding the defaults
    Init {
        /// Record this world snapshot as the default
        #[arg(long)]
        world: Option<PathBuf>,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: &ConfigArgs, cli: &Cli, config: &Config) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => {
            let value = config.get(checked(key)?);
            println!("{}", value.as_deref().unwrap_or("(not set)"));
        }
        ConfigCommands::Set { key, value } => {
            let mut updated = config.clone();
            updated.set(key, value)?;
            updated.save()?;
            tracing::info!("{} changed to {}", key, value);
            println!("{} = {}", key, updated.get(key).unwrap_or_default());
        }
        ConfigCommands::Unset { key } => {
            let mut updated = config.clone();
            updated.unset(checked(key)?)?;
            updated.save()?;
            println!("{} = {}", key, updated.get(key).as_deref().unwrap_or("(not set)"));
        }
        ConfigCommands::List => list(config, cli.output_format(config))?,
        ConfigCommands::Path => println!("{}", config_file_path().display()),
        ConfigCommands::Init { world, force } => init(world.clone(), *force)?,
    }
    Ok(())
}

fn checked(key: &str) -> anyhow::Result<&str> {
    if Config::is_key(key) {
        Ok(key)
    } else {
        anyhow::bail!("Unknown config key: {} (try `wayfinder config list`)", key)
    }
}

fn list(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", to_json(config)?);
        return Ok(());
    }

    println!("# {}", config_file_path().display());
    let (planner, top): (Vec<String>, Vec<String>) =
        Config::keys().into_iter().partition(|k| k.starts_with("planner."));
    for key in top {
        println!("{} = {}", key, config.get(&key).as_deref().unwrap_or("(not set)"));
    }
    println!();
    println!("[planner]");
    for key in planner {
        println!("{} = {}", key, config.get(&key).as_deref().unwrap_or("(not set)"));
    }
    Ok(())
}

fn init(world: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to replace it", path.display());
    }
    let config = Config {
        world,
        ..Config::default()
    };
    config.save()?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
