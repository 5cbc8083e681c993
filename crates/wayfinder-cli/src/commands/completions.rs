//! Shell completions command

use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::{generate, generate_to, Shell};

use crate::{Cli, BIN_NAME};

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script into this directory instead of stdout
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

pub fn run(args: &CompletionsArgs) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    match &args.dir {
        Some(dir) => {
            let path = generate_to(args.shell, &mut cmd, BIN_NAME, dir)?;
            println!("Wrote {}", path.display());
        }
        None => generate(args.shell, &mut cmd, BIN_NAME, &mut io::stdout()),
    }
    Ok(())
}
