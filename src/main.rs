mod cli;

use anyhow::Result;
use clap::Parser;
use stagehand::commands::common::find_base;
use stagehand::commands::Workspace;
use stagehand::{config, logging};

use cli::{dispatch, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let base = match cli.command {
        Commands::Init => cwd,
        _ => find_base(&cwd),
    };
    let config = config::load(cli.config.as_deref(), &base)?;
    logging::init(config.log.filter.as_deref());

    let workspace = Workspace::new(base, config);
    dispatch(cli.command, &workspace)
}
