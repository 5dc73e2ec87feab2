//! Config inspection command

use clap::{Args, Subcommand};
use pollbridge_server::ServerConfig;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as JSON
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show(show_args) => execute_show(show_args),
    }
}

fn execute_show(args: ShowArgs) -> anyhow::Result<()> {
    let config = ServerConfig::load(args.config.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
