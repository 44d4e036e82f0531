// server/src/cli/cli.rs

use anyhow::Result;
use clap::Parser;

use super::commands::{CliArgs, HospitalCommands};
use super::handlers::{handle_check_config, handle_serve};

/// CLI entry point. Loads `.env` first so `HOSPITAL__…` variables set there
/// reach the configuration layer.
pub async fn start_cli() -> Result<()> {
    dotenv::dotenv().ok();
    let args = CliArgs::parse();

    match args.command {
        Some(HospitalCommands::Serve(serve)) => handle_serve(serve).await,
        Some(HospitalCommands::CheckConfig { config }) => handle_check_config(config.as_deref()),
        None => handle_serve(args.serve).await,
    }
}
