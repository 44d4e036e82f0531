// server/src/main.rs

// Entry point for the hospital backend server. Parses the command line and
// dispatches to the CLI logic.

use anyhow::Result;
use hospital_server::cli::start_cli;

#[tokio::main]
async fn main() -> Result<()> {
    start_cli().await
}
