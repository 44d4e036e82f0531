// server/src/cli/mod.rs

pub mod cli;
pub mod commands;
pub mod handlers;
pub mod logging;

pub use cli::start_cli;
pub use commands::{CliArgs, HospitalCommands, ServeArgs};
pub use handlers::{handle_check_config, handle_serve};
pub use logging::init_tracing;
