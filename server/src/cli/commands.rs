// server/src/cli/commands.rs

// Command-line arguments and subcommands for the hospital server, using
// the `clap` derive API.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hospital-server")]
#[command(version = "0.1.0")]
#[command(about = "Hospital management backend")]
#[command(args_conflicts_with_subcommands = true)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<HospitalCommands>,
    // Serve options used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum HospitalCommands {
    /// Run the REST API (the default when no subcommand is given)
    Serve(ServeArgs),
    /// Load and validate the configuration, then print it
    CheckConfig {
        #[arg(long, short = 'c', env = "HOSPITAL_CONFIG", value_hint = clap::ValueHint::FilePath)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Args, PartialEq)]
pub struct ServeArgs {
    #[arg(long, short = 'c', env = "HOSPITAL_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Overrides `server.port`
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
    /// Overrides `server.host`
    #[arg(long)]
    pub host: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn serve_accepts_overrides() {
        let args = CliArgs::try_parse_from(["hospital-server", "serve", "--port", "9000", "--host", "0.0.0.0"]).unwrap();
        assert_eq!(
            args.command,
            Some(HospitalCommands::Serve(ServeArgs {
                config: None,
                port: Some(9000),
                host: Some("0.0.0.0".to_string()),
            }))
        );
    }

    #[test]
    fn bare_invocation_parses_serve_options() {
        let args = CliArgs::try_parse_from(["hospital-server", "--port", "9100"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.serve.port, Some(9100));

        let command = CliArgs::command();
        let config = command.get_arguments().find(|arg| arg.get_id() == "config").unwrap();
        assert_eq!(config.get_env(), Some(std::ffi::OsStr::new("HOSPITAL_CONFIG")));
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(CliArgs::try_parse_from(["hospital-server", "serve", "--port", "http"]).is_err());
    }
}
