// server/src/cli/handlers.rs

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use hospital_lib::config::{load_hospital_config, HospitalConfig};
use hospital_lib::Hospital;
use hospital_rest_api::start_server;

use super::commands::ServeArgs;
use super::logging::init_tracing;

/// Applies command-line overrides on top of the loaded configuration.
pub fn resolve_serve_config(args: &ServeArgs) -> Result<HospitalConfig> {
    let mut config = load_hospital_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    Ok(config)
}

pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    let config = resolve_serve_config(&args)?;
    init_tracing(&config.logging)?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        engine = %config.storage.engine,
        "starting hospital server"
    );

    let hospital = Arc::new(Hospital::open(&config).context("Failed to initialise storage")?);
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl-C, shutting down"),
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    };
    start_server(&config.server, hospital, shutdown).await
}

pub fn handle_check_config(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = load_hospital_config(config_path)?;
    let rendered = serde_json::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospital_lib::StorageEngineType;
    use std::io::Write;

    #[test]
    fn flags_override_the_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "server:\n  host: 10.0.0.1\n  port: 7000\nstorage:\n  engine: sled").unwrap();

        let config = resolve_serve_config(&ServeArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(7100),
            host: None,
        })
        .unwrap();
        assert_eq!(config.server.port, 7100);
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.storage.engine, StorageEngineType::Sled);
    }
}
