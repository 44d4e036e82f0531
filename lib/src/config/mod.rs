// lib/src/config/mod.rs
// Layered configuration: built-in defaults, then the YAML file, then
// `HOSPITAL__SECTION__KEY` environment variables.

pub mod config_defaults;
pub mod config_structs;

pub use config_defaults::*;
pub use config_structs::*;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use std::path::Path;
use tracing::debug;

/// Loads the configuration. With no explicit path the default file is
/// optional; an explicit path must exist.
pub fn load_hospital_config(config_file_path: Option<&Path>) -> Result<HospitalConfig> {
    let file_source = match config_file_path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = Config::builder()
        .add_source(file_source)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .try_parsing(true),
        )
        .build()
        .with_context(|| match config_file_path {
            Some(path) => format!("Failed to read config file {}", path.display()),
            None => format!("Failed to read config file {}", DEFAULT_CONFIG_FILE),
        })?;

    let config: HospitalConfig = settings
        .try_deserialize()
        .context("Failed to parse hospital configuration")?;
    debug!(?config, "loaded hospital configuration");
    Ok(config)
}
