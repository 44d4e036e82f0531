use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "config/hospital.yaml";
pub const ENV_PREFIX: &str = "HOSPITAL";
pub const DEFAULT_DATA_DIRECTORY: &str = "/tmp/hospital_data";
pub const DEFAULT_REST_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_REST_API_PORT: u16 = 8082;

pub fn default_host() -> String {
    DEFAULT_REST_API_HOST.to_string()
}
pub fn default_port() -> u16 { DEFAULT_REST_API_PORT }
pub fn default_cors_origins() -> Vec<String> { vec!["*".to_string()] }
pub fn default_data_directory() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIRECTORY)
}
pub fn default_cache_capacity() -> u64 { 10_000 }
pub fn default_cache_ttl_secs() -> u64 { 600 }
pub fn default_log_level() -> String { "info".to_string() }
