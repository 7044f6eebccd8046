// ABOUTME: Runtime configuration loaded from environment variables
// ABOUTME: Shared by the API server, the client services and the CLI

pub mod constants;

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use constants::*;

pub const DEFAULT_API_PORT: u16 = 3001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_METRICS_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_METRICS_INITIAL_DELAY_MS: u64 = 1000;
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid number for {name}: {source}")]
    InvalidNumber {
        name: &'static str,
        #[source]
        source: ParseIntError,
    },
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("Invalid status failure policy: {0} (expected up, down or unknown)")]
    InvalidFailurePolicy(String),
}

/// State reported by a status check whose request itself failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    Up,
    #[default]
    Down,
    Unknown,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(FailurePolicy::Up),
            "down" => Ok(FailurePolicy::Down),
            "unknown" => Ok(FailurePolicy::Unknown),
            _ => Err(ConfigError::InvalidFailurePolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub api_port: u16,
    pub configs_dir: PathBuf,
    pub details_dir: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
    pub metrics_interval: Duration,
    pub metrics_initial_delay: Duration,
    pub status_failure_policy: FailurePolicy,
    pub http_request_timeout: Duration,
    pub cors_origin: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: format!("http://localhost:{}", DEFAULT_API_PORT),
            api_port: DEFAULT_API_PORT,
            configs_dir: PathBuf::from("configs"),
            details_dir: PathBuf::from("details"),
            data_dir: None,
            log_level: "info".to_string(),
            metrics_interval: Duration::from_secs(DEFAULT_METRICS_INTERVAL_SECS),
            metrics_initial_delay: Duration::from_millis(DEFAULT_METRICS_INITIAL_DELAY_MS),
            status_failure_policy: FailurePolicy::default(),
            http_request_timeout: Duration::from_secs(DEFAULT_HTTP_REQUEST_TIMEOUT_SECS),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}

fn parse_u64(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|source| ConfigError::InvalidNumber { name, source })
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source; unset or empty
    /// variables keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = AppConfig::default();

        if let Some(port) = var(DIAGRAM_API_PORT).or_else(|| var(PORT)) {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidNumber {
                    name: DIAGRAM_API_PORT,
                    source,
                })?;
            if port == 0 {
                return Err(ConfigError::PortOutOfRange(port));
            }
            config.api_port = port;
            config.api_url = format!("http://localhost:{}", port);
        }

        if let Some(url) = var(DIAGRAM_API_URL) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = var(DIAGRAM_CONFIGS_DIR) {
            config.configs_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var(DIAGRAM_DETAILS_DIR) {
            config.details_dir = PathBuf::from(dir);
        }
        config.data_dir = var(DIAGRAM_DATA_DIR).map(PathBuf::from);

        if let Some(level) = var(DIAGRAM_LOG_LEVEL) {
            config.log_level = level;
        }

        if let Some(secs) = var(DIAGRAM_METRICS_INTERVAL_SECS) {
            let secs = parse_u64(DIAGRAM_METRICS_INTERVAL_SECS, &secs)?;
            if secs == 0 {
                return Err(ConfigError::ZeroDuration(DIAGRAM_METRICS_INTERVAL_SECS));
            }
            config.metrics_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = var(DIAGRAM_METRICS_INITIAL_DELAY_MS) {
            config.metrics_initial_delay =
                Duration::from_millis(parse_u64(DIAGRAM_METRICS_INITIAL_DELAY_MS, &ms)?);
        }
        if let Some(policy) = var(DIAGRAM_STATUS_FAILURE_POLICY) {
            config.status_failure_policy = policy.parse()?;
        }
        if let Some(secs) = var(DIAGRAM_HTTP_REQUEST_TIMEOUT_SECS) {
            let secs = parse_u64(DIAGRAM_HTTP_REQUEST_TIMEOUT_SECS, &secs)?;
            if secs == 0 {
                return Err(ConfigError::ZeroDuration(DIAGRAM_HTTP_REQUEST_TIMEOUT_SECS));
            }
            config.http_request_timeout = Duration::from_secs(secs);
        }

        if let Some(origin) = var(DIAGRAM_CORS_ORIGIN).or_else(|| var(CORS_ORIGIN)) {
            config.cors_origin = origin;
        }

        debug!(
            "Loaded configuration: api_url={}, port={}, configs_dir={}",
            config.api_url,
            config.api_port,
            config.configs_dir.display()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.api_url, "http://localhost:3001");
        assert_eq!(config.metrics_interval, Duration::from_secs(30));
        assert_eq!(config.metrics_initial_delay, Duration::from_millis(1000));
        assert_eq!(config.status_failure_policy, FailurePolicy::Down);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (DIAGRAM_API_PORT, "8080"),
            (DIAGRAM_API_URL, "http://diagrams.internal/"),
            (DIAGRAM_STATUS_FAILURE_POLICY, "UP"),
            (DIAGRAM_METRICS_INTERVAL_SECS, "5"),
            (CORS_ORIGIN, "http://legacy"),
        ]))
        .unwrap();

        assert_eq!(config.api_port, 8080);
        assert_eq!(config.api_url, "http://diagrams.internal");
        assert_eq!(config.status_failure_policy, FailurePolicy::Up);
        assert_eq!(config.metrics_interval, Duration::from_secs(5));
        assert_eq!(config.cors_origin, "http://legacy");
    }

    #[test]
    fn test_port_sets_default_api_url() {
        let config = AppConfig::from_lookup(lookup(&[(PORT, "4100")])).unwrap();
        assert_eq!(config.api_url, "http://localhost:4100");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(DIAGRAM_API_PORT, "0")])),
            Err(ConfigError::PortOutOfRange(0))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(DIAGRAM_API_PORT, "abc")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(DIAGRAM_METRICS_INTERVAL_SECS, "0")])),
            Err(ConfigError::ZeroDuration(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(DIAGRAM_STATUS_FAILURE_POLICY, "sideways")])),
            Err(ConfigError::InvalidFailurePolicy(_))
        ));
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = AppConfig::from_lookup(lookup(&[(DIAGRAM_API_PORT, "  ")])).unwrap();
        assert_eq!(config.api_port, DEFAULT_API_PORT);
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        env::set_var(DIAGRAM_CONFIGS_DIR, "/srv/diagrams");
        let config = AppConfig::from_env();
        env::remove_var(DIAGRAM_CONFIGS_DIR);

        assert_eq!(config.unwrap().configs_dir, PathBuf::from("/srv/diagrams"));
    }
}
