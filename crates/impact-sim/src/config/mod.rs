use crate::simulation::ModelStrictness;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            simulation: SimulationConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Model defaults and catalog sources.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub strictness: ModelStrictness,
    /// Optional CSV of regions layered over the builtin catalog.
    pub region_catalog: Option<PathBuf>,
    /// Maximum number of cached results kept by the service; 0 disables caching.
    pub cache_capacity: usize,
}

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            strictness: ModelStrictness::Standard,
            region_catalog: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl SimulationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let strictness = match env::var("SIM_STRICTNESS") {
            Ok(value) => ModelStrictness::parse(&value)
                .ok_or(ConfigError::InvalidStrictness { value })?,
            Err(_) => ModelStrictness::Standard,
        };

        let region_catalog = env::var("SIM_REGION_CATALOG")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let cache_capacity = match env::var("SIM_CACHE_CAPACITY") {
            Ok(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidCacheCapacity { value })?,
            Err(_) => DEFAULT_CACHE_CAPACITY,
        };

        Ok(Self {
            strictness,
            region_catalog,
            cache_capacity,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStrictness { value: String },
    InvalidCacheCapacity { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStrictness { value } => write!(
                f,
                "SIM_STRICTNESS must be conservative, standard, or aggressive (got '{}')",
                value
            ),
            ConfigError::InvalidCacheCapacity { value } => write!(
                f,
                "SIM_CACHE_CAPACITY must be a non-negative integer (got '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidStrictness { .. }
            | ConfigError::InvalidCacheCapacity { .. } => None,
        }
    }
}

/// Serializes tests that read or write process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("SIM_STRICTNESS");
        env::remove_var("SIM_REGION_CATALOG");
        env::remove_var("SIM_CACHE_CAPACITY");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn reads_simulation_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SIM_STRICTNESS", "Aggressive");
        env::set_var("SIM_REGION_CATALOG", "data/regions.csv");
        env::set_var("SIM_CACHE_CAPACITY", "0");

        let config = AppConfig::load().expect("config loads");

        assert_eq!(config.simulation.strictness, ModelStrictness::Aggressive);
        assert_eq!(
            config.simulation.region_catalog,
            Some(PathBuf::from("data/regions.csv"))
        );
        assert_eq!(config.simulation.cache_capacity, 0);
        reset_env();
    }

    #[test]
    fn rejects_unknown_strictness() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SIM_STRICTNESS", "reckless");

        let err = AppConfig::load().expect_err("strictness rejected");

        assert!(matches!(err, ConfigError::InvalidStrictness { ref value } if value == "reckless"));
        reset_env();
    }

    #[test]
    fn rejects_negative_cache_capacity() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SIM_CACHE_CAPACITY", "-4");

        let err = AppConfig::load().expect_err("capacity rejected");

        assert!(matches!(err, ConfigError::InvalidCacheCapacity { .. }));
        reset_env();
    }
}
