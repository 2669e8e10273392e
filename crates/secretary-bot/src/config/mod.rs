mod settings;

pub use settings::{
    AdmissionMode, ApplicantOffset, AutoRemoveSettings, FractionalPoint, SecretarySettings,
    SettingsError, Timings, UiElements, WhitelistSettings,
};

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

/// Top-level process configuration sourced from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub routine: RoutineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("SECRETARY_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("SECRETARY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("SECRETARY_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("SECRETARY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let device_id =
            env::var("SECRETARY_DEVICE_ID").unwrap_or_else(|_| "emulator-5554".to_string());
        let settings_path = env::var("SECRETARY_SETTINGS").ok().map(PathBuf::from);
        let interval_secs = env::var("SECRETARY_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidInterval)?;
        if interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            routine: RoutineConfig {
                device_id,
                settings_path,
                interval_secs,
            },
        })
    }
}

const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Settings controlling the status server binding.
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

/// Which device to drive, how often, and where the game settings live.
#[derive(Debug, Clone)]
pub struct RoutineConfig {
    pub device_id: String,
    pub settings_path: Option<PathBuf>,
    pub interval_secs: u64,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidInterval,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "SECRETARY_PORT must be a valid u16"),
            ConfigError::InvalidInterval => {
                write!(f, "SECRETARY_INTERVAL_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "SECRETARY_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidInterval => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
