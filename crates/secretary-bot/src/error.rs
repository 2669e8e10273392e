use crate::config::{ConfigError, SettingsError};
use crate::simulator::ScenarioError;
use crate::telemetry::TelemetryError;
use crate::workflows::secretary::{AuditError, CycleError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Settings(SettingsError),
    Telemetry(TelemetryError),
    Audit(AuditError),
    Scenario(ScenarioError),
    Io(std::io::Error),
    Cycle(CycleError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Settings(err) => write!(f, "settings error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Audit(err) => write!(f, "audit log error: {}", err),
            AppError::Scenario(err) => write!(f, "scenario error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Cycle(err) => write!(f, "secretary cycle failed: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Settings(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Audit(err) => Some(err),
            AppError::Scenario(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Cycle(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<SettingsError> for AppError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<AuditError> for AppError {
    fn from(value: AuditError) -> Self {
        Self::Audit(value)
    }
}

impl From<ScenarioError> for AppError {
    fn from(value: ScenarioError) -> Self {
        Self::Scenario(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CycleError> for AppError {
    fn from(value: CycleError) -> Self {
        Self::Cycle(value)
    }
}
