use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Targets that follow the configured level. Dependencies stay at `warn`.
const ROUTINE_TARGETS: [&str; 2] = ["secretary_bot", "secretary_runner"];

/// Install the process-wide subscriber. `RUST_LOG` wins over the configured level.
///
/// Thread names are kept so routine events from the blocking worker stand apart from the
/// HTTP handlers.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_names(true)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn build_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(scoped_directives(level)).map_err(|source| TelemetryError::EnvFilter {
        value: level.to_string(),
        source,
    })
}

/// A bare level such as `debug` applies to the routine crates only; full directive
/// strings pass through untouched.
fn scoped_directives(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }
    ROUTINE_TARGETS
        .iter()
        .fold(String::from("warn"), |directives, target| {
            format!("{directives},{target}={level}")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_the_routine_crates() {
        assert_eq!(
            scoped_directives(" debug "),
            "warn,secretary_bot=debug,secretary_runner=debug"
        );
        assert!(build_filter("trace").is_ok());
    }

    #[test]
    fn directive_strings_pass_through() {
        assert_eq!(scoped_directives("info,axum=debug"), "info,axum=debug");
    }

    #[test]
    fn accepts_directive_filters() {
        assert!(build_filter("info,secretary_bot=debug").is_ok());
    }

    #[test]
    fn reports_the_rejected_filter() {
        match build_filter("secretary_bot=loud") {
            Err(TelemetryError::EnvFilter { value, .. }) => assert_eq!(value, "secretary_bot=loud"),
            other => panic!("expected filter error, got {other:?}"),
        }
        match build_filter("loud") {
            Err(TelemetryError::EnvFilter { value, .. }) => assert_eq!(value, "loud"),
            other => panic!("expected filter error, got {other:?}"),
        }
    }
}
