use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use secretary_bot::config::SecretarySettings;
use secretary_bot::device::{Alarm, Clock, Operator};
use secretary_bot::error::AppError;
use secretary_bot::simulator::{Scenario, SimulatedGame};
use secretary_bot::workflows::secretary::{AuditSink, CsvAuditSink, MemoryAuditSink, Session};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Rings the terminal bell.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TerminalAlarm;

impl Alarm for TerminalAlarm {
    fn play_beep(&self) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

/// Blocks on a line from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StdinOperator;

impl Operator for StdinOperator {
    fn acknowledge(&self, prompt: &str) {
        println!("{prompt}");
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }
}

pub(crate) fn load_settings(path: Option<&Path>) -> Result<SecretarySettings, AppError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading secretary settings");
            Ok(SecretarySettings::from_path(path)?)
        }
        None => Ok(crate::demo::demo_settings()),
    }
}

pub(crate) fn load_scenario(path: Option<&Path>) -> Result<Scenario, AppError> {
    match path {
        Some(path) => Ok(Scenario::from_path(path)?),
        None => Ok(Scenario::demo()),
    }
}

/// Session over a simulated game with the audit sink and review hooks the settings ask for.
pub(crate) fn simulated_session(
    device_id: &str,
    scenario: Scenario,
    settings: SecretarySettings,
    clock: Arc<dyn Clock>,
) -> (Arc<SimulatedGame>, Session) {
    let game = Arc::new(SimulatedGame::new(device_id, scenario));
    let audit: Arc<dyn AuditSink> = match &settings.audit_log {
        Some(path) => Arc::new(CsvAuditSink::new(path)),
        None => Arc::new(MemoryAuditSink::default()),
    };
    let manual_deny = settings.manual_deny;

    let mut session = Session::new(game.clone(), game.clone(), settings)
        .with_clock(clock)
        .with_audit(audit);
    if manual_deny {
        session = session.with_manual_review(Arc::new(TerminalAlarm), Arc::new(StdinOperator));
    }
    (game, session)
}
