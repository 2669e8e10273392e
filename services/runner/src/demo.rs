use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use secretary_bot::config::{AppConfig, AutoRemoveSettings, SecretarySettings, Timings};
use secretary_bot::error::AppError;
use secretary_bot::simulator::{ManualClock, Scenario, SimulatedGame};
use secretary_bot::telemetry;
use secretary_bot::workflows::secretary::{
    CycleStatus, Position, ScheduledRoutine, SecretaryRoutine, StatusBoard, StatusSnapshot,
};

use crate::infra::{load_scenario, load_settings, simulated_session};

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Scenario JSON for the simulated game (defaults to the built-in demo)
    #[arg(long)]
    pub(crate) scenario: Option<PathBuf>,
    /// Number of routine cycles to run
    #[arg(long, default_value_t = 3)]
    pub(crate) cycles: u64,
    /// Settings JSON (defaults to SECRETARY_SETTINGS, then the demo settings)
    #[arg(long)]
    pub(crate) settings: Option<PathBuf>,
}

/// Whitelist "ABC", evict the military commander after ten minutes, no delays.
pub(crate) fn demo_settings() -> SecretarySettings {
    let mut settings = SecretarySettings {
        timings: Timings::instant(),
        ..SecretarySettings::default()
    };
    settings.whitelist.alliance = ["ABC".to_string()].into_iter().collect();
    settings.auto_remove = Some(AutoRemoveSettings {
        active: true,
        title_cfg: [(Position::Military, 600)].into_iter().collect(),
    });
    settings
}

pub(crate) fn run_simulation(args: SimulateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let settings_path = args.settings.or_else(|| config.routine.settings_path.clone());
    let settings = load_settings(settings_path.as_deref())?;
    let scenario = load_scenario(args.scenario.as_deref())?;
    let interval = Duration::from_secs(config.routine.interval_secs);

    println!(
        "Secretary simulation on {} ({} cycles, every {}s of simulated time)",
        config.routine.device_id, args.cycles, config.routine.interval_secs
    );
    let game = simulate(
        &config.routine.device_id,
        scenario,
        settings,
        interval,
        args.cycles,
        render_cycle,
    );
    render_game(&game);
    Ok(())
}

/// Drive `cycles` scheduled cycles on simulated time, reporting each one to `on_cycle`.
pub(crate) fn simulate(
    device_id: &str,
    scenario: Scenario,
    settings: SecretarySettings,
    interval: Duration,
    cycles: u64,
    mut on_cycle: impl FnMut(u64, &StatusSnapshot),
) -> Arc<SimulatedGame> {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let (game, session) = simulated_session(device_id, scenario, settings, clock);
    let board = Arc::new(StatusBoard::new(device_id));
    let mut scheduled = ScheduledRoutine::new(SecretaryRoutine::new(session), interval, board.clone());

    for cycle in 1..=cycles {
        scheduled.run(Some(1));
        on_cycle(cycle, &board.snapshot());
    }
    game
}

fn render_cycle(cycle: u64, snapshot: &StatusSnapshot) {
    if let Some(error) = &snapshot.last_error {
        println!("\nCycle {cycle}: failed ({error})");
        return;
    }
    let Some(report) = &snapshot.latest_cycle else {
        return;
    };

    let status = match &report.status {
        CycleStatus::Completed => "completed".to_string(),
        CycleStatus::Aborted(reason) => format!("aborted ({reason:?})"),
    };
    println!(
        "\nCycle {cycle} @ {}: {status}",
        report.started_at.format("%H:%M:%S")
    );
    for visit in &report.evictions {
        println!("  evict {:<15} {:?}", visit.position.label(), visit.outcome);
    }
    for visit in &report.admissions {
        println!(
            "  admit {:<15} accepted {} rejected {} ({:?})",
            visit.position.label(),
            visit.accepted(),
            visit.rejected(),
            visit.outcome
        );
    }
    if report.evictions.is_empty() && report.admissions.is_empty() {
        println!("  nothing to do");
    }
}

fn render_game(game: &SimulatedGame) {
    println!("\nAppointed:");
    for (position, applicant) in game.accepted() {
        println!("  - {} [{}] {}", position.label(), applicant.alliance, applicant.name);
    }
    println!("Rejected:");
    for (position, applicant) in game.rejected() {
        println!("  - {} [{}] {}", position.label(), applicant.alliance, applicant.name);
    }
    println!("Dismissed:");
    for (position, appointee) in game.dismissed() {
        println!("  - {} {}", position.label(), appointee);
    }
}
