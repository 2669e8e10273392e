use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::admission::{AdmissionLoop, AdmissionVisit};
use super::domain::{FatalReason, Position, PositionState, StepOutcome};
use super::eviction::{EvictionScanner, EvictionVisit};
use super::navigator::MenuNavigator;
use super::recovery::RecoveryController;
use super::scanner::ApplicantScanner;
use super::session::Session;
use crate::device::DeviceError;

/// Why the probe concluded the secretary interface is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFailure {
    PositionMissing(Position),
    ListMissing(Position),
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("secretary not accessible: {0:?}")]
    SecretaryUnreachable(ProbeFailure),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "stage")]
pub enum AbortReason {
    CapitolMenuMissing,
    Eviction { position: Position, reason: FatalReason },
    Admission { position: Position, reason: FatalReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Completed,
    Aborted(AbortReason),
}

/// Everything one cycle did, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: CycleStatus,
    pub evictions: Vec<EvictionVisit>,
    pub applicant_positions: Vec<Position>,
    pub admissions: Vec<AdmissionVisit>,
}

impl CycleReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            status: CycleStatus::Completed,
            evictions: Vec::new(),
            applicant_positions: Vec::new(),
            admissions: Vec::new(),
        }
    }

    pub fn accepted(&self) -> usize {
        self.admissions.iter().map(AdmissionVisit::accepted).sum()
    }

    pub fn rejected(&self) -> usize {
        self.admissions.iter().map(AdmissionVisit::rejected).sum()
    }
}

/// Cycle orchestrator owning the cooldown state of one device session.
pub struct SecretaryRoutine {
    session: Session,
    state: PositionState,
}

impl SecretaryRoutine {
    pub fn new(session: Session) -> Self {
        let state = PositionState::new(
            session.clock.now(),
            session.settings.auto_remove.as_ref(),
        );
        Self { session, state }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    /// Evictions for every due position, then admissions for every position with applicants.
    pub fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let mut report = CycleReport::new(self.session.clock.now());
        let status = self.drive(&mut report)?;
        report.status = status;
        report.finished_at = self.session.clock.now();
        Ok(report)
    }

    fn drive(&mut self, report: &mut CycleReport) -> Result<CycleStatus, CycleError> {
        let session = &self.session;
        let state = &mut self.state;

        if !MenuNavigator::new(session).open_secretary_menu()? {
            return Ok(CycleStatus::Aborted(AbortReason::CapitolMenuMissing));
        }

        if session.settings.active_auto_remove().is_some() {
            let eviction = EvictionScanner::new(session);
            let due = match eviction.find_positions_to_remove(state) {
                Ok(positions) => positions,
                Err(err) => {
                    error!(error = %err, "error finding positions to remove");
                    Vec::new()
                }
            };
            if due.is_empty() {
                info!("no auto-remove positions found");
            } else {
                info!(positions = ?due, "auto-remove positions");
            }

            for position in due {
                let visit = eviction.process_remove_position(position, state);
                let outcome = visit.outcome.clone();
                report.evictions.push(visit);
                if let StepOutcome::Fatal(reason) = outcome {
                    return Ok(CycleStatus::Aborted(AbortReason::Eviction { position, reason }));
                }
            }
        }

        let positions = match ApplicantScanner::new(session).find_positions_with_applicants() {
            Ok(positions) => positions,
            Err(err) => {
                error!(error = %err, "error finding positions with applicants");
                Vec::new()
            }
        };
        report.applicant_positions = positions.clone();

        if positions.is_empty() {
            info!("no positions with applicants found");
            return probe_secretary_interface(session);
        }

        let admission = AdmissionLoop::new(session);
        for position in positions {
            let visit = admission.process_position(position, state);
            let outcome = visit.outcome.clone();
            report.admissions.push(visit);
            if let StepOutcome::Fatal(reason) = outcome {
                return Ok(CycleStatus::Aborted(AbortReason::Admission { position, reason }));
            }
        }

        Ok(CycleStatus::Completed)
    }
}

/// Tell "no applicants" apart from a secretary screen the routine cannot read.
fn probe_secretary_interface(session: &Session) -> Result<CycleStatus, CycleError> {
    let probe = Position::CORE[0];
    let controls = session.controls();

    let error_msg = format!("Could not find {probe} secretary position");
    if !controls.find_and_tap(probe.template(), &error_msg, true)? {
        return Err(CycleError::SecretaryUnreachable(ProbeFailure::PositionMissing(probe)));
    }
    controls.after_tap();

    if session.device.find_template("list")?.is_none() {
        return Err(CycleError::SecretaryUnreachable(ProbeFailure::ListMissing(probe)));
    }

    if !RecoveryController::new(session).exit_to_secretary_menu() {
        warn!("secretary probe could not return to the menu");
    }
    Ok(CycleStatus::Completed)
}
