use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{FatalReason, Position, PositionState, SkipReason, StepOutcome};
use super::recovery::RecoveryController;
use super::session::Session;
use crate::device::DeviceError;

const EMPTY_LIST_TEMPLATE: &str = "empty_list";
const APPOINT_TEMPLATE: &str = "appoint";
const DISMISS_TEMPLATE: &str = "dismiss";
const CONFIRM_DISMISS_TEMPLATE: &str = "confirm-blue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvictionVisit {
    pub position: Position,
    pub outcome: StepOutcome,
}

/// Cooldown-driven removal of appointees.
pub struct EvictionScanner<'a> {
    session: &'a Session,
    recovery: RecoveryController<'a>,
}

impl<'a> EvictionScanner<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            recovery: RecoveryController::new(session),
        }
    }

    /// Positions whose cooldown expired and whose icon is on screen.
    ///
    /// A vacant position has its timer reset instead of being returned.
    pub fn find_positions_to_remove(
        &self,
        state: &mut PositionState,
    ) -> Result<Vec<Position>, DeviceError> {
        if self.session.settings.active_auto_remove().is_none() {
            return Ok(Vec::new());
        }

        let device = self.session.device.as_ref();
        let mut positions = Vec::new();
        for position in Position::all() {
            let now = self.session.clock.now();
            if !state.removal_due(position, now) {
                continue;
            }

            if device.find_template(position.vacant_template())?.is_some() {
                info!(%position, "position is vacant");
                state.touch(position, now);
                continue;
            }

            if device.find_template(position.template())?.is_some() {
                debug!(%position, "position requires remove check");
                positions.push(position);
            }
        }
        Ok(positions)
    }

    pub fn process_remove_position(
        &self,
        position: Position,
        state: &mut PositionState,
    ) -> EvictionVisit {
        let outcome = match self.remove(position, state) {
            Ok(None) => StepOutcome::Skip(SkipReason::PositionNotFound),
            Ok(Some(outcome)) => self.recover(outcome),
            Err(err) => {
                warn!(%position, error = %err, "error processing auto-remove position");
                self.recover(StepOutcome::Skip(SkipReason::DeviceFailure(err.to_string())))
            }
        };
        EvictionVisit { position, outcome }
    }

    fn recover(&self, outcome: StepOutcome) -> StepOutcome {
        if self.recovery.exit_to_secretary_menu() {
            outcome
        } else {
            StepOutcome::Fatal(FatalReason::RecoveryFailed)
        }
    }

    fn remove(
        &self,
        position: Position,
        state: &mut PositionState,
    ) -> Result<Option<StepOutcome>, DeviceError> {
        let controls = self.session.controls();
        let device = self.session.device.as_ref();

        let error_msg = format!("Could not find {position} auto-remove position");
        if !controls.find_and_tap(position.template(), &error_msg, true)? {
            return Ok(None);
        }
        controls.after_tap();

        if device.find_template(EMPTY_LIST_TEMPLATE)?.is_none() {
            info!(%position, "players are still queued for position");
            state.touch(position, self.session.clock.now());
            return Ok(Some(StepOutcome::Skip(SkipReason::QueuePending)));
        }

        if device.find_template(APPOINT_TEMPLATE)?.is_none() {
            info!(%position, "current term is not over yet");
            state.touch(position, self.session.clock.now());
            return Ok(Some(StepOutcome::Skip(SkipReason::NotDue)));
        }

        let dismiss_msg = format!("Impossible to find the dismiss button for position {position}");
        if !controls.find_and_tap(DISMISS_TEMPLATE, &dismiss_msg, true)? {
            return Ok(Some(StepOutcome::Skip(SkipReason::DismissUnavailable)));
        }
        controls.after_tap();

        let confirm_msg = format!("Impossible to confirm dismiss for position {position}");
        if !controls.find_and_tap(CONFIRM_DISMISS_TEMPLATE, &confirm_msg, true)? {
            return Ok(Some(StepOutcome::Skip(SkipReason::DismissUnavailable)));
        }

        info!(%position, "auto removed position");
        controls.after_tap();
        state.touch(position, self.session.clock.now());
        Ok(Some(StepOutcome::Ok))
    }
}
