use serde::Serialize;
use tracing::{debug, info, warn};

use super::audit::RejectedCandidate;
use super::domain::{CandidateDecision, FatalReason, Position, PositionState, SkipReason, StepOutcome};
use super::policy::{AdmissionDecision, AdmissionPolicy};
use super::recovery::RecoveryController;
use super::session::Session;
use crate::device::{DeviceError, ExtractedText, Point, SwipeDirection};

/// Candidates handled per position visit, whatever the outcome of each.
pub const MAX_CANDIDATES_PER_VISIT: usize = 5;

/// Vertical distance under which a reject control shares a row with the accept control.
pub const REJECT_ALIGNMENT_PX: i32 = 10;

const ACCEPT_TEMPLATE: &str = "accept";
const REJECT_TEMPLATE: &str = "reject";
const CONFIRM_TEMPLATE: &str = "confirm";
const FULL_LIST_TEMPLATE: &str = "full_list";
const LIST_TEMPLATE: &str = "list";
const OCR_LANGUAGES: &str = "eng";

/// Record of one trip into a position's applicant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionVisit {
    pub position: Position,
    pub outcome: StepOutcome,
    pub decisions: Vec<CandidateDecision>,
}

impl AdmissionVisit {
    pub fn accepted(&self) -> usize {
        self.decisions
            .iter()
            .filter(|decision| matches!(decision, CandidateDecision::Accepted { .. }))
            .count()
    }

    pub fn rejected(&self) -> usize {
        self.decisions.len() - self.accepted()
    }
}

enum Entry {
    Missing,
    ListFull,
    ListUnavailable,
    Processed,
}

/// Per-position candidate decision loop.
pub struct AdmissionLoop<'a> {
    session: &'a Session,
    recovery: RecoveryController<'a>,
}

impl<'a> AdmissionLoop<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            recovery: RecoveryController::new(session),
        }
    }

    /// Open `position`, decide up to [`MAX_CANDIDATES_PER_VISIT`] candidates, return to the menu.
    pub fn process_position(
        &self,
        position: Position,
        state: &mut PositionState,
    ) -> AdmissionVisit {
        let mut decisions = Vec::new();
        let outcome = match self.visit(position, state, &mut decisions) {
            Ok(Entry::Missing) => StepOutcome::Skip(SkipReason::PositionNotFound),
            Ok(Entry::ListUnavailable) => StepOutcome::Fatal(FatalReason::ListControlMissing),
            Ok(Entry::ListFull) => self.recover(StepOutcome::Skip(SkipReason::ListFull)),
            Ok(Entry::Processed) => self.recover(StepOutcome::Ok),
            Err(err) => {
                warn!(%position, error = %err, "error processing secretary position");
                self.recover(StepOutcome::Skip(SkipReason::DeviceFailure(err.to_string())))
            }
        };

        AdmissionVisit {
            position,
            outcome,
            decisions,
        }
    }

    fn recover(&self, outcome: StepOutcome) -> StepOutcome {
        if self.recovery.exit_to_secretary_menu() {
            outcome
        } else {
            StepOutcome::Fatal(FatalReason::RecoveryFailed)
        }
    }

    fn visit(
        &self,
        position: Position,
        state: &mut PositionState,
        decisions: &mut Vec<CandidateDecision>,
    ) -> Result<Entry, DeviceError> {
        let controls = self.session.controls();
        let device = self.session.device.as_ref();

        let error_msg = format!("Could not find {position} secretary position");
        if !controls.find_and_tap(position.template(), &error_msg, true)? {
            return Ok(Entry::Missing);
        }
        controls.after_tap();

        if device.find_template(FULL_LIST_TEMPLATE)?.is_some() {
            info!(%position, "auto-appointment list is already full");
            return Ok(Entry::ListFull);
        }

        let list_timeout = self.session.settings.timings.list_timeout();
        if !controls.find_and_tap_within(LIST_TEMPLATE, "List button not found", true, list_timeout)? {
            return Ok(Entry::ListUnavailable);
        }

        let visible = controls.find_sorted(ACCEPT_TEMPLATE)?;
        if visible.is_empty() {
            return Ok(Entry::Processed);
        }
        if visible.len() > MAX_CANDIDATES_PER_VISIT {
            device.swipe(SwipeDirection::Up, 1)?;
            let timings = &self.session.settings.timings;
            self.session.clock.sleep(timings.settle_time() * 2);
        }

        for _ in 0..MAX_CANDIDATES_PER_VISIT {
            let screenshot = match device.take_screenshot() {
                Ok(screenshot) => screenshot,
                Err(err) => {
                    warn!(%position, error = %err, "screenshot failed, leaving applicant list");
                    break;
                }
            };

            let Some(candidate) = controls.find_sorted(ACCEPT_TEMPLATE)?.first().copied() else {
                debug!(%position, "no candidates left");
                break;
            };

            let decision = match &self.session.policy {
                AdmissionPolicy::Open => {
                    controls.tap(candidate)?;
                    state.touch(position, self.session.clock.now());
                    debug!(%position, x = candidate.x, y = candidate.y, "accepted candidate");
                    CandidateDecision::Accepted { alliance: None }
                }
                policy @ AdmissionPolicy::Whitelist(_) => {
                    let text = self.session.text.as_ref();
                    let regions = text.text_regions(candidate, &screenshot)?;
                    let alliance = text.extract_text(regions.alliance, OCR_LANGUAGES, &screenshot)?;
                    debug!(%position, alliance = %alliance.normalized, "read candidate alliance");

                    match policy.decide(&alliance.normalized) {
                        AdmissionDecision::Accept => {
                            controls.tap(candidate)?;
                            state.touch(position, self.session.clock.now());
                            info!(%position, alliance = %alliance.normalized, "accepted candidate");
                            CandidateDecision::Accepted {
                                alliance: Some(alliance.normalized),
                            }
                        }
                        AdmissionDecision::Reject => {
                            let confirmed = self.reject(position, candidate, &alliance)?;
                            CandidateDecision::Rejected {
                                alliance: alliance.normalized,
                                confirmed,
                            }
                        }
                    }
                }
            };

            decisions.push(decision);
            controls.settle();
        }

        Ok(Entry::Processed)
    }

    fn reject(
        &self,
        position: Position,
        candidate: Point,
        alliance: &ExtractedText,
    ) -> Result<bool, DeviceError> {
        info!(%position, alliance = %alliance.normalized, "rejecting candidate");
        let record = RejectedCandidate {
            recorded_at: self.session.clock.now(),
            position,
            alliance: alliance.normalized.clone(),
            raw_text: alliance.raw.clone(),
        };
        if let Err(err) = self.session.audit.record_rejection(record) {
            warn!(%position, alliance = %alliance.normalized, error = %err, "rejection not written to audit log");
        }

        if let Some(review) = &self.session.manual_review {
            review.alarm.play_beep();
            review.operator.acknowledge("Press Enter to continue...");
        }

        let controls = self.session.controls();
        let rejects = controls.find_sorted(REJECT_TEMPLATE)?;
        if let Some(reject) = select_reject_control(&rejects, candidate) {
            debug!(x = reject.x, y = reject.y, "tapping reject");
            controls.tap(reject)?;
        }
        controls.find_and_tap(CONFIRM_TEMPLATE, "Failed to find confirm button", true)
    }
}

/// Topmost reject control on the candidate's row, if any.
pub fn select_reject_control(rejects: &[Point], accept: Point) -> Option<Point> {
    rejects
        .iter()
        .copied()
        .filter(|reject| (reject.y - accept.y).abs() <= REJECT_ALIGNMENT_PX)
        .min_by_key(|reject| reject.reading_order())
}
