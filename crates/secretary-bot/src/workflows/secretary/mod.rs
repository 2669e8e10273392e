//! Secretary appointment routine: cooldown registry, applicant scanning, admission and
//! eviction passes, bounded recovery and the cycle orchestrator tying them together.

pub(crate) mod admission;
pub mod audit;
pub mod domain;
pub(crate) mod eviction;
pub(crate) mod navigator;
pub mod policy;
pub(crate) mod recovery;
pub mod router;
pub(crate) mod routine;
pub(crate) mod scanner;
pub mod schedule;
pub(crate) mod session;
pub mod status;

#[cfg(test)]
mod tests;

pub use admission::{
    select_reject_control, AdmissionLoop, AdmissionVisit, MAX_CANDIDATES_PER_VISIT,
    REJECT_ALIGNMENT_PX,
};
pub use audit::{AuditError, AuditSink, CsvAuditSink, MemoryAuditSink, RejectedCandidate};
pub use domain::{
    CandidateDecision, FatalReason, Position, PositionSlot, PositionState, PositionTier,
    SkipReason, StepOutcome,
};
pub use eviction::{EvictionScanner, EvictionVisit};
pub use navigator::MenuNavigator;
pub use policy::{AdmissionDecision, AdmissionPolicy};
pub use recovery::{RecoveryController, MAX_RECOVERY_ATTEMPTS};
pub use router::status_router;
pub use routine::{AbortReason, CycleError, CycleReport, CycleStatus, ProbeFailure, SecretaryRoutine};
pub use scanner::{match_applicants, ApplicantScanner};
pub use schedule::{RoutineSchedule, ScheduledRoutine};
pub use session::{ManualReview, Session};
pub use status::{PositionStatusView, StatusBoard, StatusSnapshot};
