use std::sync::Arc;

use super::audit::{AuditSink, MemoryAuditSink};
use super::policy::AdmissionPolicy;
use crate::config::SecretarySettings;
use crate::device::{Alarm, Clock, Controls, Device, Operator, SystemClock, TextReader};

/// Pause-before-reject hooks for manual-deny mode.
#[derive(Clone)]
pub struct ManualReview {
    pub alarm: Arc<dyn Alarm>,
    pub operator: Arc<dyn Operator>,
}

/// Collaborators and settings shared by every component acting on one device.
#[derive(Clone)]
pub struct Session {
    pub device: Arc<dyn Device>,
    pub text: Arc<dyn TextReader>,
    pub clock: Arc<dyn Clock>,
    pub audit: Arc<dyn AuditSink>,
    pub manual_review: Option<ManualReview>,
    pub settings: SecretarySettings,
    pub policy: AdmissionPolicy,
}

impl Session {
    /// Session on the system clock with an in-memory audit trail.
    pub fn new(
        device: Arc<dyn Device>,
        text: Arc<dyn TextReader>,
        settings: SecretarySettings,
    ) -> Self {
        let policy = settings.admission_policy();
        Self {
            device,
            text,
            clock: Arc::new(SystemClock),
            audit: Arc::new(MemoryAuditSink::default()),
            manual_review: None,
            settings,
            policy,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_manual_review(mut self, alarm: Arc<dyn Alarm>, operator: Arc<dyn Operator>) -> Self {
        self.manual_review = Some(ManualReview { alarm, operator });
        self
    }

    pub fn controls(&self) -> Controls<'_> {
        Controls::new(
            self.device.as_ref(),
            self.clock.as_ref(),
            &self.settings.timings,
        )
    }
}
