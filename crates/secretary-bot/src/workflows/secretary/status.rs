use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Position, PositionState, PositionTier};
use super::routine::{CycleError, CycleReport};

/// Cooldown view of one position for the status API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionStatusView {
    pub position: Position,
    pub label: &'static str,
    pub tier: PositionTier,
    pub last_approve_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_remove_delay_secs: Option<i64>,
    pub removal_due: bool,
}

impl PositionStatusView {
    pub fn collect(state: &PositionState, now: DateTime<Utc>) -> Vec<Self> {
        state
            .iter()
            .map(|(position, slot)| Self {
                position,
                label: position.label(),
                tier: position.tier(),
                last_approve_time: slot.last_approve_time,
                auto_remove_delay_secs: slot.auto_remove_delay.map(|delay| delay.num_seconds()),
                removal_due: state.removal_due(position, now),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusSnapshot {
    pub device_id: String,
    pub cycles_run: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub positions: Vec<PositionStatusView>,
    pub latest_cycle: Option<CycleReport>,
    pub last_error: Option<String>,
}

/// Latest routine state, shared between the blocking worker and the HTTP handlers.
#[derive(Debug, Default)]
pub struct StatusBoard {
    inner: Mutex<StatusSnapshot>,
}

impl StatusBoard {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(StatusSnapshot {
                device_id: device_id.into(),
                ..StatusSnapshot::default()
            }),
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn publish_state(&self, state: &PositionState, now: DateTime<Utc>) {
        let mut snapshot = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        snapshot.positions = PositionStatusView::collect(state, now);
        snapshot.updated_at = Some(now);
    }

    pub fn record_cycle(
        &self,
        state: &PositionState,
        result: &Result<CycleReport, CycleError>,
        now: DateTime<Utc>,
    ) {
        let mut snapshot = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        snapshot.cycles_run += 1;
        snapshot.positions = PositionStatusView::collect(state, now);
        snapshot.updated_at = Some(now);
        match result {
            Ok(report) => {
                snapshot.latest_cycle = Some(report.clone());
                snapshot.last_error = None;
            }
            Err(err) => snapshot.last_error = Some(err.to_string()),
        }
    }
}
