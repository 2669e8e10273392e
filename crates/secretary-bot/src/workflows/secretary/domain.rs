use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AutoRemoveSettings;

/// Appointable title in the capitol secretary interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Strategy,
    Security,
    Development,
    Science,
    Interior,
    Military,
    Administrative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionTier {
    Core,
    Additional,
}

impl Position {
    pub const CORE: [Self; 5] = [
        Self::Strategy,
        Self::Security,
        Self::Development,
        Self::Science,
        Self::Interior,
    ];

    pub const ADDITIONAL: [Self; 2] = [Self::Military, Self::Administrative];

    /// Catalog order: core positions first, then the additional ones.
    pub const fn all() -> [Self; 7] {
        [
            Self::Strategy,
            Self::Security,
            Self::Development,
            Self::Science,
            Self::Interior,
            Self::Military,
            Self::Administrative,
        ]
    }

    /// Name of the icon template for this position.
    pub const fn template(self) -> &'static str {
        match self {
            Self::Strategy => "strategy",
            Self::Security => "security",
            Self::Development => "development",
            Self::Science => "science",
            Self::Interior => "interior",
            Self::Military => "military",
            Self::Administrative => "administrative",
        }
    }

    /// Template shown on the secretary menu while nobody holds the title.
    pub const fn vacant_template(self) -> &'static str {
        match self {
            Self::Strategy => "vacant-strategy",
            Self::Security => "vacant-security",
            Self::Development => "vacant-development",
            Self::Science => "vacant-science",
            Self::Interior => "vacant-interior",
            Self::Military => "vacant-military",
            Self::Administrative => "vacant-administrative",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Strategy => "Secretary of Strategy",
            Self::Security => "Secretary of Security",
            Self::Development => "Secretary of Development",
            Self::Science => "Secretary of Science",
            Self::Interior => "Secretary of Interior",
            Self::Military => "Military Commander",
            Self::Administrative => "Administrative Commander",
        }
    }

    pub const fn tier(self) -> PositionTier {
        match self {
            Self::Military | Self::Administrative => PositionTier::Additional,
            _ => PositionTier::Core,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSlot {
    pub last_approve_time: DateTime<Utc>,
    pub auto_remove_delay: Option<Duration>,
}

/// Per-position cooldown state for one device session.
///
/// Every catalog position has a slot from construction on. `last_approve_time` only ever
/// moves forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionState {
    slots: BTreeMap<Position, PositionSlot>,
}

impl PositionState {
    pub fn new(now: DateTime<Utc>, auto_remove: Option<&AutoRemoveSettings>) -> Self {
        let slots = Position::all()
            .into_iter()
            .map(|position| {
                let slot = PositionSlot {
                    last_approve_time: now,
                    auto_remove_delay: auto_remove.and_then(|section| section.delay_for(position)),
                };
                (position, slot)
            })
            .collect();
        Self { slots }
    }

    pub fn slot(&self, position: Position) -> &PositionSlot {
        &self.slots[&position]
    }

    pub fn last_approve_time(&self, position: Position) -> DateTime<Utc> {
        self.slot(position).last_approve_time
    }

    pub fn auto_remove_delay(&self, position: Position) -> Option<Duration> {
        self.slot(position).auto_remove_delay
    }

    /// Record a successful action at `now`. Earlier timestamps are ignored.
    pub fn touch(&mut self, position: Position, now: DateTime<Utc>) {
        if let Some(slot) = self.slots.get_mut(&position) {
            if now > slot.last_approve_time {
                slot.last_approve_time = now;
            }
        }
    }

    pub fn elapsed(&self, position: Position, now: DateTime<Utc>) -> Duration {
        now - self.last_approve_time(position)
    }

    /// True once the configured cooldown has fully elapsed. Positions without a delay never are.
    pub fn removal_due(&self, position: Position, now: DateTime<Utc>) -> bool {
        match self.auto_remove_delay(position) {
            Some(delay) => self.elapsed(position, now) >= delay,
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &PositionSlot)> {
        self.slots.iter().map(|(position, slot)| (*position, slot))
    }
}

/// Result of one position-level operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Ok,
    Skip(SkipReason),
    Fatal(FatalReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    PositionNotFound,
    ListFull,
    QueuePending,
    NotDue,
    DismissUnavailable,
    DeviceFailure(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalReason {
    ListControlMissing,
    RecoveryFailed,
}

impl fmt::Display for FatalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalReason::ListControlMissing => write!(f, "applicant list control not found"),
            FatalReason::RecoveryFailed => write!(f, "could not return to the secretary menu"),
        }
    }
}

/// What happened to one candidate during an admission visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum CandidateDecision {
    /// `alliance` is `None` when the open policy skipped text extraction.
    Accepted { alliance: Option<String> },
    /// `confirmed` is false when the confirm control never showed up.
    Rejected { alliance: String, confirmed: bool },
}
