use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::workflows::secretary::Position;

/// Player waiting in a position's applicant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub alliance: String,
    pub name: String,
}

impl Applicant {
    pub fn new(alliance: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alliance: alliance.into(),
            name: name.into(),
        }
    }
}

/// Modelled state of one position's screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionScenario {
    pub position: Position,
    /// Whether the icon shows on the secretary menu at all.
    #[serde(default = "enabled")]
    pub visible: bool,
    /// Current holder. `None` renders the vacant marker.
    #[serde(default)]
    pub appointee: Option<String>,
    /// The appoint control only shows once the holder's term is over.
    #[serde(default = "enabled")]
    pub term_over: bool,
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    /// Accepted players waiting for their turn.
    #[serde(default)]
    pub queued: u32,
    #[serde(default)]
    pub list_full: bool,
    #[serde(default = "enabled")]
    pub list_control: bool,
}

fn enabled() -> bool {
    true
}

impl PositionScenario {
    pub fn vacant(position: Position) -> Self {
        Self {
            position,
            visible: true,
            appointee: None,
            term_over: true,
            applicants: Vec::new(),
            queued: 0,
            list_full: false,
            list_control: true,
        }
    }

    pub fn held_by(position: Position, appointee: impl Into<String>) -> Self {
        Self {
            appointee: Some(appointee.into()),
            ..Self::vacant(position)
        }
    }

    pub fn with_applicants(mut self, applicants: impl IntoIterator<Item = Applicant>) -> Self {
        self.applicants.extend(applicants);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

/// Starting state of a simulated game. Positions left out are visible and vacant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub screen: ScreenSize,
    /// A reward popup greets the next profile visit.
    #[serde(default)]
    pub notification_pending: bool,
    #[serde(default)]
    pub capitol_missing: bool,
    #[serde(default)]
    pub positions: Vec<PositionScenario>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid scenario document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn with_position(mut self, position: PositionScenario) -> Self {
        self.positions.retain(|existing| existing.position != position.position);
        self.positions.push(position);
        self
    }

    /// Small capitol with a whitelisted and a foreign applicant, a long queue and an
    /// expired commander term.
    pub fn demo() -> Self {
        Self {
            notification_pending: true,
            ..Self::default()
        }
        .with_position(
            PositionScenario::held_by(Position::Science, "Ada").with_applicants([
                Applicant::new("ABC", "Turing"),
                Applicant::new("XYZ", "Mallory"),
            ]),
        )
        .with_position(
            PositionScenario::held_by(Position::Development, "Grace").with_applicants(
                (1..=7).map(|n| Applicant::new("ABC", format!("builder-{n}"))),
            ),
        )
        .with_position(PositionScenario::held_by(Position::Military, "Rommel"))
    }

    /// Model of `position`, falling back to a visible vacant slot.
    pub fn position(&self, position: Position) -> PositionScenario {
        self.positions
            .iter()
            .find(|entry| entry.position == position)
            .cloned()
            .unwrap_or_else(|| PositionScenario::vacant(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_default_to_a_reachable_position() {
        let scenario = Scenario::from_json(
            r#"{"positions": [{"position": "science", "applicants": [{"alliance": "ABC", "name": "Turing"}]}]}"#,
        )
        .expect("scenario parses");

        let science = scenario.position(Position::Science);
        assert!(science.visible && science.list_control && science.term_over);
        assert_eq!(science.appointee, None);
        assert_eq!(science.applicants, vec![Applicant::new("ABC", "Turing")]);
        assert_eq!(scenario.position(Position::Interior), PositionScenario::vacant(Position::Interior));
        assert_eq!(scenario.screen, ScreenSize::default());
    }

    #[test]
    fn with_position_replaces_existing_entry() {
        let scenario = Scenario::default()
            .with_position(PositionScenario::vacant(Position::Military))
            .with_position(PositionScenario::held_by(Position::Military, "Rommel"));
        assert_eq!(scenario.positions.len(), 1);
        assert_eq!(
            scenario.position(Position::Military).appointee.as_deref(),
            Some("Rommel")
        );
    }
}
