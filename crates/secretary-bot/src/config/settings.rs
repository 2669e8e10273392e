use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::Point;
use crate::workflows::secretary::{AdmissionPolicy, Position};

/// Game-side settings for the secretary routine, loaded from a JSON document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SecretarySettings {
    #[serde(default)]
    pub timings: Timings,
    #[serde(default)]
    pub ui_elements: UiElements,
    #[serde(default)]
    pub applicant_offset: ApplicantOffset,
    #[serde(default)]
    pub auto_remove: Option<AutoRemoveSettings>,
    #[serde(default)]
    pub whitelist: WhitelistSettings,
    /// Forces open admission over a populated whitelist. Never restricts an empty one.
    #[serde(default)]
    pub admission: Option<AdmissionMode>,
    #[serde(default)]
    pub manual_deny: bool,
    /// CSV file receiving rejected candidates.
    #[serde(default)]
    pub audit_log: Option<PathBuf>,
}

impl SecretarySettings {
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.timings.validate()?;
        self.ui_elements.profile.validate()?;
        Ok(())
    }

    /// An empty whitelist admits everyone, whatever the configured mode.
    pub fn admission_policy(&self) -> AdmissionPolicy {
        let alliances = &self.whitelist.alliance;
        match self.admission {
            Some(AdmissionMode::Whitelist) | None if !alliances.is_empty() => {
                AdmissionPolicy::Whitelist(alliances.clone())
            }
            _ => AdmissionPolicy::Open,
        }
    }

    /// Auto-remove section when eviction should run this cycle.
    pub fn active_auto_remove(&self) -> Option<&AutoRemoveSettings> {
        self.auto_remove
            .as_ref()
            .filter(|section| section.active && !section.title_cfg.is_empty())
    }
}

/// Delays in seconds. Accessors convert to [`Duration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default = "default_tap_delay")]
    pub tap_delay: f64,
    #[serde(default = "default_menu_animation")]
    pub menu_animation: f64,
    #[serde(default = "default_settle_time")]
    pub settle_time: f64,
    #[serde(default = "default_list_timeout")]
    pub list_timeout: f64,
    #[serde(default = "default_template_timeout")]
    pub template_timeout: f64,
}

fn default_tap_delay() -> f64 {
    1.0
}

fn default_menu_animation() -> f64 {
    2.0
}

fn default_settle_time() -> f64 {
    1.0
}

fn default_list_timeout() -> f64 {
    10.0
}

fn default_template_timeout() -> f64 {
    3.0
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            tap_delay: default_tap_delay(),
            menu_animation: default_menu_animation(),
            settle_time: default_settle_time(),
            list_timeout: default_list_timeout(),
            template_timeout: default_template_timeout(),
        }
    }
}

impl Timings {
    /// All delays zero; used by simulations that should not block.
    pub fn instant() -> Self {
        Self {
            tap_delay: 0.0,
            menu_animation: 0.0,
            settle_time: 0.0,
            list_timeout: 0.0,
            template_timeout: 0.0,
        }
    }

    pub fn tap_delay(&self) -> Duration {
        seconds(self.tap_delay)
    }

    pub fn menu_animation(&self) -> Duration {
        seconds(self.menu_animation)
    }

    pub fn settle_time(&self) -> Duration {
        seconds(self.settle_time)
    }

    pub fn list_timeout(&self) -> Duration {
        seconds(self.list_timeout)
    }

    pub fn template_timeout(&self) -> Duration {
        seconds(self.template_timeout)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let fields = [
            ("tap_delay", self.tap_delay),
            ("menu_animation", self.menu_animation),
            ("settle_time", self.settle_time),
            ("list_timeout", self.list_timeout),
            ("template_timeout", self.template_timeout),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidTiming { field, value });
            }
        }
        Ok(())
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UiElements {
    #[serde(default)]
    pub profile: FractionalPoint,
}

/// Screen position expressed as percentages, e.g. `{"x": "6%", "y": "4%"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractionalPoint {
    pub x: String,
    pub y: String,
}

impl Default for FractionalPoint {
    fn default() -> Self {
        Self {
            x: "6%".to_string(),
            y: "4%".to_string(),
        }
    }
}

impl FractionalPoint {
    pub fn resolve(&self, width: u32, height: u32) -> Result<Point, SettingsError> {
        let x = parse_percent("ui_elements.profile.x", &self.x)?;
        let y = parse_percent("ui_elements.profile.y", &self.y)?;
        Ok(Point::new(
            (f64::from(width) * x / 100.0) as i32,
            (f64::from(height) * y / 100.0) as i32,
        ))
    }

    fn validate(&self) -> Result<(), SettingsError> {
        parse_percent("ui_elements.profile.x", &self.x)?;
        parse_percent("ui_elements.profile.y", &self.y)?;
        Ok(())
    }
}

fn parse_percent(field: &'static str, raw: &str) -> Result<f64, SettingsError> {
    let invalid = || SettingsError::InvalidFraction {
        field,
        value: raw.to_string(),
    };
    let value = raw
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid())?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(invalid())
    }
}

/// Maximum distance between a position icon and its "has applicant" badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantOffset {
    pub x: i32,
    pub y: i32,
}

impl Default for ApplicantOffset {
    fn default() -> Self {
        Self { x: 150, y: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRemoveSettings {
    #[serde(default = "default_active")]
    pub active: bool,
    /// Eviction cooldown per position, in seconds. Zero disables the position.
    #[serde(default)]
    pub title_cfg: BTreeMap<Position, u64>,
}

fn default_active() -> bool {
    true
}

impl AutoRemoveSettings {
    pub fn delay_for(&self, position: Position) -> Option<chrono::Duration> {
        self.title_cfg
            .get(&position)
            .copied()
            .filter(|secs| *secs > 0)
            .map(|secs| {
                let secs = i64::try_from(secs)
                    .unwrap_or(MAX_COOLDOWN_SECS)
                    .min(MAX_COOLDOWN_SECS);
                chrono::Duration::seconds(secs)
            })
    }
}

// chrono durations are bounded by i64 milliseconds.
const MAX_COOLDOWN_SECS: i64 = i64::MAX / 1000;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WhitelistSettings {
    #[serde(default)]
    pub alliance: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionMode {
    Open,
    Whitelist,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be a percentage between 0% and 100%, found '{value}'")]
    InvalidFraction { field: &'static str, value: String },
    #[error("timings.{field} must be a non-negative number of seconds, found {value}")]
    InvalidTiming { field: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings = SecretarySettings::from_json("{}").expect("defaults load");
        assert_eq!(settings.applicant_offset, ApplicantOffset { x: 150, y: 50 });
        assert_eq!(settings.timings, Timings::default());
        assert!(settings.auto_remove.is_none());
        assert_eq!(settings.admission_policy(), AdmissionPolicy::Open);
        assert!(!settings.manual_deny);
    }

    #[test]
    fn whitelist_implies_whitelist_policy_unless_overridden() {
        let settings = SecretarySettings::from_json(r#"{"whitelist": {"alliance": ["ABC"]}}"#)
            .expect("settings load");
        match settings.admission_policy() {
            AdmissionPolicy::Whitelist(set) => assert!(set.contains("ABC")),
            other => panic!("expected whitelist policy, got {other:?}"),
        }

        let open = SecretarySettings::from_json(
            r#"{"whitelist": {"alliance": ["ABC"]}, "admission": "open"}"#,
        )
        .expect("settings load");
        assert_eq!(open.admission_policy(), AdmissionPolicy::Open);
    }

    #[test]
    fn whitelist_mode_without_alliances_admits_everyone() {
        let settings =
            SecretarySettings::from_json(r#"{"admission": "whitelist"}"#).expect("settings load");
        assert_eq!(settings.admission_policy(), AdmissionPolicy::Open);

        let settings = SecretarySettings::from_json(
            r#"{"admission": "whitelist", "whitelist": {"alliance": []}}"#,
        )
        .expect("settings load");
        assert_eq!(settings.admission_policy(), AdmissionPolicy::Open);
    }

    #[test]
    fn auto_remove_section_parses_position_keys() {
        let settings = SecretarySettings::from_json(
            r#"{"auto_remove": {"title_cfg": {"military": 600, "science": 0}}}"#,
        )
        .expect("settings load");
        let section = settings.active_auto_remove().expect("auto remove active");
        assert_eq!(
            section.delay_for(Position::Military),
            Some(chrono::Duration::seconds(600))
        );
        assert_eq!(section.delay_for(Position::Science), None);
        assert_eq!(section.delay_for(Position::Strategy), None);
    }

    #[test]
    fn inactive_auto_remove_is_ignored() {
        let settings = SecretarySettings::from_json(
            r#"{"auto_remove": {"active": false, "title_cfg": {"military": 600}}}"#,
        )
        .expect("settings load");
        assert!(settings.active_auto_remove().is_none());
    }

    #[test]
    fn profile_fraction_resolves_against_screen_size() {
        let point = FractionalPoint {
            x: "10%".to_string(),
            y: " 5 %".to_string(),
        };
        assert_eq!(point.resolve(1080, 1920).expect("valid"), Point::new(108, 96));
    }

    #[test]
    fn rejects_malformed_profile_fraction() {
        let result =
            SecretarySettings::from_json(r#"{"ui_elements": {"profile": {"x": "left", "y": "4%"}}}"#);
        assert!(matches!(
            result,
            Err(SettingsError::InvalidFraction { field: "ui_elements.profile.x", .. })
        ));
    }

    #[test]
    fn rejects_negative_timings() {
        let result = SecretarySettings::from_json(r#"{"timings": {"tap_delay": -1.0}}"#);
        assert!(matches!(
            result,
            Err(SettingsError::InvalidTiming { field: "tap_delay", .. })
        ));
    }
}
