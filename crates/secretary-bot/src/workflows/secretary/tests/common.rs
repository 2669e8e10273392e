use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::config::{AutoRemoveSettings, SecretarySettings, Timings};
use crate::device::{
    Alarm, Device, DeviceError, ExtractedText, Operator, Point, Region, Screenshot,
    SwipeDirection, TextReader, TextRegions,
};
use crate::simulator::ManualClock;
use crate::workflows::secretary::{MemoryAuditSink, Position, Session};

pub(super) const ANCHOR: Point = Point::new(540, 260);
pub(super) const LIST: Point = Point::new(540, 1650);
pub(super) const CONFIRM: Point = Point::new(700, 1150);

pub(super) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn settings() -> SecretarySettings {
    SecretarySettings {
        timings: Timings::instant(),
        ..SecretarySettings::default()
    }
}

pub(super) fn whitelist_settings(alliances: &[&str]) -> SecretarySettings {
    let mut settings = settings();
    settings.whitelist.alliance = alliances.iter().map(|tag| tag.to_string()).collect();
    settings
}

pub(super) fn eviction_settings(cooldowns: &[(Position, u64)]) -> SecretarySettings {
    let mut settings = settings();
    settings.auto_remove = Some(AutoRemoveSettings {
        active: true,
        title_cfg: cooldowns.iter().copied().collect::<BTreeMap<_, _>>(),
    });
    settings
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Call {
    Tap(Point),
    Back,
    Swipe(SwipeDirection, u32),
    Screenshot,
}

/// Device answering template lookups from per-template scripts.
///
/// Each lookup consumes the front response of the template's script; the last response
/// repeats forever. Unscripted templates are never found.
#[derive(Default)]
pub(super) struct ScriptedDevice {
    scripts: Mutex<HashMap<String, VecDeque<Vec<Point>>>>,
    calls: Mutex<Vec<Call>>,
    fail_back: Mutex<bool>,
    fail_screenshot: Mutex<bool>,
    fail_lookups: Mutex<HashSet<String>>,
}

impl ScriptedDevice {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn script(self, template: &str, responses: Vec<Vec<Point>>) -> Self {
        self.scripts
            .lock()
            .expect("scripts lock")
            .insert(template.to_string(), responses.into());
        self
    }

    pub(super) fn always(self, template: &str, points: Vec<Point>) -> Self {
        self.script(template, vec![points])
    }

    /// Anchor visible on every check.
    pub(super) fn at_menu(self) -> Self {
        self.always("president", vec![ANCHOR])
    }

    pub(super) fn failing_back(self) -> Self {
        *self.fail_back.lock().expect("flag lock") = true;
        self
    }

    pub(super) fn failing_screenshot(self) -> Self {
        *self.fail_screenshot.lock().expect("flag lock") = true;
        self
    }

    /// Lookups of `template` fail with a capture error.
    pub(super) fn failing_lookup(self, template: &str) -> Self {
        self.fail_lookups
            .lock()
            .expect("flag lock")
            .insert(template.to_string());
        self
    }

    pub(super) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(super) fn taps(&self) -> Vec<Point> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Tap(point) => Some(point),
                _ => None,
            })
            .collect()
    }

    pub(super) fn taps_at(&self, point: Point) -> usize {
        self.taps().into_iter().filter(|tap| *tap == point).count()
    }

    pub(super) fn back_presses(&self) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| *call == Call::Back)
            .count()
    }

    fn lookup(&self, template: &str) -> Result<Vec<Point>, DeviceError> {
        if self.fail_lookups.lock().expect("flag lock").contains(template) {
            return Err(DeviceError::Capture(format!("{template} match timed out")));
        }
        let mut scripts = self.scripts.lock().expect("scripts lock");
        Ok(match scripts.get_mut(template) {
            Some(responses) if responses.len() > 1 => responses.pop_front().unwrap_or_default(),
            Some(responses) => responses.front().cloned().unwrap_or_default(),
            None => Vec::new(),
        })
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl Device for ScriptedDevice {
    fn device_id(&self) -> &str {
        "scripted"
    }

    fn find_template(&self, name: &str) -> Result<Option<Point>, DeviceError> {
        Ok(self.lookup(name)?.first().copied())
    }

    fn find_all_templates(&self, name: &str) -> Result<Vec<Point>, DeviceError> {
        self.lookup(name)
    }

    fn wait_for_image(&self, name: &str, _timeout: Duration) -> Result<Option<Point>, DeviceError> {
        self.find_template(name)
    }

    fn take_screenshot(&self) -> Result<Screenshot, DeviceError> {
        if *self.fail_screenshot.lock().expect("flag lock") {
            return Err(DeviceError::Capture("frame buffer unavailable".to_string()));
        }
        self.record(Call::Screenshot);
        Ok(Screenshot { frame: 1 })
    }

    fn tap(&self, point: Point) -> Result<(), DeviceError> {
        self.record(Call::Tap(point));
        Ok(())
    }

    fn swipe(&self, direction: SwipeDirection, count: u32) -> Result<(), DeviceError> {
        self.record(Call::Swipe(direction, count));
        Ok(())
    }

    fn press_back(&self) -> Result<(), DeviceError> {
        if *self.fail_back.lock().expect("flag lock") {
            return Err(DeviceError::Input("back key rejected".to_string()));
        }
        self.record(Call::Back);
        Ok(())
    }

    fn screen_size(&self) -> Result<(u32, u32), DeviceError> {
        Ok((1080, 1920))
    }
}

/// Reads alliance tags keyed by the row of the accept control they were requested for.
pub(super) struct RowText {
    by_row: HashMap<i32, String>,
    fallback: String,
}

impl RowText {
    pub(super) fn uniform(alliance: &str) -> Self {
        Self {
            by_row: HashMap::new(),
            fallback: alliance.to_string(),
        }
    }

    pub(super) fn rows(rows: &[(i32, &str)]) -> Self {
        Self {
            by_row: rows
                .iter()
                .map(|(y, alliance)| (*y, alliance.to_string()))
                .collect(),
            fallback: String::new(),
        }
    }
}

impl TextReader for RowText {
    fn text_regions(
        &self,
        anchor: Point,
        _screenshot: &Screenshot,
    ) -> Result<TextRegions, DeviceError> {
        let region = Region {
            x: anchor.x - 700,
            y: anchor.y,
            width: 160,
            height: 40,
        };
        Ok(TextRegions {
            alliance: region,
            name: region,
        })
    }

    fn extract_text(
        &self,
        region: Region,
        _languages: &str,
        _screenshot: &Screenshot,
    ) -> Result<ExtractedText, DeviceError> {
        let alliance = self
            .by_row
            .get(&region.y)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());
        Ok(ExtractedText {
            raw: format!(" {alliance} "),
            normalized: alliance,
        })
    }
}

/// Text reader whose extraction always fails.
pub(super) struct FailingText;

impl TextReader for FailingText {
    fn text_regions(
        &self,
        anchor: Point,
        screenshot: &Screenshot,
    ) -> Result<TextRegions, DeviceError> {
        RowText::uniform("").text_regions(anchor, screenshot)
    }

    fn extract_text(
        &self,
        _region: Region,
        _languages: &str,
        _screenshot: &Screenshot,
    ) -> Result<ExtractedText, DeviceError> {
        Err(DeviceError::Text("ocr down".to_string()))
    }
}

#[derive(Default)]
pub(super) struct CountingAlarm {
    beeps: Mutex<usize>,
}

impl CountingAlarm {
    pub(super) fn beeps(&self) -> usize {
        *self.beeps.lock().expect("beeps lock")
    }
}

impl Alarm for CountingAlarm {
    fn play_beep(&self) {
        *self.beeps.lock().expect("beeps lock") += 1;
    }
}

#[derive(Default)]
pub(super) struct RecordingOperator {
    prompts: Mutex<Vec<String>>,
}

impl RecordingOperator {
    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

impl Operator for RecordingOperator {
    fn acknowledge(&self, prompt: &str) {
        self.prompts.lock().expect("prompts lock").push(prompt.to_string());
    }
}

pub(super) struct Harness {
    pub device: Arc<ScriptedDevice>,
    pub clock: Arc<ManualClock>,
    pub audit: Arc<MemoryAuditSink>,
    pub session: Session,
}

pub(super) fn harness(
    device: ScriptedDevice,
    text: impl TextReader + 'static,
    settings: SecretarySettings,
) -> Harness {
    let device = Arc::new(device);
    let clock = Arc::new(ManualClock::new(epoch()));
    let audit = Arc::new(MemoryAuditSink::default());
    let session = Session::new(device.clone(), Arc::new(text), settings)
        .with_clock(clock.clone())
        .with_audit(audit.clone());
    Harness {
        device,
        clock,
        audit,
        session,
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("json body")
}
