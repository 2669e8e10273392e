//! Contracts for the capability providers the routine drives.
//!
//! Template matching, OCR, screen capture and input injection live behind these traits. A
//! detection miss is reported as `Ok(None)` or an empty list, never as an error; errors are
//! reserved for a provider that could not do its job at all.

mod controls;

pub use controls::Controls;

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Screen coordinate in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Sort key putting the topmost control first, left-to-right on ties.
    pub const fn reading_order(self) -> (i32, i32) {
        (self.y, self.x)
    }
}

/// Rectangle handed to the text extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Handle to a captured frame. Text extraction reads from the frame it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub frame: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Up,
    Down,
}

/// Areas of a candidate row holding the alliance tag and the player name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRegions {
    pub alliance: Region,
    pub name: Region,
}

/// OCR result: `normalized` is what policy decisions compare against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedText {
    pub normalized: String,
    pub raw: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("device {0} is not connected")]
    Disconnected(String),
    #[error("screen capture failed: {0}")]
    Capture(String),
    #[error("input injection failed: {0}")]
    Input(String),
    #[error("text extraction failed: {0}")]
    Text(String),
}

/// Template matching, capture and input for a single device session.
pub trait Device: Send + Sync {
    fn device_id(&self) -> &str;
    /// Best match of a named template on the current frame.
    fn find_template(&self, name: &str) -> Result<Option<Point>, DeviceError>;
    /// Every match of a named template, in no particular order.
    fn find_all_templates(&self, name: &str) -> Result<Vec<Point>, DeviceError>;
    /// Polls for a template until it appears or `timeout` elapses.
    fn wait_for_image(&self, name: &str, timeout: Duration) -> Result<Option<Point>, DeviceError>;
    fn take_screenshot(&self) -> Result<Screenshot, DeviceError>;
    fn tap(&self, point: Point) -> Result<(), DeviceError>;
    fn swipe(&self, direction: SwipeDirection, count: u32) -> Result<(), DeviceError>;
    fn press_back(&self) -> Result<(), DeviceError>;
    fn screen_size(&self) -> Result<(u32, u32), DeviceError>;
}

/// OCR over a captured frame.
pub trait TextReader: Send + Sync {
    fn text_regions(
        &self,
        anchor: Point,
        screenshot: &Screenshot,
    ) -> Result<TextRegions, DeviceError>;

    fn extract_text(
        &self,
        region: Region,
        languages: &str,
        screenshot: &Screenshot,
    ) -> Result<ExtractedText, DeviceError>;
}

/// Audible cue used before a manual-deny pause.
pub trait Alarm: Send + Sync {
    fn play_beep(&self);
}

/// Human in the loop for manual-deny mode. Blocks until the operator continues.
pub trait Operator: Send + Sync {
    fn acknowledge(&self, prompt: &str);
}

/// Time source and blocking delays.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}
