//! In-memory model of the game's secretary screens.
//!
//! [`SimulatedGame`] renders the controls of whatever screen is on top of its navigation
//! stack and resolves taps against them, so the routine can be driven end to end without a
//! device. Every tap, back press and swipe lands in an event log.

mod clock;
mod scenario;

pub use clock::ManualClock;
pub use scenario::{Applicant, PositionScenario, Scenario, ScenarioError, ScreenSize};

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::trace;

use crate::device::{
    Device, DeviceError, ExtractedText, Point, Region, Screenshot, SwipeDirection, TextReader,
    TextRegions,
};
use crate::workflows::secretary::Position;

/// Interactions retained by a [`SimulatedGame`]; older ones are dropped.
pub const EVENT_LOG_LIMIT: usize = 10_000;

const ANCHOR: Point = Point::new(540, 260);
const NOTIFICATION: Point = Point::new(540, 1100);
const CAPITOL: Point = Point::new(540, 1450);
const FULL_LIST: Point = Point::new(540, 380);
const APPOINT: Point = Point::new(300, 600);
const DISMISS: Point = Point::new(780, 600);
const EMPTY_LIST: Point = Point::new(540, 900);
const LIST: Point = Point::new(540, 1650);
const DIALOG_CONFIRM: Point = Point::new(700, 1150);

/// Applicant rows rendered at once.
pub const VISIBLE_ROWS: usize = 8;
const TAP_TOLERANCE: i32 = 40;
const PROFILE_CORNER: i32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Profile,
    Reward,
    Secretary,
    PositionDetail(Position),
    Applicants(Position),
    RejectDialog { position: Position, row: usize },
    DismissDialog(Position),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Tap {
        point: Point,
        control: Option<&'static str>,
    },
    Back,
    Swipe {
        direction: SwipeDirection,
        count: u32,
    },
    Accepted {
        position: Position,
        applicant: Applicant,
    },
    Rejected {
        position: Position,
        applicant: Applicant,
    },
    Dismissed {
        position: Position,
        appointee: String,
    },
}

/// Where a position's icon sits on the secretary menu.
pub fn icon_point(position: Position) -> Point {
    let index = Position::all()
        .iter()
        .position(|candidate| *candidate == position)
        .unwrap_or_default() as i32;
    Point::new(270 + 540 * (index % 2), 500 + 260 * (index / 2))
}

pub fn badge_point(position: Position) -> Point {
    let icon = icon_point(position);
    Point::new(icon.x + 90, icon.y - 40)
}

pub fn accept_point(row: usize) -> Point {
    Point::new(930, 420 + 150 * row as i32)
}

pub fn reject_point(row: usize) -> Point {
    Point::new(780, 420 + 150 * row as i32)
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Inert,
    OpenNotification,
    OpenCapitol,
    OpenPosition(Position),
    OpenList(Position),
    Accept(Position, usize),
    Reject(Position, usize),
    ConfirmReject(Position, usize),
    Dismiss(Position),
    ConfirmDismiss(Position),
}

struct Control {
    template: &'static str,
    point: Point,
    action: Action,
}

impl Control {
    fn new(template: &'static str, point: Point, action: Action) -> Self {
        Self {
            template,
            point,
            action,
        }
    }

    fn contains(&self, point: Point) -> bool {
        (self.point.x - point.x).abs() <= TAP_TOLERANCE
            && (self.point.y - point.y).abs() <= TAP_TOLERANCE
    }
}

struct GameState {
    screen: ScreenSize,
    stack: Vec<Screen>,
    notification_pending: bool,
    capitol_missing: bool,
    positions: BTreeMap<Position, PositionScenario>,
    events: VecDeque<SimEvent>,
    frame: u64,
    connected: bool,
    back_enabled: bool,
}

impl GameState {
    fn log(&mut self, event: SimEvent) {
        if self.events.len() >= EVENT_LOG_LIMIT {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn current(&self) -> Screen {
        self.stack.last().copied().unwrap_or(Screen::Home)
    }

    fn model(&self, position: Position) -> Option<&PositionScenario> {
        self.positions.get(&position)
    }

    fn controls(&self) -> Vec<Control> {
        let mut controls = Vec::new();
        match self.current() {
            Screen::Home | Screen::Reward => {}
            Screen::Profile => {
                if self.notification_pending {
                    controls.push(Control::new("awesome", NOTIFICATION, Action::OpenNotification));
                }
                if !self.capitol_missing {
                    controls.push(Control::new("capitol_menu", CAPITOL, Action::OpenCapitol));
                }
            }
            Screen::Secretary => {
                controls.push(Control::new("president", ANCHOR, Action::Inert));
                for model in self.positions.values().filter(|model| model.visible) {
                    let position = model.position;
                    let icon = icon_point(position);
                    controls.push(Control::new(
                        position.template(),
                        icon,
                        Action::OpenPosition(position),
                    ));
                    if model.appointee.is_none() {
                        let marker = Point::new(icon.x, icon.y + 80);
                        controls.push(Control::new(position.vacant_template(), marker, Action::Inert));
                    }
                    if !model.applicants.is_empty() {
                        controls.push(Control::new("has_applicant", badge_point(position), Action::Inert));
                    }
                }
            }
            Screen::PositionDetail(position) => {
                if let Some(model) = self.model(position) {
                    if model.list_full {
                        controls.push(Control::new("full_list", FULL_LIST, Action::Inert));
                    }
                    if model.appointee.is_some() {
                        if model.term_over {
                            controls.push(Control::new("appoint", APPOINT, Action::Inert));
                        }
                        controls.push(Control::new("dismiss", DISMISS, Action::Dismiss(position)));
                    }
                    if model.queued == 0 {
                        controls.push(Control::new("empty_list", EMPTY_LIST, Action::Inert));
                    }
                    if model.list_control {
                        controls.push(Control::new("list", LIST, Action::OpenList(position)));
                    }
                }
            }
            Screen::Applicants(position) => {
                let rows = self.model(position).map_or(0, |model| model.applicants.len());
                for row in 0..rows.min(VISIBLE_ROWS) {
                    controls.push(Control::new("reject", reject_point(row), Action::Reject(position, row)));
                    controls.push(Control::new("accept", accept_point(row), Action::Accept(position, row)));
                }
            }
            Screen::RejectDialog { position, row } => {
                controls.push(Control::new(
                    "confirm",
                    DIALOG_CONFIRM,
                    Action::ConfirmReject(position, row),
                ));
            }
            Screen::DismissDialog(position) => {
                controls.push(Control::new(
                    "confirm-blue",
                    DIALOG_CONFIRM,
                    Action::ConfirmDismiss(position),
                ));
            }
        }
        controls
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Inert => {}
            Action::OpenNotification => {
                self.notification_pending = false;
                self.stack.push(Screen::Reward);
            }
            Action::OpenCapitol => self.stack.push(Screen::Secretary),
            Action::OpenPosition(position) => self.stack.push(Screen::PositionDetail(position)),
            Action::OpenList(position) => self.stack.push(Screen::Applicants(position)),
            Action::Accept(position, row) => {
                if let Some(model) = self.positions.get_mut(&position) {
                    if row < model.applicants.len() {
                        let applicant = model.applicants.remove(row);
                        model.queued += 1;
                        self.log(SimEvent::Accepted {
                            position,
                            applicant,
                        });
                    }
                }
            }
            Action::Reject(position, row) => {
                self.stack.push(Screen::RejectDialog { position, row })
            }
            Action::ConfirmReject(position, row) => {
                if let Some(model) = self.positions.get_mut(&position) {
                    if row < model.applicants.len() {
                        let applicant = model.applicants.remove(row);
                        self.log(SimEvent::Rejected {
                            position,
                            applicant,
                        });
                    }
                }
                self.stack.pop();
            }
            Action::Dismiss(position) => self.stack.push(Screen::DismissDialog(position)),
            Action::ConfirmDismiss(position) => {
                if let Some(appointee) = self
                    .positions
                    .get_mut(&position)
                    .and_then(|model| model.appointee.take())
                {
                    self.log(SimEvent::Dismissed {
                        position,
                        appointee,
                    });
                }
                self.stack.pop();
            }
        }
    }

    /// Applicant whose alliance or name area starts at `region`, on the open list.
    fn applicant_at(&self, region: Region) -> Option<&Applicant> {
        let Screen::Applicants(position) = self.current() else {
            return None;
        };
        let applicants = &self.model(position)?.applicants;
        (0..applicants.len().min(VISIBLE_ROWS))
            .find(|row| {
                let accept = accept_point(*row);
                region.y == accept.y - 50
                    && (region.x == accept.x - 700 || region.x == accept.x - 540)
            })
            .and_then(|row| applicants.get(row))
    }
}

/// Scenario-driven stand-in for a device running the game.
pub struct SimulatedGame {
    device_id: String,
    state: Mutex<GameState>,
}

impl SimulatedGame {
    pub fn new(device_id: impl Into<String>, scenario: Scenario) -> Self {
        let positions = Position::all()
            .into_iter()
            .map(|position| (position, scenario.position(position)))
            .collect();
        Self {
            device_id: device_id.into(),
            state: Mutex::new(GameState {
                screen: scenario.screen,
                stack: vec![Screen::Home],
                notification_pending: scenario.notification_pending,
                capitol_missing: scenario.capitol_missing,
                positions,
                events: VecDeque::new(),
                frame: 0,
                connected: true,
                back_enabled: true,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn connected(&self) -> Result<MutexGuard<'_, GameState>, DeviceError> {
        let state = self.lock();
        if state.connected {
            Ok(state)
        } else {
            Err(DeviceError::Disconnected(self.device_id.clone()))
        }
    }

    pub fn current_screen(&self) -> Screen {
        self.lock().current()
    }

    /// Most recent interactions, oldest first, at most [`EVENT_LOG_LIMIT`] of them.
    pub fn events(&self) -> Vec<SimEvent> {
        self.lock().events.iter().cloned().collect()
    }

    pub fn accepted(&self) -> Vec<(Position, Applicant)> {
        self.lock()
            .events
            .iter()
            .filter_map(|event| match event {
                SimEvent::Accepted {
                    position,
                    applicant,
                } => Some((*position, applicant.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn rejected(&self) -> Vec<(Position, Applicant)> {
        self.lock()
            .events
            .iter()
            .filter_map(|event| match event {
                SimEvent::Rejected {
                    position,
                    applicant,
                } => Some((*position, applicant.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn dismissed(&self) -> Vec<(Position, String)> {
        self.lock()
            .events
            .iter()
            .filter_map(|event| match event {
                SimEvent::Dismissed {
                    position,
                    appointee,
                } => Some((*position, appointee.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn back_presses(&self) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|event| matches!(event, SimEvent::Back))
            .count()
    }

    pub fn swipes(&self, direction: SwipeDirection) -> u32 {
        self.lock()
            .events
            .iter()
            .filter_map(|event| match event {
                SimEvent::Swipe {
                    direction: swiped,
                    count,
                } if *swiped == direction => Some(*count),
                _ => None,
            })
            .sum()
    }

    /// Number of taps that landed on controls rendered from `template`.
    pub fn taps_on(&self, template: &str) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|event| {
                matches!(event, SimEvent::Tap { control: Some(control), .. } if *control == template)
            })
            .count()
    }

    pub fn position(&self, position: Position) -> Option<PositionScenario> {
        self.lock().model(position).cloned()
    }

    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }

    /// With back disabled, back presses are logged but never leave the current screen.
    pub fn set_back_enabled(&self, enabled: bool) {
        self.lock().back_enabled = enabled;
    }
}

impl Device for SimulatedGame {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn find_template(&self, name: &str) -> Result<Option<Point>, DeviceError> {
        let state = self.connected()?;
        Ok(state
            .controls()
            .into_iter()
            .find(|control| control.template == name)
            .map(|control| control.point))
    }

    fn find_all_templates(&self, name: &str) -> Result<Vec<Point>, DeviceError> {
        let state = self.connected()?;
        Ok(state
            .controls()
            .into_iter()
            .filter(|control| control.template == name)
            .map(|control| control.point)
            .collect())
    }

    fn wait_for_image(&self, name: &str, _timeout: Duration) -> Result<Option<Point>, DeviceError> {
        self.find_template(name)
    }

    fn take_screenshot(&self) -> Result<Screenshot, DeviceError> {
        let mut state = self.connected()?;
        state.frame += 1;
        Ok(Screenshot { frame: state.frame })
    }

    fn tap(&self, point: Point) -> Result<(), DeviceError> {
        let mut state = self.connected()?;

        if point.x < PROFILE_CORNER && point.y < PROFILE_CORNER {
            trace!(x = point.x, y = point.y, "profile avatar tapped");
            state.log(SimEvent::Tap {
                point,
                control: Some("profile"),
            });
            state.stack = vec![Screen::Home, Screen::Profile];
            return Ok(());
        }

        let hit = state
            .controls()
            .into_iter()
            .find(|control| control.contains(point));
        state.log(SimEvent::Tap {
            point,
            control: hit.as_ref().map(|control| control.template),
        });
        if let Some(control) = hit {
            trace!(template = control.template, "control tapped");
            state.apply(control.action);
        }
        Ok(())
    }

    fn swipe(&self, direction: SwipeDirection, count: u32) -> Result<(), DeviceError> {
        let mut state = self.connected()?;
        state.log(SimEvent::Swipe { direction, count });
        Ok(())
    }

    fn press_back(&self) -> Result<(), DeviceError> {
        let mut state = self.connected()?;
        state.log(SimEvent::Back);
        if state.back_enabled && state.stack.len() > 1 {
            state.stack.pop();
        }
        Ok(())
    }

    fn screen_size(&self) -> Result<(u32, u32), DeviceError> {
        let state = self.connected()?;
        Ok((state.screen.width, state.screen.height))
    }
}

impl TextReader for SimulatedGame {
    fn text_regions(
        &self,
        anchor: Point,
        _screenshot: &Screenshot,
    ) -> Result<TextRegions, DeviceError> {
        Ok(TextRegions {
            alliance: Region {
                x: anchor.x - 700,
                y: anchor.y - 50,
                width: 160,
                height: 40,
            },
            name: Region {
                x: anchor.x - 540,
                y: anchor.y - 50,
                width: 300,
                height: 40,
            },
        })
    }

    fn extract_text(
        &self,
        region: Region,
        _languages: &str,
        _screenshot: &Screenshot,
    ) -> Result<ExtractedText, DeviceError> {
        let state = self.connected()?;
        let Some(applicant) = state.applicant_at(region) else {
            return Ok(ExtractedText::default());
        };
        let text = if region.x == accept_point(0).x - 700 {
            &applicant.alliance
        } else {
            &applicant.name
        };
        Ok(ExtractedText {
            normalized: text.trim().to_string(),
            raw: format!("[{text}]"),
        })
    }
}
