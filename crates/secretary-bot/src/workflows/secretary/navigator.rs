use tracing::{debug, error, warn};

use super::session::Session;
use crate::device::{DeviceError, SwipeDirection};

pub(crate) const ANCHOR_TEMPLATE: &str = "president";
const NOTIFICATION_TEMPLATE: &str = "awesome";
const CAPITOL_TEMPLATE: &str = "capitol_menu";

/// Opens the profile → capitol → secretary screens and checks the menu anchor.
pub struct MenuNavigator<'a> {
    session: &'a Session,
}

impl<'a> MenuNavigator<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Tap the profile avatar and clear a reward notification if one pops up.
    ///
    /// Only a failed avatar tap returns false; the notification path is best effort.
    pub fn open_profile_menu(&self) -> bool {
        if let Err(err) = self.tap_profile() {
            error!(error = %err, "error opening profile menu");
            return false;
        }

        if let Err(err) = self.dismiss_notification() {
            warn!(error = %err, "could not dismiss profile notification");
        }
        true
    }

    fn tap_profile(&self) -> Result<(), DeviceError> {
        let device = self.session.device.as_ref();
        let (width, height) = device.screen_size()?;
        let profile = self
            .session
            .settings
            .ui_elements
            .profile
            .resolve(width, height)
            .map_err(|err| DeviceError::Input(err.to_string()))?;
        debug!(x = profile.x, y = profile.y, "tapping profile avatar");
        device.tap(profile)
    }

    fn dismiss_notification(&self) -> Result<(), DeviceError> {
        let device = self.session.device.as_ref();
        let timeout = self.session.settings.timings.menu_animation();
        if let Some(notification) = device.wait_for_image(NOTIFICATION_TEMPLATE, timeout)? {
            debug!("dismissing profile notification");
            device.tap(notification)?;
            device.press_back()?;
            self.session.controls().after_menu();
        }
        Ok(())
    }

    /// Single bounded check for the secretary menu anchor. Never changes device state.
    pub fn verify_secretary_menu(&self) -> bool {
        let timeout = self.session.settings.timings.menu_animation();
        match self
            .session
            .device
            .wait_for_image(ANCHOR_TEMPLATE, timeout)
        {
            Ok(found) => found.is_some(),
            Err(err) => {
                warn!(error = %err, "anchor check failed");
                false
            }
        }
    }

    /// Full entry chain from any screen to the secretary list.
    ///
    /// Returns `Ok(false)` when the capitol entry cannot be found.
    pub fn open_secretary_menu(&self) -> Result<bool, DeviceError> {
        self.open_profile_menu();

        let controls = self.session.controls();
        if !controls.find_and_tap(CAPITOL_TEMPLATE, "Failed to find capitol menu", true)? {
            return Ok(false);
        }

        self.session.device.swipe(SwipeDirection::Down, 1)?;
        controls.after_tap();
        Ok(true)
    }
}
