use std::time::Duration;

use tracing::{debug, error};

use super::{Clock, Device, DeviceError, Point};
use crate::config::Timings;

/// Composite input helpers layered over a [`Device`] and the configured delays.
pub struct Controls<'a> {
    device: &'a dyn Device,
    clock: &'a dyn Clock,
    timings: &'a Timings,
}

impl<'a> Controls<'a> {
    pub fn new(device: &'a dyn Device, clock: &'a dyn Clock, timings: &'a Timings) -> Self {
        Self {
            device,
            clock,
            timings,
        }
    }

    /// Locate a template within the default timeout and tap it.
    ///
    /// Returns `Ok(false)` on a miss. `critical` misses are logged at error level with
    /// `error_msg`, the rest at debug level.
    pub fn find_and_tap(
        &self,
        name: &str,
        error_msg: &str,
        critical: bool,
    ) -> Result<bool, DeviceError> {
        self.find_and_tap_within(name, error_msg, critical, self.timings.template_timeout())
    }

    pub fn find_and_tap_within(
        &self,
        name: &str,
        error_msg: &str,
        critical: bool,
        timeout: Duration,
    ) -> Result<bool, DeviceError> {
        match self.device.wait_for_image(name, timeout)? {
            Some(point) => {
                debug!(template = name, x = point.x, y = point.y, "tapping template");
                self.device.tap(point)?;
                Ok(true)
            }
            None => {
                if critical {
                    error!(template = name, "{error_msg}");
                } else {
                    debug!(template = name, "{error_msg}");
                }
                Ok(false)
            }
        }
    }

    pub fn tap(&self, point: Point) -> Result<(), DeviceError> {
        self.device.tap(point)
    }

    /// Every match of `name`, topmost first.
    pub fn find_sorted(&self, name: &str) -> Result<Vec<Point>, DeviceError> {
        let mut matches = self.device.find_all_templates(name)?;
        matches.sort_by_key(|point| point.reading_order());
        if let Some(top) = matches.first() {
            debug!(
                template = name,
                count = matches.len(),
                top_x = top.x,
                top_y = top.y,
                "located controls"
            );
        }
        Ok(matches)
    }

    pub fn after_tap(&self) {
        self.clock.sleep(self.timings.tap_delay());
    }

    pub fn after_menu(&self) {
        self.clock.sleep(self.timings.menu_animation());
    }

    pub fn settle(&self) {
        self.clock.sleep(self.timings.settle_time());
    }
}
