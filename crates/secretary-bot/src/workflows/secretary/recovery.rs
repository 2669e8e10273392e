use tracing::{debug, error};

use super::navigator::MenuNavigator;
use super::session::Session;

/// Upper bound on back presses issued by one recovery.
pub const MAX_RECOVERY_ATTEMPTS: usize = 10;

/// Bounded back-navigation to the secretary menu anchor.
///
/// The only component that presses back on behalf of the routine.
pub struct RecoveryController<'a> {
    session: &'a Session,
    navigator: MenuNavigator<'a>,
}

impl<'a> RecoveryController<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            navigator: MenuNavigator::new(session),
        }
    }

    /// Press back until the anchor is visible, at most [`MAX_RECOVERY_ATTEMPTS`] times.
    ///
    /// The anchor is checked before every press and once more after the last one.
    pub fn exit_to_secretary_menu(&self) -> bool {
        let controls = self.session.controls();

        for attempt in 0..MAX_RECOVERY_ATTEMPTS {
            if self.navigator.verify_secretary_menu() {
                debug!(back_presses = attempt, "secretary menu reached");
                return true;
            }

            if let Err(err) = self.session.device.press_back() {
                error!(error = %err, "error exiting to secretary menu");
                return false;
            }
            controls.after_menu();
        }

        if self.navigator.verify_secretary_menu() {
            debug!(back_presses = MAX_RECOVERY_ATTEMPTS, "secretary menu reached");
            return true;
        }

        error!(
            attempts = MAX_RECOVERY_ATTEMPTS,
            "failed to return to secretary menu"
        );
        false
    }
}
