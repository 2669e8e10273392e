use tracing::{debug, info};

use super::domain::Position;
use super::session::Session;
use crate::config::ApplicantOffset;
use crate::device::{DeviceError, Point};

const BADGE_TEMPLATE: &str = "has_applicant";

/// Finds positions with pending applicants on the secretary menu.
pub struct ApplicantScanner<'a> {
    session: &'a Session,
}

impl<'a> ApplicantScanner<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Positions carrying an applicant badge, in catalog order.
    pub fn find_positions_with_applicants(&self) -> Result<Vec<Position>, DeviceError> {
        let device = self.session.device.as_ref();

        let mut icons = Vec::new();
        for position in Position::all() {
            if let Some(point) = device.find_all_templates(position.template())?.first() {
                debug!(%position, x = point.x, y = point.y, "found position icon");
                icons.push((position, *point));
            }
        }

        let badges = device.find_all_templates(BADGE_TEMPLATE)?;
        if badges.is_empty() {
            debug!("no applicant icons found");
            return Ok(Vec::new());
        }
        debug!(count = badges.len(), "found applicant icons");

        Ok(match_applicants(
            &icons,
            &badges,
            self.session.settings.applicant_offset,
        ))
    }
}

/// Pair each icon with the first badge inside its proximity box.
///
/// A badge belongs to a position when it lies within `offset.x` horizontally and `offset.y`
/// vertically of the icon, bounds inclusive. Each position is reported at most once.
pub fn match_applicants(
    icons: &[(Position, Point)],
    badges: &[Point],
    offset: ApplicantOffset,
) -> Vec<Position> {
    let mut positions = Vec::new();
    for (position, icon) in icons {
        if positions.contains(position) {
            continue;
        }
        let hit = badges.iter().find(|badge| {
            (badge.x - icon.x).abs() <= offset.x && (badge.y - icon.y).abs() <= offset.y
        });
        if let Some(badge) = hit {
            info!(
                %position,
                x_diff = (badge.x - icon.x).abs(),
                y_diff = (badge.y - icon.y).abs(),
                "found applicant for position"
            );
            positions.push(*position);
        }
    }
    positions
}
