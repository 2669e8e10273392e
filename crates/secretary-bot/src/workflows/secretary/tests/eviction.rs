use chrono::Duration;

use super::common::*;
use crate::device::Point;
use crate::workflows::secretary::{
    EvictionScanner, FatalReason, Position, PositionState, SkipReason, StepOutcome,
};

const MILITARY_ICON: Point = Point::new(270, 1280);
const DISMISS: Point = Point::new(780, 600);

fn military_settings() -> crate::config::SecretarySettings {
    eviction_settings(&[(Position::Military, 600)])
}

fn state_for(harness: &Harness) -> PositionState {
    PositionState::new(epoch(), harness.session.settings.auto_remove.as_ref())
}

fn dismissable() -> ScriptedDevice {
    ScriptedDevice::new()
        .at_menu()
        .always("military", vec![MILITARY_ICON])
        .always("empty_list", vec![Point::new(540, 900)])
        .always("appoint", vec![Point::new(300, 600)])
        .always("dismiss", vec![DISMISS])
        .always("confirm-blue", vec![CONFIRM])
}

#[test]
fn position_becomes_due_exactly_at_its_cooldown() {
    let harness = harness(dismissable(), RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);
    let scanner = EvictionScanner::new(&harness.session);

    harness.clock.advance(Duration::seconds(599));
    assert!(scanner
        .find_positions_to_remove(&mut state)
        .expect("scan")
        .is_empty());

    harness.clock.advance(Duration::seconds(1));
    assert_eq!(
        scanner.find_positions_to_remove(&mut state).expect("scan"),
        vec![Position::Military]
    );
}

#[test]
fn vacant_due_position_resets_its_timer() {
    let device = dismissable().always("vacant-military", vec![Point::new(270, 1360)]);
    let harness = harness(device, RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);
    harness.clock.advance(Duration::seconds(900));

    let due = EvictionScanner::new(&harness.session)
        .find_positions_to_remove(&mut state)
        .expect("scan");

    assert!(due.is_empty());
    assert_eq!(
        state.last_approve_time(Position::Military),
        epoch() + Duration::seconds(900)
    );
}

#[test]
fn inactive_auto_remove_finds_nothing() {
    let mut settings = military_settings();
    if let Some(section) = settings.auto_remove.as_mut() {
        section.active = false;
    }
    let harness = harness(dismissable(), RowText::uniform(""), settings);
    let mut state = state_for(&harness);
    harness.clock.advance(Duration::days(1));

    assert!(EvictionScanner::new(&harness.session)
        .find_positions_to_remove(&mut state)
        .expect("scan")
        .is_empty());
}

#[test]
fn expired_term_is_dismissed_and_timer_reset() {
    let harness = harness(dismissable(), RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);
    harness.clock.advance(Duration::seconds(600));

    let visit = EvictionScanner::new(&harness.session)
        .process_remove_position(Position::Military, &mut state);

    assert_eq!(visit.outcome, StepOutcome::Ok);
    assert_eq!(harness.device.taps(), vec![MILITARY_ICON, DISMISS, CONFIRM]);
    assert_eq!(
        state.last_approve_time(Position::Military),
        epoch() + Duration::seconds(600)
    );
    assert!(!state.removal_due(Position::Military, epoch() + Duration::seconds(1199)));
}

#[test]
fn queued_players_defer_the_removal() {
    let device = ScriptedDevice::new()
        .at_menu()
        .always("military", vec![MILITARY_ICON])
        .always("dismiss", vec![DISMISS]);
    let harness = harness(device, RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);
    harness.clock.advance(Duration::seconds(650));

    let visit = EvictionScanner::new(&harness.session)
        .process_remove_position(Position::Military, &mut state);

    assert_eq!(visit.outcome, StepOutcome::Skip(SkipReason::QueuePending));
    assert_eq!(harness.device.taps_at(DISMISS), 0);
    assert_eq!(
        state.last_approve_time(Position::Military),
        epoch() + Duration::seconds(650)
    );
}

#[test]
fn running_term_is_left_alone() {
    let device = ScriptedDevice::new()
        .at_menu()
        .always("military", vec![MILITARY_ICON])
        .always("empty_list", vec![Point::new(540, 900)])
        .always("dismiss", vec![DISMISS]);
    let harness = harness(device, RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);
    harness.clock.advance(Duration::seconds(600));

    let visit = EvictionScanner::new(&harness.session)
        .process_remove_position(Position::Military, &mut state);

    assert_eq!(visit.outcome, StepOutcome::Skip(SkipReason::NotDue));
    assert_eq!(harness.device.taps_at(DISMISS), 0);
    assert_eq!(
        state.last_approve_time(Position::Military),
        epoch() + Duration::seconds(600)
    );
}

#[test]
fn missing_dismiss_control_keeps_the_timer() {
    let device = ScriptedDevice::new()
        .at_menu()
        .always("military", vec![MILITARY_ICON])
        .always("empty_list", vec![Point::new(540, 900)])
        .always("appoint", vec![Point::new(300, 600)]);
    let harness = harness(device, RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);
    harness.clock.advance(Duration::seconds(600));

    let visit = EvictionScanner::new(&harness.session)
        .process_remove_position(Position::Military, &mut state);

    assert_eq!(visit.outcome, StepOutcome::Skip(SkipReason::DismissUnavailable));
    assert_eq!(state.last_approve_time(Position::Military), epoch());
}

#[test]
fn missing_icon_skips_without_recovery() {
    let harness = harness(ScriptedDevice::new().at_menu(), RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);

    let visit = EvictionScanner::new(&harness.session)
        .process_remove_position(Position::Military, &mut state);

    assert_eq!(visit.outcome, StepOutcome::Skip(SkipReason::PositionNotFound));
    assert_eq!(harness.device.back_presses(), 0);
}

#[test]
fn failed_recovery_after_removal_is_fatal() {
    let device = ScriptedDevice::new()
        .always("military", vec![MILITARY_ICON])
        .always("empty_list", vec![Point::new(540, 900)])
        .always("appoint", vec![Point::new(300, 600)])
        .always("dismiss", vec![DISMISS])
        .always("confirm-blue", vec![CONFIRM]);
    let harness = harness(device, RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);

    let visit = EvictionScanner::new(&harness.session)
        .process_remove_position(Position::Military, &mut state);

    assert_eq!(visit.outcome, StepOutcome::Fatal(FatalReason::RecoveryFailed));
    assert_eq!(harness.device.back_presses(), 10);
}

#[test]
fn lookup_failure_mid_removal_skips_after_recovery() {
    let device = dismissable()
        .failing_lookup("empty_list")
        .script("president", vec![vec![], vec![ANCHOR]]);
    let harness = harness(device, RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);
    harness.clock.advance(Duration::seconds(600));

    let visit = EvictionScanner::new(&harness.session)
        .process_remove_position(Position::Military, &mut state);

    assert_eq!(
        visit.outcome,
        StepOutcome::Skip(SkipReason::DeviceFailure(
            "screen capture failed: empty_list match timed out".to_string()
        ))
    );
    assert_eq!(harness.device.taps(), vec![MILITARY_ICON]);
    assert_eq!(harness.device.back_presses(), 1);
    assert_eq!(state.last_approve_time(Position::Military), epoch());
}

#[test]
fn lookup_failure_without_recovery_is_fatal() {
    let device = ScriptedDevice::new()
        .always("military", vec![MILITARY_ICON])
        .failing_lookup("empty_list");
    let harness = harness(device, RowText::uniform(""), military_settings());
    let mut state = state_for(&harness);

    let visit = EvictionScanner::new(&harness.session)
        .process_remove_position(Position::Military, &mut state);

    assert_eq!(visit.outcome, StepOutcome::Fatal(FatalReason::RecoveryFailed));
    assert_eq!(harness.device.back_presses(), 10);
}
