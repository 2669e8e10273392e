use super::common::*;
use crate::workflows::secretary::{RecoveryController, MAX_RECOVERY_ATTEMPTS};

fn anchor_after(presses: usize) -> ScriptedDevice {
    let mut responses = vec![Vec::new(); presses];
    responses.push(vec![ANCHOR]);
    ScriptedDevice::new().script("president", responses)
}

#[test]
fn no_back_press_when_already_at_the_menu() {
    let harness = harness(ScriptedDevice::new().at_menu(), RowText::uniform(""), settings());

    assert!(RecoveryController::new(&harness.session).exit_to_secretary_menu());
    assert_eq!(harness.device.back_presses(), 0);
}

#[test]
fn returns_after_exactly_k_presses() {
    for k in [1, 3, MAX_RECOVERY_ATTEMPTS] {
        let harness = harness(anchor_after(k), RowText::uniform(""), settings());

        assert!(
            RecoveryController::new(&harness.session).exit_to_secretary_menu(),
            "anchor after {k} presses"
        );
        assert_eq!(harness.device.back_presses(), k);
    }
}

#[test]
fn gives_up_after_ten_presses() {
    let harness = harness(anchor_after(MAX_RECOVERY_ATTEMPTS + 1), RowText::uniform(""), settings());

    assert!(!RecoveryController::new(&harness.session).exit_to_secretary_menu());
    assert_eq!(harness.device.back_presses(), MAX_RECOVERY_ATTEMPTS);
}

#[test]
fn back_key_failure_ends_recovery() {
    let device = ScriptedDevice::new().failing_back();
    let harness = harness(device, RowText::uniform(""), settings());

    assert!(!RecoveryController::new(&harness.session).exit_to_secretary_menu());
    assert_eq!(harness.device.back_presses(), 0);
}
