//! Integration test: ready-to-drive debounce in PreDrive.
//!
//! The latched button request is accepted only together with a pressed
//! brake and confirmed HV, within a fixed window.

use vcu_common::vehicle::config::VcuConfig;
use vcu_common::vehicle::inverter::InverterStatusFlags as F;
use vcu_common::vehicle::state::{PedalInputs, Stage};

use super::bench::{BRAKED, Bench, Inputs, RUNNING};

const FREE: PedalInputs = PedalInputs {
    gas: 0,
    brake: 0,
    steering_angle: 0,
    brake_intensity: 0,
};

fn in_pre_drive() -> Bench {
    let mut bench = Bench::new(VcuConfig::default());
    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY));
    assert_eq!(bench.stage(), Stage::PreDrive);
    bench
}

#[test]
fn request_without_brake_expires_after_window() {
    let mut bench = in_pre_drive();

    bench.step(&Inputs::all(FREE, RUNNING).r2d());
    assert!(bench.vcu.state().dashboard.ready_to_drive_requested);

    for _ in 0..8 {
        bench.step(&Inputs::all(FREE, RUNNING));
        assert!(bench.vcu.state().dashboard.ready_to_drive_requested);
    }
    assert_eq!(bench.vcu.state().counters.ready_to_drive_debounce, 9);

    bench.step(&Inputs::all(FREE, RUNNING));
    assert!(!bench.vcu.state().dashboard.ready_to_drive_requested);
    assert_eq!(bench.vcu.state().counters.ready_to_drive_debounce, 0);

    // Brake alone does not revive an expired request.
    bench.step(&Inputs::all(BRAKED, RUNNING));
    assert_eq!(bench.stage(), Stage::PreDrive);

    bench.step(&Inputs::all(BRAKED, RUNNING).r2d());
    assert_eq!(bench.stage(), Stage::InverterBringup);
}

#[test]
fn request_waits_for_hv_within_window() {
    let mut bench = in_pre_drive();

    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY).r2d());
    for _ in 0..3 {
        bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY));
        assert_eq!(bench.stage(), Stage::PreDrive);
    }

    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY | F::HV_CONFIRMED));
    assert_eq!(bench.stage(), Stage::InverterBringup);
    assert!(!bench.vcu.state().dashboard.ready_to_drive_requested);
}

#[test]
fn brake_threshold_is_strict() {
    let mut bench = in_pre_drive();
    let at_threshold = PedalInputs {
        brake: 5,
        brake_intensity: 5,
        ..FREE
    };
    bench.step(&Inputs::all(at_threshold, RUNNING).r2d());
    assert_eq!(bench.stage(), Stage::PreDrive);

    let above = PedalInputs {
        brake: 6,
        brake_intensity: 6,
        ..FREE
    };
    bench.step(&Inputs::all(above, RUNNING));
    assert_eq!(bench.stage(), Stage::InverterBringup);
}

#[test]
fn request_during_bringup_does_not_carry_over() {
    let mut bench = in_pre_drive();
    let lagging = F::SYSTEM_READY | F::HV_CONFIRMED;
    bench.step(&Inputs::all(BRAKED, lagging).r2d());
    assert_eq!(bench.stage(), Stage::InverterBringup);

    bench.step(&Inputs::all(BRAKED, lagging).r2d());
    assert!(!bench.vcu.state().dashboard.ready_to_drive_requested);
}
