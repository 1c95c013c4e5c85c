//! Integration test: lamps, brake light and the ready-to-drive buzzer.

use vcu_common::vehicle::config::VcuConfig;
use vcu_common::vehicle::inverter::{InverterId, InverterStatusFlags as F};
use vcu_common::vehicle::state::{PedalInputs, Stage};

use vcu_control_unit::io::{Indicator, Level};

use super::bench::{BRAKED, Bench, Inputs, RUNNING};

#[test]
fn buzzer_sounds_once_per_drive() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.drive();

    let cruise = Inputs::all(BRAKED, RUNNING);
    bench.step(&cruise);
    assert_eq!(bench.io().tone_starts(), 1);
    for _ in 0..149 {
        bench.step(&cruise);
        assert!(bench.io().tone_active());
    }
    bench.step(&cruise);
    assert!(!bench.io().tone_active());
    assert_eq!(bench.io().tone_stops(), 1);

    for _ in 0..5 {
        bench.step(&cruise);
    }
    assert_eq!(bench.io().tone_starts(), 1);
    assert_eq!(bench.io().tone_stops(), 1);
}

#[test]
fn fault_reset_rearms_the_buzzer() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.drive();
    bench.step(&Inputs::all(BRAKED, RUNNING));
    assert_eq!(bench.io().tone_starts(), 1);

    bench.step(&Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv1, Some(RUNNING | F::ERROR)));
    assert_eq!(bench.stage(), Stage::Init);
    bench.step(&Inputs::all(BRAKED, RUNNING));
    assert_eq!(bench.stage(), Stage::PreDrive);

    bench.step(&Inputs::all(BRAKED, RUNNING).r2d());
    bench.step(&Inputs::all(BRAKED, RUNNING));
    assert_eq!(bench.stage(), Stage::Driving);
    bench.step(&Inputs::all(BRAKED, RUNNING));
    assert_eq!(bench.io().tone_starts(), 2);
}

#[test]
fn brake_light_follows_intensity_in_every_stage() {
    let mut bench = Bench::new(VcuConfig::default());
    let with_intensity = |brake_intensity| PedalInputs {
        brake_intensity,
        ..PedalInputs::default()
    };

    bench.step(&Inputs::all(with_intensity(5), F::SYSTEM_READY));
    assert!(!bench.io().is_on(Indicator::BrakeLight));
    bench.step(&Inputs::all(with_intensity(6), F::SYSTEM_READY));
    assert!(bench.io().is_on(Indicator::BrakeLight));
    assert_eq!(bench.stage(), Stage::PreDrive);
    bench.step(&Inputs::all(with_intensity(0), F::SYSTEM_READY));
    assert!(!bench.io().is_on(Indicator::BrakeLight));
}

#[test]
fn bringup_lamp_blinks_while_waiting() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY));
    let lagging = F::SYSTEM_READY | F::HV_CONFIRMED;
    bench.step(&Inputs::all(BRAKED, lagging).r2d());
    assert_eq!(bench.stage(), Stage::InverterBringup);
    // PreDrive left its lamp on.
    assert!(bench.io().is_on(Indicator::StagePreDriveLamp));

    let mut seen = Vec::new();
    for _ in 0..4 {
        bench.step(&Inputs::all(BRAKED, lagging));
        seen.push(bench.io().is_on(Indicator::StagePreDriveLamp));
        assert!(!bench.io().is_on(Indicator::StageDriveLamp));
    }
    assert_eq!(seen, vec![false, true, false, true]);
    assert_eq!(
        bench.io().indicator_calls(Indicator::StagePreDriveLamp, Level::Toggle),
        4
    );
}
