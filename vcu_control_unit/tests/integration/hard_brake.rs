//! Integration test: brake-pedal plausibility while driving.

use vcu_common::vehicle::config::VcuConfig;
use vcu_common::vehicle::inverter::InverterId;
use vcu_common::vehicle::state::{PedalInputs, Stage};

use super::bench::{Bench, Inputs, RUNNING};

fn pedal(gas: u16, brake: u16) -> Inputs {
    Inputs::all(
        PedalInputs {
            gas,
            brake,
            steering_angle: 0,
            brake_intensity: brake,
        },
        RUNNING,
    )
}

/// Thresholds reachable within the pedal range.
fn reachable() -> VcuConfig {
    let mut config = VcuConfig::default();
    config.hard_brake.gas_high = 60;
    config.hard_brake.brake_high = 60;
    config.hard_brake.gas_low = 20;
    config.hard_brake.entry_ticks = 3;
    config.hard_brake.exit_ticks = 2;
    config.hard_brake.torque_limit = 500;
    config
}

fn velocity_and_limits(bench: &Bench) -> (i16, i16, i16) {
    let sp = bench.vcu.state().setpoint(InverterId::Inv1);
    (sp.target_velocity, sp.positive_torque_limit, sp.negative_torque_limit)
}

#[test]
fn sustained_gas_and_brake_cut_torque_until_gas_released() {
    let mut bench = Bench::new(reachable());
    bench.drive();

    bench.step(&pedal(80, 0));
    assert_eq!(velocity_and_limits(&bench), (800, 1000, -1000));

    // Counting toward entry: the last setpoints are held.
    for _ in 0..2 {
        bench.step(&pedal(80, 80));
        assert!(!bench.vcu.state().hard_brake_active);
        assert_eq!(velocity_and_limits(&bench), (800, 1000, -1000));
    }

    bench.step(&pedal(80, 80));
    assert!(bench.vcu.state().hard_brake_active);
    assert_eq!(velocity_and_limits(&bench), (0, 500, -500));

    // Brake released but gas still high: stays latched.
    bench.step(&pedal(80, 0));
    assert!(bench.vcu.state().hard_brake_active);
    assert_eq!(velocity_and_limits(&bench), (0, 500, -500));

    bench.step(&pedal(10, 0));
    assert!(bench.vcu.state().hard_brake_active);

    // Exit tick still carries zero torque.
    bench.step(&pedal(10, 0));
    assert!(!bench.vcu.state().hard_brake_active);
    assert_eq!(velocity_and_limits(&bench), (0, 500, -500));

    bench.step(&pedal(10, 0));
    assert_eq!(velocity_and_limits(&bench), (100, 1000, -1000));
    assert_eq!(bench.stage(), Stage::Driving);
}

#[test]
fn interrupted_condition_restarts_the_count() {
    let mut bench = Bench::new(reachable());
    bench.drive();

    for _ in 0..2 {
        bench.step(&pedal(80, 80));
    }
    bench.step(&pedal(80, 0));
    assert_eq!(bench.vcu.state().counters.hard_brake, 0);
    assert_eq!(velocity_and_limits(&bench), (800, 1000, -1000));

    for _ in 0..2 {
        bench.step(&pedal(80, 80));
    }
    assert!(!bench.vcu.state().hard_brake_active);
}

#[test]
fn stock_thresholds_are_out_of_pedal_range() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.drive();

    // Pedal frames clamp to 100, below the stock 250 / 300 thresholds.
    for _ in 0..30 {
        bench.step(&pedal(1000, 1000));
        assert!(!bench.vcu.state().hard_brake_active);
    }
    assert_eq!(velocity_and_limits(&bench), (1000, 1000, -1000));
}
