//! Integration test: communication liveness.
//!
//! Every node must be heard from within each liveness window; a silent
//! inverter resets the sequence, a silent pedal box is only reported.

use vcu_common::protocol::codec::decode_setpoint;
use vcu_common::vehicle::config::VcuConfig;
use vcu_common::vehicle::fault::Fault;
use vcu_common::vehicle::inverter::{ControlBits, InverterId, InverterStatusFlags as F};
use vcu_common::vehicle::state::Stage;

use vcu_control_unit::io::Indicator;

use super::bench::{BRAKED, Bench, Inputs, RUNNING};

fn short_window() -> VcuConfig {
    let mut config = VcuConfig::default();
    config.liveness.timeout_ticks = 10;
    config
}

#[test]
fn silent_inverter_resets_at_window_end() {
    let mut bench = Bench::new(short_window());
    bench.drive();

    let muted = Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv4, None);
    // Inverter 4 was heard in ticks 1..=3, so the first window passes.
    for _ in 4..=19 {
        bench.step(&muted);
        assert_eq!(bench.stage(), Stage::Driving);
    }

    bench.step(&muted);
    assert_eq!(bench.vcu.ticks(), 20);
    assert_eq!(bench.vcu.state().last_handled_fault, Fault::InverterComm);
    // Init holds for the reset tick.
    assert_eq!(bench.stage(), Stage::Init);
    assert!(!bench.io().is_on(Indicator::MainContactor));
}

#[test]
fn silent_pedal_box_is_reported_only() {
    let mut bench = Bench::new(short_window());
    bench.drive();
    bench.vcu.io_mut().clear();

    let mut muted = Inputs::all(BRAKED, RUNNING);
    muted.pedal = None;
    for _ in 4..=20 {
        bench.step(&muted);
    }
    assert_eq!(bench.vcu.state().system_fault, Fault::PedalComm);
    assert_eq!(bench.stage(), Stage::Driving);
    assert!(bench.io().frames().all(|f| {
        !decode_setpoint(f)
            .unwrap()
            .control
            .contains(ControlBits::ERROR_RESET)
    }));
}

#[test]
fn node_missing_from_start_holds_init_and_resets() {
    let mut bench = Bench::new(short_window());
    let inputs = Inputs::all(BRAKED, F::SYSTEM_READY).with_inverter(InverterId::Inv1, None);

    for _ in 0..9 {
        bench.step(&inputs);
        assert_eq!(bench.stage(), Stage::Init);
    }
    assert_eq!(bench.io().frames().count(), 0);

    bench.step(&inputs);
    assert_eq!(bench.stage(), Stage::Init);
    assert_eq!(bench.vcu.state().last_handled_fault, Fault::InverterComm);
    assert_eq!(bench.io().frames().count(), 4);

    // Once the node speaks, the next tick leaves Init.
    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY));
    assert_eq!(bench.stage(), Stage::PreDrive);
}
