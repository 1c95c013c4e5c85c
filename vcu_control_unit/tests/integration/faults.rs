//! Integration test: fault handling across stages.
//!
//! Stage-reset faults send every inverter an error reset and restart the
//! sequence at Init; reported faults leave the stage alone.

use vcu_common::protocol::codec::decode_setpoint;
use vcu_common::vehicle::config::{InverterErrorScan, VcuConfig};
use vcu_common::vehicle::fault::Fault;
use vcu_common::vehicle::inverter::{ControlBits, InverterId, InverterStatusFlags as F};
use vcu_common::vehicle::state::{PedalInputs, Stage};

use vcu_control_unit::io::{Indicator, RecordingIo};

use super::bench::{BRAKED, Bench, Inputs, RUNNING};

fn reset_frames(io: &RecordingIo) -> usize {
    io.frames()
        .filter(|f| {
            decode_setpoint(f)
                .map(|sp| sp.control == ControlBits::ERROR_RESET)
                .unwrap_or(false)
        })
        .count()
}

#[test]
fn inverter_error_while_driving_resets_to_init() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.drive();
    bench.vcu.io_mut().clear();

    bench.step(&Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv2, Some(RUNNING | F::ERROR)));

    let state = bench.vcu.state();
    assert_eq!(state.last_handled_fault, Fault::InverterComm);
    assert_eq!(state.system_fault, Fault::NoFault);
    assert!(!state.main_contactor);
    assert_eq!(state.counters.buzzer_phase, 0);
    assert!(!bench.io().is_on(Indicator::MainContactor));

    // Error reset to all four, nothing else on the bus this tick.
    assert_eq!(bench.io().frames().count(), 4);
    assert_eq!(reset_frames(bench.io()), 4);

    // Init holds for the reset tick; its checks run on the next one.
    assert_eq!(bench.stage(), Stage::Init);
    bench.vcu.io_mut().clear();
    bench.step(&Inputs::all(BRAKED, RUNNING));
    assert!(bench.io().is_on(Indicator::StageInitLamp));
    assert_eq!(bench.stage(), Stage::PreDrive);
    assert_eq!(bench.io().frames().count(), 0);

    // Fresh bring-up frames carry no reset bit and no request is pending.
    bench.step(&Inputs::all(BRAKED, RUNNING));
    assert_eq!(bench.stage(), Stage::PreDrive);
    assert_eq!(reset_frames(bench.io()), 0);
    for frame in bench.io().frames() {
        let sp = decode_setpoint(frame).unwrap();
        assert!(!sp.control.contains(ControlBits::ERROR_RESET));
    }
}

#[test]
fn hv_loss_while_driving_resets_on_the_next_tick() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.drive();

    let no_dc = RUNNING.difference(F::DC_ON);
    let inputs = Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv3, Some(no_dc));

    bench.step(&inputs);
    assert_eq!(bench.stage(), Stage::Driving);
    assert_eq!(bench.vcu.state().system_fault, Fault::Hv);

    bench.vcu.io_mut().clear();
    bench.step(&inputs);
    assert_eq!(bench.vcu.state().last_handled_fault, Fault::Hv);
    assert_eq!(reset_frames(bench.io()), 4);
    assert_eq!(bench.stage(), Stage::Init);
    // HV loss does not open the contactor.
    assert!(bench.io().is_on(Indicator::MainContactor));
}

#[test]
fn front_pair_scan_ignores_rear_inverters() {
    let mut config = VcuConfig::default();
    config.fault_policy.inverter_error_scan = InverterErrorScan::FrontPair;
    let mut bench = Bench::new(config);
    bench.drive();

    let faulted = Some(RUNNING | F::ERROR);
    bench.step(&Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv3, faulted));
    assert_eq!(bench.stage(), Stage::Driving);
    assert_eq!(bench.vcu.state().system_fault, Fault::NoFault);

    bench.step(&Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv1, faulted));
    assert_eq!(bench.vcu.state().last_handled_fault, Fault::InverterComm);
    assert_eq!(bench.stage(), Stage::Init);
}

#[test]
fn unacknowledged_fault_keeps_resetting() {
    let mut config = VcuConfig::default();
    config.fault_policy.acknowledge_reset_faults = false;
    let mut bench = Bench::new(config);
    bench.drive();

    let faulted =
        Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv4, Some(RUNNING | F::ERROR));
    bench.step(&faulted);
    assert_eq!(bench.stage(), Stage::Init);
    assert_eq!(bench.vcu.state().system_fault, Fault::InverterComm);
    assert_eq!(bench.vcu.state().last_handled_fault, Fault::NoFault);

    bench.vcu.io_mut().clear();
    // The latched code repeats the reset every tick, even once the error
    // bit is gone, so Init never gets to run.
    for _ in 0..3 {
        bench.step(&Inputs::all(BRAKED, RUNNING).r2d());
        assert_eq!(bench.stage(), Stage::Init);
        assert_eq!(bench.vcu.state().system_fault, Fault::InverterComm);
    }
    assert_eq!(reset_frames(bench.io()), 12);
    assert_eq!(bench.io().frames().count(), 12);
}

#[test]
fn persistent_inverter_error_holds_init() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.drive();

    let faulted =
        Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv2, Some(RUNNING | F::ERROR));
    for _ in 0..5 {
        bench.step(&faulted);
        assert_eq!(bench.stage(), Stage::Init);
        assert_eq!(bench.vcu.state().system_fault, Fault::NoFault);
    }

    bench.step(&Inputs::all(BRAKED, RUNNING));
    assert_eq!(bench.stage(), Stage::PreDrive);
}

#[test]
fn short_circuit_is_reported_without_stage_change() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.drive();

    let grounded = PedalInputs {
        gas: 0xFF10,
        ..PedalInputs::default()
    };
    bench.step(&Inputs::all(grounded, RUNNING));
    assert_eq!(bench.vcu.state().system_fault, Fault::ShortToGround);
    assert_eq!(bench.stage(), Stage::Driving);
    assert_eq!(reset_frames(bench.io()), 0);
    // A sentinel never turns into a velocity command.
    for id in InverterId::ALL {
        assert_eq!(bench.vcu.state().setpoint(id).target_velocity, 0);
    }

    let both = PedalInputs {
        gas: 0xFF10,
        brake: 0xFF11,
        ..PedalInputs::default()
    };
    bench.step(&Inputs::all(both, RUNNING));
    assert_eq!(bench.vcu.state().system_fault, Fault::ShortToSupply);
    assert_eq!(bench.stage(), Stage::Driving);
}
