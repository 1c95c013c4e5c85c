//! Integration test: ready-to-drive handshake.
//!
//! Init → PreDrive → InverterBringup → Driving, hand-fed and closed-loop
//! against the simulation plant.

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;

use vcu_common::protocol::codec::decode_setpoint;
use vcu_common::protocol::frame::CanFrame;
use vcu_common::vehicle::config::VcuConfig;
use vcu_common::vehicle::fault::Fault;
use vcu_common::vehicle::inverter::{ControlBits, InverterId, InverterStatusFlags as F};
use vcu_common::vehicle::state::{PedalInputs, Stage};

use vcu_control_unit::cycle::CycleRunner;
use vcu_control_unit::io::{InboundQueue, Indicator};
use vcu_control_unit::sim::{DriverScript, SimBus, SimVehicle};
use vcu_control_unit::vcu::Vcu;

use super::bench::{BRAKED, Bench, Inputs, RUNNING};

// ── Hand-fed ────────────────────────────────────────────────────────

#[test]
fn init_holds_until_every_node_reports() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY).with_inverter(InverterId::Inv3, None));
    assert_eq!(bench.stage(), Stage::Init);
    assert!(bench.io().is_on(Indicator::StageInitLamp));

    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY));
    assert_eq!(bench.stage(), Stage::PreDrive);
    assert_eq!(bench.vcu.state().system_fault, Fault::NoFault);
}

#[test]
fn uncalibrated_pedal_blocks_init() {
    let mut bench = Bench::new(VcuConfig::default());
    let pedal = PedalInputs {
        gas: 0xFFFF,
        ..BRAKED
    };
    bench.step(&Inputs::all(pedal, F::SYSTEM_READY));
    assert_eq!(bench.stage(), Stage::Init);
    assert_eq!(bench.vcu.state().system_fault, Fault::SensorsNotCalibrated);

    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY));
    assert_eq!(bench.stage(), Stage::PreDrive);
}

#[test]
fn pre_drive_sends_bringup_frames_without_torque() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY));
    bench.vcu.io_mut().clear();

    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY | F::HV_CONFIRMED));
    let frames: Vec<CanFrame> = bench.io().frames().copied().collect();
    assert_eq!(
        frames.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![0x184, 0x185, 0x188, 0x189]
    );
    for frame in &frames {
        let sp = decode_setpoint(frame).unwrap();
        assert_eq!(
            sp.control,
            ControlBits::INVERTER_ON | ControlBits::DC_ON | ControlBits::ENABLE
        );
        assert_eq!(sp.target_velocity, 0);
        assert_eq!((sp.positive_torque_limit, sp.negative_torque_limit), (0, 0));
    }
}

#[test]
fn hand_fed_handshake_closes_contactor() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.drive();
    assert!(bench.io().is_on(Indicator::MainContactor));
    assert!(bench.vcu.state().main_contactor);

    let pedal = PedalInputs {
        gas: 40,
        ..PedalInputs::default()
    };
    bench.step(&Inputs::all(pedal, RUNNING));
    assert!(bench.io().is_on(Indicator::StageDriveLamp));
    assert!(!bench.io().is_on(Indicator::StagePreDriveLamp));
    assert!(!bench.io().is_on(Indicator::StageInitLamp));
    for id in InverterId::ALL {
        let sp = bench.vcu.state().setpoint(id);
        assert_eq!(sp.target_velocity, 400);
        assert_eq!(sp.positive_torque_limit, 1000);
        assert_eq!(sp.negative_torque_limit, -1000);
    }
}

#[test]
fn contactor_waits_for_every_inverter() {
    let mut bench = Bench::new(VcuConfig::default());
    bench.step(&Inputs::all(BRAKED, F::SYSTEM_READY));
    let lagging = F::SYSTEM_READY | F::HV_CONFIRMED;
    bench.step(&Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv2, Some(lagging)).r2d());
    assert_eq!(bench.stage(), Stage::InverterBringup);

    for _ in 0..5 {
        bench.step(&Inputs::all(BRAKED, RUNNING).with_inverter(InverterId::Inv2, Some(lagging)));
        assert_eq!(bench.stage(), Stage::InverterBringup);
        assert!(!bench.io().is_on(Indicator::MainContactor));
    }

    bench.step(&Inputs::all(BRAKED, RUNNING));
    assert!(bench.io().is_on(Indicator::MainContactor));
    assert_eq!(bench.stage(), Stage::Driving);
}

// ── Closed loop ─────────────────────────────────────────────────────

fn sim_vcu(config: VcuConfig) -> (Vcu<SimBus, InboundQueue>, SimVehicle) {
    (
        Vcu::new(config, SimBus::new(), InboundQueue::new()),
        SimVehicle::new(DriverScript::default()),
    )
}

fn step_plant(tick: u64, vcu: &mut Vcu<SimBus, InboundQueue>, plant: &mut SimVehicle) {
    let sent = vcu.io_mut().take_sent();
    for frame in plant.step(tick, &sent) {
        vcu.inbound_mut().push_back(frame).unwrap();
    }
}

#[test]
fn simulated_vehicle_reaches_driving() {
    let (mut vcu, mut plant) = sim_vcu(VcuConfig::default());
    let mut driving_at = None;
    for tick in 0..130 {
        step_plant(tick, &mut vcu, &mut plant);
        vcu.tick();
        if driving_at.is_none() && vcu.state().stage == Stage::Driving {
            driving_at = Some(tick);
        }
    }

    // Ready-to-drive is pressed at plant tick 20 and accepted the tick after.
    let driving_at = driving_at.expect("never reached Driving");
    assert!((20..=25).contains(&driving_at), "driving at {driving_at}");
    assert_eq!(vcu.state().stage, Stage::Driving);
    assert_eq!(vcu.state().system_fault, Fault::NoFault);
    assert!(vcu.io().is_on(Indicator::MainContactor));
    assert!(vcu.io().tone_active());

    // Brake released at 60, gas ramps to 60 by plant tick 120.
    assert!(!vcu.io().is_on(Indicator::BrakeLight));
    for id in InverterId::ALL {
        assert_eq!(vcu.state().setpoint(id).target_velocity, 600);
        assert!(plant.inverter(id).is_on());
        assert!(plant.inverter(id).speed() > 0);
    }
    assert_eq!(vcu.counters().rx_malformed, 0);
    assert_eq!(vcu.counters().tx_dropped, 0);
}

#[test]
fn runner_drives_the_plant() {
    let config = VcuConfig {
        tick_period_us: 1_000,
        diag_interval_ticks: 10,
        ..VcuConfig::default()
    };
    let (vcu, mut plant) = sim_vcu(config);
    let mut runner = CycleRunner::new(vcu).unwrap();
    let running = AtomicBool::new(true);

    runner
        .run(&running, Some(40), |tick, vcu| step_plant(tick, vcu, &mut plant))
        .unwrap();

    assert_eq!(runner.stats().cycle_count, 40);
    assert_eq!(runner.vcu().ticks(), 40);
    assert_eq!(runner.vcu().state().stage, Stage::Driving);
}

#[test]
fn vec_deque_source_behaves_like_the_bounded_queue() {
    let mut vcu: Vcu<SimBus, VecDeque<CanFrame>> =
        Vcu::new(VcuConfig::default(), SimBus::new(), VecDeque::new());
    let mut plant = SimVehicle::new(DriverScript::default());
    for tick in 0..30 {
        let sent = vcu.io_mut().take_sent();
        vcu.inbound_mut().extend(plant.step(tick, &sent));
        vcu.tick();
    }
    assert_eq!(vcu.state().stage, Stage::Driving);
}
