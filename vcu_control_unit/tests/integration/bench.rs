//! Hand-fed test bench around the core.

use std::collections::VecDeque;

use vcu_common::protocol::codec::{StatusA, encode_dashboard, encode_pedal, encode_status_a};
use vcu_common::protocol::frame::CanFrame;
use vcu_common::protocol::ids::{DASHBOARD_ID, PEDAL_ID, status_a_id};
use vcu_common::vehicle::config::VcuConfig;
use vcu_common::vehicle::inverter::{InverterId, InverterStatusFlags as F};
use vcu_common::vehicle::state::{PedalInputs, Stage};

use vcu_control_unit::io::RecordingIo;
use vcu_control_unit::vcu::Vcu;

/// Inverter fully brought up: ready, HV confirmed, enable acknowledged.
pub const RUNNING: F = F::SYSTEM_READY
    .union(F::HV_CONFIRMED)
    .union(F::BRINGUP_CONFIRMED);

/// Brake held, no gas.
pub const BRAKED: PedalInputs = PedalInputs {
    gas: 0,
    brake: 30,
    steering_angle: 0,
    brake_intensity: 30,
};

/// One tick worth of inbound traffic.
#[derive(Debug, Clone, Copy)]
pub struct Inputs {
    pub pedal: Option<PedalInputs>,
    pub ready_to_drive: bool,
    /// `None` leaves that inverter silent.
    pub inverters: [Option<F>; 4],
}

impl Inputs {
    pub fn all(pedal: PedalInputs, flags: F) -> Self {
        Self {
            pedal: Some(pedal),
            ready_to_drive: false,
            inverters: [Some(flags); 4],
        }
    }

    pub fn r2d(mut self) -> Self {
        self.ready_to_drive = true;
        self
    }

    pub fn with_inverter(mut self, id: InverterId, flags: Option<F>) -> Self {
        self.inverters[id.index()] = flags;
        self
    }
}

pub struct Bench {
    pub vcu: Vcu<RecordingIo, VecDeque<CanFrame>>,
}

impl Bench {
    pub fn new(config: VcuConfig) -> Self {
        Self {
            vcu: Vcu::new(config, RecordingIo::new(), VecDeque::new()),
        }
    }

    pub fn stage(&self) -> Stage {
        self.vcu.state().stage
    }

    pub fn io(&self) -> &RecordingIo {
        self.vcu.io()
    }

    pub fn feed(&mut self, inputs: &Inputs) {
        let rx = self.vcu.inbound_mut();
        if let Some(pedal) = inputs.pedal {
            rx.push_back(CanFrame::new(PEDAL_ID, encode_pedal(&pedal)));
        }
        rx.push_back(CanFrame::new(DASHBOARD_ID, encode_dashboard(inputs.ready_to_drive)));
        for id in InverterId::ALL {
            if let Some(flags) = inputs.inverters[id.index()] {
                let status = StatusA {
                    flags,
                    ..StatusA::default()
                };
                rx.push_back(CanFrame::new(status_a_id(id), encode_status_a(&status)));
            }
        }
    }

    /// Feed one tick of traffic and run the tick.
    pub fn step(&mut self, inputs: &Inputs) {
        self.feed(inputs);
        self.vcu.tick();
    }

    /// Standard handshake with every node healthy: three ticks to `Driving`.
    pub fn drive(&mut self) {
        self.step(&Inputs::all(BRAKED, F::SYSTEM_READY));
        assert_eq!(self.stage(), Stage::PreDrive);
        self.step(&Inputs::all(BRAKED, RUNNING).r2d());
        assert_eq!(self.stage(), Stage::InverterBringup);
        self.step(&Inputs::all(BRAKED, RUNNING));
        assert_eq!(self.stage(), Stage::Driving);
    }
}
