//! Periodic diagnostic snapshot of the store.

use serde::Serialize;

use vcu_common::consts::NUM_INVERTERS;
use vcu_common::vehicle::fault::Fault;
use vcu_common::vehicle::inverter::InverterId;
use vcu_common::vehicle::state::{Stage, VehicleState};

use crate::io::IoCounters;

/// Flattened view of one inverter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InverterSnapshot {
    pub status_bits: u8,
    pub actual_speed: i16,
    pub motor_temperature: i16,
    pub last_fault_code: u16,
    pub control_bits: u8,
    pub target_velocity: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleSnapshot {
    pub tick: u64,
    pub stage: Stage,
    pub stage_code: u8,
    pub system_fault: Fault,
    pub fault_code: u16,
    pub last_handled_fault: Fault,
    pub gas: u16,
    pub brake: u16,
    pub steering_angle: i16,
    pub brake_intensity: u16,
    pub ready_to_drive_requested: bool,
    pub liveness_bits: u8,
    pub hard_brake_active: bool,
    pub main_contactor: bool,
    pub buzzer_phase: u16,
    pub inverters: [InverterSnapshot; NUM_INVERTERS],
    pub io: IoCounters,
}

impl VehicleSnapshot {
    pub fn capture(tick: u64, state: &VehicleState, io: &IoCounters) -> Self {
        let inverters = InverterId::ALL.map(|id| {
            let status = state.status(id);
            let setpoint = state.setpoint(id);
            InverterSnapshot {
                status_bits: status.flags.bits(),
                actual_speed: status.actual_speed,
                motor_temperature: status.motor_temperature,
                last_fault_code: status.last_fault_code,
                control_bits: setpoint.control.bits(),
                target_velocity: setpoint.target_velocity,
            }
        });
        Self {
            tick,
            stage: state.stage,
            stage_code: state.stage.code(),
            system_fault: state.system_fault,
            fault_code: state.system_fault.code(),
            last_handled_fault: state.last_handled_fault,
            gas: state.pedal.gas,
            brake: state.pedal.brake,
            steering_angle: state.pedal.steering_angle,
            brake_intensity: state.pedal.brake_intensity,
            ready_to_drive_requested: state.dashboard.ready_to_drive_requested,
            liveness_bits: state.liveness.bits(),
            hard_brake_active: state.hard_brake_active,
            main_contactor: state.main_contactor,
            buzzer_phase: state.counters.buzzer_phase,
            inverters,
            io: *io,
        }
    }

    /// JSON encoding for the log line.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
