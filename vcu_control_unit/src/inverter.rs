//! Inverter protocol component.
//!
//! Builds the per-inverter setpoints into the store, transmits them as
//! setpoint frames, and evaluates the HV / bring-up / error predicates on
//! the decoded status records.
//!
//! - [`setpoint`] - Pure setpoint computation
//! - [`bppc`] - Hard-brake plausibility state machine
//! - [`checks`] - HV, bring-up, contactor and error predicates

pub mod bppc;
pub mod checks;
pub mod setpoint;

use tracing::trace;

use vcu_common::protocol::codec::encode_setpoint;
use vcu_common::protocol::frame::{CanChannel, CanFrame};
use vcu_common::protocol::ids::setpoint_id;
use vcu_common::vehicle::config::{CanConfig, VcuConfig};
use vcu_common::vehicle::inverter::InverterId;
use vcu_common::vehicle::state::VehicleState;

use crate::io::{FrameSink, IoCounters, send_or_drop};
use bppc::BppcAction;
use setpoint::{bringup_setpoint, error_reset_setpoint, hard_brake_setpoint};

/// Bus an inverter is wired to.
#[inline]
pub fn channel_for(inverter: InverterId, can: &CanConfig) -> CanChannel {
    if inverter.is_front_pair() {
        can.front_pair_channel
    } else {
        can.rear_pair_channel
    }
}

/// Recompute every inverter's bring-up setpoint from its status and the gas pedal.
pub fn apply_bringup(state: &mut VehicleState, config: &VcuConfig) {
    let gas = state.pedal.gas;
    for id in InverterId::ALL {
        state.inverter_setpoint[id.index()] =
            bringup_setpoint(state.status(id), gas, &config.drive);
    }
}

/// Driving routine: plausibility check, then the matching setpoints.
pub fn driving_routine(state: &mut VehicleState, config: &VcuConfig) -> BppcAction {
    let action = bppc::evaluate(state, &config.hard_brake);
    match action {
        BppcAction::GasDerived => apply_bringup(state, config),
        BppcAction::Hold => {}
        BppcAction::ZeroTorque => {
            state.inverter_setpoint = [hard_brake_setpoint(config.hard_brake.torque_limit); 4];
        }
    }
    action
}

/// Cyclic transmission of the stored setpoints, inverters 1..4 in order.
pub fn transmit_setpoints<IO: FrameSink + ?Sized>(
    io: &mut IO,
    state: &VehicleState,
    can: &CanConfig,
    counters: &mut IoCounters,
) {
    for id in InverterId::ALL {
        let frame = CanFrame::new(setpoint_id(id), encode_setpoint(state.setpoint(id)));
        send_or_drop(io, channel_for(id, can), &frame, counters);
    }
    trace!("setpoints transmitted");
}

/// Store and immediately send an error-reset request to every inverter.
pub fn send_error_reset<IO: FrameSink + ?Sized>(
    io: &mut IO,
    state: &mut VehicleState,
    can: &CanConfig,
    counters: &mut IoCounters,
) {
    state.inverter_setpoint = [error_reset_setpoint(0, 0); 4];
    transmit_setpoints(io, state, can, counters);
}
