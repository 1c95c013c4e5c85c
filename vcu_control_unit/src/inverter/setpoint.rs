//! Pure setpoint computation.
//!
//! The control byte is always rebuilt from a [`ControlIntent`], so nothing
//! set on a previous tick or before a stage reset leaks into a new frame.

use vcu_common::protocol::codec::is_sensor_sentinel;
use vcu_common::vehicle::config::DriveConfig;
use vcu_common::vehicle::inverter::{
    ControlIntent, InverterSetpoint, InverterStatus, InverterStatusFlags,
};

/// Velocity commanded for a gas position: `max_velocity * gas / 100`, truncated.
///
/// A sensor sentinel in place of the gas value commands zero.
#[inline]
pub fn target_velocity(gas: u16, max_velocity: i16) -> i16 {
    if is_sensor_sentinel(gas) {
        return 0;
    }
    (f32::from(max_velocity) * (f32::from(gas) / 100.0)) as i16
}

/// Bring-up / normal driving setpoint for one inverter.
///
/// Torque is only released once the inverter has acknowledged enable;
/// before that the frame carries the enable bits with zero velocity and
/// zero limits.
pub fn bringup_setpoint(status: &InverterStatus, gas: u16, drive: &DriveConfig) -> InverterSetpoint {
    let control = ControlIntent::BRINGUP.control_bits();
    if status.flags.contains(InverterStatusFlags::INVERTER_QUIT_ACK) {
        InverterSetpoint {
            control,
            target_velocity: target_velocity(gas, drive.max_velocity),
            positive_torque_limit: drive.bringup_torque_limit,
            negative_torque_limit: -drive.bringup_torque_limit,
        }
    } else {
        InverterSetpoint::zero_torque(control, 0, 0)
    }
}

/// Zero velocity under the hard-brake limits, enable bits kept.
#[inline]
pub fn hard_brake_setpoint(torque_limit: i16) -> InverterSetpoint {
    InverterSetpoint::zero_torque(ControlIntent::BRINGUP.control_bits(), torque_limit, -torque_limit)
}

/// Error-reset request: only the reset bit, zero velocity, given limits.
#[inline]
pub fn error_reset_setpoint(positive: i16, negative: i16) -> InverterSetpoint {
    InverterSetpoint::zero_torque(ControlIntent::ERROR_RESET.control_bits(), positive, negative)
}
