//! Bit-exact frame codecs.
//!
//! All multi-byte fields are little-endian. Decoders check the received
//! length against the bytes they read and return [`FrameError::TooShort`]
//! instead of reading stale buffer contents.

use thiserror::Error;

use super::frame::CanFrame;
use crate::consts::{
    FRAME_LEN, SENSOR_SHORT_TO_GROUND, SENSOR_SHORT_TO_SUPPLY, SENSOR_UNCALIBRATED,
};
use crate::vehicle::config::PedalConfig;
use crate::vehicle::inverter::{ControlBits, InverterSetpoint, InverterStatus, InverterStatusFlags};
use crate::vehicle::state::PedalInputs;

/// Frame decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame {id:#05x} too short: {len} bytes, need {need}")]
    TooShort { id: u32, len: u8, need: u8 },

    #[error("unknown message id {0:#05x}")]
    UnknownId(u32),
}

/// Minimum payload lengths.
pub const SETPOINT_LEN: u8 = 8;
pub const STATUS_A_LEN: u8 = 8;
pub const STATUS_B_LEN: u8 = 6;
pub const PEDAL_LEN: u8 = 8;
pub const DASHBOARD_LEN: u8 = 4;

#[inline]
fn require(frame: &CanFrame, need: u8) -> Result<(), FrameError> {
    if frame.len < need {
        return Err(FrameError::TooShort {
            id: frame.id,
            len: frame.len,
            need,
        });
    }
    Ok(())
}

#[inline]
fn u16_at(data: &[u8; FRAME_LEN], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

#[inline]
fn i16_at(data: &[u8; FRAME_LEN], at: usize) -> i16 {
    i16::from_le_bytes([data[at], data[at + 1]])
}

#[inline]
fn put(data: &mut [u8; FRAME_LEN], at: usize, bytes: [u8; 2]) {
    data[at..at + 2].copy_from_slice(&bytes);
}

// ─── Setpoint ───────────────────────────────────────────────────────

/// Encode a setpoint: byte0 reserved, byte1 control bits, then
/// velocity, positive and negative torque limit as `i16`.
pub fn encode_setpoint(setpoint: &InverterSetpoint) -> [u8; FRAME_LEN] {
    let mut data = [0u8; FRAME_LEN];
    data[1] = setpoint.control.bits();
    put(&mut data, 2, setpoint.target_velocity.to_le_bytes());
    put(&mut data, 4, setpoint.positive_torque_limit.to_le_bytes());
    put(&mut data, 6, setpoint.negative_torque_limit.to_le_bytes());
    data
}

/// Decode a setpoint frame. Unknown control bits are dropped.
pub fn decode_setpoint(frame: &CanFrame) -> Result<InverterSetpoint, FrameError> {
    require(frame, SETPOINT_LEN)?;
    Ok(InverterSetpoint {
        control: ControlBits::from_bits_truncate(frame.data[1]),
        target_velocity: i16_at(&frame.data, 2),
        positive_torque_limit: i16_at(&frame.data, 4),
        negative_torque_limit: i16_at(&frame.data, 6),
    })
}

// ─── Inverter status ────────────────────────────────────────────────

/// Status A fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusA {
    pub flags: InverterStatusFlags,
    pub actual_speed: i16,
    pub torque_current: i16,
    pub magnetizing_current: i16,
}

impl StatusA {
    /// Write into an inverter record, leaving status-B fields untouched.
    pub fn apply(&self, status: &mut InverterStatus) {
        status.flags = self.flags;
        status.actual_speed = self.actual_speed;
        status.torque_current = self.torque_current;
        status.magnetizing_current = self.magnetizing_current;
    }
}

pub fn decode_status_a(frame: &CanFrame) -> Result<StatusA, FrameError> {
    require(frame, STATUS_A_LEN)?;
    Ok(StatusA {
        flags: InverterStatusFlags::from_bits_retain(frame.data[1]),
        actual_speed: i16_at(&frame.data, 2),
        torque_current: i16_at(&frame.data, 4),
        magnetizing_current: i16_at(&frame.data, 6),
    })
}

pub fn encode_status_a(status: &StatusA) -> [u8; FRAME_LEN] {
    let mut data = [0u8; FRAME_LEN];
    data[1] = status.flags.bits();
    put(&mut data, 2, status.actual_speed.to_le_bytes());
    put(&mut data, 4, status.torque_current.to_le_bytes());
    put(&mut data, 6, status.magnetizing_current.to_le_bytes());
    data
}

/// Status B fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusB {
    pub motor_temperature: i16,
    pub plate_temperature: i16,
    pub error_code: u16,
}

impl StatusB {
    pub fn apply(&self, status: &mut InverterStatus) {
        status.motor_temperature = self.motor_temperature;
        status.plate_temperature = self.plate_temperature;
        status.last_fault_code = self.error_code;
    }
}

pub fn decode_status_b(frame: &CanFrame) -> Result<StatusB, FrameError> {
    require(frame, STATUS_B_LEN)?;
    Ok(StatusB {
        motor_temperature: i16_at(&frame.data, 0),
        plate_temperature: i16_at(&frame.data, 2),
        error_code: u16_at(&frame.data, 4),
    })
}

pub fn encode_status_b(status: &StatusB) -> [u8; FRAME_LEN] {
    let mut data = [0u8; FRAME_LEN];
    put(&mut data, 0, status.motor_temperature.to_le_bytes());
    put(&mut data, 2, status.plate_temperature.to_le_bytes());
    put(&mut data, 4, status.error_code.to_le_bytes());
    data
}

// ─── Pedal box ──────────────────────────────────────────────────────

/// True for the reserved raw values that must reach the supervisor unclamped.
#[inline]
pub const fn is_sensor_sentinel(raw: u16) -> bool {
    matches!(
        raw,
        SENSOR_UNCALIBRATED | SENSOR_SHORT_TO_GROUND | SENSOR_SHORT_TO_SUPPLY
    )
}

#[inline]
fn clamp_pedal(raw: u16, max: u16) -> u16 {
    if is_sensor_sentinel(raw) { raw } else { raw.min(max) }
}

/// Decode a pedal frame, clamping each channel to its configured range.
pub fn decode_pedal(frame: &CanFrame, range: &PedalConfig) -> Result<PedalInputs, FrameError> {
    require(frame, PEDAL_LEN)?;
    Ok(PedalInputs {
        gas: clamp_pedal(u16_at(&frame.data, 0), range.max),
        brake: clamp_pedal(u16_at(&frame.data, 2), range.max),
        // The uncalibrated pattern (-1) lies inside the steering range.
        steering_angle: i16_at(&frame.data, 4).clamp(range.steering_min, range.steering_max),
        brake_intensity: clamp_pedal(u16_at(&frame.data, 6), range.max),
    })
}

pub fn encode_pedal(inputs: &PedalInputs) -> [u8; FRAME_LEN] {
    let mut data = [0u8; FRAME_LEN];
    put(&mut data, 0, inputs.gas.to_le_bytes());
    put(&mut data, 2, inputs.brake.to_le_bytes());
    put(&mut data, 4, inputs.steering_angle.to_le_bytes());
    put(&mut data, 6, inputs.brake_intensity.to_le_bytes());
    data
}

// ─── Dashboard ──────────────────────────────────────────────────────

/// Decode the ready-to-drive button state (bytes 2-3, non-zero = pressed).
pub fn decode_dashboard(frame: &CanFrame) -> Result<bool, FrameError> {
    require(frame, DASHBOARD_LEN)?;
    Ok(u16_at(&frame.data, 2) != 0)
}

pub fn encode_dashboard(ready_to_drive: bool) -> [u8; FRAME_LEN] {
    let mut data = [0u8; FRAME_LEN];
    put(&mut data, 2, u16::from(ready_to_drive).to_le_bytes());
    data
}
