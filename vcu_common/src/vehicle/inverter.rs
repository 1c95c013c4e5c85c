//! Inverter identifiers, status flags, control bits and per-inverter records.
//!
//! Bit layouts follow the inverter's wire protocol: status byte 1 of the
//! status-A frame maps onto [`InverterStatusFlags`], control byte 1 of the
//! setpoint frame onto [`ControlBits`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::NUM_INVERTERS;

/// One of the four traction inverters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum InverterId {
    Inv1 = 0,
    Inv2 = 1,
    Inv3 = 2,
    Inv4 = 3,
}

impl InverterId {
    /// All inverters in wire order.
    pub const ALL: [Self; NUM_INVERTERS] = [Self::Inv1, Self::Inv2, Self::Inv3, Self::Inv4];

    /// Array index into the per-inverter store arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Convert from an array index. Returns `None` for indices ≥ 4.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Inv1),
            1 => Some(Self::Inv2),
            2 => Some(Self::Inv3),
            3 => Some(Self::Inv4),
            _ => None,
        }
    }

    /// True for the front pair (inverters 1 and 2).
    #[inline]
    pub const fn is_front_pair(self) -> bool {
        matches!(self, Self::Inv1 | Self::Inv2)
    }
}

bitflags! {
    /// Status bits reported in byte 1 of the status-A frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InverterStatusFlags: u8 {
        /// System ready.
        const SYSTEM_READY      = 0x01;
        /// Inverter error.
        const ERROR             = 0x02;
        /// Inverter warning.
        const WARN              = 0x04;
        /// DC bus enable acknowledged.
        const DC_QUIT_ACK       = 0x08;
        /// DC bus energized.
        const DC_ON             = 0x10;
        /// Inverter enable acknowledged.
        const INVERTER_QUIT_ACK = 0x20;
        /// Inverter on.
        const INVERTER_ON       = 0x40;
        /// Derating active.
        const DERATING          = 0x80;
    }
}

impl InverterStatusFlags {
    /// Both DC bus bits required for high-voltage confirmation.
    pub const HV_CONFIRMED: Self =
        Self::from_bits_truncate(Self::DC_QUIT_ACK.bits() | Self::DC_ON.bits());

    /// Both inverter bits required for bring-up confirmation.
    pub const BRINGUP_CONFIRMED: Self =
        Self::from_bits_truncate(Self::INVERTER_QUIT_ACK.bits() | Self::INVERTER_ON.bits());
}

bitflags! {
    /// Control bits carried in byte 1 of the setpoint frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControlBits: u8 {
        /// Inverter enable.
        const INVERTER_ON = 0x01;
        /// DC bus enable.
        const DC_ON       = 0x02;
        /// Run enable.
        const ENABLE      = 0x04;
        /// Error reset request.
        const ERROR_RESET = 0x08;
    }
}

/// Commanded intent for one setpoint frame.
///
/// The control byte is always derived from the whole intent, never
/// accumulated into previously sent bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlIntent {
    pub dc_enable: bool,
    pub inverter_enable: bool,
    pub run_enable: bool,
    pub error_reset: bool,
}

impl ControlIntent {
    /// Everything off.
    pub const IDLE: Self = Self {
        dc_enable: false,
        inverter_enable: false,
        run_enable: false,
        error_reset: false,
    };

    /// Bring-up / driving: DC bus, inverter and run enabled.
    pub const BRINGUP: Self = Self {
        dc_enable: true,
        inverter_enable: true,
        run_enable: true,
        error_reset: false,
    };

    /// Error reset only; the inverter is not enabled.
    pub const ERROR_RESET: Self = Self {
        dc_enable: false,
        inverter_enable: false,
        run_enable: false,
        error_reset: true,
    };

    /// Build the control byte from this intent.
    pub fn control_bits(self) -> ControlBits {
        let mut bits = ControlBits::empty();
        bits.set(ControlBits::DC_ON, self.dc_enable);
        bits.set(ControlBits::INVERTER_ON, self.inverter_enable);
        bits.set(ControlBits::ENABLE, self.run_enable);
        bits.set(ControlBits::ERROR_RESET, self.error_reset);
        bits
    }
}

/// Status and telemetry decoded from an inverter's status frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InverterStatus {
    /// Status bits (status-A byte 1).
    pub flags: InverterStatusFlags,
    /// Actual speed [rpm].
    pub actual_speed: i16,
    /// Raw torque current.
    pub torque_current: i16,
    /// Raw magnetizing current.
    pub magnetizing_current: i16,
    /// Motor temperature [0.1 °C].
    pub motor_temperature: i16,
    /// Cold plate temperature [0.1 °C].
    pub plate_temperature: i16,
    /// Inverter-specific error code from the last status-B frame.
    pub last_fault_code: u16,
}

impl InverterStatus {
    /// DC bus acknowledged and energized.
    #[inline]
    pub fn hv_confirmed(&self) -> bool {
        self.flags.contains(InverterStatusFlags::HV_CONFIRMED)
    }

    /// Inverter enable acknowledged and inverter on.
    #[inline]
    pub fn bringup_confirmed(&self) -> bool {
        self.flags.contains(InverterStatusFlags::BRINGUP_CONFIRMED)
    }

    #[inline]
    pub fn inverter_on(&self) -> bool {
        self.flags.contains(InverterStatusFlags::INVERTER_ON)
    }

    #[inline]
    pub fn has_error(&self) -> bool {
        self.flags.contains(InverterStatusFlags::ERROR)
    }
}

/// Setpoint mirrored into an inverter's outgoing control frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InverterSetpoint {
    pub control: ControlBits,
    pub target_velocity: i16,
    pub positive_torque_limit: i16,
    pub negative_torque_limit: i16,
}

impl InverterSetpoint {
    /// Zero velocity with the given control bits and torque limits.
    pub fn zero_torque(control: ControlBits, positive: i16, negative: i16) -> Self {
        Self {
            control,
            target_velocity: 0,
            positive_torque_limit: positive,
            negative_torque_limit: negative,
        }
    }
}
