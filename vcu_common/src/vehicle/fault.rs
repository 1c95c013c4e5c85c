//! System fault taxonomy.
//!
//! The store holds exactly one active [`Fault`]; detectors overwrite it
//! (last writer wins). The numeric codes are exposed to telemetry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Active system fault code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u16)]
pub enum Fault {
    /// No fault active.
    #[default]
    NoFault = 0,
    /// Pedal box silent for a full liveness window.
    PedalComm = 1,
    /// Dashboard node silent for a full liveness window.
    DbComm = 2,
    /// Inverter silent, or an inverter reported its error bit.
    InverterComm = 3,
    /// Gas or brake sensor shorted to ground.
    ShortToGround = 4,
    /// Gas or brake sensor shorted to supply.
    ShortToSupply = 5,
    /// A pedal sensor reports the uncalibrated sentinel.
    SensorsNotCalibrated = 6,
    /// High voltage lost while driving.
    Hv = 7,
}

impl Fault {
    /// Convert from the raw telemetry code. Returns `None` for unknown codes.
    #[inline]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::NoFault),
            1 => Some(Self::PedalComm),
            2 => Some(Self::DbComm),
            3 => Some(Self::InverterComm),
            4 => Some(Self::ShortToGround),
            5 => Some(Self::ShortToSupply),
            6 => Some(Self::SensorsNotCalibrated),
            7 => Some(Self::Hv),
            _ => None,
        }
    }

    /// Raw telemetry code.
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// True for any code other than [`Fault::NoFault`].
    #[inline]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::NoFault)
    }

    /// Faults whose response forces the stage back to `Init`.
    #[inline]
    pub const fn resets_stage(self) -> bool {
        matches!(self, Self::InverterComm | Self::Hv)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoFault => "NoFault",
            Self::PedalComm => "PedalCommFault",
            Self::DbComm => "DbCommFault",
            Self::InverterComm => "InverterCommFault",
            Self::ShortToGround => "ShortToGroundFault",
            Self::ShortToSupply => "ShortToSupplyFault",
            Self::SensorsNotCalibrated => "SensorsNotCalibratedFault",
            Self::Hv => "HvFault",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}
