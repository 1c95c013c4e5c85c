//! Message ID catalogue.
//!
//! The inbound ID set is static, so classification is a plain `match` into a
//! closed [`MessageKind`] rather than a runtime handler table.

use crate::vehicle::inverter::InverterId;

// ─── Inbound ────────────────────────────────────────────────────────

pub const BMS_ID: u32 = 0x191;
pub const RES_ID: u32 = 0x192;
pub const PEDAL_ID: u32 = 0x193;
pub const DASHBOARD_ID: u32 = 0x194;

/// Status A (AMK "actual values 1") per inverter.
pub const STATUS_A_IDS: [u32; 4] = [0x283, 0x284, 0x287, 0x288];

/// Status B (AMK "actual values 2") per inverter.
pub const STATUS_B_IDS: [u32; 4] = [0x285, 0x286, 0x289, 0x290];

// ─── Outbound ───────────────────────────────────────────────────────

/// Setpoint frame per inverter.
pub const SETPOINT_IDS: [u32; 4] = [0x184, 0x185, 0x188, 0x189];

/// Inbound message class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Pedal,
    Dashboard,
    StatusA(InverterId),
    StatusB(InverterId),
    /// Known, carries no decoded fields.
    Bms,
    /// Known, carries no decoded fields.
    Res,
}

impl MessageKind {
    /// Classify an inbound ID. `None` for IDs the core does not handle.
    pub const fn classify(id: u32) -> Option<Self> {
        Some(match id {
            PEDAL_ID => Self::Pedal,
            DASHBOARD_ID => Self::Dashboard,
            BMS_ID => Self::Bms,
            RES_ID => Self::Res,
            0x283 => Self::StatusA(InverterId::Inv1),
            0x284 => Self::StatusA(InverterId::Inv2),
            0x287 => Self::StatusA(InverterId::Inv3),
            0x288 => Self::StatusA(InverterId::Inv4),
            0x285 => Self::StatusB(InverterId::Inv1),
            0x286 => Self::StatusB(InverterId::Inv2),
            0x289 => Self::StatusB(InverterId::Inv3),
            0x290 => Self::StatusB(InverterId::Inv4),
            _ => return None,
        })
    }
}

/// Setpoint frame ID for an inverter.
#[inline]
pub const fn setpoint_id(inverter: InverterId) -> u32 {
    SETPOINT_IDS[inverter.index()]
}

/// Status A frame ID for an inverter.
#[inline]
pub const fn status_a_id(inverter: InverterId) -> u32 {
    STATUS_A_IDS[inverter.index()]
}

/// Status B frame ID for an inverter.
#[inline]
pub const fn status_b_id(inverter: InverterId) -> u32 {
    STATUS_B_IDS[inverter.index()]
}
