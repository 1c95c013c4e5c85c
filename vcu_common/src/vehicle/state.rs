//! The shared vehicle state store.
//!
//! A single [`VehicleState`] record is created at startup and owned by the
//! control core for the lifetime of the process. Transport handlers write only
//! node-specific decoded fields and liveness bits; `stage` and `system_fault`
//! are written by the core alone.

use serde::{Deserialize, Serialize};

use super::fault::Fault;
use super::inverter::{InverterId, InverterSetpoint, InverterStatus};
use crate::consts::{NUM_INVERTERS, NUM_LIVENESS_NODES};

// ─── Stage ──────────────────────────────────────────────────────────

/// Sequencer stage.
///
/// Discriminants are the telemetry codes (`InverterBringup` reports 25, the
/// "stage 2.5" of the dashboard display).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Stage {
    /// Sensor plausibility and liveness checks.
    #[default]
    Init = 1,
    /// Waiting for the ready-to-drive handshake.
    PreDrive = 2,
    /// Main contactor and inverter enable.
    InverterBringup = 25,
    /// Torque commanded from the gas pedal.
    Driving = 3,
}

impl Stage {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Init),
            2 => Some(Self::PreDrive),
            25 => Some(Self::InverterBringup),
            3 => Some(Self::Driving),
            _ => None,
        }
    }

    /// Telemetry code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// The stage that follows in the forward sequence, if any.
    #[inline]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::PreDrive),
            Self::PreDrive => Some(Self::InverterBringup),
            Self::InverterBringup => Some(Self::Driving),
            Self::Driving => None,
        }
    }
}

// ─── Liveness ───────────────────────────────────────────────────────

/// Monitored node, in sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LivenessNode {
    Pedal = 0,
    Dashboard = 1,
    Inverter1 = 2,
    Inverter2 = 3,
    Inverter3 = 4,
    Inverter4 = 5,
}

impl LivenessNode {
    /// All nodes in the fixed sweep order.
    pub const ALL: [Self; NUM_LIVENESS_NODES] = [
        Self::Pedal,
        Self::Dashboard,
        Self::Inverter1,
        Self::Inverter2,
        Self::Inverter3,
        Self::Inverter4,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Liveness slot of an inverter.
    #[inline]
    pub const fn inverter(id: InverterId) -> Self {
        match id {
            InverterId::Inv1 => Self::Inverter1,
            InverterId::Inv2 => Self::Inverter2,
            InverterId::Inv3 => Self::Inverter3,
            InverterId::Inv4 => Self::Inverter4,
        }
    }

    /// Fault raised when this node is found silent.
    #[inline]
    pub const fn silence_fault(self) -> Fault {
        match self {
            Self::Pedal => Fault::PedalComm,
            Self::Dashboard => Fault::DbComm,
            Self::Inverter1 | Self::Inverter2 | Self::Inverter3 | Self::Inverter4 => {
                Fault::InverterComm
            }
        }
    }
}

/// Per-node "message seen since the last sweep" bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LivenessBits([bool; NUM_LIVENESS_NODES]);

impl LivenessBits {
    /// Record that a periodic message from `node` was received.
    #[inline]
    pub fn mark(&mut self, node: LivenessNode) {
        self.0[node.index()] = true;
    }

    #[inline]
    pub fn is_alive(&self, node: LivenessNode) -> bool {
        self.0[node.index()]
    }

    #[inline]
    pub fn clear_all(&mut self) {
        self.0 = [false; NUM_LIVENESS_NODES];
    }

    /// First node in sweep order whose bit is clear, or `None` when all are alive.
    pub fn first_silent(&self) -> Option<LivenessNode> {
        LivenessNode::ALL
            .into_iter()
            .find(|node| !self.is_alive(*node))
    }

    #[inline]
    pub fn all_alive(&self) -> bool {
        self.first_silent().is_none()
    }

    /// Bits packed LSB-first in sweep order (telemetry).
    pub fn bits(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, alive)| acc | (u8::from(*alive) << i))
    }
}

// ─── Node records ───────────────────────────────────────────────────

/// Pedal box inputs.
///
/// Values are clamped on decode, except the reserved sentinels which are
/// stored unchanged so the supervisor can detect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PedalInputs {
    pub gas: u16,
    pub brake: u16,
    pub steering_angle: i16,
    pub brake_intensity: u16,
}

/// Dashboard inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardInputs {
    /// Latched ready-to-drive request.
    pub ready_to_drive_requested: bool,
}

/// Bounded tick counters. Each is reset to 0 by its triggering transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub buzzer_phase: u16,
    pub communication_timeout: u16,
    pub hard_brake: u16,
    pub ready_to_drive_debounce: u16,
}

// ─── Store ──────────────────────────────────────────────────────────

/// The vehicle state store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VehicleState {
    /// Current sequencer stage.
    pub stage: Stage,
    pub pedal: PedalInputs,
    pub dashboard: DashboardInputs,
    pub inverter_status: [InverterStatus; NUM_INVERTERS],
    pub inverter_setpoint: [InverterSetpoint; NUM_INVERTERS],
    /// Active fault (last writer wins).
    pub system_fault: Fault,
    /// Stage-reset fault most recently handled and acknowledged.
    pub last_handled_fault: Fault,
    pub liveness: LivenessBits,
    pub counters: Counters,
    /// Latched by the brake-pedal plausibility check.
    pub hard_brake_active: bool,
    /// Main contactor (BE1) output state.
    pub main_contactor: bool,
}

impl VehicleState {
    /// Raise a fault, overwriting whatever was active.
    #[inline]
    pub fn raise(&mut self, fault: Fault) {
        self.system_fault = fault;
    }

    #[inline]
    pub fn status(&self, id: InverterId) -> &InverterStatus {
        &self.inverter_status[id.index()]
    }

    #[inline]
    pub fn status_mut(&mut self, id: InverterId) -> &mut InverterStatus {
        &mut self.inverter_status[id.index()]
    }

    #[inline]
    pub fn setpoint(&self, id: InverterId) -> &InverterSetpoint {
        &self.inverter_setpoint[id.index()]
    }
}
