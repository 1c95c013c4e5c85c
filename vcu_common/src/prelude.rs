//! Prelude module for common re-exports.
//!
//! # Usage
//!
//! ```rust
//! use vcu_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel};
pub use crate::vehicle::config::{InverterErrorScan, VcuConfig, load_config, load_config_from_str};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_TICK_PERIOD_US, NUM_INVERTERS, NUM_LIVENESS_NODES};

// ─── Wire ───────────────────────────────────────────────────────────
pub use crate::protocol::codec::FrameError;
pub use crate::protocol::frame::{CanChannel, CanFrame};
pub use crate::protocol::ids::{MessageKind, setpoint_id};

// ─── Vehicle ────────────────────────────────────────────────────────
pub use crate::vehicle::fault::Fault;
pub use crate::vehicle::inverter::{
    ControlBits, ControlIntent, InverterId, InverterSetpoint, InverterStatus, InverterStatusFlags,
};
pub use crate::vehicle::state::{
    Counters, DashboardInputs, LivenessBits, LivenessNode, PedalInputs, Stage, VehicleState,
};
