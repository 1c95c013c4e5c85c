//! Sensor & liveness supervisor.
//!
//! - [`sensors`] - Calibration and short-circuit sentinels on the pedal inputs
//! - [`liveness`] - Communication window sweep over the per-node bits

pub mod liveness;
pub mod sensors;

pub use liveness::{SweepOutcome, sweep};
pub use sensors::{check_calibration, check_short_circuit, sensors_calibrated};
