//! # VCU Control Unit Library
//!
//! Cyclic control core of the vehicle control unit. Once per fixed tick the
//! core drains the inbound CAN frames into the vehicle state store, runs the
//! cross-stage supervision (short circuit, liveness, inverter errors, brake
//! light, fault handling), then the logic of the current stage:
//!
//! 1. **Init** - Sensor calibration and liveness of every node
//! 2. **PreDrive** - DC bus bring-up and the ready-to-drive debounce
//! 3. **InverterBringup** - Inverter enable and main contactor
//! 4. **Driving** - Pedal-derived velocity setpoints, hard-brake plausibility
//!
//! Any stage-reset fault sends the inverters an error reset and returns the
//! sequencer to Init.
//!
//! ## Ports
//!
//! The core owns no hardware. It transmits and drives outputs through
//! [`io::VehicleIo`] and receives through [`io::FrameSource`]; [`sim`]
//! provides a hosted plant for both.

pub mod config;
pub mod cycle;
pub mod dispatch;
pub mod error;
pub mod indicator;
pub mod inverter;
pub mod io;
pub mod sim;
pub mod snapshot;
pub mod state;
pub mod supervisor;
pub mod vcu;

pub use vcu::Vcu;
