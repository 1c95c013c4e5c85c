//! VCU Common Library
//!
//! Shared types for the vehicle control unit workspace: the vehicle state
//! store records, the fault taxonomy, the inverter / pedal / dashboard wire
//! codecs, and the TOML configuration structures.
//!
//! # Module Structure
//!
//! - [`consts`] - Firmware limits, thresholds and sentinel values
//! - [`vehicle`] - State store, faults, inverter records, configuration
//! - [`protocol`] - CAN frame type, message catalogue, frame codecs
//! - [`config`] - Configuration loading trait and error type
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use vcu_common::prelude::*;
//!
//! let state = VehicleState::default();
//! assert_eq!(state.stage, Stage::Init);
//! assert_eq!(state.system_fault, Fault::NoFault);
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
pub mod protocol;
pub mod vehicle;
