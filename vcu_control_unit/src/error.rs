//! Error module root.
//!
//! Single active fault, dispatched once per tick: stage-reset faults send the
//! inverters back through error reset, the rest are reported only.

pub mod handler;

pub use handler::{FaultHandler, FaultResponse};
