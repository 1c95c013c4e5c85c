//! Indicator / actuator adapter.
//!
//! Maps stage, braking and the buzzer counter onto the discrete outputs.

pub mod buzzer;
pub mod lamps;

pub use buzzer::BuzzerStep;
pub use lamps::{show_stage, update_brake_light};
