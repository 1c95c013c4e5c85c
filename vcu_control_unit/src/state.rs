//! Stage sequencer.
//!
//! - [`machine`] - Transition table
//! - [`stages`] - Logic run for the current stage each tick

pub mod machine;
pub mod stages;

pub use machine::{StageEvent, TransitionResult, transition};
pub use stages::{ReadyToDrive, StageContext, run_stage};
