//! CAN wire protocol.
//!
//! - [`frame`] - The fixed 8-byte frame and bus channel types
//! - [`ids`] - Message ID catalogue and inbound classification
//! - [`codec`] - Bit-exact encoders / decoders for every frame the core handles

pub mod codec;
pub mod frame;
pub mod ids;
