//! Vehicle state store and the records it is built from.
//!
//! Organized by domain: stage and liveness types, fault taxonomy,
//! inverter status / setpoint records, and configuration structures.

pub mod config;
pub mod fault;
pub mod inverter;
pub mod state;
