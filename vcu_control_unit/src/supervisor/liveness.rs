//! Periodic liveness sweep.

use tracing::trace;

use vcu_common::vehicle::state::{LivenessNode, VehicleState};

/// Outcome of one sweep call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Window still running.
    NotDue,
    /// Window elapsed, every node was heard from.
    AllAlive,
    /// Window elapsed, this node (first in sweep order) was silent.
    Silent(LivenessNode),
}

/// Advance the communication window; at its end test, raise and clear.
///
/// The bits are cleared and the counter restarted whether or not a node was
/// found silent.
pub fn sweep(state: &mut VehicleState, timeout_ticks: u16) -> SweepOutcome {
    let counter = &mut state.counters.communication_timeout;
    *counter = counter.saturating_add(1);
    if *counter < timeout_ticks {
        return SweepOutcome::NotDue;
    }
    *counter = 0;

    let outcome = match state.liveness.first_silent() {
        Some(node) => {
            state.raise(node.silence_fault());
            SweepOutcome::Silent(node)
        }
        None => SweepOutcome::AllAlive,
    };
    trace!(bits = state.liveness.bits(), ?outcome, "liveness sweep");
    state.liveness.clear_all();
    outcome
}
