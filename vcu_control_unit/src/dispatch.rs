//! Inbound frame dispatch.
//!
//! Classifies each drained frame by ID and applies the decoded record to the
//! store. A handler writes only its node's fields and liveness bit; `stage`
//! and `system_fault` are never touched here.

use tracing::{debug, trace};

use vcu_common::protocol::codec::{
    FrameError, decode_dashboard, decode_pedal, decode_status_a, decode_status_b,
};
use vcu_common::protocol::frame::CanFrame;
use vcu_common::protocol::ids::MessageKind;
use vcu_common::vehicle::config::PedalConfig;
use vcu_common::vehicle::state::{LivenessNode, VehicleState};

use crate::io::{FrameSource, IoCounters};

/// Apply one frame to the store.
///
/// Returns the message class on success; unknown IDs and short frames are
/// reported as [`FrameError`] and leave the store untouched.
pub fn apply_frame(
    state: &mut VehicleState,
    frame: &CanFrame,
    pedal_range: &PedalConfig,
) -> Result<MessageKind, FrameError> {
    let kind = MessageKind::classify(frame.id).ok_or(FrameError::UnknownId(frame.id))?;

    match kind {
        MessageKind::Pedal => {
            state.pedal = decode_pedal(frame, pedal_range)?;
            state.liveness.mark(LivenessNode::Pedal);
        }
        MessageKind::Dashboard => {
            let pressed = decode_dashboard(frame)?;
            // Written only while clear; the sequencer owns clearing it.
            if !state.dashboard.ready_to_drive_requested {
                state.dashboard.ready_to_drive_requested = pressed;
            }
            state.liveness.mark(LivenessNode::Dashboard);
        }
        MessageKind::StatusA(inverter) => {
            decode_status_a(frame)?.apply(state.status_mut(inverter));
            state.liveness.mark(LivenessNode::inverter(inverter));
        }
        MessageKind::StatusB(inverter) => {
            decode_status_b(frame)?.apply(state.status_mut(inverter));
            state.liveness.mark(LivenessNode::inverter(inverter));
        }
        MessageKind::Bms | MessageKind::Res => {}
    }
    Ok(kind)
}

/// Drain the inbound queue completely into the store.
pub fn drain_inbound<RX: FrameSource + ?Sized>(
    state: &mut VehicleState,
    rx: &mut RX,
    pedal_range: &PedalConfig,
    counters: &mut IoCounters,
) {
    while let Some(frame) = rx.pop() {
        match apply_frame(state, &frame, pedal_range) {
            Ok(kind) => {
                counters.rx_frames += 1;
                trace!(id = frame.id, ?kind, "frame applied");
            }
            Err(FrameError::UnknownId(id)) => {
                counters.rx_ignored += 1;
                trace!(id, "unknown id ignored");
            }
            Err(e) => {
                counters.rx_malformed += 1;
                debug!(error = %e, "malformed frame dropped");
            }
        }
    }
}
