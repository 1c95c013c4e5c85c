//! Fault handler.
//!
//! Dispatches on the active fault once per tick, last in the cross-stage
//! routine so it sees faults raised earlier in the same tick.
//!
//! | Fault            | Response                                                  |
//! |------------------|-----------------------------------------------------------|
//! | `NoFault`        | none                                                      |
//! | `PedalComm`      | reported only                                             |
//! | `InverterComm`   | stage → Init, error reset, contactor off, buzzer re-armed |
//! | `Hv`             | stage → Init, error reset                                 |
//! | others           | none                                                      |

use tracing::{info, trace, warn};

use vcu_common::vehicle::config::VcuConfig;
use vcu_common::vehicle::fault::Fault;
use vcu_common::vehicle::state::VehicleState;

use crate::inverter::send_error_reset;
use crate::io::{Indicator, IoCounters, Level, VehicleIo};
use crate::state::machine::{StageEvent, TransitionResult, transition};

/// What the handler did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultResponse {
    None,
    Reported(Fault),
    StageReset(Fault),
}

/// Fault dispatcher with edge-triggered reporting.
///
/// The edge is taken on the raised code, before any acknowledgement, so a
/// detector that re-raises the same fault every tick is logged once.
#[derive(Debug, Clone, Default)]
pub struct FaultHandler {
    last_seen: Fault,
}

impl FaultHandler {
    pub const fn new() -> Self {
        Self {
            last_seen: Fault::NoFault,
        }
    }

    /// Fault raised on the previous call, acknowledged or not.
    #[inline]
    pub const fn last_seen(&self) -> Fault {
        self.last_seen
    }

    pub fn handle<IO: VehicleIo + ?Sized>(
        &mut self,
        state: &mut VehicleState,
        io: &mut IO,
        config: &VcuConfig,
        counters: &mut IoCounters,
    ) -> FaultResponse {
        let fault = state.system_fault;
        let fresh = fault != self.last_seen;
        self.last_seen = fault;

        if fresh && fault.is_active() {
            warn!(fault = %fault, stage = ?state.stage, "fault raised");
        }

        let response = match fault {
            Fault::NoFault => return FaultResponse::None,
            Fault::PedalComm => FaultResponse::Reported(fault),
            Fault::InverterComm => {
                self.reset_stage(state, fault);
                send_error_reset(io, state, &config.can, counters);
                io.set_indicator(Indicator::MainContactor, Level::Off);
                state.main_contactor = false;
                state.counters.buzzer_phase = 0;
                FaultResponse::StageReset(fault)
            }
            Fault::Hv => {
                self.reset_stage(state, fault);
                send_error_reset(io, state, &config.can, counters);
                FaultResponse::StageReset(fault)
            }
            _ => {
                trace!(fault = %fault, "no response");
                FaultResponse::None
            }
        };

        if matches!(response, FaultResponse::StageReset(_)) {
            if fresh {
                info!(fault = %fault, "stage reset, inverter error reset sent");
            }
            if config.fault_policy.acknowledge_reset_faults {
                state.last_handled_fault = fault;
                state.system_fault = Fault::NoFault;
            }
        }
        response
    }

    fn reset_stage(&self, state: &mut VehicleState, fault: Fault) {
        if let TransitionResult::Ok(stage) = transition(state.stage, StageEvent::FaultReset) {
            if stage != state.stage {
                info!(from = ?state.stage, to = ?stage, fault = %fault, "stage transition");
            }
            state.stage = stage;
        }
    }
}
