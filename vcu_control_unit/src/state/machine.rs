//! Stage transitions.
//!
//! Forward-only sequence `Init → PreDrive → InverterBringup → Driving`,
//! one step per event, plus the fault reset edge from any stage to `Init`.

use vcu_common::vehicle::state::Stage;

/// Result of a stage transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new stage.
    Ok(Stage),
    /// Transition rejected, with the reason.
    Rejected(&'static str),
}

/// Event that can move the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// Sensors calibrated and every node alive.
    ChecksPassed,
    /// Debounced ready-to-drive with brake pressed and HV confirmed.
    ReadyToDrive,
    /// Every inverter confirmed bring-up.
    InvertersReady,
    /// Stage-reset fault handled.
    FaultReset,
}

/// Apply `event` to `stage`.
pub fn transition(stage: Stage, event: StageEvent) -> TransitionResult {
    use Stage::*;
    use StageEvent::*;

    match (stage, event) {
        (_, FaultReset) => TransitionResult::Ok(Init),
        (Init, ChecksPassed) => TransitionResult::Ok(PreDrive),
        (PreDrive, ReadyToDrive) => TransitionResult::Ok(InverterBringup),
        (InverterBringup, InvertersReady) => TransitionResult::Ok(Driving),
        _ => TransitionResult::Rejected(invalid_transition_reason(stage)),
    }
}

fn invalid_transition_reason(stage: Stage) -> &'static str {
    match stage {
        Stage::Init => "Init: only ChecksPassed or FaultReset allowed",
        Stage::PreDrive => "PreDrive: only ReadyToDrive or FaultReset allowed",
        Stage::InverterBringup => "InverterBringup: only InvertersReady or FaultReset allowed",
        Stage::Driving => "Driving: only FaultReset allowed",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
