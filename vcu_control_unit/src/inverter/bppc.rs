//! Brake-pedal plausibility check (hard brake).
//!
//! Two states, `Normal` and `HardBrake`, with one shared tick counter.
//! Entry needs `entry_ticks` consecutive ticks of gas ≥ `gas_high` and
//! brake ≥ `brake_high`; exit needs `exit_ticks` consecutive ticks of
//! gas ≤ `gas_low`. A tick that breaks the condition zeroes the counter.

use tracing::debug;

use vcu_common::vehicle::config::HardBrakeConfig;
use vcu_common::vehicle::state::VehicleState;

/// What the driving routine must send this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BppcAction {
    /// Normal driving: gas-derived setpoints.
    GasDerived,
    /// Counting toward entry: setpoints left as they are.
    Hold,
    /// Hard brake: zero velocity with the hard-brake torque limits.
    ZeroTorque,
}

/// Result of one plausibility step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BppcStep {
    pub active: bool,
    pub counter: u16,
    pub action: BppcAction,
}

/// One step of the hard-brake state machine.
pub fn step(active: bool, counter: u16, gas: u16, brake: u16, cfg: &HardBrakeConfig) -> BppcStep {
    if active {
        let (active, counter) = if gas <= cfg.gas_low {
            let counter = counter.saturating_add(1);
            if counter >= cfg.exit_ticks {
                (false, 0)
            } else {
                (true, counter)
            }
        } else {
            (true, 0)
        };
        // Zero torque is sent on the exit tick too.
        return BppcStep {
            active,
            counter,
            action: BppcAction::ZeroTorque,
        };
    }

    if gas >= cfg.gas_high && brake >= cfg.brake_high {
        let counter = counter.saturating_add(1);
        if counter >= cfg.entry_ticks {
            BppcStep {
                active: true,
                counter: 0,
                action: BppcAction::ZeroTorque,
            }
        } else {
            BppcStep {
                active: false,
                counter,
                action: BppcAction::Hold,
            }
        }
    } else {
        BppcStep {
            active: false,
            counter: 0,
            action: BppcAction::GasDerived,
        }
    }
}

/// Run the check against the store, updating the latch and counter.
pub fn evaluate(state: &mut VehicleState, cfg: &HardBrakeConfig) -> BppcAction {
    let was_active = state.hard_brake_active;
    let next = step(
        was_active,
        state.counters.hard_brake,
        state.pedal.gas,
        state.pedal.brake,
        cfg,
    );
    state.hard_brake_active = next.active;
    state.counters.hard_brake = next.counter;

    match (was_active, next.active) {
        (false, true) => debug!(gas = state.pedal.gas, brake = state.pedal.brake, "hard brake engaged"),
        (true, false) => debug!("hard brake released"),
        _ => {}
    }
    next.action
}
