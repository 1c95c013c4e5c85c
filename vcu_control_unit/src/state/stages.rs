//! Per-stage logic, run once per tick after the cross-stage routine.
//!
//! Each function advances exactly one stage and returns the event the
//! sequencer should apply, if any.

use tracing::{debug, info};

use vcu_common::vehicle::config::{StageConfig, VcuConfig};
use vcu_common::vehicle::fault::Fault;
use vcu_common::vehicle::state::{Stage, VehicleState};

use crate::indicator::{buzzer, show_stage};
use crate::inverter::checks::{all_inverters_on, check_hv, check_init};
use crate::inverter::{apply_bringup, driving_routine, transmit_setpoints};
use crate::io::{Indicator, IoCounters, Level, VehicleIo};
use crate::state::machine::StageEvent;
use crate::supervisor::check_calibration;

/// Everything a stage may touch during one tick.
pub struct StageContext<'a, IO: ?Sized> {
    pub state: &'a mut VehicleState,
    pub config: &'a VcuConfig,
    pub io: &'a mut IO,
    pub counters: &'a mut IoCounters,
}

/// Dispatch to the logic of the current stage.
pub fn run_stage<IO: VehicleIo + ?Sized>(ctx: &mut StageContext<'_, IO>) -> Option<StageEvent> {
    match ctx.state.stage {
        Stage::Init => run_init(ctx),
        Stage::PreDrive => run_pre_drive(ctx),
        Stage::InverterBringup => run_inverter_bringup(ctx),
        Stage::Driving => run_driving(ctx),
    }
}

// ─── Init ───────────────────────────────────────────────────────────

/// Sensor calibration and liveness gate.
pub fn run_init<IO: VehicleIo + ?Sized>(ctx: &mut StageContext<'_, IO>) -> Option<StageEvent> {
    show_stage(ctx.io, Stage::Init);
    let sensors_ok = check_calibration(ctx.state);
    let comm_ok = ctx.state.liveness.all_alive();
    (sensors_ok && comm_ok).then_some(StageEvent::ChecksPassed)
}

// ─── PreDrive ───────────────────────────────────────────────────────

/// Ready-to-drive debounce outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyToDrive {
    /// No request latched.
    Idle,
    /// Request latched, brake or HV not there yet.
    Waiting,
    /// Request accepted; latch and counter cleared.
    Accepted,
    /// Window elapsed; latch and counter cleared.
    Expired,
}

/// Debounce the latched ready-to-drive request against brake and HV.
pub fn debounce_ready_to_drive(
    state: &mut VehicleState,
    cfg: &StageConfig,
    brake_pressed: bool,
    hv_confirmed: bool,
) -> ReadyToDrive {
    let mut outcome = ReadyToDrive::Idle;

    if state.dashboard.ready_to_drive_requested
        && state.counters.ready_to_drive_debounce < cfg.r2d_window_ticks
    {
        if brake_pressed && hv_confirmed {
            state.dashboard.ready_to_drive_requested = false;
            state.counters.ready_to_drive_debounce = 0;
            return ReadyToDrive::Accepted;
        }
        state.counters.ready_to_drive_debounce += 1;
        outcome = ReadyToDrive::Waiting;
    }

    if state.counters.ready_to_drive_debounce >= cfg.r2d_window_ticks {
        state.dashboard.ready_to_drive_requested = false;
        state.counters.ready_to_drive_debounce = 0;
        debug!(brake_pressed, hv_confirmed, "ready-to-drive request expired");
        outcome = ReadyToDrive::Expired;
    }
    outcome
}

/// Cyclic bring-up frames while waiting for the driver.
pub fn run_pre_drive<IO: VehicleIo + ?Sized>(ctx: &mut StageContext<'_, IO>) -> Option<StageEvent> {
    show_stage(ctx.io, Stage::PreDrive);
    apply_bringup(ctx.state, ctx.config);
    transmit_setpoints(ctx.io, ctx.state, &ctx.config.can, ctx.counters);

    let brake_pressed = ctx.state.pedal.brake_intensity > ctx.config.stages.brake_pressed_threshold;
    let hv = check_hv(&ctx.state.inverter_status);
    match debounce_ready_to_drive(ctx.state, &ctx.config.stages, brake_pressed, hv) {
        ReadyToDrive::Accepted => Some(StageEvent::ReadyToDrive),
        _ => None,
    }
}

// ─── InverterBringup ────────────────────────────────────────────────

/// Contactor gating and bring-up confirmation.
pub fn run_inverter_bringup<IO: VehicleIo + ?Sized>(
    ctx: &mut StageContext<'_, IO>,
) -> Option<StageEvent> {
    show_stage(ctx.io, Stage::InverterBringup);
    apply_bringup(ctx.state, ctx.config);
    transmit_setpoints(ctx.io, ctx.state, &ctx.config.can, ctx.counters);

    if all_inverters_on(&ctx.state.inverter_status) {
        ctx.io.set_indicator(Indicator::MainContactor, Level::On);
        if !ctx.state.main_contactor {
            info!("main contactor closed");
        }
        ctx.state.main_contactor = true;
    }
    let ready = check_init(&ctx.state.inverter_status);

    // A request latched during bring-up must not carry into Driving.
    ctx.state.dashboard.ready_to_drive_requested = false;

    ready.then_some(StageEvent::InvertersReady)
}

// ─── Driving ────────────────────────────────────────────────────────

/// Torque from the gas pedal, HV watch, buzzer.
pub fn run_driving<IO: VehicleIo + ?Sized>(ctx: &mut StageContext<'_, IO>) -> Option<StageEvent> {
    show_stage(ctx.io, Stage::Driving);
    driving_routine(ctx.state, ctx.config);
    if !check_hv(&ctx.state.inverter_status) {
        ctx.state.raise(Fault::Hv);
    }
    transmit_setpoints(ctx.io, ctx.state, &ctx.config.can, ctx.counters);
    buzzer::step(ctx.io, &mut ctx.state.counters.buzzer_phase, &ctx.config.indicators);
    None
}
