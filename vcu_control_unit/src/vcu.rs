//! The control core.
//!
//! [`Vcu`] owns the vehicle state store, the configuration, the output port
//! and the inbound queue. [`Vcu::tick`] is called once per fixed period and
//! runs to completion:
//!
//! 1. drain inbound frames into the store
//! 2. short-circuit check
//! 3. liveness sweep
//! 4. inverter error scan
//! 5. brake light
//! 6. fault handling
//! 7. logic of the current stage, then its transition
//!
//! A tick whose fault handling reset the stage ends after step 6, so `Init`
//! is held for at least that tick before its checks run.

use tracing::{info, trace, warn};

use vcu_common::vehicle::config::VcuConfig;
use vcu_common::vehicle::fault::Fault;
use vcu_common::vehicle::state::VehicleState;

use crate::dispatch::drain_inbound;
use crate::error::{FaultHandler, FaultResponse};
use crate::indicator::update_brake_light;
use crate::inverter::checks::first_inverter_error;
use crate::io::{FrameSource, IoCounters, VehicleIo};
use crate::state::machine::{StageEvent, TransitionResult, transition};
use crate::state::stages::{StageContext, run_stage};
use crate::supervisor::{SweepOutcome, check_short_circuit, sweep};

/// Vehicle control unit core.
pub struct Vcu<IO, RX> {
    config: VcuConfig,
    state: VehicleState,
    io: IO,
    rx: RX,
    faults: FaultHandler,
    counters: IoCounters,
    ticks: u64,
}

impl<IO: VehicleIo, RX: FrameSource> Vcu<IO, RX> {
    /// Create the core in `Init` with a fresh store.
    pub fn new(config: VcuConfig, io: IO, rx: RX) -> Self {
        Self {
            config,
            state: VehicleState::default(),
            io,
            rx,
            faults: FaultHandler::new(),
            counters: IoCounters::default(),
            ticks: 0,
        }
    }

    /// Run one tick.
    pub fn tick(&mut self) {
        self.ticks += 1;
        if let FaultResponse::StageReset(fault) = self.cross_stage() {
            trace!(fault = %fault, "stage reset this tick, stage logic skipped");
            return;
        }

        let event = {
            let mut ctx = StageContext {
                state: &mut self.state,
                config: &self.config,
                io: &mut self.io,
                counters: &mut self.counters,
            };
            run_stage(&mut ctx)
        };
        if let Some(event) = event {
            self.apply_event(event);
        }
    }

    /// Checks run at the start of every tick regardless of stage.
    fn cross_stage(&mut self) -> FaultResponse {
        drain_inbound(
            &mut self.state,
            &mut self.rx,
            &self.config.pedal,
            &mut self.counters,
        );

        check_short_circuit(&mut self.state);

        if let SweepOutcome::Silent(node) = sweep(&mut self.state, self.config.liveness.timeout_ticks)
        {
            trace!(?node, "silent node");
        }

        if let Some(inverter) = first_inverter_error(
            &self.state.inverter_status,
            self.config.fault_policy.inverter_error_scan,
        ) {
            trace!(
                ?inverter,
                code = self.state.status(inverter).last_fault_code,
                "inverter error bit set"
            );
            self.state.raise(Fault::InverterComm);
        }

        update_brake_light(
            &mut self.io,
            self.state.pedal.brake_intensity,
            self.config.indicators.brake_light_threshold,
        );

        self.faults
            .handle(&mut self.state, &mut self.io, &self.config, &mut self.counters)
    }

    fn apply_event(&mut self, event: StageEvent) {
        match transition(self.state.stage, event) {
            TransitionResult::Ok(next) => {
                info!(from = ?self.state.stage, to = ?next, ?event, "stage transition");
                self.state.stage = next;
            }
            TransitionResult::Rejected(reason) => {
                warn!(?event, reason, "stage event rejected");
            }
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &VcuConfig {
        &self.config
    }

    #[inline]
    pub fn counters(&self) -> &IoCounters {
        &self.counters
    }

    /// Ticks executed so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn io(&self) -> &IO {
        &self.io
    }

    #[inline]
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Inbound queue, for the receive path to push into between ticks.
    #[inline]
    pub fn inbound_mut(&mut self) -> &mut RX {
        &mut self.rx
    }

    /// Direct store access for bench and test setups.
    #[inline]
    pub fn state_mut(&mut self) -> &mut VehicleState {
        &mut self.state
    }
}
