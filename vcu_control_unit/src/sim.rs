//! Hosted simulation plant.
//!
//! [`SimVehicle`] models the four inverters, the pedal box and the dashboard
//! closely enough to take the core through the full ready-to-drive handshake
//! without hardware. [`SimBus`] is the matching output port: it buffers the
//! frames the core sends for the plant and logs indicator and buzzer
//! changes.

use tracing::{debug, info};

use vcu_common::consts::NUM_INVERTERS;
use vcu_common::protocol::codec::{
    StatusA, StatusB, decode_setpoint, encode_dashboard, encode_pedal, encode_status_a,
    encode_status_b,
};
use vcu_common::protocol::frame::{CanChannel, CanFrame};
use vcu_common::protocol::ids::{DASHBOARD_ID, PEDAL_ID, SETPOINT_IDS, status_a_id, status_b_id};
use vcu_common::vehicle::inverter::{ControlBits, InverterId, InverterStatusFlags};
use vcu_common::vehicle::state::PedalInputs;

use crate::io::{Buzzer, FrameSink, Indicator, Indicators, Level, TxError};

/// Frames one plant step may emit.
pub const SIM_FRAMES_PER_TICK: usize = 16;

/// Transmit mailbox depth of the simulated bus.
pub const SIM_MAILBOX: usize = 16;

// ─── Bus ────────────────────────────────────────────────────────────

/// Output port backed by the simulation.
#[derive(Debug, Default)]
pub struct SimBus {
    sent: heapless::Vec<(CanChannel, CanFrame), SIM_MAILBOX>,
    outputs: [bool; 5],
    tone: bool,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames sent since the last call.
    pub fn take_sent(&mut self) -> heapless::Vec<(CanChannel, CanFrame), SIM_MAILBOX> {
        core::mem::take(&mut self.sent)
    }

    pub fn is_on(&self, indicator: Indicator) -> bool {
        self.outputs[indicator as usize]
    }

    pub fn tone_active(&self) -> bool {
        self.tone
    }
}

impl FrameSink for SimBus {
    fn send_frame(&mut self, channel: CanChannel, frame: &CanFrame) -> Result<(), TxError> {
        self.sent
            .push((channel, *frame))
            .map_err(|_| TxError::MailboxFull(channel))
    }
}

impl Indicators for SimBus {
    fn set_indicator(&mut self, indicator: Indicator, level: Level) {
        let slot = &mut self.outputs[indicator as usize];
        let next = match level {
            Level::On => true,
            Level::Off => false,
            Level::Toggle => !*slot,
        };
        if next != *slot {
            match indicator {
                Indicator::MainContactor => info!(closed = next, "main contactor"),
                Indicator::StagePreDriveLamp if level == Level::Toggle => {}
                _ => debug!(?indicator, on = next, "output"),
            }
        }
        *slot = next;
    }
}

impl Buzzer for SimBus {
    fn start_tone(&mut self, freq_hz: u32, duty_pct: f32) {
        self.tone = true;
        info!(freq_hz, duty_pct, "buzzer on");
    }

    fn stop_tone(&mut self) {
        self.tone = false;
        info!("buzzer off");
    }
}

// ─── Inverter model ─────────────────────────────────────────────────

/// Ticks between DC enable and the DC bus reporting on.
pub const DC_SETTLE_TICKS: u16 = 5;

/// Speed change per tick toward the target [rpm].
const SPEED_SLEW: i16 = 50;

#[derive(Debug, Clone, Copy, Default)]
pub struct SimInverter {
    dc_settle: u16,
    dc_on: bool,
    inverter_on: bool,
    error: bool,
    speed: i16,
    /// Status frames suppressed.
    muted: bool,
}

impl SimInverter {
    fn apply(&mut self, control: ControlBits, target_velocity: i16) {
        if control.contains(ControlBits::ERROR_RESET) {
            self.error = false;
        }

        if control.contains(ControlBits::DC_ON) {
            if !self.dc_on {
                self.dc_settle += 1;
                self.dc_on = self.dc_settle >= DC_SETTLE_TICKS;
            }
        } else {
            self.dc_settle = 0;
            self.dc_on = false;
        }

        self.inverter_on = self.dc_on && control.contains(ControlBits::INVERTER_ON);

        let target = if self.inverter_on && control.contains(ControlBits::ENABLE) {
            target_velocity
        } else {
            0
        };
        let slew = i32::from(SPEED_SLEW);
        let delta = (i32::from(target) - i32::from(self.speed)).clamp(-slew, slew);
        self.speed = (i32::from(self.speed) + delta) as i16;
    }

    fn flags(&self) -> InverterStatusFlags {
        let mut flags = InverterStatusFlags::SYSTEM_READY;
        flags.set(InverterStatusFlags::ERROR, self.error);
        flags.set(InverterStatusFlags::HV_CONFIRMED, self.dc_on);
        flags.set(InverterStatusFlags::BRINGUP_CONFIRMED, self.inverter_on);
        flags
    }

    pub fn is_on(&self) -> bool {
        self.inverter_on
    }

    pub fn speed(&self) -> i16 {
        self.speed
    }
}

// ─── Driver script ──────────────────────────────────────────────────

/// Scripted driver inputs, by tick.
#[derive(Debug, Clone, Copy)]
pub struct DriverScript {
    /// First tick the ready-to-drive button is reported pressed.
    pub r2d_press_tick: u64,
    /// Ticks the button is held.
    pub r2d_hold_ticks: u64,
    /// Brake is held from the start until this tick.
    pub brake_release_tick: u64,
    /// Brake intensity while held.
    pub brake_intensity: u16,
    /// Gas increase per tick after the brake is released.
    pub gas_ramp_per_tick: u16,
    /// Gas plateau.
    pub gas_target: u16,
}

impl Default for DriverScript {
    fn default() -> Self {
        Self {
            r2d_press_tick: 20,
            r2d_hold_ticks: 3,
            brake_release_tick: 60,
            brake_intensity: 30,
            gas_ramp_per_tick: 1,
            gas_target: 60,
        }
    }
}

impl DriverScript {
    fn pedal(&self, tick: u64) -> PedalInputs {
        if tick < self.brake_release_tick {
            return PedalInputs {
                gas: 0,
                brake: self.brake_intensity,
                steering_angle: 0,
                brake_intensity: self.brake_intensity,
            };
        }
        let ramp = (tick - self.brake_release_tick).saturating_mul(u64::from(self.gas_ramp_per_tick));
        PedalInputs {
            gas: ramp.min(u64::from(self.gas_target)) as u16,
            ..PedalInputs::default()
        }
    }

    fn r2d_pressed(&self, tick: u64) -> bool {
        (self.r2d_press_tick..self.r2d_press_tick + self.r2d_hold_ticks).contains(&tick)
    }
}

// ─── Vehicle ────────────────────────────────────────────────────────

/// The simulated vehicle around the core.
#[derive(Debug, Clone)]
pub struct SimVehicle {
    script: DriverScript,
    inverters: [SimInverter; NUM_INVERTERS],
    pedal_muted: bool,
}

impl SimVehicle {
    pub fn new(script: DriverScript) -> Self {
        Self {
            script,
            inverters: [SimInverter::default(); NUM_INVERTERS],
            pedal_muted: false,
        }
    }

    pub fn inverter(&self, id: InverterId) -> &SimInverter {
        &self.inverters[id.index()]
    }

    /// Latch an error on one inverter until it receives an error reset.
    pub fn inject_error(&mut self, id: InverterId) {
        self.inverters[id.index()].error = true;
    }

    /// Drop the DC bus on one inverter (HV loss).
    pub fn drop_dc(&mut self, id: InverterId) {
        let inv = &mut self.inverters[id.index()];
        inv.dc_on = false;
        inv.dc_settle = 0;
        inv.inverter_on = false;
    }

    pub fn mute_inverter(&mut self, id: InverterId, muted: bool) {
        self.inverters[id.index()].muted = muted;
    }

    pub fn mute_pedal(&mut self, muted: bool) {
        self.pedal_muted = muted;
    }

    /// Consume the frames the core sent and emit this tick's inbound frames.
    pub fn step(
        &mut self,
        tick: u64,
        sent: &[(CanChannel, CanFrame)],
    ) -> heapless::Vec<CanFrame, SIM_FRAMES_PER_TICK> {
        for (_, frame) in sent {
            let Some(index) = SETPOINT_IDS.iter().position(|id| *id == frame.id) else {
                continue;
            };
            if let Ok(setpoint) = decode_setpoint(frame) {
                self.inverters[index].apply(setpoint.control, setpoint.target_velocity);
            }
        }

        let mut out = heapless::Vec::new();
        if !self.pedal_muted {
            let _ = out.push(CanFrame::new(PEDAL_ID, encode_pedal(&self.script.pedal(tick))));
        }
        let _ = out.push(CanFrame::new(
            DASHBOARD_ID,
            encode_dashboard(self.script.r2d_pressed(tick)),
        ));
        for id in InverterId::ALL {
            let inv = &self.inverters[id.index()];
            if inv.muted {
                continue;
            }
            let status = StatusA {
                flags: inv.flags(),
                actual_speed: inv.speed,
                ..StatusA::default()
            };
            let _ = out.push(CanFrame::new(status_a_id(id), encode_status_a(&status)));
            if tick % 10 == 0 {
                let temps = StatusB {
                    motor_temperature: 250 + inv.speed / 10,
                    plate_temperature: 220,
                    error_code: if inv.error { 2310 } else { 0 },
                };
                let _ = out.push(CanFrame::new(status_b_id(id), encode_status_b(&temps)));
            }
        }
        out
    }
}
