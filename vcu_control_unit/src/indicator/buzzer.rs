//! Ready-to-drive buzzer sequence.
//!
//! Phase 0 starts the tone, phases 1..timeout only advance, the timeout
//! phase stops the tone and pins the counter at the terminal value. Only an
//! external reset to 0 re-arms it.

use tracing::debug;

use vcu_common::vehicle::config::IndicatorConfig;

use crate::io::Buzzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerStep {
    Started,
    Sounding,
    Stopped,
    Idle,
}

pub fn step<IO: Buzzer + ?Sized>(io: &mut IO, phase: &mut u16, cfg: &IndicatorConfig) -> BuzzerStep {
    if *phase == 0 {
        io.start_tone(cfg.buzzer_freq_hz, cfg.buzzer_duty_pct);
        *phase = 1;
        debug!("buzzer on");
        BuzzerStep::Started
    } else if *phase >= cfg.buzzer_terminal {
        BuzzerStep::Idle
    } else if *phase >= cfg.buzzer_timeout_ticks {
        io.stop_tone();
        *phase = cfg.buzzer_terminal;
        debug!("buzzer off");
        BuzzerStep::Stopped
    } else {
        *phase += 1;
        BuzzerStep::Sounding
    }
}
