//! System-wide constants for the VCU workspace.
//!
//! Single source of truth for firmware limits, protocol sentinels and the
//! default tuning values. Every tunable here has a matching field in
//! [`crate::vehicle::config::VcuConfig`]; the constants are the defaults.

use static_assertions::const_assert;

/// Number of traction inverters on the vehicle.
pub const NUM_INVERTERS: usize = 4;

/// Number of monitored nodes: pedal box, dashboard, four inverters.
pub const NUM_LIVENESS_NODES: usize = 6;

/// Fixed payload length of every CAN frame handled by the core.
pub const FRAME_LEN: usize = 8;

// ─── Timing ─────────────────────────────────────────────────────────

/// Default tick period in microseconds (50 Hz).
///
/// The hard-brake entry window of 18 ticks corresponds to 360 ms.
pub const DEFAULT_TICK_PERIOD_US: u32 = 20_000;

/// Minimum accepted tick period.
pub const TICK_PERIOD_US_MIN: u32 = 1_000;

/// Maximum accepted tick period.
pub const TICK_PERIOD_US_MAX: u32 = 100_000;

/// Default diagnostic snapshot interval [ticks].
pub const DIAG_INTERVAL_TICKS_DEFAULT: u32 = 50;

// ─── Stage sequencer ────────────────────────────────────────────────

/// Ready-to-drive debounce window [ticks].
pub const R2D_WINDOW_TICKS: u16 = 10;

/// Brake intensity above which the pedal counts as pressed for R2D.
pub const BRAKE_PEDAL_THRESHOLD: u16 = 5;

// ─── Liveness ───────────────────────────────────────────────────────

/// Liveness sweep window [ticks].
pub const LIVENESS_TIMEOUT_TICKS: u16 = 220;

// ─── Hard brake (BPPC) ──────────────────────────────────────────────

/// Gas value at or above which a hard-brake entry tick is counted.
pub const HB_GAS_HIGH: u16 = 250;

/// Brake value at or above which a hard-brake entry tick is counted.
pub const HB_BRAKE_HIGH: u16 = 300;

/// Gas value at or below which a hard-brake exit tick is counted.
pub const HB_GAS_LOW: u16 = 50;

/// Consecutive ticks required to enter the hard-brake state.
pub const HB_ENTRY_TICKS: u16 = 18;

/// Consecutive ticks required to leave the hard-brake state.
pub const HB_EXIT_TICKS: u16 = 5;

// ─── Inverter setpoints ─────────────────────────────────────────────

/// Velocity commanded at 100 % gas.
pub const MAX_VELOCITY: i16 = 1000;

/// Torque limit magnitude used during bring-up, driving and hard brake.
pub const BRINGUP_TORQUE_LIMIT: i16 = 1000;

// ─── Indicators ─────────────────────────────────────────────────────

/// Brake intensity above which the brake light is lit.
pub const BRAKE_LIGHT_THRESHOLD: u16 = 5;

/// Ready-to-drive buzzer tone frequency [Hz].
pub const BUZZER_FREQ_HZ: u32 = 5300;

/// Ready-to-drive buzzer duty cycle [%].
pub const BUZZER_DUTY_PCT: f32 = 55.0;

/// Buzzer phase at which the tone is stopped.
pub const BUZZER_TIMEOUT_TICKS: u16 = 150;

/// Terminal buzzer phase; the buzzer stays silent until reset to 0.
pub const BUZZER_TERMINAL: u16 = 200;

// ─── Pedal sensor encoding ──────────────────────────────────────────

/// Raw value reported by an uncalibrated sensor.
pub const SENSOR_UNCALIBRATED: u16 = 0xFFFF;

/// Raw value reported for a short to ground.
pub const SENSOR_SHORT_TO_GROUND: u16 = 0xFF10;

/// Raw value reported for a short to supply.
pub const SENSOR_SHORT_TO_SUPPLY: u16 = 0xFF11;

/// Upper clamp for gas / brake / brake intensity.
pub const PEDAL_MAX: u16 = 100;

/// Lower clamp for steering angle.
pub const STEERING_MIN: i16 = -100;

/// Upper clamp for steering angle.
pub const STEERING_MAX: i16 = 100;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/vcu.toml";

const_assert!(NUM_LIVENESS_NODES == NUM_INVERTERS + 2);
const_assert!(BUZZER_TERMINAL > BUZZER_TIMEOUT_TICKS);
const_assert!(HB_GAS_LOW < HB_GAS_HIGH);
const_assert!(SENSOR_SHORT_TO_GROUND > PEDAL_MAX);
