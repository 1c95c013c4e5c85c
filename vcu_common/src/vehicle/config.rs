//! VCU configuration document.
//!
//! Every field carries a serde default equal to the firmware constant in
//! [`crate::consts`], so an empty TOML document yields the stock vehicle.
//! Sections are optional and may be given partially.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigLoader, LogLevel};
use crate::consts::*;
use crate::protocol::frame::CanChannel;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level VCU configuration.
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcuConfig {
    /// Tick period in microseconds (default: 20 000 = 50 Hz).
    #[serde(default = "default_tick_period_us")]
    pub tick_period_us: u32,

    /// Diagnostic snapshot interval [ticks]; 0 disables snapshots.
    #[serde(default = "default_diag_interval")]
    pub diag_interval_ticks: u32,

    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub stages: StageConfig,

    #[serde(default)]
    pub liveness: LivenessConfig,

    #[serde(default)]
    pub hard_brake: HardBrakeConfig,

    #[serde(default)]
    pub drive: DriveConfig,

    #[serde(default)]
    pub indicators: IndicatorConfig,

    #[serde(default)]
    pub pedal: PedalConfig,

    #[serde(default)]
    pub can: CanConfig,

    #[serde(default)]
    pub fault_policy: FaultPolicy,
}

fn default_tick_period_us() -> u32 {
    DEFAULT_TICK_PERIOD_US
}
fn default_diag_interval() -> u32 {
    DIAG_INTERVAL_TICKS_DEFAULT
}

impl Default for VcuConfig {
    fn default() -> Self {
        Self {
            tick_period_us: DEFAULT_TICK_PERIOD_US,
            diag_interval_ticks: DIAG_INTERVAL_TICKS_DEFAULT,
            log_level: LogLevel::default(),
            stages: StageConfig::default(),
            liveness: LivenessConfig::default(),
            hard_brake: HardBrakeConfig::default(),
            drive: DriveConfig::default(),
            indicators: IndicatorConfig::default(),
            pedal: PedalConfig::default(),
            can: CanConfig::default(),
            fault_policy: FaultPolicy::default(),
        }
    }
}

impl VcuConfig {
    /// Check bounds and cross-field relations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_us < TICK_PERIOD_US_MIN || self.tick_period_us > TICK_PERIOD_US_MAX {
            return Err(invalid(format!(
                "tick_period_us {} out of range [{}, {}]",
                self.tick_period_us, TICK_PERIOD_US_MIN, TICK_PERIOD_US_MAX
            )));
        }
        if self.stages.r2d_window_ticks == 0 {
            return Err(invalid("stages.r2d_window_ticks must be non-zero".into()));
        }
        if self.liveness.timeout_ticks == 0 {
            return Err(invalid("liveness.timeout_ticks must be non-zero".into()));
        }

        let hb = &self.hard_brake;
        if hb.gas_low >= hb.gas_high {
            return Err(invalid(format!(
                "hard_brake.gas_low {} must be below gas_high {}",
                hb.gas_low, hb.gas_high
            )));
        }
        if hb.entry_ticks == 0 || hb.exit_ticks == 0 {
            return Err(invalid(
                "hard_brake.entry_ticks and exit_ticks must be non-zero".into(),
            ));
        }
        if hb.torque_limit < 0 {
            return Err(invalid(format!(
                "hard_brake.torque_limit {} must not be negative",
                hb.torque_limit
            )));
        }

        if self.drive.max_velocity < 0 || self.drive.bringup_torque_limit < 0 {
            return Err(invalid(
                "drive.max_velocity and drive.bringup_torque_limit must not be negative".into(),
            ));
        }

        let ind = &self.indicators;
        if !(0.0..=100.0).contains(&ind.buzzer_duty_pct) {
            return Err(invalid(format!(
                "indicators.buzzer_duty_pct {} out of range [0, 100]",
                ind.buzzer_duty_pct
            )));
        }
        if ind.buzzer_freq_hz == 0 {
            return Err(invalid("indicators.buzzer_freq_hz must be non-zero".into()));
        }
        if ind.buzzer_terminal <= ind.buzzer_timeout_ticks {
            return Err(invalid(format!(
                "indicators.buzzer_terminal {} must exceed buzzer_timeout_ticks {}",
                ind.buzzer_terminal, ind.buzzer_timeout_ticks
            )));
        }

        let pedal = &self.pedal;
        if pedal.max == 0 || pedal.max >= SENSOR_SHORT_TO_GROUND {
            return Err(invalid(format!(
                "pedal.max {} must be in [1, {:#06x})",
                pedal.max, SENSOR_SHORT_TO_GROUND
            )));
        }
        if pedal.steering_min >= pedal.steering_max {
            return Err(invalid(format!(
                "pedal.steering_min {} must be below steering_max {}",
                pedal.steering_min, pedal.steering_max
            )));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<VcuConfig, ConfigError> {
    let config = VcuConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a configuration document.
pub fn load_config_from_str(content: &str) -> Result<VcuConfig, ConfigError> {
    let config = VcuConfig::from_toml_str(content)?;
    config.validate()?;
    Ok(config)
}

// ─── Sections ───────────────────────────────────────────────────────

/// Stage sequencer tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Ready-to-drive debounce window [ticks].
    pub r2d_window_ticks: u16,
    /// Brake intensity strictly above which the brake counts as pressed.
    pub brake_pressed_threshold: u16,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            r2d_window_ticks: R2D_WINDOW_TICKS,
            brake_pressed_threshold: BRAKE_PEDAL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Sweep window [ticks].
    pub timeout_ticks: u16,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            timeout_ticks: LIVENESS_TIMEOUT_TICKS,
        }
    }
}

/// Brake-pedal plausibility check (hard brake) tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardBrakeConfig {
    pub gas_high: u16,
    pub brake_high: u16,
    pub gas_low: u16,
    pub entry_ticks: u16,
    pub exit_ticks: u16,
    /// Torque limit magnitude sent with the zero-velocity setpoints.
    pub torque_limit: i16,
}

impl Default for HardBrakeConfig {
    fn default() -> Self {
        Self {
            gas_high: HB_GAS_HIGH,
            brake_high: HB_BRAKE_HIGH,
            gas_low: HB_GAS_LOW,
            entry_ticks: HB_ENTRY_TICKS,
            exit_ticks: HB_EXIT_TICKS,
            torque_limit: BRINGUP_TORQUE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Velocity commanded at full gas.
    pub max_velocity: i16,
    /// Torque limit magnitude once an inverter has acknowledged enable.
    pub bringup_torque_limit: i16,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_velocity: MAX_VELOCITY,
            bringup_torque_limit: BRINGUP_TORQUE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub brake_light_threshold: u16,
    pub buzzer_freq_hz: u32,
    pub buzzer_duty_pct: f32,
    pub buzzer_timeout_ticks: u16,
    pub buzzer_terminal: u16,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            brake_light_threshold: BRAKE_LIGHT_THRESHOLD,
            buzzer_freq_hz: BUZZER_FREQ_HZ,
            buzzer_duty_pct: BUZZER_DUTY_PCT,
            buzzer_timeout_ticks: BUZZER_TIMEOUT_TICKS,
            buzzer_terminal: BUZZER_TERMINAL,
        }
    }
}

/// Pedal box decode clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PedalConfig {
    /// Upper clamp for gas, brake and brake intensity.
    pub max: u16,
    pub steering_min: i16,
    pub steering_max: i16,
}

impl Default for PedalConfig {
    fn default() -> Self {
        Self {
            max: PEDAL_MAX,
            steering_min: STEERING_MIN,
            steering_max: STEERING_MAX,
        }
    }
}

/// Bus assignment of the inverter pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanConfig {
    /// Bus carrying inverters 1 and 2.
    pub front_pair_channel: CanChannel,
    /// Bus carrying inverters 3 and 4.
    pub rear_pair_channel: CanChannel,
}

impl Default for CanConfig {
    fn default() -> Self {
        Self {
            front_pair_channel: CanChannel::Can1,
            rear_pair_channel: CanChannel::Can1,
        }
    }
}

/// Which inverters the per-tick error scan looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InverterErrorScan {
    /// All four inverters.
    #[default]
    All,
    /// Inverters 1 and 2 only.
    FrontPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultPolicy {
    pub inverter_error_scan: InverterErrorScan,
    /// Return `system_fault` to `NoFault` once a stage-reset fault was handled.
    pub acknowledge_reset_faults: bool,
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self {
            inverter_error_scan: InverterErrorScan::All,
            acknowledge_reset_faults: true,
        }
    }
}
