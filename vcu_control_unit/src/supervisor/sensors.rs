//! Pedal sensor plausibility.

use vcu_common::consts::{SENSOR_SHORT_TO_GROUND, SENSOR_SHORT_TO_SUPPLY, SENSOR_UNCALIBRATED};
use vcu_common::vehicle::fault::Fault;
use vcu_common::vehicle::state::{PedalInputs, VehicleState};

/// True when no pedal channel carries the uncalibrated pattern.
pub fn sensors_calibrated(pedal: &PedalInputs) -> bool {
    pedal.gas != SENSOR_UNCALIBRATED
        && pedal.brake != SENSOR_UNCALIBRATED
        && pedal.steering_angle as u16 != SENSOR_UNCALIBRATED
        && pedal.brake_intensity != SENSOR_UNCALIBRATED
}

/// Calibration check used by `Init`: raises `SensorsNotCalibrated` when it fails.
pub fn check_calibration(state: &mut VehicleState) -> bool {
    let ok = sensors_calibrated(&state.pedal);
    if !ok {
        state.raise(Fault::SensorsNotCalibrated);
    }
    ok
}

/// Short-circuit check on gas and brake, run every tick.
///
/// Ground and supply are tested independently, ground first; with both
/// present the supply fault is the one left active.
pub fn check_short_circuit(state: &mut VehicleState) {
    let (gas, brake) = (state.pedal.gas, state.pedal.brake);
    if gas == SENSOR_SHORT_TO_GROUND || brake == SENSOR_SHORT_TO_GROUND {
        state.raise(Fault::ShortToGround);
    }
    if gas == SENSOR_SHORT_TO_SUPPLY || brake == SENSOR_SHORT_TO_SUPPLY {
        state.raise(Fault::ShortToSupply);
    }
}
