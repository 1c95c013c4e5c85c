//! Stage lamps and brake light.

use vcu_common::vehicle::state::Stage;

use crate::io::{Indicator, Indicators, Level};

/// Drive the stage lamps: exactly one lit, the bring-up lamp blinking.
pub fn show_stage<IO: Indicators + ?Sized>(io: &mut IO, stage: Stage) {
    use Indicator::{StageDriveLamp, StageInitLamp, StagePreDriveLamp};

    match stage {
        Stage::Init => {
            io.set_indicator(StageInitLamp, Level::On);
            io.set_indicator(StagePreDriveLamp, Level::Off);
            io.set_indicator(StageDriveLamp, Level::Off);
        }
        Stage::PreDrive => {
            io.set_indicator(StageInitLamp, Level::Off);
            io.set_indicator(StagePreDriveLamp, Level::On);
            io.set_indicator(StageDriveLamp, Level::Off);
        }
        Stage::InverterBringup => {
            io.set_indicator(StageInitLamp, Level::Off);
            io.set_indicator(StageDriveLamp, Level::Off);
            io.set_indicator(StagePreDriveLamp, Level::Toggle);
        }
        Stage::Driving => {
            io.set_indicator(StageInitLamp, Level::Off);
            io.set_indicator(StagePreDriveLamp, Level::Off);
            io.set_indicator(StageDriveLamp, Level::On);
        }
    }
}

/// Brake light on while brake intensity is above the threshold.
pub fn update_brake_light<IO: Indicators + ?Sized>(io: &mut IO, brake_intensity: u16, threshold: u16) {
    io.set_indicator(Indicator::BrakeLight, Level::from(brake_intensity > threshold));
}
