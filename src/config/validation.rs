//! Board configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::board::{BoardConfig, BoardKind};
use super::units::StepModeSet;

/// Validate a board configuration.
///
/// Checks:
/// - Steps per revolution and pulse width are non-zero
/// - Speed delays are strictly ordered with fast the smallest
/// - At most three microstep-select pins
/// - A wired step mode is one the driver family can produce
pub fn validate_board_config(config: &BoardConfig) -> Result<()> {
    if config.steps_per_revolution == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(
            config.steps_per_revolution,
        )));
    }

    if config.pulse_width_us == 0 {
        return Err(Error::Config(ConfigError::InvalidPulseWidth(
            config.pulse_width_us,
        )));
    }

    let delays = config.speed_delays();
    if !delays.is_valid() {
        return Err(Error::Config(ConfigError::InvalidSpeedDelays {
            slow_us: delays.slow_us,
            medium_us: delays.medium_us,
            fast_us: delays.fast_us,
        }));
    }

    if config.microstep_pins > 3 {
        return Err(Error::Config(ConfigError::TooManyMicrostepPins(
            config.microstep_pins,
        )));
    }

    if let Some(mode) = config.fixed_step_mode {
        if config.kind == BoardKind::CoilSequenced && !StepModeSet::FULL_HALF.contains(mode) {
            return Err(Error::Config(ConfigError::UnsupportedStepMode(mode.value())));
        }
    }

    Ok(())
}
