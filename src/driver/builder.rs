//! Builder pattern for MotorDriver.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::config::{validate_board_config, BoardConfig, BoardKind};
use crate::error::{ConfigError, Error, Result};

use super::coil::CoilSequencer;
use super::motor::MotorDriver;
use super::sequencer::BoardSequencer;
use super::step_dir::{StepDirSequencer, MAX_MICROSTEP_PINS};

/// Builder for a [`MotorDriver`] over the board named in configuration.
///
/// All pins share one type `P`; use an erased pin type (e.g. `AnyPin`) when
/// the HAL gives each GPIO its own type.
pub struct MotorDriverBuilder<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    board: Option<BoardConfig>,
    step_pin: Option<P>,
    dir_pin: Option<P>,
    enable_pin: Option<P>,
    microstep_pins: Vec<P, MAX_MICROSTEP_PINS>,
    microstep_overflow: bool,
    coil_pins: Option<[P; 4]>,
    delay: Option<D>,
}

impl<P, D> Default for MotorDriverBuilder<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, D> MotorDriverBuilder<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            board: None,
            step_pin: None,
            dir_pin: None,
            enable_pin: None,
            microstep_pins: Vec::new(),
            microstep_overflow: false,
            coil_pins: None,
            delay: None,
        }
    }

    /// Set the board description.
    pub fn board(mut self, board: BoardConfig) -> Self {
        self.board = Some(board);
        self
    }

    /// Set the STEP pin (step/dir boards).
    pub fn step_pin(mut self, pin: P) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin (step/dir boards).
    pub fn dir_pin(mut self, pin: P) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the driver enable pin (step/dir boards).
    pub fn enable_pin(mut self, pin: P) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    /// Add the next microstep-select pin (MS1, then MS2, then MS3).
    ///
    /// The count is checked against the board's `microstep_pins` at build
    /// time; a fourth pin makes the build fail.
    pub fn microstep_pin(mut self, pin: P) -> Self {
        if self.microstep_pins.push(pin).is_err() {
            self.microstep_overflow = true;
        }
        self
    }

    /// Set the four coil pins, coil 1 first (coil-sequenced boards).
    pub fn coil_pins(mut self, pins: [P; 4]) -> Self {
        self.coil_pins = Some(pins);
        self
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build the MotorDriver.
    ///
    /// # Errors
    ///
    /// Returns an error if the board description is invalid or the supplied
    /// pins don't match its kind.
    pub fn build(self) -> Result<MotorDriver<BoardSequencer<P>, D>> {
        let board = self.board.ok_or(Error::Config(ConfigError::PinMismatch(
            "board is required",
        )))?;
        validate_board_config(&board)?;

        let delay = self
            .delay
            .ok_or(Error::Config(ConfigError::PinMismatch("delay is required")))?;

        let sequencer = match board.kind {
            BoardKind::StepDir => {
                if self.coil_pins.is_some() {
                    return Err(Error::Config(ConfigError::PinMismatch(
                        "coil pins given for a step/dir board",
                    )));
                }
                if self.microstep_overflow
                    || self.microstep_pins.len() != usize::from(board.microstep_pins)
                {
                    return Err(Error::Config(ConfigError::PinMismatch(
                        "microstep pin count differs from board",
                    )));
                }
                let step_pin = self.step_pin.ok_or(Error::Config(ConfigError::PinMismatch(
                    "step_pin is required",
                )))?;
                let dir_pin = self.dir_pin.ok_or(Error::Config(ConfigError::PinMismatch(
                    "dir_pin is required",
                )))?;

                BoardSequencer::StepDir(StepDirSequencer::new(
                    step_pin,
                    dir_pin,
                    self.enable_pin,
                    self.microstep_pins,
                    board.step_modes(),
                    board.pulse_width_us,
                    board.enable_active_low,
                ))
            }
            BoardKind::CoilSequenced => {
                if self.step_pin.is_some()
                    || self.dir_pin.is_some()
                    || self.enable_pin.is_some()
                    || !self.microstep_pins.is_empty()
                    || self.microstep_overflow
                {
                    return Err(Error::Config(ConfigError::PinMismatch(
                        "step/dir pins given for a coil-sequenced board",
                    )));
                }
                let coils = self.coil_pins.ok_or(Error::Config(ConfigError::PinMismatch(
                    "coil_pins are required",
                )))?;

                BoardSequencer::Coil(CoilSequencer::new(coils, board.steps_per_revolution))
            }
        };

        Ok(MotorDriver::new(
            sequencer,
            delay,
            board.speed_delays(),
            board.enable_settle_us,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StepMode;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::Mock as PinMock;

    fn pin() -> PinMock {
        PinMock::new(&[])
    }

    #[test]
    fn test_build_step_dir() {
        let (mut step, mut dir) = (pin(), pin());
        let driver = MotorDriverBuilder::new()
            .board(BoardConfig::step_dir("drv", 200, 0))
            .step_pin(step.clone())
            .dir_pin(dir.clone())
            .delay(NoopDelay::new())
            .build()
            .unwrap();

        assert!(driver.supported_step_modes().is_fixed());
        assert_eq!(driver.step_mode(), StepMode::Full);
        step.done();
        dir.done();
    }

    #[test]
    fn test_build_coil_board() {
        let mut coils = [pin(), pin(), pin(), pin()];
        let driver = MotorDriverBuilder::new()
            .board(BoardConfig::coil_sequenced("uln2003", 2048))
            .coil_pins(coils.clone())
            .delay(NoopDelay::new())
            .build()
            .unwrap();

        assert!(matches!(driver.sequencer(), BoardSequencer::Coil(_)));
        for coil in coils.iter_mut() {
            coil.done();
        }
    }

    #[test]
    fn test_microstep_pin_count_must_match() {
        let (mut step, mut dir, mut ms1) = (pin(), pin(), pin());
        let result = MotorDriverBuilder::new()
            .board(BoardConfig::step_dir("drv", 200, 3))
            .step_pin(step.clone())
            .dir_pin(dir.clone())
            .microstep_pin(ms1.clone())
            .delay(NoopDelay::new())
            .build();

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::PinMismatch(_)))
        ));
        for p in [&mut step, &mut dir, &mut ms1] {
            p.done();
        }
    }

    #[test]
    fn test_fourth_microstep_pin_fails_build() {
        let (mut step, mut dir) = (pin(), pin());
        let mut ms = [pin(), pin(), pin(), pin()];
        let result = MotorDriverBuilder::new()
            .board(BoardConfig::step_dir("drv", 200, 3))
            .step_pin(step.clone())
            .dir_pin(dir.clone())
            .microstep_pin(ms[0].clone())
            .microstep_pin(ms[1].clone())
            .microstep_pin(ms[2].clone())
            .microstep_pin(ms[3].clone())
            .delay(NoopDelay::new())
            .build();

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::PinMismatch(_)))
        ));
        step.done();
        dir.done();
        for p in ms.iter_mut() {
            p.done();
        }
    }

    #[test]
    fn test_coil_board_rejects_step_pin() {
        let mut step = pin();
        let mut coils = [pin(), pin(), pin(), pin()];
        let result = MotorDriverBuilder::new()
            .board(BoardConfig::coil_sequenced("l298n", 200))
            .step_pin(step.clone())
            .coil_pins(coils.clone())
            .delay(NoopDelay::new())
            .build();

        assert!(result.is_err());
        step.done();
        for coil in coils.iter_mut() {
            coil.done();
        }
    }
}
