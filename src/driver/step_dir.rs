//! Step/direction driver family (DRV8825, A4988 and friends).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;

use crate::config::{Direction, StepMode, StepModeSet};
use crate::error::MotorError;

use super::sequencer::{write_pin, StepSequencer};

/// Maximum number of microstep-select pins.
pub const MAX_MICROSTEP_PINS: usize = 3;

/// MS1, MS2, MS3 levels for a step mode (DRV8825 table).
pub const fn microstep_pattern(mode: StepMode) -> [bool; MAX_MICROSTEP_PINS] {
    match mode {
        StepMode::Full => [false, false, false],
        StepMode::Half => [true, false, false],
        StepMode::Quarter => [false, true, false],
        StepMode::Eighth => [true, true, false],
        StepMode::Sixteenth => [false, false, true],
        StepMode::ThirtySecond => [true, false, true],
    }
}

/// Sequencer for drivers that take a STEP pulse and a DIR level.
pub struct StepDirSequencer<P: OutputPin> {
    step_pin: P,
    dir_pin: P,
    enable_pin: Option<P>,
    microstep_pins: Vec<P, MAX_MICROSTEP_PINS>,
    modes: StepModeSet,
    mode: StepMode,
    pulse_width_us: u32,
    enable_active_low: bool,
    reversed: bool,
}

impl<P: OutputPin> StepDirSequencer<P> {
    /// Create a sequencer.
    ///
    /// `modes` must be consistent with the number of microstep pins supplied;
    /// the builder guarantees this when created from a [`BoardConfig`](crate::config::BoardConfig).
    pub fn new(
        step_pin: P,
        dir_pin: P,
        enable_pin: Option<P>,
        microstep_pins: Vec<P, MAX_MICROSTEP_PINS>,
        modes: StepModeSet,
        pulse_width_us: u32,
        enable_active_low: bool,
    ) -> Self {
        Self {
            step_pin,
            dir_pin,
            enable_pin,
            microstep_pins,
            modes,
            mode: modes.resolve(StepMode::Full),
            pulse_width_us,
            enable_active_low,
            reversed: false,
        }
    }

    /// Release the pins.
    pub fn into_pins(self) -> (P, P, Option<P>, Vec<P, MAX_MICROSTEP_PINS>) {
        (self.step_pin, self.dir_pin, self.enable_pin, self.microstep_pins)
    }
}

impl<P: OutputPin> StepSequencer for StepDirSequencer<P> {
    fn step<D: DelayNs>(
        &mut self,
        direction: Direction,
        delay: &mut D,
    ) -> Result<(), MotorError> {
        let outward = (direction == Direction::Outward) != self.reversed;
        write_pin(&mut self.dir_pin, outward)?;

        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        delay.delay_us(self.pulse_width_us);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
        Ok(())
    }

    fn set_step_mode(&mut self, requested: StepMode) -> Result<StepMode, MotorError> {
        let effective = self.modes.resolve(requested);
        if effective != requested {
            warn!(
                "step mode {} not supported, using {}",
                requested.value(),
                effective.value()
            );
        }

        let pattern = microstep_pattern(effective);
        for (pin, level) in self.microstep_pins.iter_mut().zip(pattern) {
            write_pin(pin, level)?;
        }

        self.mode = effective;
        Ok(effective)
    }

    fn step_mode(&self) -> StepMode {
        self.mode
    }

    fn supported_step_modes(&self) -> StepModeSet {
        self.modes
    }

    fn energize(&mut self, on: bool) -> Result<(), MotorError> {
        let active_low = self.enable_active_low;
        match self.enable_pin.as_mut() {
            Some(pin) => write_pin(pin, on != active_low),
            None => Ok(()),
        }
    }

    fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }
}
