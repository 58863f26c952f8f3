//! Step sequencer abstraction.
//!
//! A sequencer turns "advance one unit in this direction" into pin transitions
//! for one driver family. Step-mode requests outside the family's capability
//! are clamped, and the effective mode is returned to the caller.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{Direction, StepMode, StepModeSet};
use crate::error::MotorError;

use super::coil::CoilSequencer;
use super::step_dir::StepDirSequencer;

/// Pin-level realization of single steps for a driver family.
pub trait StepSequencer {
    /// Emit exactly one step in `direction`.
    ///
    /// `delay` is only used for pulse-width timing inside the step, never for
    /// the inter-step delay.
    fn step<D: DelayNs>(&mut self, direction: Direction, delay: &mut D)
        -> Result<(), MotorError>;

    /// Request a step mode and return the mode actually in effect.
    fn set_step_mode(&mut self, requested: StepMode) -> Result<StepMode, MotorError>;

    /// Step mode in effect.
    fn step_mode(&self) -> StepMode;

    /// Modes this hardware can realize.
    fn supported_step_modes(&self) -> StepModeSet;

    /// Power (`true`) or de-energize (`false`) the motor coils.
    fn energize(&mut self, on: bool) -> Result<(), MotorError>;

    /// Swap inward and outward at the pins.
    fn set_reversed(&mut self, reversed: bool);
}

/// Runtime-selected sequencer for the board described in configuration.
pub enum BoardSequencer<P: OutputPin> {
    /// Step/direction driver chip.
    StepDir(StepDirSequencer<P>),
    /// Coil-sequenced H-bridge.
    Coil(CoilSequencer<P>),
}

impl<P: OutputPin> StepSequencer for BoardSequencer<P> {
    fn step<D: DelayNs>(
        &mut self,
        direction: Direction,
        delay: &mut D,
    ) -> Result<(), MotorError> {
        match self {
            BoardSequencer::StepDir(s) => s.step(direction, delay),
            BoardSequencer::Coil(s) => s.step(direction, delay),
        }
    }

    fn set_step_mode(&mut self, requested: StepMode) -> Result<StepMode, MotorError> {
        match self {
            BoardSequencer::StepDir(s) => s.set_step_mode(requested),
            BoardSequencer::Coil(s) => s.set_step_mode(requested),
        }
    }

    fn step_mode(&self) -> StepMode {
        match self {
            BoardSequencer::StepDir(s) => s.step_mode(),
            BoardSequencer::Coil(s) => s.step_mode(),
        }
    }

    fn supported_step_modes(&self) -> StepModeSet {
        match self {
            BoardSequencer::StepDir(s) => s.supported_step_modes(),
            BoardSequencer::Coil(s) => s.supported_step_modes(),
        }
    }

    fn energize(&mut self, on: bool) -> Result<(), MotorError> {
        match self {
            BoardSequencer::StepDir(s) => s.energize(on),
            BoardSequencer::Coil(s) => s.energize(on),
        }
    }

    fn set_reversed(&mut self, reversed: bool) {
        match self {
            BoardSequencer::StepDir(s) => s.set_reversed(reversed),
            BoardSequencer::Coil(s) => s.set_reversed(reversed),
        }
    }
}

#[inline]
pub(crate) fn write_pin<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), MotorError> {
    if high {
        pin.set_high().map_err(|_| MotorError::PinError)
    } else {
        pin.set_low().map_err(|_| MotorError::PinError)
    }
}
