//! Coil-sequenced driver family (ULN2003, L298N, L293D, L9110S).
//!
//! The four coil pins walk a phase table. Full step uses four two-coil
//! patterns; half step interleaves a one-coil pattern between each of them.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{Direction, StepMode, StepModeSet};
use crate::error::MotorError;

use super::sequencer::{write_pin, StepSequencer};

/// Full-step phase table. Bit 3 drives coil 1, bit 0 drives coil 4.
pub const FULL_STEP_TABLE: [u8; 4] = [0b1010, 0b0110, 0b0101, 0b1001];

/// Half-step phase table. Odd entries are the full-step patterns.
pub const HALF_STEP_TABLE: [u8; 8] = [
    0b1000, 0b1010, 0b0010, 0b0110, 0b0100, 0b0101, 0b0001, 0b1001,
];

/// Sequencer for 4-wire H-bridge drivers.
pub struct CoilSequencer<P: OutputPin> {
    coils: [P; 4],
    mode: StepMode,
    steps_per_revolution: u16,
    step_number: u32,
    energized: bool,
    reversed: bool,
}

impl<P: OutputPin> CoilSequencer<P> {
    /// Create a sequencer in full-step mode at phase 0, coils off.
    pub fn new(coils: [P; 4], steps_per_revolution: u16) -> Self {
        Self {
            coils,
            mode: StepMode::Full,
            steps_per_revolution: steps_per_revolution.max(1),
            step_number: 0,
            energized: false,
            reversed: false,
        }
    }

    /// Index into the phase table for the current step.
    #[inline]
    pub fn phase(&self) -> usize {
        self.step_number as usize % self.table().len()
    }

    /// Coil pattern currently driven (or that would be driven when energized).
    #[inline]
    pub fn pattern(&self) -> u8 {
        self.table()[self.phase()]
    }

    /// Release the pins.
    pub fn into_pins(self) -> [P; 4] {
        self.coils
    }

    fn table(&self) -> &'static [u8] {
        match self.mode {
            StepMode::Half => &HALF_STEP_TABLE,
            _ => &FULL_STEP_TABLE,
        }
    }

    /// Length of one step-counter cycle, a whole number of table passes.
    fn cycle_len(&self) -> u32 {
        let table_len = self.table().len() as u32;
        let steps = u32::from(self.steps_per_revolution) * u32::from(self.mode.value());
        (steps / table_len).max(1) * table_len
    }

    fn write_phase(&mut self) -> Result<(), MotorError> {
        let pattern = self.pattern();
        for (i, coil) in self.coils.iter_mut().enumerate() {
            write_pin(coil, pattern & (0b1000 >> i) != 0)?;
        }
        Ok(())
    }
}

impl<P: OutputPin> StepSequencer for CoilSequencer<P> {
    fn step<D: DelayNs>(
        &mut self,
        direction: Direction,
        _delay: &mut D,
    ) -> Result<(), MotorError> {
        let cycle = self.cycle_len();
        let forward = (direction == Direction::Outward) != self.reversed;
        self.step_number = if forward {
            (self.step_number + 1) % cycle
        } else if self.step_number == 0 {
            cycle - 1
        } else {
            self.step_number - 1
        };
        self.energized = true;
        self.write_phase()
    }

    fn set_step_mode(&mut self, requested: StepMode) -> Result<StepMode, MotorError> {
        let effective = StepModeSet::FULL_HALF.resolve(requested);
        if effective != requested {
            warn!(
                "coil driver cannot do step mode {}, using {}",
                requested.value(),
                effective.value()
            );
        }

        if effective != self.mode {
            // Keep the rotor where it is: full-step entry i is half-step entry 2i+1.
            self.step_number = match effective {
                StepMode::Half => self.step_number * 2 + 1,
                _ => self.step_number / 2,
            };
            self.mode = effective;
            self.step_number %= self.cycle_len();
            if self.energized {
                self.write_phase()?;
            }
        }

        Ok(effective)
    }

    fn step_mode(&self) -> StepMode {
        self.mode
    }

    fn supported_step_modes(&self) -> StepModeSet {
        StepModeSet::FULL_HALF
    }

    fn energize(&mut self, on: bool) -> Result<(), MotorError> {
        self.energized = on;
        if on {
            self.write_phase()
        } else {
            for coil in self.coils.iter_mut() {
                write_pin(coil, false)?;
            }
            Ok(())
        }
    }

    fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }
}
