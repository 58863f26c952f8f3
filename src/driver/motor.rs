//! Uniform motor driver over any [`StepSequencer`].
//!
//! Owns the sequencer, the delay provider and the speed model. Stepping is a
//! blocking pulse followed by a busy-wait; the wait *is* the speed control.

use embedded_hal::delay::DelayNs;

use crate::config::{Direction, MotorSpeed, SpeedDelays, StepMode, StepModeSet};
use crate::error::MotorError;

use super::sequencer::StepSequencer;

/// Motion primitive shared by every board kind.
pub struct MotorDriver<S, D>
where
    S: StepSequencer,
    D: DelayNs,
{
    sequencer: S,
    delay: D,
    speed_delays: SpeedDelays,
    step_delay_us: u32,
    settle_us: u32,
    energized: bool,
}

impl<S, D> MotorDriver<S, D>
where
    S: StepSequencer,
    D: DelayNs,
{
    /// Create a driver at fast speed with the coils released.
    pub fn new(sequencer: S, delay: D, speed_delays: SpeedDelays, settle_us: u32) -> Self {
        Self {
            sequencer,
            delay,
            speed_delays,
            step_delay_us: speed_delays.fast_us,
            settle_us,
            energized: false,
        }
    }

    /// Perform one physical step, then wait the inter-step delay.
    ///
    /// Powers the driver first if it was released.
    pub fn step(&mut self, direction: Direction) -> Result<(), MotorError> {
        self.enable()?;
        self.sequencer.step(direction, &mut self.delay)?;
        self.delay.delay_us(self.step_delay_us);
        Ok(())
    }

    /// Power the coils. Includes the mandatory settle time when coming out of release.
    pub fn enable(&mut self) -> Result<(), MotorError> {
        if self.energized {
            return Ok(());
        }
        self.sequencer.energize(true)?;
        self.delay.delay_us(self.settle_us);
        self.energized = true;
        Ok(())
    }

    /// De-energize the coils.
    pub fn release(&mut self) -> Result<(), MotorError> {
        self.sequencer.energize(false)?;
        self.energized = false;
        Ok(())
    }

    /// Whether the coils are powered.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.energized
    }

    /// Select a speed level.
    pub fn set_speed(&mut self, speed: MotorSpeed) {
        self.step_delay_us = self.speed_delays.delay_us(speed);
        debug!("motor speed {} ({}us)", speed.index(), self.step_delay_us);
    }

    /// Current speed level, classified from the active delay.
    #[inline]
    pub fn speed(&self) -> MotorSpeed {
        self.speed_delays.classify(self.step_delay_us)
    }

    /// Active inter-step delay in microseconds.
    #[inline]
    pub fn step_delay_us(&self) -> u32 {
        self.step_delay_us
    }

    /// Request a step mode; returns the mode actually in effect.
    pub fn set_step_mode(&mut self, requested: StepMode) -> Result<StepMode, MotorError> {
        self.sequencer.set_step_mode(requested)
    }

    /// Step mode in effect.
    #[inline]
    pub fn step_mode(&self) -> StepMode {
        self.sequencer.step_mode()
    }

    /// Step modes the board can realize.
    #[inline]
    pub fn supported_step_modes(&self) -> StepModeSet {
        self.sequencer.supported_step_modes()
    }

    /// Swap inward and outward at the hardware.
    pub fn set_reversed(&mut self, reversed: bool) {
        self.sequencer.set_reversed(reversed);
    }

    /// Borrow the sequencer.
    pub fn sequencer(&self) -> &S {
        &self.sequencer
    }

    /// Take the driver apart.
    pub fn into_parts(self) -> (S, D) {
        (self.sequencer, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::CoilSequencer;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    /// Delay that records the total time spent.
    #[derive(Default)]
    struct RecordingDelay {
        total_ns: u64,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn driver_with(coils: &[PinMock; 4]) -> MotorDriver<CoilSequencer<PinMock>, RecordingDelay> {
        MotorDriver::new(
            CoilSequencer::new(coils.clone(), 200),
            RecordingDelay::default(),
            SpeedDelays::COIL_SEQUENCED,
            1_000,
        )
    }

    fn level(high: bool) -> Transaction {
        Transaction::set(if high { State::High } else { State::Low })
    }

    /// Coils expecting the enable pattern (1010) then one outward step (0110).
    fn enable_then_step_coils() -> [PinMock; 4] {
        [
            PinMock::new(&[level(true), level(false)]),
            PinMock::new(&[level(false), level(true)]),
            PinMock::new(&[level(true), level(true)]),
            PinMock::new(&[level(false), level(false)]),
        ]
    }

    fn silent_coils() -> [PinMock; 4] {
        [
            PinMock::new(&[]),
            PinMock::new(&[]),
            PinMock::new(&[]),
            PinMock::new(&[]),
        ]
    }

    #[test]
    fn test_enable_inserts_settle_time() {
        let mut coils = enable_then_step_coils();
        let mut driver = driver_with(&coils);
        driver.set_speed(MotorSpeed::Fast);

        driver.enable().unwrap();
        driver.step(Direction::Outward).unwrap();

        let (_, delay) = driver.into_parts();
        let expected_us = 1_000 + SpeedDelays::COIL_SEQUENCED.fast_us;
        assert_eq!(delay.total_ns, u64::from(expected_us) * 1_000);
        for coil in coils.iter_mut() {
            coil.done();
        }
    }

    #[test]
    fn test_step_from_released_matches_enable_then_step() {
        let mut coils = enable_then_step_coils();
        let mut driver = driver_with(&coils);

        driver.step(Direction::Outward).unwrap();
        assert!(driver.is_enabled());

        let (_, delay) = driver.into_parts();
        let expected_us = 1_000 + SpeedDelays::COIL_SEQUENCED.fast_us;
        assert_eq!(delay.total_ns, u64::from(expected_us) * 1_000);
        for coil in coils.iter_mut() {
            coil.done();
        }
    }

    #[test]
    fn test_speed_round_trips_through_delay() {
        let mut coils = silent_coils();
        let mut driver = driver_with(&coils);

        for speed in MotorSpeed::ALL {
            driver.set_speed(speed);
            assert_eq!(driver.speed(), speed);
        }
        for coil in coils.iter_mut() {
            coil.done();
        }
    }
}
