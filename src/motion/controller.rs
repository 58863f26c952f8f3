//! Focuser motion controller.
//!
//! Owns position, target and every motion-related setting. A single
//! cooperative loop calls [`MotionController::tick`]; transports change the
//! target and settings between ticks, and the next tick picks the change up.

use embedded_hal::delay::DelayNs;

use crate::compensation::{
    BacklashCompensator, BacklashConfig, TemperatureCompensator, TemperatureConfig,
};
use crate::config::{
    CompensationDirection, Direction, FocuserSettings, MotorSpeed, StepMode, StepModeSet,
    VariableState, PRESET_COUNT,
};
use crate::driver::{MotorDriver, StepSequencer};
use crate::error::Result;
use crate::status::{display_temperature, speed_options, step_mode_options, FocuserStatus};
use crate::storage::{load_or_default, SettingsStore};

use super::clock::Clock;
use super::persistence::WriteBehind;
use super::state::MotionState;

/// Focuser motion state machine.
pub struct MotionController<S, D, C>
where
    S: StepSequencer,
    D: DelayNs,
    C: Clock,
{
    driver: MotorDriver<S, D>,
    clock: C,
    settings: FocuserSettings,
    current: u32,
    target: u32,
    last_direction: Direction,
    state: MotionState,
    settle_started_ms: u64,
    backlash: BacklashCompensator,
    /// Backlash steps at the end of the current move.
    backlash_inserted: u32,
    temperature: TemperatureCompensator,
    last_reading: Option<f32>,
    persistent_changes: WriteBehind,
    variable_changes: WriteBehind,
}

impl<S, D, C> MotionController<S, D, C>
where
    S: StepSequencer,
    D: DelayNs,
    C: Clock,
{
    /// Create a controller from loaded settings.
    ///
    /// Applies speed, direction and step mode to the driver. The loaded
    /// position is aligned to the effective step mode and clamped to
    /// `max_step`. A step mode the board can't realize is replaced by the
    /// effective one and the configuration is marked for rewriting.
    pub fn new(
        mut driver: MotorDriver<S, D>,
        clock: C,
        mut settings: FocuserSettings,
        variable: VariableState,
    ) -> Result<Self> {
        settings.sanitize();

        driver.set_reversed(settings.reverse_direction);
        driver.set_speed(settings.motor_speed);
        let mode = driver.set_step_mode(settings.step_mode)?;

        let now = clock.now_ms();
        let mut persistent_changes = WriteBehind::default();
        if mode != settings.step_mode {
            warn!(
                "step mode {} unsupported, using {}",
                settings.step_mode.value(),
                mode.value()
            );
            settings.step_mode = mode;
            persistent_changes.mark(now);
        }

        let current = variable.aligned_position(mode, settings.max_step);
        if settings.coil_power {
            driver.enable()?;
        }

        info!("focuser ready at {} (max {})", current, settings.max_step);

        Ok(Self {
            driver,
            clock,
            backlash: BacklashCompensator::new(BacklashConfig::from_settings(&settings)),
            temperature: TemperatureCompensator::new(TemperatureConfig::from_settings(&settings)),
            settings,
            current,
            target: current,
            last_direction: variable.last_direction,
            state: MotionState::Idle,
            settle_started_ms: now,
            backlash_inserted: 0,
            last_reading: None,
            persistent_changes,
            variable_changes: WriteBehind::default(),
        })
    }

    /// Create a controller from whatever `store` holds, restoring defaults
    /// for missing or corrupt documents.
    pub fn from_store<T: SettingsStore + ?Sized>(
        driver: MotorDriver<S, D>,
        clock: C,
        store: &mut T,
    ) -> Result<Self> {
        let (settings, variable) = load_or_default(store);
        Self::new(driver, clock, settings, variable)
    }

    // ------------------------------------------------------------------
    // Motion
    // ------------------------------------------------------------------

    /// Run one iteration of the state machine.
    ///
    /// Issues at most one step. Blocks for that step plus the inter-step delay.
    pub fn tick(&mut self) -> Result<MotionState> {
        let now = self.clock.now_ms();

        if self.current != self.target {
            self.step_toward_target(now)?;
            if self.current == self.target {
                self.begin_settle(now);
            }
            return Ok(self.state);
        }

        match self.state {
            MotionState::Moving | MotionState::ApplyingBacklash | MotionState::Halted => {
                self.begin_settle(now);
            }
            MotionState::DelayAfterMove => {
                let waited = now.saturating_sub(self.settle_started_ms);
                if waited >= u64::from(self.settings.delay_after_move_ms) {
                    if !self.settings.coil_power {
                        self.driver.release()?;
                    }
                    self.state = MotionState::Idle;
                    debug!("idle at {}", self.current);
                }
            }
            MotionState::Idle => {}
        }

        Ok(self.state)
    }

    fn step_toward_target(&mut self, now: u64) -> Result<()> {
        let mut direction = match Direction::between(self.current, self.target) {
            Some(d) => d,
            None => return Ok(()),
        };

        if direction != self.last_direction {
            let adjusted = self.backlash.adjust_target(
                self.target,
                self.current,
                self.last_direction,
                self.settings.max_step,
            );
            self.target = adjusted.target;
            self.last_direction = adjusted.direction;
            self.backlash_inserted = adjusted.inserted;
            direction = adjusted.direction;
        }

        if !self.state.is_stepping() {
            debug!("move {} -> {}", self.current, self.target);
        }

        self.state = if self.backlash_inserted > 0
            && self.current.abs_diff(self.target) <= self.backlash_inserted
        {
            MotionState::ApplyingBacklash
        } else {
            MotionState::Moving
        };

        self.driver.step(direction)?;
        self.current = match direction {
            Direction::Outward => self.current + 1,
            Direction::Inward => self.current - 1,
        };
        self.variable_changes.mark(now);

        Ok(())
    }

    fn begin_settle(&mut self, now: u64) {
        self.state = MotionState::DelayAfterMove;
        self.settle_started_ms = now;
        self.backlash_inserted = 0;
    }

    /// Current position in steps.
    #[inline]
    pub fn position(&self) -> u32 {
        self.current
    }

    /// Target position in steps.
    #[inline]
    pub fn target_position(&self) -> u32 {
        self.target
    }

    /// Target differs from position.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.current != self.target
    }

    /// State machine state.
    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Direction of the last move.
    #[inline]
    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    /// Set the target, clamped to `[0, max_step]`. Returns the target in effect.
    ///
    /// Allowed while moving; the latest target wins on the next tick.
    pub fn set_target_position(&mut self, position: i64) -> u32 {
        self.target = position.clamp(0, i64::from(self.settings.max_step)) as u32;
        self.backlash_inserted = 0;
        debug!("target {}", self.target);
        self.target
    }

    /// Redefine the current position without moving. Refused while moving.
    ///
    /// The position is clamped to `max_step`; the target follows it.
    pub fn set_absolute_position(&mut self, position: u32) -> bool {
        if self.is_moving() {
            return false;
        }
        self.current = position.min(self.settings.max_step);
        self.target = self.current;
        self.variable_changes.mark(self.clock.now_ms());
        info!("position set to {}", self.current);
        true
    }

    /// Stop at the current position.
    ///
    /// The step already issued completes; none follow. No effect when idle.
    pub fn halt(&mut self) {
        if !self.is_moving() {
            return;
        }
        self.target = self.current;
        self.backlash_inserted = 0;
        self.state = MotionState::Halted;
        info!("halted at {}", self.current);
    }

    /// Home switch closed.
    ///
    /// While moving inward the focuser is at its datum: position and target
    /// both become zero. Ignored otherwise.
    pub fn home_switch_triggered(&mut self) -> bool {
        if !self.is_moving() || self.target > self.current {
            return false;
        }
        let now = self.clock.now_ms();
        self.current = 0;
        self.target = 0;
        self.begin_settle(now);
        self.variable_changes.mark(now);
        info!("home switch reached");
        true
    }

    // ------------------------------------------------------------------
    // Drive settings
    // ------------------------------------------------------------------

    /// Step mode in effect.
    pub fn step_mode(&self) -> StepMode {
        self.driver.step_mode()
    }

    /// Request a step mode; the board may substitute another. Returns the
    /// mode in effect.
    pub fn set_step_mode(&mut self, mode: StepMode) -> Result<StepMode> {
        let effective = self.driver.set_step_mode(mode)?;
        self.settings.step_mode = effective;
        self.mark_persistent();
        Ok(effective)
    }

    /// Modes the board supports.
    pub fn supported_step_modes(&self) -> StepModeSet {
        self.driver.supported_step_modes()
    }

    /// Speed level in effect.
    pub fn motor_speed(&self) -> MotorSpeed {
        self.driver.speed()
    }

    /// Select a speed level.
    pub fn set_motor_speed(&mut self, speed: MotorSpeed) {
        self.driver.set_speed(speed);
        self.settings.motor_speed = self.driver.speed();
        self.mark_persistent();
    }

    /// Highest reachable position.
    pub fn max_step(&self) -> u32 {
        self.settings.max_step
    }

    /// Set `max_step`, never below the current position or the hardware
    /// lower limit. The target and presets are pulled in if they exceed it.
    /// Returns the value in effect.
    pub fn set_max_step(&mut self, max_step: u32) -> u32 {
        self.settings.max_step = FocuserSettings::clamp_max_step(max_step, self.current);
        self.target = self.target.min(self.settings.max_step);
        self.settings.sanitize();
        self.mark_persistent();
        self.settings.max_step
    }

    /// Post-move settle time in milliseconds.
    pub fn delay_after_move_ms(&self) -> u8 {
        self.settings.delay_after_move_ms
    }

    /// Set the post-move settle time.
    pub fn set_delay_after_move_ms(&mut self, delay_ms: u8) {
        self.settings.delay_after_move_ms = delay_ms;
        self.mark_persistent();
    }

    /// Coils stay energized while idle.
    pub fn coil_power(&self) -> bool {
        self.settings.coil_power
    }

    /// Change the idle coil policy. Takes effect at once when idle.
    pub fn set_coil_power(&mut self, on: bool) -> Result<()> {
        self.settings.coil_power = on;
        self.mark_persistent();
        if self.state == MotionState::Idle {
            if on {
                self.driver.enable()?;
            } else {
                self.driver.release()?;
            }
        }
        Ok(())
    }

    /// Inward and outward are swapped at the driver.
    pub fn reverse_direction(&self) -> bool {
        self.settings.reverse_direction
    }

    /// Swap inward and outward at the driver.
    pub fn set_reverse_direction(&mut self, reversed: bool) {
        self.settings.reverse_direction = reversed;
        self.driver.set_reversed(reversed);
        self.mark_persistent();
    }

    // ------------------------------------------------------------------
    // Backlash
    // ------------------------------------------------------------------

    /// Extra steps on reversal to inward travel.
    pub fn backlash_in_steps(&self) -> u8 {
        self.settings.backlash_in_steps
    }

    /// Set the inward backlash steps.
    pub fn set_backlash_in_steps(&mut self, steps: u8) {
        self.settings.backlash_in_steps = steps;
        self.sync_backlash();
    }

    /// Extra steps on reversal to outward travel.
    pub fn backlash_out_steps(&self) -> u8 {
        self.settings.backlash_out_steps
    }

    /// Set the outward backlash steps.
    pub fn set_backlash_out_steps(&mut self, steps: u8) {
        self.settings.backlash_out_steps = steps;
        self.sync_backlash();
    }

    /// Inward backlash compensation active.
    pub fn backlash_in_enabled(&self) -> bool {
        self.settings.backlash_in_enabled
    }

    /// Enable inward backlash compensation.
    pub fn set_backlash_in_enabled(&mut self, enabled: bool) {
        self.settings.backlash_in_enabled = enabled;
        self.sync_backlash();
    }

    /// Outward backlash compensation active.
    pub fn backlash_out_enabled(&self) -> bool {
        self.settings.backlash_out_enabled
    }

    /// Enable outward backlash compensation.
    pub fn set_backlash_out_enabled(&mut self, enabled: bool) {
        self.settings.backlash_out_enabled = enabled;
        self.sync_backlash();
    }

    fn sync_backlash(&mut self) {
        *self.backlash.config_mut() = BacklashConfig::from_settings(&self.settings);
        self.mark_persistent();
    }

    // ------------------------------------------------------------------
    // Temperature compensation
    // ------------------------------------------------------------------

    /// Record a probe reading in Celsius.
    ///
    /// On the compensation cadence, drift beyond the threshold moves the
    /// target. Returns the adjustment applied, if any.
    pub fn update_temperature(&mut self, celsius: f32) -> Option<i32> {
        self.last_reading = Some(celsius);
        let adjustment = self.temperature.poll(self.clock.now_ms(), celsius)?;
        self.target = TemperatureCompensator::apply(adjustment, self.target, self.settings.max_step);
        Some(adjustment)
    }

    /// Latest probe reading in Celsius.
    pub fn temperature(&self) -> Option<f32> {
        self.last_reading
    }

    /// Reference the compensator measures drift against.
    pub fn temp_reference(&self) -> Option<f32> {
        self.temperature.reference()
    }

    /// Temperature compensation active.
    pub fn temp_comp_enabled(&self) -> bool {
        self.settings.temp_comp_enabled
    }

    /// Enable or disable temperature compensation.
    ///
    /// Enabling snapshots the latest reading as the reference.
    pub fn set_temp_comp_enabled(&mut self, enabled: bool) {
        self.temperature.set_enabled(enabled, self.last_reading);
        self.settings.temp_comp_enabled = enabled;
        self.mark_persistent();
    }

    /// Steps per degree.
    pub fn temp_coefficient(&self) -> u16 {
        self.settings.temp_coefficient
    }

    /// Set steps per degree.
    pub fn set_temp_coefficient(&mut self, coefficient: u16) {
        self.temperature.set_coefficient(coefficient);
        self.settings.temp_coefficient = coefficient;
        self.mark_persistent();
    }

    /// Correction direction on a temperature fall.
    pub fn temp_comp_direction(&self) -> CompensationDirection {
        self.settings.temp_comp_direction
    }

    /// Set the correction direction.
    pub fn set_temp_comp_direction(&mut self, direction: CompensationDirection) {
        self.temperature.set_direction(direction);
        self.settings.temp_comp_direction = direction;
        self.mark_persistent();
    }

    /// Change how often compensation is evaluated.
    pub fn set_temp_comp_interval_ms(&mut self, interval_ms: u64) {
        self.temperature.set_interval_ms(interval_ms);
    }

    // ------------------------------------------------------------------
    // Presets
    // ------------------------------------------------------------------

    /// Stored position `index`, or `None` past the last slot.
    pub fn preset(&self, index: usize) -> Option<u32> {
        self.settings.presets.get(index).copied()
    }

    /// Store a position, clamped to `max_step`. Ignored past the last slot.
    pub fn set_preset(&mut self, index: usize, position: u32) -> bool {
        if index >= PRESET_COUNT {
            return false;
        }
        self.settings.presets[index] = position.min(self.settings.max_step);
        self.mark_persistent();
        true
    }

    /// Move to stored position `index`. Returns the new target.
    pub fn goto_preset(&mut self, index: usize) -> Option<u32> {
        let position = self.preset(index)?;
        Some(self.set_target_position(i64::from(position)))
    }

    // ------------------------------------------------------------------
    // Persistence and reporting
    // ------------------------------------------------------------------

    /// Configuration document as it stands.
    pub fn settings(&self) -> &FocuserSettings {
        &self.settings
    }

    /// Position document as it stands.
    pub fn variable_state(&self) -> VariableState {
        VariableState {
            current_position: self.current,
            last_direction: self.last_direction,
        }
    }

    /// Write documents whose write-behind delay has expired.
    ///
    /// Only writes while idle. Returns whether anything was written; a
    /// failed write leaves the document pending for the next call.
    pub fn flush_settings<T: SettingsStore + ?Sized>(&mut self, store: &mut T) -> Result<bool> {
        if self.state != MotionState::Idle {
            return Ok(false);
        }

        let now = self.clock.now_ms();
        let mut wrote = false;

        if self.persistent_changes.due(now) {
            store.save_persistent(&self.settings)?;
            self.persistent_changes.clear();
            wrote = true;
        }
        if self.variable_changes.due(now) {
            store.save_variable(&self.variable_state())?;
            self.variable_changes.clear();
            wrote = true;
        }

        if wrote {
            debug!("settings saved");
        }
        Ok(wrote)
    }

    /// Replace both write-behind delays.
    pub fn set_write_delay_ms(&mut self, delay_ms: u64) {
        self.persistent_changes.set_delay_ms(delay_ms);
        self.variable_changes.set_delay_ms(delay_ms);
    }

    fn mark_persistent(&mut self) {
        self.persistent_changes.mark(self.clock.now_ms());
    }

    /// Snapshot for transports.
    pub fn status(&self) -> FocuserStatus {
        let settings = &self.settings;
        let step_mode = self.driver.step_mode();
        let speed = self.driver.speed();

        FocuserStatus {
            position: self.current,
            target: self.target,
            max_step: settings.max_step,
            is_moving: self.is_moving(),
            state: self.state,
            step_mode: step_mode.value(),
            step_modes: step_mode_options(self.driver.supported_step_modes(), step_mode),
            motor_speed: speed.index(),
            speeds: speed_options(speed),
            temperature: self
                .last_reading
                .map(|c| display_temperature(c, settings.temp_mode_celsius)),
            temp_mode_celsius: settings.temp_mode_celsius,
            temp_comp_enabled: settings.temp_comp_enabled,
            coil_power: settings.coil_power,
            reverse_direction: settings.reverse_direction,
            backlash_in_steps: settings
                .backlash_in_enabled
                .then_some(settings.backlash_in_steps),
            backlash_out_steps: settings
                .backlash_out_enabled
                .then_some(settings.backlash_out_steps),
            step_size_microns: settings
                .step_size_enabled
                .then_some(settings.step_size_microns),
        }
    }

    /// Borrow the motor driver.
    pub fn driver(&self) -> &MotorDriver<S, D> {
        &self.driver
    }

    /// Take the controller apart.
    pub fn into_driver(self) -> MotorDriver<S, D> {
        self.driver
    }
}
