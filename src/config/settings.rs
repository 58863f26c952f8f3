//! Persisted focuser settings.
//!
//! Two documents: [`FocuserSettings`] holds configuration that changes rarely,
//! [`VariableState`] holds only what changes on every move so flash writes
//! stay small.

use serde::{Deserialize, Serialize};

use super::units::{CompensationDirection, Direction, MotorSpeed, StepMode};

/// `max_step` may never be set below this.
pub const MAX_STEP_LOWER_LIMIT: u32 = 1_024;

/// `max_step` may never be set above this.
pub const MAX_STEP_UPPER_LIMIT: u32 = 2_000_000_000;

/// Number of stored focus presets.
pub const PRESET_COUNT: usize = 10;

/// Position assumed when no variable document exists.
pub const DEFAULT_POSITION: u32 = 5_000;

/// Configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocuserSettings {
    /// Highest reachable position.
    pub max_step: u32,
    /// Focuser travel per step, for display.
    pub step_size_microns: f32,
    /// Whether `step_size_microns` is shown.
    pub step_size_enabled: bool,
    /// Settle period after a move before coil power is released.
    pub delay_after_move_ms: u8,
    /// Extra steps inserted on reversal to inward travel.
    pub backlash_in_steps: u8,
    /// Extra steps inserted on reversal to outward travel.
    pub backlash_out_steps: u8,
    /// Apply inward backlash compensation.
    pub backlash_in_enabled: bool,
    /// Apply outward backlash compensation.
    pub backlash_out_enabled: bool,
    /// Steps per degree of temperature change.
    pub temp_coefficient: u16,
    /// Probe resolution in bits (9..=12).
    pub temp_precision_bits: u8,
    /// Report temperatures in Celsius (Fahrenheit otherwise).
    pub temp_mode_celsius: bool,
    /// Temperature compensation active.
    pub temp_comp_enabled: bool,
    /// Correction direction on a temperature fall.
    pub temp_comp_direction: CompensationDirection,
    /// Requested step mode (may be clamped by the board).
    pub step_mode: StepMode,
    /// Keep coils energized while idle.
    pub coil_power: bool,
    /// Swap inward/outward at the driver.
    pub reverse_direction: bool,
    /// Speed level.
    pub motor_speed: MotorSpeed,
    /// Local display attached and enabled.
    pub display_enabled: bool,
    /// Port of the text protocol TCP server.
    pub tcp_port: u16,
    /// Port of the Alpaca HTTP server.
    pub alpaca_port: u16,
    /// Port of the web UI.
    pub web_port: u16,
    /// Stored focus positions.
    pub presets: [u32; PRESET_COUNT],
}

impl Default for FocuserSettings {
    fn default() -> Self {
        Self {
            max_step: 80_000,
            step_size_microns: 50.0,
            step_size_enabled: false,
            delay_after_move_ms: 0,
            backlash_in_steps: 0,
            backlash_out_steps: 0,
            backlash_in_enabled: false,
            backlash_out_enabled: false,
            temp_coefficient: 0,
            temp_precision_bits: 9,
            temp_mode_celsius: true,
            temp_comp_enabled: false,
            temp_comp_direction: CompensationDirection::Inward,
            step_mode: StepMode::Full,
            coil_power: false,
            reverse_direction: false,
            motor_speed: MotorSpeed::Fast,
            display_enabled: false,
            tcp_port: 2020,
            alpaca_port: 4040,
            web_port: 80,
            presets: [0; PRESET_COUNT],
        }
    }
}

impl FocuserSettings {
    /// Clamp a requested `max_step` against the hardware limits and the
    /// position the focuser already occupies.
    pub fn clamp_max_step(requested: u32, current_position: u32) -> u32 {
        requested
            .max(MAX_STEP_LOWER_LIMIT)
            .max(current_position)
            .min(MAX_STEP_UPPER_LIMIT)
    }

    /// Bring every field into its legal range.
    ///
    /// Used after loading a document that may have been written by hand.
    pub fn sanitize(&mut self) {
        self.max_step = self.max_step.clamp(MAX_STEP_LOWER_LIMIT, MAX_STEP_UPPER_LIMIT);
        self.temp_precision_bits = self.temp_precision_bits.clamp(9, 12);
        for preset in self.presets.iter_mut() {
            *preset = (*preset).min(self.max_step);
        }
    }
}

/// Frequently written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableState {
    /// Focuser position in steps.
    pub current_position: u32,
    /// Direction of the last move, for backlash tracking.
    pub last_direction: Direction,
}

impl Default for VariableState {
    fn default() -> Self {
        Self {
            current_position: DEFAULT_POSITION,
            last_direction: Direction::Inward,
        }
    }
}

impl VariableState {
    /// Position clamped to `max_step` and rounded to the nearest multiple of
    /// the step mode divisor, rounding down where rounding up would pass
    /// `max_step`.
    pub fn aligned_position(&self, mode: StepMode, max_step: u32) -> u32 {
        let divisor = u32::from(mode.value());
        let position = self.current_position.min(max_step);
        let down = position / divisor * divisor;
        let nearest = (u64::from(position) + u64::from(divisor / 2)) / u64::from(divisor)
            * u64::from(divisor);
        match u32::try_from(nearest) {
            Ok(up) if up <= max_step => up,
            _ => down,
        }
    }
}
