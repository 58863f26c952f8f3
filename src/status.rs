//! Presentation snapshot shared by every transport.
//!
//! Text protocol, Alpaca and web UI all render from [`FocuserStatus`], so the
//! step-mode and speed labels are derived in exactly one place.

use heapless::Vec;
use serde::Serialize;

use crate::config::{MotorSpeed, StepMode, StepModeSet};
use crate::motion::MotionState;

/// A supported step mode with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepModeOption {
    /// Divisor (1, 2, 4, ...).
    pub value: u16,
    /// Label such as `"1/8"`.
    pub label: &'static str,
    /// This is the mode in effect.
    pub selected: bool,
}

/// A speed level with its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeedOption {
    /// Protocol encoding (0 = slow, 2 = fast).
    pub index: u8,
    /// Label such as `"Med"`.
    pub label: &'static str,
    /// This is the speed in effect.
    pub selected: bool,
}

/// Point-in-time view of the focuser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocuserStatus {
    /// Current position in steps.
    pub position: u32,
    /// Target position in steps.
    pub target: u32,
    /// Highest reachable position.
    pub max_step: u32,
    /// Target differs from position.
    pub is_moving: bool,
    /// Controller state.
    pub state: MotionState,
    /// Step mode divisor in effect.
    pub step_mode: u16,
    /// Every mode the board supports.
    pub step_modes: Vec<StepModeOption, 6>,
    /// Speed level in effect.
    pub motor_speed: u8,
    /// Every speed level.
    pub speeds: [SpeedOption; 3],
    /// Latest probe reading in the configured unit.
    pub temperature: Option<f32>,
    /// `temperature` is in Celsius.
    pub temp_mode_celsius: bool,
    /// Temperature compensation active.
    pub temp_comp_enabled: bool,
    /// Coils kept energized while idle.
    pub coil_power: bool,
    /// Direction reversed at the driver.
    pub reverse_direction: bool,
    /// Inward backlash steps (when enabled).
    pub backlash_in_steps: Option<u8>,
    /// Outward backlash steps (when enabled).
    pub backlash_out_steps: Option<u8>,
    /// Focuser travel per step in microns (when enabled).
    pub step_size_microns: Option<f32>,
}

/// Label/selection list for the supported step modes.
pub fn step_mode_options(supported: StepModeSet, active: StepMode) -> Vec<StepModeOption, 6> {
    supported
        .iter()
        .map(|mode| StepModeOption {
            value: mode.value(),
            label: mode.as_str(),
            selected: mode == active,
        })
        .collect()
}

/// Label/selection list for the speed levels.
pub fn speed_options(active: MotorSpeed) -> [SpeedOption; 3] {
    MotorSpeed::ALL.map(|speed| SpeedOption {
        index: speed.index(),
        label: speed.as_str(),
        selected: speed == active,
    })
}

/// Convert a Celsius reading to the display unit.
#[inline]
pub fn display_temperature(celsius: f32, in_celsius: bool) -> f32 {
    if in_celsius {
        celsius
    } else {
        celsius * 9.0 / 5.0 + 32.0
    }
}
