//! Board description: which driver family is wired and how it is timed.
//!
//! Selected once at startup and immutable for the session.

use heapless::String;
use serde::Deserialize;

use super::units::{MotorSpeed, StepMode, StepModeSet};

/// Minimum settle time after powering the driver before the first step.
pub const DEFAULT_ENABLE_SETTLE_US: u32 = 1_000;

/// Driver hardware family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardKind {
    /// Dedicated step/direction driver chip (DRV8825, A4988, TMC in step/dir mode).
    StepDir,
    /// H-bridge (ULN2003, L298N, L293D) driven through a 4-pin coil table.
    CoilSequenced,
}

/// Inter-step delays for each speed level, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SpeedDelays {
    /// Delay used at [`MotorSpeed::Slow`].
    pub slow_us: u32,
    /// Delay used at [`MotorSpeed::Medium`].
    pub medium_us: u32,
    /// Delay used at [`MotorSpeed::Fast`].
    pub fast_us: u32,
}

impl SpeedDelays {
    /// Defaults for a step/dir driver chip.
    pub const STEP_DIR: Self = Self {
        slow_us: 10_000,
        medium_us: 4_000,
        fast_us: 1_000,
    };

    /// Defaults for coil-sequenced H-bridges, which need longer for the
    /// field to build up.
    pub const COIL_SEQUENCED: Self = Self {
        slow_us: 20_000,
        medium_us: 10_000,
        fast_us: 4_000,
    };

    /// Delay for a speed level.
    #[inline]
    pub fn delay_us(&self, speed: MotorSpeed) -> u32 {
        match speed {
            MotorSpeed::Slow => self.slow_us,
            MotorSpeed::Medium => self.medium_us,
            MotorSpeed::Fast => self.fast_us,
        }
    }

    /// Classify a raw delay back to the closest speed level.
    pub fn classify(&self, delay_us: u32) -> MotorSpeed {
        let mut best = MotorSpeed::Fast;
        let mut best_distance = u32::MAX;
        for speed in MotorSpeed::ALL {
            let distance = self.delay_us(speed).abs_diff(delay_us);
            if distance < best_distance {
                best = speed;
                best_distance = distance;
            }
        }
        best
    }

    /// Check `0 < fast < medium < slow`.
    pub fn is_valid(&self) -> bool {
        self.fast_us > 0 && self.fast_us < self.medium_us && self.medium_us < self.slow_us
    }
}

/// Complete board configuration from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoardConfig {
    /// Human-readable board name (max 32 chars).
    pub name: String<32>,

    /// Driver family.
    pub kind: BoardKind,

    /// Full steps per motor revolution (typically 200, or 2048 for 28BYJ-48).
    pub steps_per_revolution: u16,

    /// Number of microstep-select pins wired (step/dir only, 0..=3).
    #[serde(default)]
    pub microstep_pins: u8,

    /// Step mode wired in hardware, if the board cannot change it.
    #[serde(default)]
    pub fixed_step_mode: Option<StepMode>,

    /// Width of the STEP pulse in microseconds.
    #[serde(default = "default_pulse_width_us")]
    pub pulse_width_us: u32,

    /// Time to wait after powering the driver before stepping.
    #[serde(default = "default_enable_settle_us")]
    pub enable_settle_us: u32,

    /// Driver enable pin is asserted low (DRV8825/A4988 convention).
    #[serde(default = "default_true")]
    pub enable_active_low: bool,

    /// Per-speed delays; defaults depend on `kind`.
    #[serde(default)]
    pub speed_delays: Option<SpeedDelays>,
}

fn default_pulse_width_us() -> u32 {
    2
}

fn default_enable_settle_us() -> u32 {
    DEFAULT_ENABLE_SETTLE_US
}

fn default_true() -> bool {
    true
}

impl BoardConfig {
    /// A step/dir board with the given number of microstep-select pins.
    pub fn step_dir(name: &str, steps_per_revolution: u16, microstep_pins: u8) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            kind: BoardKind::StepDir,
            steps_per_revolution,
            microstep_pins,
            fixed_step_mode: None,
            pulse_width_us: default_pulse_width_us(),
            enable_settle_us: DEFAULT_ENABLE_SETTLE_US,
            enable_active_low: true,
            speed_delays: None,
        }
    }

    /// A coil-sequenced H-bridge board.
    pub fn coil_sequenced(name: &str, steps_per_revolution: u16) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            kind: BoardKind::CoilSequenced,
            steps_per_revolution,
            microstep_pins: 0,
            fixed_step_mode: None,
            pulse_width_us: default_pulse_width_us(),
            enable_settle_us: DEFAULT_ENABLE_SETTLE_US,
            enable_active_low: false,
            speed_delays: None,
        }
    }

    /// Effective speed delays.
    pub fn speed_delays(&self) -> SpeedDelays {
        self.speed_delays.unwrap_or(match self.kind {
            BoardKind::StepDir => SpeedDelays::STEP_DIR,
            BoardKind::CoilSequenced => SpeedDelays::COIL_SEQUENCED,
        })
    }

    /// Step modes this board can realize.
    pub fn step_modes(&self) -> StepModeSet {
        if let Some(mode) = self.fixed_step_mode {
            return StepModeSet::fixed(mode);
        }
        match self.kind {
            BoardKind::CoilSequenced => StepModeSet::FULL_HALF,
            BoardKind::StepDir => match self.microstep_pins {
                0 => StepModeSet::fixed(StepMode::Full),
                1 => StepModeSet::FULL_HALF,
                2 => StepModeSet::UP_TO_EIGHTH,
                _ => StepModeSet::ALL,
            },
        }
    }
}
