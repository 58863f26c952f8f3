//! Focuser unit types.
//!
//! Step modes, speed levels and travel directions shared by the driver,
//! the compensators and the motion controller.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fraction of a full motor step taken per pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepMode {
    /// Full step.
    #[default]
    Full,
    /// Half step.
    Half,
    /// Quarter step.
    Quarter,
    /// Eighth step.
    Eighth,
    /// Sixteenth step.
    Sixteenth,
    /// Thirty-second step.
    ThirtySecond,
}

impl StepMode {
    /// Every step mode, finest last.
    pub const ALL: [StepMode; 6] = [
        StepMode::Full,
        StepMode::Half,
        StepMode::Quarter,
        StepMode::Eighth,
        StepMode::Sixteenth,
        StepMode::ThirtySecond,
    ];

    /// Create from the divisor value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidStepMode` if the value is not 1, 2, 4, 8, 16 or 32.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        match value {
            1 => Ok(StepMode::Full),
            2 => Ok(StepMode::Half),
            4 => Ok(StepMode::Quarter),
            8 => Ok(StepMode::Eighth),
            16 => Ok(StepMode::Sixteenth),
            32 => Ok(StepMode::ThirtySecond),
            _ => Err(ConfigError::InvalidStepMode(value)),
        }
    }

    /// Convert a raw divisor coming from a transport, falling back to full step.
    #[inline]
    pub fn from_value_or_full(value: u16) -> Self {
        Self::new(value).unwrap_or(StepMode::Full)
    }

    /// Get the raw divisor value.
    #[inline]
    pub const fn value(self) -> u16 {
        match self {
            StepMode::Full => 1,
            StepMode::Half => 2,
            StepMode::Quarter => 4,
            StepMode::Eighth => 8,
            StepMode::Sixteenth => 16,
            StepMode::ThirtySecond => 32,
        }
    }

    /// Human readable label.
    pub const fn as_str(self) -> &'static str {
        match self {
            StepMode::Full => "Full",
            StepMode::Half => "1/2",
            StepMode::Quarter => "1/4",
            StepMode::Eighth => "1/8",
            StepMode::Sixteenth => "1/16",
            StepMode::ThirtySecond => "1/32",
        }
    }

    #[inline]
    const fn bit(self) -> u8 {
        match self {
            StepMode::Full => 1 << 0,
            StepMode::Half => 1 << 1,
            StepMode::Quarter => 1 << 2,
            StepMode::Eighth => 1 << 3,
            StepMode::Sixteenth => 1 << 4,
            StepMode::ThirtySecond => 1 << 5,
        }
    }
}

impl TryFrom<u16> for StepMode {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for StepMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.value())
    }
}

impl<'de> Deserialize<'de> for StepMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        StepMode::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}

/// The set of step modes a board can realize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepModeSet(u8);

impl StepModeSet {
    /// Full and half step only (coil-sequenced drivers, single select pin).
    pub const FULL_HALF: Self = Self(0b0000_0011);
    /// Up to eighth step (two select pins).
    pub const UP_TO_EIGHTH: Self = Self(0b0000_1111);
    /// Every mode (three select pins).
    pub const ALL: Self = Self(0b0011_1111);

    /// A set holding exactly one mode, for boards with the mode wired in hardware.
    #[inline]
    pub const fn fixed(mode: StepMode) -> Self {
        Self(mode.bit())
    }

    /// Check if a mode is in the set.
    #[inline]
    pub const fn contains(self, mode: StepMode) -> bool {
        self.0 & mode.bit() != 0
    }

    /// True when the board cannot change step mode at all.
    #[inline]
    pub const fn is_fixed(self) -> bool {
        self.0.count_ones() == 1
    }

    /// Map a requested mode to one the board can honour.
    ///
    /// Supported modes pass through. Anything else falls back to full step,
    /// or to the single wired mode on fixed boards.
    pub fn resolve(self, requested: StepMode) -> StepMode {
        if self.contains(requested) {
            return requested;
        }
        if self.contains(StepMode::Full) {
            return StepMode::Full;
        }
        StepMode::ALL
            .iter()
            .copied()
            .find(|m| self.contains(*m))
            .unwrap_or(StepMode::Full)
    }

    /// Iterate supported modes, coarsest first.
    pub fn iter(self) -> impl Iterator<Item = StepMode> {
        StepMode::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

/// Motor speed level, realized as an inter-step delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorSpeed {
    /// Longest delay.
    Slow,
    /// Middle delay.
    Medium,
    /// Shortest delay.
    #[default]
    Fast,
}

impl MotorSpeed {
    /// Every speed level, slowest first.
    pub const ALL: [MotorSpeed; 3] = [MotorSpeed::Slow, MotorSpeed::Medium, MotorSpeed::Fast];

    /// Human readable label.
    pub const fn as_str(self) -> &'static str {
        match self {
            MotorSpeed::Slow => "Slow",
            MotorSpeed::Medium => "Med",
            MotorSpeed::Fast => "Fast",
        }
    }

    /// Convert the 0/1/2 encoding used by the text protocols, clamping above 2.
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => MotorSpeed::Slow,
            1 => MotorSpeed::Medium,
            _ => MotorSpeed::Fast,
        }
    }

    /// The 0/1/2 protocol encoding.
    pub const fn index(self) -> u8 {
        match self {
            MotorSpeed::Slow => 0,
            MotorSpeed::Medium => 1,
            MotorSpeed::Fast => 2,
        }
    }
}

/// Direction of focuser travel.
///
/// Outward increases the step count, inward decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward zero.
    #[default]
    Inward,
    /// Toward `max_step`.
    Outward,
}

impl Direction {
    /// Direction needed to go from `from` to `to`, or `None` when already there.
    #[inline]
    pub fn between(from: u32, to: u32) -> Option<Self> {
        match to.cmp(&from) {
            core::cmp::Ordering::Greater => Some(Direction::Outward),
            core::cmp::Ordering::Less => Some(Direction::Inward),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// The other direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Inward => Direction::Outward,
            Direction::Outward => Direction::Inward,
        }
    }

    /// Human readable label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inward => "in",
            Direction::Outward => "out",
        }
    }
}

/// Which way to correct when the temperature falls.
///
/// A rise corrects the opposite way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompensationDirection {
    /// Move inward on a temperature fall.
    #[default]
    Inward,
    /// Move outward on a temperature fall.
    Outward,
}
