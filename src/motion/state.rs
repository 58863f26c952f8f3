//! Motion controller states.

use serde::Serialize;

/// Where the controller is in its move cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// At target; coils released unless coil power is kept on.
    #[default]
    Idle,
    /// Stepping toward the target.
    Moving,
    /// Stepping through the extra steps added on a reversal.
    ApplyingBacklash,
    /// At target, waiting out the settle period before releasing coil power.
    DelayAfterMove,
    /// Halt requested; the next tick starts the settle period.
    Halted,
}

impl MotionState {
    /// Whether steps are being issued.
    #[inline]
    pub fn is_stepping(self) -> bool {
        matches!(self, MotionState::Moving | MotionState::ApplyingBacklash)
    }

    /// State name for display/debugging.
    pub const fn as_str(self) -> &'static str {
        match self {
            MotionState::Idle => "Idle",
            MotionState::Moving => "Moving",
            MotionState::ApplyingBacklash => "ApplyingBacklash",
            MotionState::DelayAfterMove => "DelayAfterMove",
            MotionState::Halted => "Halted",
        }
    }
}
