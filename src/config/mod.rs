//! Configuration module for focuser-motion.
//!
//! Board descriptions (loaded from TOML with the `std` feature) and the two
//! persisted settings documents.

mod board;
#[cfg(feature = "std")]
mod loader;
mod settings;
pub mod units;
mod validation;

pub use board::{BoardConfig, BoardKind, SpeedDelays, DEFAULT_ENABLE_SETTLE_US};
pub use settings::{
    FocuserSettings, VariableState, DEFAULT_POSITION, MAX_STEP_LOWER_LIMIT,
    MAX_STEP_UPPER_LIMIT, PRESET_COUNT,
};
pub use validation::validate_board_config;

#[cfg(feature = "std")]
pub use loader::{load_board_config, parse_board_config};

// Re-export unit types at config level
pub use units::{CompensationDirection, Direction, MotorSpeed, StepMode, StepModeSet};
