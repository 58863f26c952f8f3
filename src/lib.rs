//! # focuser-motion
//!
//! Motor control and motion coordination core for stepper-driven telescope
//! focusers, with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Board-driven**: Step/dir driver chips and coil-sequenced H-bridges
//!   behind one [`StepSequencer`] interface, selected from a TOML board file
//! - **embedded-hal 1.0**: Uses `OutputPin` for all pins, `DelayNs` for timing
//! - **no_std compatible**: Core library works without standard library
//! - **Clamp, don't fail**: Out-of-range targets, step modes and limits are
//!   corrected in place and the effective value is readable afterward
//! - **Compensation**: Backlash on direction reversal, incremental
//!   temperature compensation
//! - **Flash friendly**: Debounced write-behind of settings and position
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use focuser_motion::{MotionController, MotorDriverBuilder, FileStore, SystemClock};
//!
//! let board = focuser_motion::load_board_config("board.toml")?;
//!
//! let driver = MotorDriverBuilder::new()
//!     .board(board)
//!     .step_pin(step_pin)
//!     .dir_pin(dir_pin)
//!     .enable_pin(enable_pin)
//!     .delay(delay)
//!     .build()?;
//!
//! let mut store = FileStore::new("/var/lib/focuser");
//! let mut focuser = MotionController::from_store(driver, SystemClock::new(), &mut store)?;
//!
//! focuser.set_target_position(12_000);
//! loop {
//!     focuser.tick()?;
//!     focuser.flush_settings(&mut store)?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables TOML board files, the file store and the shared handle
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Logging shims, textually scoped so they must come first
#[macro_use]
mod fmt;

// Core modules
pub mod compensation;
pub mod config;
pub mod driver;
pub mod error;
pub mod motion;
pub mod status;
pub mod storage;

#[cfg(feature = "std")]
pub mod shared;

// Re-exports for ergonomic API
pub use compensation::{BacklashCompensator, BacklashConfig, TemperatureCompensator, TemperatureConfig};
pub use config::{validate_board_config, BoardConfig, BoardKind, FocuserSettings, VariableState};
pub use driver::{BoardSequencer, MotorDriver, MotorDriverBuilder, StepSequencer};
pub use error::{Error, Result};
pub use motion::{Clock, MotionController, MotionState, TimeBase};
pub use status::FocuserStatus;
pub use storage::{load_or_default, MemoryStore, SettingsStore};

// std-only surfaces
#[cfg(feature = "std")]
pub use config::load_board_config;
#[cfg(feature = "std")]
pub use motion::SystemClock;
#[cfg(feature = "std")]
pub use shared::SharedFocuser;
#[cfg(feature = "std")]
pub use storage::FileStore;

// Unit types
pub use config::units::{CompensationDirection, Direction, MotorSpeed, StepMode, StepModeSet};
