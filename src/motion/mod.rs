//! Motion module for focuser-motion.
//!
//! Provides the focuser state machine, its time source and write-behind
//! persistence tracking.

mod clock;
mod controller;
mod persistence;
mod state;

pub use clock::{Clock, TimeBase};
pub use controller::MotionController;
pub use persistence::{WriteBehind, DEFAULT_WRITE_DELAY_MS};
pub use state::MotionState;

#[cfg(feature = "std")]
pub use clock::SystemClock;
