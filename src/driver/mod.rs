//! Driver module for focuser-motion.
//!
//! Pin-level step sequencing for each driver family, and the uniform
//! [`MotorDriver`] built on top.

mod builder;
mod coil;
mod motor;
mod sequencer;
mod step_dir;

pub use builder::MotorDriverBuilder;
pub use coil::{CoilSequencer, FULL_STEP_TABLE, HALF_STEP_TABLE};
pub use motor::MotorDriver;
pub use sequencer::{BoardSequencer, StepSequencer};
pub use step_dir::{microstep_pattern, StepDirSequencer, MAX_MICROSTEP_PINS};
