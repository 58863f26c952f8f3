//! Unit test harness for focuser-motion.
//!
//! This module organizes unit tests for the board configuration surface.

mod config_parsing;
mod config_validation;
