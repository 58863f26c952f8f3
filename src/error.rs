//! Error types for focuser-motion.
//!
//! Range and capability problems never surface here: setters clamp and report
//! the effective value instead. What remains are board descriptions that cannot
//! be honoured at startup, GPIO failures, and settings storage failures.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all focuser-motion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Board configuration parsing or validation error
    Config(ConfigError),
    /// Motor pin operation error
    Motor(MotorError),
    /// Settings storage error
    Storage(StorageError),
}

/// Board configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Step mode literal is not one of 1, 2, 4, 8, 16, 32
    InvalidStepMode(u16),
    /// Step mode is not available on this board kind
    UnsupportedStepMode(u16),
    /// Steps per revolution must be non-zero
    InvalidStepsPerRevolution(u16),
    /// Step pulse width must be non-zero
    InvalidPulseWidth(u32),
    /// Speed delays must satisfy 0 < fast < medium < slow
    InvalidSpeedDelays {
        /// Slow delay in microseconds
        slow_us: u32,
        /// Medium delay in microseconds
        medium_us: u32,
        /// Fast delay in microseconds
        fast_us: u32,
    },
    /// Too many microstep-select pins (at most 3)
    TooManyMicrostepPins(u8),
    /// Pins supplied to the builder don't match the board kind
    PinMismatch(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor operation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorError {
    /// Pin operation failed
    PinError,
}

/// Settings storage errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The requested document has never been written
    NotFound,
    /// The document exists but could not be decoded
    Corrupt(heapless::String<128>),
    /// The backing medium failed
    Io(heapless::String<128>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidStepMode(v) => {
                write!(f, "Invalid step mode: {}. Valid values: 1, 2, 4, 8, 16, 32", v)
            }
            ConfigError::UnsupportedStepMode(v) => {
                write!(f, "Step mode {} is not supported by this board", v)
            }
            ConfigError::InvalidStepsPerRevolution(v) => {
                write!(f, "Invalid steps per revolution: {}. Must be > 0", v)
            }
            ConfigError::InvalidPulseWidth(v) => {
                write!(f, "Invalid step pulse width: {}us. Must be > 0", v)
            }
            ConfigError::InvalidSpeedDelays {
                slow_us,
                medium_us,
                fast_us,
            } => write!(
                f,
                "Invalid speed delays: slow={}us medium={}us fast={}us. Need 0 < fast < medium < slow",
                slow_us, medium_us, fast_us
            ),
            ConfigError::TooManyMicrostepPins(n) => {
                write!(f, "Too many microstep pins: {}. At most 3", n)
            }
            ConfigError::PinMismatch(msg) => write!(f, "Pin assignment mismatch: {}", msg),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "Document not found"),
            StorageError::Corrupt(msg) => write!(f, "Corrupt document: {}", msg),
            StorageError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}
