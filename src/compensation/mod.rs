//! Target-position compensation for mechanical backlash and thermal drift.

mod backlash;
mod temperature;

pub use backlash::{BacklashAdjustment, BacklashCompensator, BacklashConfig};
pub use temperature::{
    TemperatureCompensator, TemperatureConfig, COMPENSATION_THRESHOLD, DEFAULT_INTERVAL_MS,
};
