//! Temperature compensation.
//!
//! Each time the reading drifts a full degree from the reference, the target
//! is nudged by `coefficient` steps and the reference moves to the new
//! reading. Compensation is incremental, never measured against a fixed baseline.

use libm::fabsf;

use crate::config::{CompensationDirection, FocuserSettings};

/// Drift, in degrees, needed before an adjustment fires.
pub const COMPENSATION_THRESHOLD: f32 = 1.0;

/// Default interval between compensation checks.
pub const DEFAULT_INTERVAL_MS: u64 = 3_000;

/// Temperature compensation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureConfig {
    /// Compensation active.
    pub enabled: bool,
    /// Steps per degree.
    pub coefficient: u16,
    /// Correction direction on a temperature fall.
    pub direction: CompensationDirection,
}

impl TemperatureConfig {
    /// Take the compensation fields from persisted settings.
    pub fn from_settings(settings: &FocuserSettings) -> Self {
        Self {
            enabled: settings.temp_comp_enabled,
            coefficient: settings.temp_coefficient,
            direction: settings.temp_comp_direction,
        }
    }
}

/// Tracks temperature drift and produces step adjustments.
#[derive(Debug, Clone)]
pub struct TemperatureCompensator {
    config: TemperatureConfig,
    reference: Option<f32>,
    interval_ms: u64,
    last_run_ms: Option<u64>,
}

impl TemperatureCompensator {
    /// Create a compensator with no reference yet.
    pub fn new(config: TemperatureConfig) -> Self {
        Self {
            config,
            reference: None,
            interval_ms: DEFAULT_INTERVAL_MS,
            last_run_ms: None,
        }
    }

    /// Active parameters.
    #[inline]
    pub fn config(&self) -> &TemperatureConfig {
        &self.config
    }

    /// Reference temperature drift is measured against.
    #[inline]
    pub fn reference(&self) -> Option<f32> {
        self.reference
    }

    /// Change the check interval.
    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    /// Enable or disable compensation.
    ///
    /// Enabling from disabled snapshots `current_reading` as the new reference.
    /// A non-finite reading leaves no reference; the next good one sets it.
    pub fn set_enabled(&mut self, enabled: bool, current_reading: Option<f32>) {
        if enabled && !self.config.enabled {
            self.reference = current_reading.filter(|t| t.is_finite());
        }
        self.config.enabled = enabled;
    }

    /// Set the steps-per-degree coefficient.
    pub fn set_coefficient(&mut self, coefficient: u16) {
        self.config.coefficient = coefficient;
    }

    /// Set the correction direction.
    pub fn set_direction(&mut self, direction: CompensationDirection) {
        self.config.direction = direction;
    }

    /// Run [`tick`](Self::tick) if the check interval has elapsed.
    pub fn poll(&mut self, now_ms: u64, current_temp: f32) -> Option<i32> {
        if let Some(last) = self.last_run_ms {
            if now_ms.saturating_sub(last) < self.interval_ms {
                return None;
            }
        }
        self.last_run_ms = Some(now_ms);
        self.tick(current_temp)
    }

    /// Compare a reading with the reference and return a signed step adjustment.
    ///
    /// Disabled compensation and non-finite readings leave the reference
    /// untouched.
    pub fn tick(&mut self, current_temp: f32) -> Option<i32> {
        if !self.config.enabled || !current_temp.is_finite() {
            return None;
        }

        let reference = match self.reference {
            Some(r) => r,
            None => {
                self.reference = Some(current_temp);
                return None;
            }
        };

        let delta = current_temp - reference;
        if fabsf(delta) < COMPENSATION_THRESHOLD {
            return None;
        }

        let magnitude = i32::from(self.config.coefficient);
        let fell = delta < 0.0;
        let adjustment = match (fell, self.config.direction) {
            (true, CompensationDirection::Inward) => -magnitude,
            (true, CompensationDirection::Outward) => magnitude,
            (false, CompensationDirection::Inward) => magnitude,
            (false, CompensationDirection::Outward) => -magnitude,
        };

        self.reference = Some(current_temp);
        info!("temperature compensation: {} steps", adjustment);
        (adjustment != 0).then_some(adjustment)
    }

    /// Apply an adjustment to a target, clamped to `[0, max_step]`.
    pub fn apply(adjustment: i32, target: u32, max_step: u32) -> u32 {
        let moved = i64::from(target) + i64::from(adjustment);
        moved.clamp(0, i64::from(max_step)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_at(temp: f32, coefficient: u16, direction: CompensationDirection) -> TemperatureCompensator {
        let mut comp = TemperatureCompensator::new(TemperatureConfig {
            enabled: false,
            coefficient,
            direction,
        });
        comp.set_enabled(true, Some(temp));
        comp
    }

    #[test]
    fn test_reference_resets_after_adjustment() {
        let mut comp = enabled_at(20.0, 2, CompensationDirection::Outward);
        assert_eq!(comp.reference(), Some(20.0));

        assert_eq!(comp.tick(18.9), Some(2));
        assert_eq!(comp.reference(), Some(18.9));

        assert_eq!(comp.tick(18.0), None);
        assert_eq!(comp.reference(), Some(18.9));
    }

    #[test]
    fn test_decision_table() {
        let cases = [
            (CompensationDirection::Inward, 18.0, -3),
            (CompensationDirection::Inward, 22.0, 3),
            (CompensationDirection::Outward, 18.0, 3),
            (CompensationDirection::Outward, 22.0, -3),
        ];
        for (direction, reading, expected) in cases {
            let mut comp = enabled_at(20.0, 3, direction);
            assert_eq!(comp.tick(reading), Some(expected));
        }
    }

    #[test]
    fn test_disabled_keeps_reference() {
        let mut comp = enabled_at(20.0, 2, CompensationDirection::Inward);
        comp.set_enabled(false, Some(25.0));
        assert_eq!(comp.tick(10.0), None);
        assert_eq!(comp.reference(), Some(20.0));
    }

    #[test]
    fn test_reenable_snapshots_fresh_reading() {
        let mut comp = enabled_at(20.0, 2, CompensationDirection::Inward);
        comp.set_enabled(false, None);
        comp.set_enabled(true, Some(12.5));
        assert_eq!(comp.reference(), Some(12.5));
        assert_eq!(comp.tick(12.0), None);
    }

    #[test]
    fn test_enabled_again_while_enabled_keeps_reference() {
        let mut comp = enabled_at(20.0, 2, CompensationDirection::Inward);
        comp.set_enabled(true, Some(30.0));
        assert_eq!(comp.reference(), Some(20.0));
    }

    #[test]
    fn test_non_finite_reading_is_ignored() {
        let mut comp = enabled_at(20.0, 5, CompensationDirection::Outward);
        assert_eq!(comp.tick(f32::NAN), None);
        assert_eq!(comp.tick(f32::INFINITY), None);
        assert_eq!(comp.reference(), Some(20.0));
        for _ in 0..3 {
            assert_eq!(comp.tick(20.0), None);
        }
    }

    #[test]
    fn test_enable_with_bad_reading_waits_for_good_one() {
        let mut comp = enabled_at(f32::NAN, 5, CompensationDirection::Outward);
        assert_eq!(comp.reference(), None);
        assert_eq!(comp.tick(20.0), None);
        assert_eq!(comp.reference(), Some(20.0));
    }

    #[test]
    fn test_poll_respects_interval() {
        let mut comp = enabled_at(20.0, 2, CompensationDirection::Inward);
        assert_eq!(comp.poll(0, 22.0), Some(2));
        assert_eq!(comp.poll(1_000, 24.0), None);
        assert_eq!(comp.poll(DEFAULT_INTERVAL_MS, 24.0), Some(2));
    }

    #[test]
    fn test_apply_clamps() {
        assert_eq!(TemperatureCompensator::apply(-10, 5, 100), 0);
        assert_eq!(TemperatureCompensator::apply(10, 95, 100), 100);
        assert_eq!(TemperatureCompensator::apply(2, 50, 100), 52);
    }
}
