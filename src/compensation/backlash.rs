//! Backlash compensation.
//!
//! On a reversal of travel the target is extended by the configured number of
//! steps in the new direction, so the slack is taken up within the same move.
//! The extension happens once per reversal; further targets in the same
//! direction pass through untouched.

use crate::config::{Direction, FocuserSettings};

/// Backlash parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BacklashConfig {
    /// Extra steps on reversal to inward travel.
    pub in_steps: u8,
    /// Extra steps on reversal to outward travel.
    pub out_steps: u8,
    /// Apply `in_steps`.
    pub in_enabled: bool,
    /// Apply `out_steps`.
    pub out_enabled: bool,
}

impl BacklashConfig {
    /// Take the backlash fields from persisted settings.
    pub fn from_settings(settings: &FocuserSettings) -> Self {
        Self {
            in_steps: settings.backlash_in_steps,
            out_steps: settings.backlash_out_steps,
            in_enabled: settings.backlash_in_enabled,
            out_enabled: settings.backlash_out_enabled,
        }
    }

    /// Extra steps for a reversal into `direction`, zero when disabled.
    #[inline]
    pub fn steps_for(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Inward if self.in_enabled => u32::from(self.in_steps),
            Direction::Outward if self.out_enabled => u32::from(self.out_steps),
            _ => 0,
        }
    }
}

/// Result of [`BacklashCompensator::adjust_target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacklashAdjustment {
    /// Target to drive to.
    pub target: u32,
    /// Direction to record as last moved.
    pub direction: Direction,
    /// Extra steps added to the requested target (after clamping).
    pub inserted: u32,
}

/// Inserts extra travel when the direction of motion reverses.
#[derive(Debug, Clone, Default)]
pub struct BacklashCompensator {
    config: BacklashConfig,
}

impl BacklashCompensator {
    /// Create a compensator.
    pub fn new(config: BacklashConfig) -> Self {
        Self { config }
    }

    /// Active parameters.
    #[inline]
    pub fn config(&self) -> &BacklashConfig {
        &self.config
    }

    /// Mutable access to the parameters.
    #[inline]
    pub fn config_mut(&mut self) -> &mut BacklashConfig {
        &mut self.config
    }

    /// Adjust a requested target for backlash.
    ///
    /// Only a reversal relative to `last_direction` adds steps. The result is
    /// clamped to `[0, max_step]`.
    pub fn adjust_target(
        &self,
        requested: u32,
        current: u32,
        last_direction: Direction,
        max_step: u32,
    ) -> BacklashAdjustment {
        let unchanged = BacklashAdjustment {
            target: requested,
            direction: last_direction,
            inserted: 0,
        };

        let direction = match Direction::between(current, requested) {
            Some(d) if d != last_direction => d,
            _ => return unchanged,
        };

        let extra = self.config.steps_for(direction);
        let target = match direction {
            Direction::Outward => requested.saturating_add(extra).min(max_step),
            Direction::Inward => requested.saturating_sub(extra),
        };
        let inserted = target.abs_diff(requested);

        if inserted > 0 {
            debug!("backlash: {} extra steps {}", inserted, direction.as_str());
        }

        BacklashAdjustment {
            target,
            direction,
            inserted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compensator(in_steps: u8, out_steps: u8) -> BacklashCompensator {
        BacklashCompensator::new(BacklashConfig {
            in_steps,
            out_steps,
            in_enabled: true,
            out_enabled: true,
        })
    }

    #[test]
    fn test_reversal_outward_extends_target() {
        let adj = compensator(0, 5).adjust_target(150, 100, Direction::Inward, 80_000);
        assert_eq!(adj.target, 155);
        assert_eq!(adj.direction, Direction::Outward);
        assert_eq!(adj.inserted, 5);
    }

    #[test]
    fn test_same_direction_adds_nothing() {
        let adj = compensator(0, 5).adjust_target(160, 120, Direction::Outward, 80_000);
        assert_eq!(adj.target, 160);
        assert_eq!(adj.inserted, 0);
    }

    #[test]
    fn test_reversal_inward_clamps_at_zero() {
        let adj = compensator(10, 0).adjust_target(3, 50, Direction::Outward, 80_000);
        assert_eq!(adj.target, 0);
        assert_eq!(adj.direction, Direction::Inward);
        assert_eq!(adj.inserted, 3);
    }

    #[test]
    fn test_reversal_outward_clamps_at_max() {
        let adj = compensator(0, 20).adjust_target(9_990, 9_000, Direction::Inward, 10_000);
        assert_eq!(adj.target, 10_000);
        assert_eq!(adj.inserted, 10);
    }

    #[test]
    fn test_disabled_direction_still_records_reversal() {
        let mut comp = compensator(10, 10);
        comp.config_mut().in_enabled = false;
        let adj = comp.adjust_target(50, 100, Direction::Outward, 80_000);
        assert_eq!(adj.target, 50);
        assert_eq!(adj.direction, Direction::Inward);
    }

    #[test]
    fn test_no_motion_keeps_direction() {
        let adj = compensator(10, 10).adjust_target(100, 100, Direction::Outward, 80_000);
        assert_eq!(adj.direction, Direction::Outward);
        assert_eq!(adj.inserted, 0);
    }
}
