//! Debounced write-behind tracking for settings documents.

/// Quiet period after the last change before a document is written.
pub const DEFAULT_WRITE_DELAY_MS: u64 = 30_000;

/// Tracks whether a document changed and when it last changed.
///
/// Each change re-arms the timer, so a long run of steps produces one write
/// once the focuser has been quiet for the whole delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteBehind {
    delay_ms: u64,
    changed_at: Option<u64>,
}

impl Default for WriteBehind {
    fn default() -> Self {
        Self::new(DEFAULT_WRITE_DELAY_MS)
    }
}

impl WriteBehind {
    /// Tracker with the given quiet period.
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            changed_at: None,
        }
    }

    /// Record a change at `now_ms`.
    #[inline]
    pub fn mark(&mut self, now_ms: u64) {
        self.changed_at = Some(now_ms);
    }

    /// Unsaved changes exist.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.changed_at.is_some()
    }

    /// Dirty and quiet for at least the delay.
    pub fn due(&self, now_ms: u64) -> bool {
        match self.changed_at {
            Some(at) => now_ms.saturating_sub(at) >= self.delay_ms,
            None => false,
        }
    }

    /// Forget pending changes after a successful write.
    #[inline]
    pub fn clear(&mut self) {
        self.changed_at = None;
    }

    /// Quiet period in milliseconds.
    #[inline]
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Change the quiet period; pending changes stay pending.
    #[inline]
    pub fn set_delay_ms(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_is_never_due() {
        let wb = WriteBehind::default();
        assert!(!wb.is_dirty());
        assert!(!wb.due(u64::MAX));
    }

    #[test]
    fn test_each_change_rearms() {
        let mut wb = WriteBehind::new(100);
        wb.mark(0);
        wb.mark(80);
        assert!(!wb.due(150));
        assert!(wb.due(180));
        wb.clear();
        assert!(!wb.due(1_000));
    }
}
