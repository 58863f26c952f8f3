//! Monotonic time sources.
//!
//! The controller only ever asks "what time is it" in milliseconds. Boards
//! with a hardware timer feed a [`TimeBase`] from the timer interrupt; hosted
//! builds use [`SystemClock`].

use core::cell::Cell;

use critical_section::Mutex;

/// Millisecond monotonic clock.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[derive(Debug, Clone, Copy)]
struct Ticks {
    now_ms: u64,
    since_second_ms: u32,
    second_elapsed: bool,
}

/// Interrupt-fed time base.
///
/// The timer ISR calls [`on_timer_tick`](Self::on_timer_tick); the main loop
/// reads the counter and polls the once-per-second flag. Every access runs
/// inside a critical section, so the counter is never observed half-updated.
///
/// ```rust,ignore
/// static TIME: TimeBase = TimeBase::new();
///
/// #[interrupt]
/// fn TIMER0() {
///     TIME.on_timer_tick(10);
/// }
/// ```
pub struct TimeBase {
    ticks: Mutex<Cell<Ticks>>,
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeBase {
    /// A time base at zero.
    pub const fn new() -> Self {
        Self {
            ticks: Mutex::new(Cell::new(Ticks {
                now_ms: 0,
                since_second_ms: 0,
                second_elapsed: false,
            })),
        }
    }

    /// Advance the counter by one timer period. Safe to call from interrupt context.
    pub fn on_timer_tick(&self, period_ms: u32) {
        critical_section::with(|cs| {
            let cell = self.ticks.borrow(cs);
            let mut ticks = cell.get();
            ticks.now_ms = ticks.now_ms.wrapping_add(u64::from(period_ms));
            ticks.since_second_ms = ticks.since_second_ms.saturating_add(period_ms);
            if ticks.since_second_ms >= 1_000 {
                ticks.since_second_ms %= 1_000;
                ticks.second_elapsed = true;
            }
            cell.set(ticks);
        });
    }

    /// Consume the once-per-second signal. Returns `true` at most once per raise.
    pub fn take_second_elapsed(&self) -> bool {
        critical_section::with(|cs| {
            let cell = self.ticks.borrow(cs);
            let mut ticks = cell.get();
            let elapsed = ticks.second_elapsed;
            ticks.second_elapsed = false;
            cell.set(ticks);
            elapsed
        })
    }
}

impl Clock for TimeBase {
    fn now_ms(&self) -> u64 {
        critical_section::with(|cs| self.ticks.borrow(cs).get().now_ms)
    }
}

/// Wall-clock backed time source (std only).
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl SystemClock {
    /// A clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_base_counts() {
        let time = TimeBase::new();
        for _ in 0..25 {
            time.on_timer_tick(10);
        }
        assert_eq!(time.now_ms(), 250);
        assert!(!time.take_second_elapsed());
    }

    #[test]
    fn test_second_flag_is_taken_once() {
        let time = TimeBase::new();
        for _ in 0..100 {
            time.on_timer_tick(10);
        }
        assert!(time.take_second_elapsed());
        assert!(!time.take_second_elapsed());

        time.on_timer_tick(999);
        assert!(!time.take_second_elapsed());
        time.on_timer_tick(1);
        assert!(time.take_second_elapsed());
    }

    #[test]
    fn test_reference_is_a_clock() {
        fn read<C: Clock>(clock: C) -> u64 {
            clock.now_ms()
        }
        let time = TimeBase::new();
        time.on_timer_tick(42);
        assert_eq!(read(&time), 42);
    }

    #[test]
    fn test_concurrent_ticks_are_not_lost() {
        use std::sync::Arc;
        use std::thread;

        let time = Arc::new(TimeBase::new());
        let handles: std::vec::Vec<_> = (0..4)
            .map(|_| {
                let time = Arc::clone(&time);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        time.on_timer_tick(1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(time.now_ms(), 4_000);
    }
}
