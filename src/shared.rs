//! Shared controller handle for threaded transports (std only).
//!
//! `SharedFocuser` wraps the single [`MotionController`] so the motion loop
//! and every transport (text protocol, Alpaca, web UI) work on the same
//! position, target and settings.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use focuser_motion::SharedFocuser;
//!
//! let focuser = Arc::new(SharedFocuser::new(controller));
//!
//! // Motion loop
//! focuser.with_controller(|c| c.tick())?;
//!
//! // Transport handler
//! focuser.with_controller(|c| c.set_target_position(12_000));
//! let status = focuser.status();
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;

use crate::driver::StepSequencer;
use crate::motion::{Clock, MotionController};
use crate::status::FocuserStatus;

/// Last position/target handed out by [`SharedFocuser::check_changes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeDetection {
    /// Last reported position.
    pub last_position: u32,
    /// Last reported target.
    pub last_target: u32,
}

/// Thread-safe handle to one focuser controller.
///
/// A `Mutex` rather than an `RwLock`: the motion loop writes on every tick.
/// Change detection has its own lock so publishers don't contend with it.
pub struct SharedFocuser<S, D, C>
where
    S: StepSequencer,
    D: DelayNs,
    C: Clock,
{
    controller: Mutex<MotionController<S, D, C>>,
    change_detection: Mutex<ChangeDetection>,
}

impl<S, D, C> SharedFocuser<S, D, C>
where
    S: StepSequencer,
    D: DelayNs,
    C: Clock,
{
    /// Wrap a controller.
    pub fn new(controller: MotionController<S, D, C>) -> Self {
        let baseline = ChangeDetection {
            last_position: controller.position(),
            last_target: controller.target_position(),
        };
        Self {
            controller: Mutex::new(controller),
            change_detection: Mutex::new(baseline),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MotionController<S, D, C>> {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the controller.
    ///
    /// The closure form keeps the lock from being held across unrelated work.
    pub fn with_controller<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut MotionController<S, D, C>) -> R,
    {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    /// Snapshot for transports.
    pub fn status(&self) -> FocuserStatus {
        self.lock().status()
    }

    /// Current position.
    pub fn position(&self) -> u32 {
        self.lock().position()
    }

    /// Whether the focuser is moving.
    pub fn is_moving(&self) -> bool {
        self.lock().is_moving()
    }

    /// Returns a snapshot if position or target changed since the last call.
    pub fn check_changes(&self) -> Option<FocuserStatus> {
        let status = self.status();

        let mut detection = self
            .change_detection
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if status.position == detection.last_position && status.target == detection.last_target {
            return None;
        }
        detection.last_position = status.position;
        detection.last_target = status.target;
        Some(status)
    }

    /// Unwrap the controller.
    pub fn into_inner(self) -> MotionController<S, D, C> {
        self.controller
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
