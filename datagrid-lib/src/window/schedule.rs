//! Per-frame update coalescing.
//!
//! Raw scroll and resize signals never recompute the window directly. They
//! mark a recompute as pending, and the next animation frame performs at most
//! one. Scrolls faster than the velocity threshold skip the wait so fast flicks
//! and scrollbar drags do not show blank gaps.

use std::time::Instant;

/// Default scroll velocity (logical units per millisecond) above which an
/// update is forced immediately.
pub const DEFAULT_VELOCITY_THRESHOLD: f64 = 2.0;

/// What the caller should do after feeding a signal to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// A recompute was queued for the next frame.
    Deferred,
    /// A recompute is already queued; this signal was coalesced into it.
    AlreadyPending,
    /// Recompute now; the scroll is too fast to wait for a frame.
    Immediate,
}

impl ScheduleDecision {
    /// Returns `true` if the caller must recompute before the next frame.
    pub fn is_immediate(&self) -> bool {
        matches!(self, ScheduleDecision::Immediate)
    }
}

/// Coalesces viewport signals into one recompute per frame.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    pending: bool,
    velocity_threshold: f64,
    last_signal: Option<(f64, Instant)>,
    last_velocity: f64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_VELOCITY_THRESHOLD)
    }
}

impl FrameScheduler {
    /// Creates a scheduler with the given velocity threshold (units/ms).
    pub fn new(velocity_threshold: f64) -> Self {
        Self {
            pending: false,
            velocity_threshold,
            last_signal: None,
            last_velocity: 0.0,
        }
    }

    /// Feeds a raw scroll signal at `offset`, observed at `now`.
    pub fn scroll(&mut self, offset: f64, now: Instant) -> ScheduleDecision {
        let velocity = match self.last_signal {
            Some((last_offset, last_time)) => {
                let distance = (offset - last_offset).abs();
                let elapsed_ms = now.saturating_duration_since(last_time).as_secs_f64() * 1000.0;
                if elapsed_ms > 0.0 {
                    distance / elapsed_ms
                } else if distance > 0.0 {
                    f64::INFINITY
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        self.last_signal = Some((offset, now));
        self.last_velocity = velocity;

        if velocity > self.velocity_threshold {
            log::trace!("scroll velocity {:.2} units/ms, forcing update", velocity);
            self.pending = false;
            return ScheduleDecision::Immediate;
        }
        self.request()
    }

    /// Queues a recompute for the next frame (resize, data change).
    pub fn request(&mut self) -> ScheduleDecision {
        if self.pending {
            ScheduleDecision::AlreadyPending
        } else {
            self.pending = true;
            ScheduleDecision::Deferred
        }
    }

    /// Called once per animation frame. Returns `true` if a recompute is due,
    /// and clears the pending flag.
    pub fn on_frame(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Returns `true` if a recompute is queued.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Velocity measured at the last scroll signal (units/ms).
    pub fn last_velocity(&self) -> f64 {
        self.last_velocity
    }
}
