//! Sustained-pose detection

use std::time::Duration;

use crate::input::HandPose;

/// Fires once when a hand keeps the watched pose for long enough.
///
/// Changing pose resets the timer; the tracker re-arms only after the pose
/// is broken, so a fist held for ten seconds fires once.
#[derive(Debug, Clone)]
pub struct PoseHoldTracker {
    watched: HandPose,
    threshold: Duration,
    held_for: Duration,
    fired: bool,
}

impl PoseHoldTracker {
    pub fn new(watched: HandPose, threshold: Duration) -> Self {
        Self {
            watched,
            threshold,
            held_for: Duration::ZERO,
            fired: false,
        }
    }

    pub fn watched(&self) -> HandPose {
        self.watched
    }

    /// Fraction of the hold completed, in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.threshold.is_zero() {
            return if self.fired { 1.0 } else { 0.0 };
        }
        (self.held_for.as_secs_f32() / self.threshold.as_secs_f32()).min(1.0)
    }

    /// Feed the current pose; returns true on the tick the hold completes
    pub fn update(&mut self, pose: HandPose, dt: Duration) -> bool {
        if pose != self.watched {
            self.reset();
            return false;
        }
        self.held_for += dt;
        if !self.fired && self.held_for >= self.threshold {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.held_for = Duration::ZERO;
        self.fired = false;
    }
}
