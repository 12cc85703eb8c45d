//! Critically damped follow motion for held entities

use crate::spatial::{Point3, Vector3};

/// Spring state for one followed point.
///
/// A critically damped spring reaches its target as fast as possible without
/// overshooting, so a held entity trails the hand smoothly and settles on it
/// instead of teleporting or wobbling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Follow {
    velocity: Vector3,
}

impl Follow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    pub fn reset(&mut self) {
        self.velocity = Vector3::ZERO;
    }

    /// Advance `current` toward `target` by `dt` seconds with natural
    /// frequency `omega` (rad/s).
    pub fn step(&mut self, current: Point3, target: Point3, omega: f32, dt: f32) -> Point3 {
        if dt <= 0.0 {
            return current;
        }
        let x = omega * dt;
        // Pade approximant of exp(-x); stable for any dt.
        let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

        let change = current - target;
        let temp = (self.velocity + change * omega) * dt;
        self.velocity = (self.velocity + temp * -omega) * decay;
        target + (change + temp) * decay
    }
}
