//! Cursor sources and display smoothing

use crate::config::SmoothingConfig;
use crate::spatial::Point3;

use super::landmarks::pose;

/// Adaptive exponential smoothing for a displayed cursor.
///
/// Small movements are eased to hide tracker jitter; large jumps (a hand
/// re-acquired elsewhere) snap so the cursor never lags visibly behind.
#[derive(Debug, Clone)]
pub struct CursorSmoother {
    config: SmoothingConfig,
    current: Option<Point3>,
}

impl CursorSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    /// Feed a raw play-space sample and get the smoothed position
    pub fn update(&mut self, raw: Point3) -> Point3 {
        let next = match self.current {
            Some(prev) if self.config.enabled => {
                if prev.planar_distance(&raw) > self.config.snap_distance {
                    raw
                } else {
                    prev.lerp(&raw, self.config.alpha)
                }
            }
            _ => raw,
        };
        self.current = Some(next);
        next
    }

    pub fn current(&self) -> Option<Point3> {
        self.current
    }

    /// Forget history so the next sample is taken as-is
    pub fn reset(&mut self) {
        self.current = None;
    }
}

/// Index fingertip of the raised hand from a body pose.
///
/// Picks whichever of the two index fingertips is higher in the image
/// (smaller normalized y). Non-finite points are ignored.
pub fn pose_index_tip(points: &[Point3]) -> Option<Point3> {
    if points.len() < pose::COUNT {
        return None;
    }
    let valid = |p: &Point3| p.is_finite().then_some(*p);
    match (valid(&points[pose::LEFT_INDEX]), valid(&points[pose::RIGHT_INDEX])) {
        (Some(left), Some(right)) => Some(if left.y < right.y { left } else { right }),
        (Some(left), None) => Some(left),
        (None, right) => right,
    }
}
