//! Axis-aligned play-area bounds

use serde::{Deserialize, Serialize};

use super::Point2;

/// Rectangle of the play plane the visitor's hand can comfortably reach
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayBounds {
    pub min: Point2,
    pub max: Point2,
}

impl Default for PlayBounds {
    fn default() -> Self {
        Self {
            min: Point2::new(-4.0, -2.5),
            max: Point2::new(4.0, 2.5),
        }
    }
}

impl PlayBounds {
    /// Create bounds from two corners
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Create bounds from a center and half-extents
    pub fn centered(center: Point2, half_width: f32, half_height: f32) -> Self {
        Self {
            min: Point2::new(center.x - half_width, center.y - half_height),
            max: Point2::new(center.x + half_width, center.y + half_height),
        }
    }

    /// Center of the bounds
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check if a point is inside the bounds (edges inclusive)
    pub fn contains(&self, point: Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Nearest point inside the bounds
    pub fn clamp(&self, point: Point2) -> Point2 {
        Point2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Finite corners with strictly positive extent on both axes
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.max.x > self.min.x
            && self.max.y > self.min.y
    }
}
