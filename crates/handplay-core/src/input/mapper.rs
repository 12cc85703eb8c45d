//! Image-space to play-space coordinate mapping

use crate::config::MapperConfig;
use crate::spatial::{Point2, Point3};

/// Converts normalized landmark coordinates into play-space coordinates.
///
/// Image y grows downward and the camera sees the visitor un-mirrored, so
/// the default mapping flips both: moving your hand right moves the cursor
/// right, moving it up moves the cursor up.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    config: MapperConfig,
}

impl CoordinateMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Map a normalized landmark into play space
    pub fn map(&self, p: Point3) -> Point3 {
        let c = &self.config;
        let x = if c.mirror_x { 1.0 - p.x } else { p.x };
        Point3::new(
            (x - 0.5) * c.width + c.offset_x,
            (0.5 - p.y) * c.height + c.offset_y,
            p.z * c.depth_scale,
        )
    }

    /// Map and drop depth
    pub fn map_planar(&self, p: Point3) -> Point2 {
        self.map(p).planar()
    }

    /// Inverse of [`CoordinateMapper::map`] on the x/y plane
    pub fn unmap(&self, p: Point2) -> Point2 {
        let c = &self.config;
        let x = (p.x - c.offset_x) / c.width + 0.5;
        let y = 0.5 - (p.y - c.offset_y) / c.height;
        Point2::new(if c.mirror_x { 1.0 - x } else { x }, y)
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}
