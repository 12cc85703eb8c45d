//! Rejection-sampling entity placement
//!
//! Candidates are drawn uniformly from the reachable bounds and rejected when
//! they crowd another entity or sit on a delivery zone. After
//! `max_attempts` rejections the placer gives up and returns a point on a
//! small ring around the bounds center, so placement always terminates.

use std::f32::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::PlacementConfig;
use crate::interaction::{DeliveryZone, SizeClass};
use crate::spatial::Point2;

/// Golden angle in radians; successive fallbacks spread evenly around the ring
const GOLDEN_ANGLE: f32 = PI * (3.0 - 2.236_068);

/// A chosen spawn position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub position: Point2,
    /// Random sampling failed and the deterministic ring was used
    pub fallback: bool,
}

/// Scatters entities across the play area
#[derive(Debug, Clone)]
pub struct SpatialPlacer {
    config: PlacementConfig,
    rng: StdRng,
    fallbacks: u32,
}

impl SpatialPlacer {
    /// Seeded from `config.seed`, or from OS entropy when unset
    pub fn new(config: PlacementConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            fallbacks: 0,
        }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Number of placements that ended on the fallback ring
    pub fn fallback_count(&self) -> u32 {
        self.fallbacks
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Required clearance between entities of sizes `a` and `b`
    pub fn min_distance(&self, a: SizeClass, b: SizeClass) -> f32 {
        let table = &self.config.min_entity_distance;
        table.get(a).max(table.get(b))
    }

    /// Whether `candidate` satisfies every spacing constraint
    pub fn is_valid(
        &self,
        candidate: Point2,
        size: SizeClass,
        existing: &[(Point2, SizeClass)],
        zones: &[DeliveryZone],
    ) -> bool {
        let margin = self.config.zone_exclusion_margin;
        let clear_of_zones = zones
            .iter()
            .all(|z| candidate.distance(&z.position) >= z.snap_radius + margin);
        clear_of_zones
            && existing
                .iter()
                .all(|(p, s)| candidate.distance(p) >= self.min_distance(size, *s))
    }

    /// Find a position for one entity of `size`
    pub fn place(
        &mut self,
        size: SizeClass,
        existing: &[(Point2, SizeClass)],
        zones: &[DeliveryZone],
    ) -> Placement {
        let bounds = self.config.bounds;
        for _ in 0..self.config.max_attempts {
            let candidate = Point2::new(
                self.rng.gen_range(bounds.min.x..bounds.max.x),
                self.rng.gen_range(bounds.min.y..bounds.max.y),
            );
            if self.is_valid(candidate, size, existing, zones) {
                return Placement {
                    position: candidate,
                    fallback: false,
                };
            }
        }

        let position = self.fallback_position();
        tracing::warn!(
            attempts = self.config.max_attempts,
            x = position.x,
            y = position.y,
            "placement exhausted, using fallback ring"
        );
        Placement {
            position,
            fallback: true,
        }
    }

    /// Place several entities; each one keeps clear of those placed before it
    pub fn place_many(
        &mut self,
        sizes: &[SizeClass],
        existing: &[(Point2, SizeClass)],
        zones: &[DeliveryZone],
    ) -> Vec<Placement> {
        let mut occupied = existing.to_vec();
        sizes
            .iter()
            .map(|size| {
                let placement = self.place(*size, &occupied, zones);
                occupied.push((placement.position, *size));
                placement
            })
            .collect()
    }

    fn fallback_position(&mut self) -> Point2 {
        let bounds = self.config.bounds;
        let center = bounds.center();
        let angle = self.fallbacks as f32 * GOLDEN_ANGLE;
        let r = self.config.fallback_ring_radius;
        self.fallbacks = self.fallbacks.wrapping_add(1);
        bounds.clamp(Point2::new(center.x + r * angle.cos(), center.y + r * angle.sin()))
    }
}
