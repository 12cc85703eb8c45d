//! Category-balanced entity spawning

use rand::Rng;

use crate::config::PlacementConfig;
use crate::error::{EngineError, Result};
use crate::interaction::{Category, DeliveryZone, EntityId, GrabbableEntity, SizeClass};
use crate::spatial::Point2;

use super::placer::{Placement, SpatialPlacer};

/// Creates entities, keeping every zone supplied.
///
/// The category vocabulary is the set of categories the zones accept, in
/// zone declaration order. The next spawn always takes the category with
/// the fewest live entities, so no zone is starved.
#[derive(Debug, Clone)]
pub struct Spawner {
    categories: Vec<Category>,
    placer: SpatialPlacer,
    small_ratio: f32,
    next_id: EntityId,
}

impl Spawner {
    pub fn new(config: PlacementConfig, zones: &[DeliveryZone]) -> Result<Self> {
        let mut categories: Vec<Category> = Vec::new();
        for zone in zones {
            if !categories.contains(&zone.accepted_category) {
                categories.push(zone.accepted_category.clone());
            }
        }
        if categories.is_empty() {
            return Err(EngineError::EmptyCategories);
        }

        Ok(Self {
            categories,
            small_ratio: config.small_ratio,
            placer: SpatialPlacer::new(config),
            next_id: 1,
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn placer(&self) -> &SpatialPlacer {
        &self.placer
    }

    /// Category with the fewest live entities; ties go to vocabulary order
    pub fn next_category(&self, live: &[GrabbableEntity]) -> Category {
        let mut best = &self.categories[0];
        let mut best_count = usize::MAX;
        for category in &self.categories {
            let count = live.iter().filter(|e| e.category == *category).count();
            if count < best_count {
                best = category;
                best_count = count;
            }
        }
        best.clone()
    }

    /// Small with probability `small_ratio`
    pub fn next_size(&mut self) -> SizeClass {
        if self.placer.rng_mut().gen::<f32>() < self.small_ratio {
            SizeClass::Small
        } else {
            SizeClass::Normal
        }
    }

    /// Spawn a specific category, for example to restock one zone
    pub fn spawn_category(
        &mut self,
        category: Category,
        live: &[GrabbableEntity],
        zones: &[DeliveryZone],
    ) -> Result<(GrabbableEntity, Placement)> {
        self.check_category(&category)?;
        Ok(self.build(category, live, zones))
    }

    /// Create an entity at a fixed position, bypassing the placer
    pub fn spawn_at(
        &mut self,
        category: Category,
        size: SizeClass,
        position: Point2,
    ) -> Result<GrabbableEntity> {
        self.check_category(&category)?;
        if !position.is_finite() {
            return Err(EngineError::invalid("position", "must be finite"));
        }
        Ok(self.allocate(category, size, position))
    }

    fn check_category(&self, category: &Category) -> Result<()> {
        if self.categories.contains(category) {
            Ok(())
        } else {
            Err(EngineError::UnknownCategory(category.to_string()))
        }
    }

    /// Spawn the next balanced entity
    pub fn spawn(
        &mut self,
        live: &[GrabbableEntity],
        zones: &[DeliveryZone],
    ) -> (GrabbableEntity, Placement) {
        let category = self.next_category(live);
        self.build(category, live, zones)
    }

    fn build(
        &mut self,
        category: Category,
        live: &[GrabbableEntity],
        zones: &[DeliveryZone],
    ) -> (GrabbableEntity, Placement) {
        let size = self.next_size();
        let existing: Vec<_> = live.iter().map(|e| (e.position.planar(), e.size)).collect();
        let placement = self.placer.place(size, &existing, zones);
        (self.allocate(category, size, placement.position), placement)
    }

    fn allocate(
        &mut self,
        category: Category,
        size: SizeClass,
        position: Point2,
    ) -> GrabbableEntity {
        let id = self.next_id;
        self.next_id += 1;
        GrabbableEntity::new(id, position.with_z(0.0), category, size)
    }
}
