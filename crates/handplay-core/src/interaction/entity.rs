//! Grabbable entities, delivery zones and their shared category vocabulary

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::input::HandId;
use crate::spatial::{Point2, Point3};

/// Unique identifier for a spawned entity
pub type EntityId = u64;

/// Unique identifier for a delivery zone
pub type ZoneId = String;

/// Tag shared by entities and the zone that accepts them (e.g. "mars").
///
/// Matching is plain equality; there is no partial credit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity size; small ones get a smaller grab radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    #[default]
    Normal,
    Small,
}

/// Something a visitor can pinch, carry and deliver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrabbableEntity {
    pub id: EntityId,
    /// Current play-space position
    pub position: Point3,
    /// Resting position an idle entity drifts back to
    pub home: Point3,
    pub category: Category,
    pub size: SizeClass,
    /// Hand currently holding this entity
    pub grabbed_by: Option<HandId>,
    /// End of the bounce-back window after a rejected delivery
    pub rejected_until: Option<Duration>,
}

impl GrabbableEntity {
    pub fn new(id: EntityId, position: Point3, category: Category, size: SizeClass) -> Self {
        Self {
            id,
            position,
            home: position,
            category,
            size,
            grabbed_by: None,
            rejected_until: None,
        }
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed_by.is_some()
    }

    /// Whether the rejection bounce animation is still running at `now`
    pub fn is_bouncing(&self, now: Duration) -> bool {
        self.rejected_until.map(|t| now < t).unwrap_or(false)
    }
}

/// Fixed target area that accepts entities of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub id: ZoneId,
    pub position: Point2,
    /// A held entity is delivered once the hand comes this close
    pub snap_radius: f32,
    pub accepted_category: Category,
}

impl DeliveryZone {
    pub fn new(
        id: impl Into<ZoneId>,
        position: Point2,
        snap_radius: f32,
        accepted_category: impl Into<Category>,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            snap_radius,
            accepted_category: accepted_category.into(),
        }
    }

    pub fn accepts(&self, category: &Category) -> bool {
        self.accepted_category == *category
    }

    /// Whether `point` is inside the snap radius (boundary inclusive)
    pub fn contains(&self, point: Point2) -> bool {
        self.position.distance(&point) <= self.snap_radius
    }
}
