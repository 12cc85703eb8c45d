//! Per-hand grab state machine
//!
//! Each tracked hand cycles through `Idle -> Near -> Grabbed` and back.
//! A grab starts only on the rising edge of a pinch, so sweeping an already
//! pinched hand across entities never picks anything up. While held, the
//! entity follows the pinch-point and is delivered automatically as soon as
//! the hand enters a delivery zone's snap radius.

use std::time::Duration;

use serde::Serialize;

use crate::config::GrabConfig;
use crate::event::{InteractionEvent, ReleaseReason};
use crate::input::{HandId, PinchEdge};
use crate::spatial::Point3;

use super::entity::{DeliveryZone, EntityId, GrabbableEntity};
use super::follow::Follow;

/// Where a hand is in its grab lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", content = "entity_id", rename_all = "snake_case")]
pub enum GrabPhase {
    #[default]
    Idle,
    /// An ungrabbed entity is within grab radius; it would be taken on the next pinch
    Near(EntityId),
    /// Holding an entity
    Grabbed(EntityId),
}

impl GrabPhase {
    pub fn held(&self) -> Option<EntityId> {
        match self {
            GrabPhase::Grabbed(id) => Some(*id),
            _ => None,
        }
    }

    pub fn candidate(&self) -> Option<EntityId> {
        match self {
            GrabPhase::Near(id) => Some(*id),
            _ => None,
        }
    }
}

/// Grab bookkeeping for one hand
#[derive(Debug, Clone, Default)]
pub struct HandGrab {
    pub phase: GrabPhase,
    follow: Follow,
}

impl HandGrab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a Near candidate; a held entity is kept
    pub fn clear_candidate(&mut self) {
        if matches!(self.phase, GrabPhase::Near(_)) {
            self.phase = GrabPhase::Idle;
        }
    }

    fn hold(&mut self, id: EntityId) {
        self.phase = GrabPhase::Grabbed(id);
        self.follow.reset();
    }

    fn idle(&mut self) {
        self.phase = GrabPhase::Idle;
        self.follow.reset();
    }
}

/// One hand's input for a tick, already mapped to play space
#[derive(Debug, Clone, Copy)]
pub struct HandSample {
    pub hand: HandId,
    pub pinch_point: Point3,
    pub is_pinching: bool,
    pub edge: PinchEdge,
}

/// Result of stepping one hand
#[derive(Debug, Default)]
pub struct HandStep {
    /// Entity removed by a successful delivery; the caller owes a replacement
    pub consumed: Option<GrabbableEntity>,
}

/// Grab, follow, release and delivery rules shared by both hands
#[derive(Debug, Clone)]
pub struct GrabStateMachine {
    config: GrabConfig,
}

impl GrabStateMachine {
    pub fn new(config: GrabConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GrabConfig {
        &self.config
    }

    /// Nearest ungrabbed entity strictly inside its grab radius.
    ///
    /// Ties go to the lowest entity id.
    pub fn candidate(&self, point: Point3, entities: &[GrabbableEntity]) -> Option<EntityId> {
        entities
            .iter()
            .filter(|e| !e.is_grabbed())
            .map(|e| (e.position.planar_distance(&point), e))
            .filter(|(d, e)| *d < self.config.radius(e.size))
            .min_by(|(da, a), (db, b)| da.total_cmp(db).then(a.id.cmp(&b.id)))
            .map(|(_, e)| e.id)
    }

    /// Zone whose snap radius contains `point`; nearest wins, then declaration order
    pub fn zone_at<'a>(
        &self,
        point: Point3,
        zones: &'a [DeliveryZone],
    ) -> Option<&'a DeliveryZone> {
        let p = point.planar();
        zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.contains(p))
            .min_by(|(ia, a), (ib, b)| {
                a.position
                    .distance(&p)
                    .total_cmp(&b.position.distance(&p))
                    .then(ia.cmp(ib))
            })
            .map(|(_, z)| z)
    }

    /// Advance one visible hand by `dt` seconds
    #[allow(clippy::too_many_arguments)]
    pub fn step_hand(
        &self,
        sample: &HandSample,
        grab: &mut HandGrab,
        entities: &mut Vec<GrabbableEntity>,
        zones: &[DeliveryZone],
        now: Duration,
        dt: f32,
        events: &mut Vec<InteractionEvent>,
    ) -> HandStep {
        let held = match grab.phase.held() {
            Some(id) => id,
            None => {
                self.step_free(sample, grab, entities, events);
                return HandStep::default();
            }
        };

        let Some(index) = entities.iter().position(|e| e.id == held) else {
            grab.idle();
            return HandStep::default();
        };

        let target = sample.pinch_point;
        let entity = &mut entities[index];
        entity.position = grab
            .follow
            .step(entity.position, target, self.config.follow_frequency, dt);

        // Zones are checked while pinching and on the release tick itself, so
        // letting go inside a zone still counts as a delivery.
        if sample.is_pinching || sample.edge.is_falling() {
            if let Some(zone) = self.zone_at(target, zones) {
                let success = zone.accepts(&entity.category);
                events.push(InteractionEvent::Deliver {
                    entity_id: held,
                    zone_id: zone.id.clone(),
                    hand: sample.hand,
                    success,
                });
                grab.idle();

                if success {
                    let consumed = entities.remove(index);
                    tracing::info!(entity = held, zone = %zone.id, "delivered");
                    return HandStep {
                        consumed: Some(consumed),
                    };
                }

                entity.grabbed_by = None;
                entity.rejected_until = Some(now + self.config.bounce_window());
                tracing::debug!(entity = held, zone = %zone.id, "delivery rejected");
                return HandStep::default();
            }
        }

        if !sample.is_pinching {
            entity.grabbed_by = None;
            entity.home = entity.position;
            grab.idle();
            events.push(InteractionEvent::GrabRelease {
                entity_id: held,
                hand: sample.hand,
                reason: ReleaseReason::Manual,
            });
        }

        HandStep::default()
    }

    fn step_free(
        &self,
        sample: &HandSample,
        grab: &mut HandGrab,
        entities: &mut [GrabbableEntity],
        events: &mut Vec<InteractionEvent>,
    ) {
        let candidate = self.candidate(sample.pinch_point, entities);

        match candidate {
            Some(id) if sample.edge.is_rising() => {
                if let Some(entity) = entities.iter_mut().find(|e| e.id == id) {
                    entity.grabbed_by = Some(sample.hand);
                    entity.rejected_until = None;
                    grab.hold(id);
                    events.push(InteractionEvent::GrabStart {
                        entity_id: id,
                        hand: sample.hand,
                    });
                }
            }
            Some(id) => grab.phase = GrabPhase::Near(id),
            None => grab.phase = GrabPhase::Idle,
        }
    }

    /// Force-release whatever `grab` holds, e.g. when the hand is lost or input pauses
    pub fn release(
        &self,
        hand: HandId,
        grab: &mut HandGrab,
        entities: &mut [GrabbableEntity],
        reason: ReleaseReason,
        events: &mut Vec<InteractionEvent>,
    ) {
        if let Some(id) = grab.phase.held() {
            if let Some(entity) = entities.iter_mut().find(|e| e.id == id) {
                entity.grabbed_by = None;
                entity.home = entity.position;
            }
            events.push(InteractionEvent::GrabRelease {
                entity_id: id,
                hand,
                reason,
            });
        }
        grab.idle();
    }

    /// Ease every free entity back toward its home position
    pub fn relax(&self, entities: &mut [GrabbableEntity], now: Duration) {
        let rate = self.config.home_return_rate;
        for entity in entities.iter_mut().filter(|e| !e.is_grabbed()) {
            entity.position = entity.position.lerp(&entity.home, rate);
            if entity.rejected_until.map(|t| now >= t).unwrap_or(false) {
                entity.rejected_until = None;
            }
        }
    }
}

impl Default for GrabStateMachine {
    fn default() -> Self {
        Self::new(GrabConfig::default())
    }
}
