//! Interaction session
//!
//! [`InteractionEngine`] owns all mutable session state: per-hand trackers,
//! live entities, dwell targets and the spawner. Callers feed it one
//! [`LandmarkFrame`] per rendered frame and render whatever the returned
//! [`TickOutput`] describes.

use std::time::Duration;

use serde::Serialize;

use crate::config::{CursorSource, EngineConfig, ExhibitLayout};
use crate::error::{EngineError, Result};
use crate::event::{InteractionEvent, ReleaseReason, TickOutput};
use crate::input::{
    classify, pose_index_tip, CoordinateMapper, CursorSmoother, HandFrame, HandId, HandPose,
    LandmarkFrame, PinchGestureDetector, PinchState, MAX_HANDS,
};
use crate::interaction::{
    Category, DeliveryZone, DwellSelector, DwellTarget, GrabPhase, GrabStateMachine,
    GrabbableEntity, HandGrab, HandSample, PoseHoldTracker, SizeClass, TwoHandPinchDetector,
};
use crate::placement::{Placement, Spawner};
use crate::spatial::{Point2, Point3};

/// Everything the engine remembers about one hand slot
#[derive(Debug, Clone)]
pub struct HandTrackerState {
    pub pinch: PinchState,
    pub grab: HandGrab,
    /// Smoothed play-space cursor; `None` while the hand is out of view
    pub cursor: Option<Point3>,
    pub pose: Option<HandPose>,
    /// Engine time the hand was last seen
    pub last_seen: Option<Duration>,
    /// Unsmoothed play-space pinch-point, used by gesture logic
    point: Option<Point3>,
    smoother: CursorSmoother,
    hold: PoseHoldTracker,
}

impl HandTrackerState {
    fn new(config: &EngineConfig) -> Self {
        Self {
            pinch: PinchState::default(),
            grab: HandGrab::new(),
            cursor: None,
            pose: None,
            last_seen: None,
            point: None,
            smoother: CursorSmoother::new(config.smoothing.clone()),
            hold: PoseHoldTracker::new(HandPose::Fist, config.pose_hold.fist_hold()),
        }
    }

    pub fn phase(&self) -> GrabPhase {
        self.grab.phase
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_pinching
    }

    /// Fill fraction of the fist-hold gesture, for a radial indicator
    pub fn hold_progress(&self) -> f32 {
        self.hold.progress()
    }

    fn clear_transient(&mut self) {
        self.cursor = None;
        self.point = None;
        self.pose = None;
        self.smoother.reset();
        self.hold.reset();
        self.grab.clear_candidate();
    }

    fn reset(&mut self) {
        self.clear_transient();
        self.pinch.reset();
        self.last_seen = None;
    }
}

/// Running totals for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub ticks: u64,
    pub skipped_frames: u64,
    pub grabs: u64,
    pub drops: u64,
    pub deliveries: u64,
    pub rejections: u64,
    pub spawned: u64,
    pub placement_fallbacks: u64,
    pub dwell_completions: u64,
    pub score: u64,
}

impl SessionStats {
    fn record(&mut self, event: &InteractionEvent, delivery_score: u32) {
        match event {
            InteractionEvent::GrabStart { .. } => self.grabs += 1,
            InteractionEvent::GrabRelease { .. } => self.drops += 1,
            InteractionEvent::Deliver { success: true, .. } => {
                self.deliveries += 1;
                self.score += u64::from(delivery_score);
            }
            InteractionEvent::Deliver { success: false, .. } => self.rejections += 1,
            InteractionEvent::Spawned { fallback, .. } => {
                self.spawned += 1;
                if *fallback {
                    self.placement_fallbacks += 1;
                }
            }
            InteractionEvent::DwellComplete { .. } => self.dwell_completions += 1,
            _ => {}
        }
    }
}

/// Gesture interaction engine for one exhibit session
#[derive(Debug)]
pub struct InteractionEngine {
    config: EngineConfig,
    mapper: CoordinateMapper,
    pinch: PinchGestureDetector,
    grab: GrabStateMachine,
    spawner: Spawner,
    dwell: DwellSelector,
    two_hand: TwoHandPinchDetector,
    pose_smoother: CursorSmoother,
    hands: [HandTrackerState; MAX_HANDS],
    entities: Vec<GrabbableEntity>,
    zones: Vec<DeliveryZone>,
    clock: Duration,
    last_sequence: Option<u64>,
    paused: bool,
    stats: SessionStats,
}

impl InteractionEngine {
    /// Build a session; no entities exist until [`populate`](Self::populate)
    pub fn new(
        config: EngineConfig,
        zones: Vec<DeliveryZone>,
        dwell_targets: Vec<DwellTarget>,
    ) -> Result<Self> {
        config.validate()?;
        validate_zones(&zones)?;
        let spawner = Spawner::new(config.placement.clone(), &zones)?;
        let dwell = DwellSelector::with_targets(dwell_targets)?;

        tracing::info!(
            zones = zones.len(),
            dwell_targets = dwell.targets().len(),
            categories = spawner.categories().len(),
            "interaction engine ready"
        );

        Ok(Self {
            mapper: CoordinateMapper::new(config.mapper.clone()),
            pinch: PinchGestureDetector::new(config.pinch.clone()),
            grab: GrabStateMachine::new(config.grab.clone()),
            two_hand: TwoHandPinchDetector::new(config.two_hand.cooldown()),
            pose_smoother: CursorSmoother::new(config.smoothing.clone()),
            hands: std::array::from_fn(|_| HandTrackerState::new(&config)),
            spawner,
            dwell,
            entities: Vec::new(),
            zones,
            clock: Duration::ZERO,
            last_sequence: None,
            paused: false,
            stats: SessionStats::default(),
            config,
        })
    }

    /// Build a session from a layout and spawn its initial population
    pub fn from_layout(
        config: EngineConfig,
        layout: ExhibitLayout,
    ) -> Result<(Self, Vec<InteractionEvent>)> {
        let targets = layout.dwell_targets(&config.dwell);
        let mut engine = Self::new(config, layout.zones, targets)?;
        let events = engine.populate(layout.population);
        Ok((engine, events))
    }

    /// Spawn `count` entities, balancing categories
    pub fn populate(&mut self, count: usize) -> Vec<InteractionEvent> {
        let mut events = Vec::with_capacity(count);
        for _ in 0..count {
            let (entity, placement) = self.spawner.spawn(&self.entities, &self.zones);
            let event = self.admit(entity, placement);
            self.stats.record(&event, self.config.grab.delivery_score);
            events.push(event);
        }
        tracing::info!(count, live = self.entities.len(), "population spawned");
        events
    }

    /// Spawn one entity of a given category
    pub fn spawn_category(&mut self, category: impl Into<Category>) -> Result<InteractionEvent> {
        let (entity, placement) =
            self.spawner
                .spawn_category(category.into(), &self.entities, &self.zones)?;
        let event = self.admit(entity, placement);
        self.stats.record(&event, self.config.grab.delivery_score);
        Ok(event)
    }

    /// Place an entity at a fixed play-space position, for scripted layouts
    pub fn place_entity(
        &mut self,
        category: impl Into<Category>,
        size: SizeClass,
        position: Point2,
    ) -> Result<InteractionEvent> {
        let entity = self.spawner.spawn_at(category.into(), size, position)?;
        let placement = Placement {
            position,
            fallback: false,
        };
        let event = self.admit(entity, placement);
        self.stats.record(&event, self.config.grab.delivery_score);
        Ok(event)
    }

    fn admit(&mut self, entity: GrabbableEntity, placement: Placement) -> InteractionEvent {
        let event = InteractionEvent::Spawned {
            entity_id: entity.id,
            category: entity.category.clone(),
            size: entity.size,
            position: entity.position,
            fallback: placement.fallback,
        };
        tracing::debug!(entity = entity.id, category = %entity.category, "spawned");
        self.entities.push(entity);
        event
    }

    /// Pause or resume gesture evaluation, e.g. while a fact panel is shown.
    ///
    /// Held entities are released on the next tick. Pinch state keeps
    /// tracking while paused, so a pinch held through the pause needs to
    /// open and close again before it can grab.
    pub fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        self.paused = paused;
        if paused {
            for hand in &mut self.hands {
                hand.hold.reset();
            }
        }
        tracing::debug!(paused, "input pause changed");
    }

    /// Process one frame `dt` after the previous one
    pub fn update(&mut self, dt: Duration, frame: &LandmarkFrame) -> TickOutput {
        if self.last_sequence == Some(frame.sequence) {
            tracing::warn!(sequence = frame.sequence, "duplicate frame ignored");
            self.stats.skipped_frames += 1;
            return TickOutput::skipped(frame.sequence);
        }
        self.last_sequence = Some(frame.sequence);
        self.clock += dt;
        self.stats.ticks += 1;

        let now = self.clock;
        let mut events = Vec::new();

        for hand in frame.hands.iter().filter(|h| !h.is_well_formed()) {
            tracing::warn!(
                hand = hand.hand_id,
                points = hand.landmarks.len(),
                "skipping malformed hand"
            );
        }

        for slot in 0..MAX_HANDS {
            let hand = frame.hand(slot);
            if self.paused {
                self.track_paused(slot, hand, now, &mut events);
            } else {
                self.track_hand(slot, hand, now, dt, &mut events);
            }
        }
        if !self.paused {
            self.detect_two_hand(now, &mut events);
        }
        self.grab.relax(&mut self.entities, now);

        let dt_secs = dt.as_secs_f32();
        let (dwell_point, dwell_cursor) = self.dwell_cursor(frame);
        if self.paused {
            if let Some(target_id) = self.dwell.tick_lock(dt_secs) {
                events.push(InteractionEvent::DwellDismissed { target_id });
            }
        } else {
            let update = self.dwell.update(dwell_point, dt_secs);
            if let Some(target_id) = update.auto_dismissed {
                events.push(InteractionEvent::DwellDismissed { target_id });
            }
            events.extend(
                update
                    .completed
                    .into_iter()
                    .map(|target_id| InteractionEvent::DwellComplete { target_id }),
            );
        }

        let score = self.config.grab.delivery_score;
        for event in &events {
            self.stats.record(event, score);
        }

        TickOutput {
            sequence: frame.sequence,
            skipped: false,
            events,
            cursors: std::array::from_fn(|slot| self.hands[slot].cursor),
            dwell_cursor,
        }
    }

    fn track_hand(
        &mut self,
        slot: usize,
        hand: Option<&HandFrame>,
        now: Duration,
        dt: Duration,
        events: &mut Vec<InteractionEvent>,
    ) {
        let hand_id = slot as HandId;
        let tracker = &mut self.hands[slot];

        let Some(frame) = hand else {
            tracker.clear_transient();
            let Some(seen) = tracker.last_seen else {
                return;
            };
            if now.saturating_sub(seen) > self.config.grab.hand_loss_grace() {
                if let Some(id) = tracker.grab.phase.held() {
                    tracing::debug!(hand = hand_id, entity = id, "hand lost, releasing");
                }
                self.grab.release(
                    hand_id,
                    &mut tracker.grab,
                    &mut self.entities,
                    ReleaseReason::HandLost,
                    events,
                );
                tracker.reset();
            }
            return;
        };

        tracker.last_seen = Some(now);
        let edge = self
            .pinch
            .update(&mut tracker.pinch, frame.thumb_tip(), frame.index_tip(), now);
        let pinch_point = self.mapper.map(frame.pinch_point());
        tracker.point = Some(pinch_point);
        tracker.cursor = Some(tracker.smoother.update(pinch_point));

        let sample = HandSample {
            hand: hand_id,
            pinch_point,
            is_pinching: tracker.pinch.is_pinching,
            edge,
        };
        let step = self.grab.step_hand(
            &sample,
            &mut tracker.grab,
            &mut self.entities,
            &self.zones,
            now,
            dt.as_secs_f32(),
            events,
        );
        if edge.is_rising() || edge.is_falling() {
            tracing::debug!(hand = hand_id, ?edge, phase = ?tracker.grab.phase, "pinch edge");
        }

        let pose = classify(frame, tracker.pinch.is_pinching);
        tracker.pose = Some(pose);
        if self.config.pose_hold.enabled && tracker.hold.update(pose, dt) {
            tracing::debug!(hand = hand_id, pose = pose.as_str(), "pose held");
            events.push(InteractionEvent::PoseHeld {
                hand: hand_id,
                pose,
            });
        }

        if step.consumed.is_some() {
            let (entity, placement) = self.spawner.spawn(&self.entities, &self.zones);
            events.push(self.admit(entity, placement));
        }
    }

    fn track_paused(
        &mut self,
        slot: usize,
        hand: Option<&HandFrame>,
        now: Duration,
        events: &mut Vec<InteractionEvent>,
    ) {
        let hand_id = slot as HandId;
        let tracker = &mut self.hands[slot];
        self.grab.release(
            hand_id,
            &mut tracker.grab,
            &mut self.entities,
            ReleaseReason::Paused,
            events,
        );

        match hand {
            Some(frame) => {
                tracker.last_seen = Some(now);
                self.pinch
                    .update(&mut tracker.pinch, frame.thumb_tip(), frame.index_tip(), now);
                let point = self.mapper.map(frame.pinch_point());
                tracker.point = Some(point);
                tracker.cursor = Some(tracker.smoother.update(point));
            }
            None => tracker.clear_transient(),
        }
    }

    fn detect_two_hand(&mut self, now: Duration, events: &mut Vec<InteractionEvent>) {
        let [a, b] = &self.hands;
        let both = match (a.cursor, b.cursor) {
            (Some(pa), Some(pb)) if a.is_pinching() && b.is_pinching() => Some(pa.midpoint(&pb)),
            _ => None,
        };
        if self.two_hand.update(both.is_some(), now) {
            if let Some(center) = both {
                tracing::debug!("two-hand pinch");
                events.push(InteractionEvent::TwoHandPinch { center });
            }
        }
    }

    /// Raw dwell cursor for target tests, and its smoothed display position
    fn dwell_cursor(&mut self, frame: &LandmarkFrame) -> (Option<Point2>, Option<Point2>) {
        match self.config.dwell.cursor_source {
            CursorSource::Hand => {
                let Some(hand) = self.hands.iter().find(|h| h.point.is_some()) else {
                    return (None, None);
                };
                (hand.point.map(|p| p.planar()), hand.cursor.map(|c| c.planar()))
            }
            CursorSource::Pose => match frame.pose.as_deref().and_then(pose_index_tip) {
                Some(tip) => {
                    let raw = self.mapper.map(tip);
                    let shown = self.pose_smoother.update(raw);
                    (Some(raw.planar()), Some(shown.planar()))
                }
                None => {
                    self.pose_smoother.reset();
                    (None, None)
                }
            },
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn entities(&self) -> &[GrabbableEntity] {
        &self.entities
    }

    pub fn zones(&self) -> &[DeliveryZone] {
        &self.zones
    }

    pub fn dwell(&self) -> &DwellSelector {
        &self.dwell
    }

    /// Mutable access, e.g. to dismiss a fired target when its panel closes
    pub fn dwell_mut(&mut self) -> &mut DwellSelector {
        &mut self.dwell
    }

    pub fn hand(&self, slot: usize) -> Option<&HandTrackerState> {
        self.hands.get(slot)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Engine time accumulated from `dt`
    pub fn now(&self) -> Duration {
        self.clock
    }

    pub fn score(&self) -> u64 {
        self.stats.score
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

fn validate_zones(zones: &[DeliveryZone]) -> Result<()> {
    for (i, zone) in zones.iter().enumerate() {
        if zones[..i].iter().any(|z| z.id == zone.id) {
            return Err(EngineError::DuplicateZone(zone.id.clone()));
        }
        if !zone.position.is_finite() || !(zone.snap_radius.is_finite() && zone.snap_radius > 0.0) {
            return Err(EngineError::invalid(
                "zones",
                format!(
                    "zone `{}` needs a finite position and a positive snap radius",
                    zone.id
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::synthetic::SyntheticHand;

    const TICK: Duration = Duration::from_millis(16);

    fn engine() -> InteractionEngine {
        let mut config = EngineConfig::default();
        config.placement.seed = Some(5);
        let zones = vec![
            DeliveryZone::new("mars", Point2::new(-3.0, 1.5), 1.0, "mars"),
            DeliveryZone::new("venus", Point2::new(3.0, 1.5), 1.0, "venus"),
        ];
        InteractionEngine::new(config, zones, Vec::new()).unwrap()
    }

    #[test]
    fn test_duplicate_zone_rejected() {
        let zones = vec![
            DeliveryZone::new("a", Point2::ORIGIN, 1.0, "x"),
            DeliveryZone::new("a", Point2::new(2.0, 0.0), 1.0, "y"),
        ];
        let err = InteractionEngine::new(EngineConfig::default(), zones, Vec::new());
        assert!(matches!(err, Err(EngineError::DuplicateZone(id)) if id == "a"));
    }

    #[test]
    fn test_degenerate_zone_rejected() {
        let zones = vec![DeliveryZone::new("a", Point2::ORIGIN, 0.0, "x")];
        let err = InteractionEngine::new(EngineConfig::default(), zones, Vec::new());
        assert!(matches!(err, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_instant_dwell_target_rejected() {
        let zones = vec![DeliveryZone::new("a", Point2::ORIGIN, 1.0, "x")];
        let targets = vec![DwellTarget::new("panel", Point2::new(2.0, 0.0), 0.5, 0.0)];
        let err = InteractionEngine::new(EngineConfig::default(), zones, targets);
        assert!(matches!(err, Err(EngineError::InvalidConfig { field: "targets", .. })));
    }

    #[test]
    fn test_populate_balances_categories() {
        let mut engine = engine();
        let events = engine.populate(4);
        assert_eq!(events.len(), 4);
        assert_eq!(engine.entities().len(), 4);
        let mars = engine
            .entities()
            .iter()
            .filter(|e| e.category.as_str() == "mars")
            .count();
        assert_eq!(mars, 2);
        assert_eq!(engine.stats().spawned, 4);
    }

    #[test]
    fn test_duplicate_sequence_is_ignored() {
        let mut engine = engine();
        let frame = LandmarkFrame::empty(1).with_hand(SyntheticHand::new(0).build());
        assert!(!engine.update(TICK, &frame).skipped);
        let out = engine.update(TICK, &frame);
        assert!(out.skipped);
        assert_eq!(engine.now(), TICK);
        assert_eq!(engine.stats().skipped_frames, 1);
    }

    #[test]
    fn test_cursor_reported_per_slot() {
        let mut engine = engine();
        let frame = LandmarkFrame::empty(1).with_hand(SyntheticHand::new(1).at(0.5, 0.5).build());
        let out = engine.update(TICK, &frame);
        assert!(out.cursors[0].is_none());
        let cursor = out.cursors[1].unwrap();
        assert!(cursor.planar().distance(&Point2::ORIGIN) < 1e-5);
        assert_eq!(out.dwell_cursor, Some(cursor.planar()));
    }

    #[test]
    fn test_fist_hold_emits_pose_held_once() {
        let mut engine = engine();
        let mut held = 0;
        for seq in 0..120 {
            let frame = LandmarkFrame::empty(seq).with_hand(SyntheticHand::new(0).fist().build());
            let out = engine.update(TICK, &frame);
            held += out.events.iter().filter(|e| e.kind() == "pose_held").count();
        }
        assert_eq!(held, 1);
        assert_eq!(engine.hand(0).unwrap().pose, Some(HandPose::Fist));
    }

    #[test]
    fn test_two_hand_pinch() {
        let mut engine = engine();
        let frame = |seq| {
            LandmarkFrame::empty(seq)
                .with_hand(SyntheticHand::new(0).at(0.2, 0.5).pinched().build())
                .with_hand(SyntheticHand::new(1).at(0.8, 0.5).pinched().build())
        };
        let first = engine.update(TICK, &frame(1));
        assert!(first.has("two_hand_pinch"));
        let second = engine.update(TICK, &frame(2));
        assert!(!second.has("two_hand_pinch"));
    }

    #[test]
    fn test_spawn_unknown_category() {
        let mut engine = engine();
        assert!(engine.spawn_category("mars").is_ok());
        assert!(matches!(
            engine.spawn_category("pluto"),
            Err(EngineError::UnknownCategory(_))
        ));
    }
}
