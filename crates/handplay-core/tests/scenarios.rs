//! End-to-end sessions driven through the public engine API

use std::time::Duration;

use handplay_core::config::CursorSource;
use handplay_core::input::synthetic::{pose_with_index_tips, SyntheticHand};
use handplay_core::input::CoordinateMapper;
use handplay_core::{
    DeliveryZone, DwellTarget, EngineConfig, GrabPhase, InteractionEngine, InteractionEvent,
    LandmarkFrame, Point2, ReleaseReason, SizeClass, TickOutput,
};

const TICK: Duration = Duration::from_millis(16);

/// Drives an engine with an auto-incrementing sequence number
struct Session {
    engine: InteractionEngine,
    mapper: CoordinateMapper,
    seq: u64,
}

impl Session {
    fn new(config: EngineConfig, zones: Vec<DeliveryZone>, targets: Vec<DwellTarget>) -> Self {
        let mapper = CoordinateMapper::new(config.mapper.clone());
        Self {
            engine: InteractionEngine::new(config, zones, targets).unwrap(),
            mapper,
            seq: 0,
        }
    }

    fn with_zone(category: &str) -> Self {
        let mut config = EngineConfig::default();
        config.placement.seed = Some(99);
        let other = if category == "mars" { "venus" } else { "mars" };
        let zones = vec![
            DeliveryZone::new("zone", Point2::ORIGIN, 1.0, category),
            DeliveryZone::new("elsewhere", Point2::new(-3.5, 2.0), 0.4, other),
        ];
        Self::new(config, zones, Vec::new())
    }

    /// Synthetic hand whose pinch-point lands on play-space `p`
    fn hand(&self, id: u8, p: Point2) -> SyntheticHand {
        SyntheticHand::new(id).at_point(self.mapper.unmap(p))
    }

    fn tick(&mut self, hands: Vec<SyntheticHand>) -> TickOutput {
        self.seq += 1;
        let frame = hands
            .iter()
            .fold(LandmarkFrame::empty(self.seq), |f, h| f.with_hand(h.build()));
        self.engine.update(TICK, &frame)
    }

    fn tick_frame(&mut self, frame: LandmarkFrame) -> TickOutput {
        self.engine.update(TICK, &frame)
    }

    fn assert_one_grab_per_hand(&self) {
        for hand in 0..2u8 {
            let held = self
                .engine
                .entities()
                .iter()
                .filter(|e| e.grabbed_by == Some(hand))
                .count();
            assert!(held <= 1, "hand {hand} holds {held} entities");
        }
    }
}

fn delivers(out: &TickOutput) -> Vec<bool> {
    out.events
        .iter()
        .filter_map(|e| match e {
            InteractionEvent::Deliver { success, .. } => Some(*success),
            _ => None,
        })
        .collect()
}

#[test]
fn test_matching_zone_delivers_without_release() {
    let mut s = Session::with_zone("mars");
    s.engine.place_entity("mars", SizeClass::Normal, Point2::ORIGIN).unwrap();
    let id = s.engine.entities()[0].id;

    s.tick(vec![s.hand(0, Point2::ORIGIN).open()]);
    let grab = s.tick(vec![s.hand(0, Point2::ORIGIN).pinched()]);
    assert_eq!(grab.events, vec![InteractionEvent::GrabStart { entity_id: id, hand: 0 }]);

    let out = s.tick(vec![s.hand(0, Point2::ORIGIN).pinched()]);
    assert_eq!(delivers(&out), vec![true]);
    assert!(out.has("spawned"));

    // Destroyed and replaced; population stays constant.
    assert_eq!(s.engine.entities().len(), 1);
    assert!(s.engine.entities().iter().all(|e| e.id != id));
    assert_eq!(s.engine.score(), 100);
    assert_eq!(s.engine.stats().deliveries, 1);
}

#[test]
fn test_wrong_zone_rejects_and_keeps_entity() {
    let mut s = Session::with_zone("venus");
    s.engine.place_entity("venus", SizeClass::Normal, Point2::new(3.0, 0.0)).unwrap();
    s.engine.place_entity("mars", SizeClass::Normal, Point2::ORIGIN).unwrap();
    let mars = s.engine.entities()[1].id;

    s.tick(vec![s.hand(0, Point2::ORIGIN).open()]);
    s.tick(vec![s.hand(0, Point2::ORIGIN).pinched()]);
    let out = s.tick(vec![s.hand(0, Point2::ORIGIN).pinched()]);
    assert_eq!(delivers(&out), vec![false]);

    let entity = s.engine.entities().iter().find(|e| e.id == mars).unwrap();
    assert_eq!(entity.grabbed_by, None);
    assert!(entity.rejected_until.is_some());
    assert_eq!(s.engine.entities().len(), 2);
    assert_eq!(s.engine.score(), 0);
    assert_eq!(s.engine.stats().rejections, 1);
}

#[test]
fn test_one_deliver_per_grab_lifecycle() {
    let mut s = Session::with_zone("venus");
    s.engine.place_entity("mars", SizeClass::Normal, Point2::ORIGIN).unwrap();

    s.tick(vec![s.hand(0, Point2::ORIGIN).open()]);
    s.tick(vec![s.hand(0, Point2::ORIGIN).pinched()]);

    // Keep pinching inside the zone for a second.
    let mut total = 0;
    for _ in 0..60 {
        let out = s.tick(vec![s.hand(0, Point2::ORIGIN).pinched()]);
        total += delivers(&out).len();
        assert!(!out.has("grab_start"));
    }
    assert_eq!(total, 1);
}

#[test]
fn test_carry_into_zone_then_deliver() {
    let mut config = EngineConfig::default();
    config.placement.seed = Some(1);
    let zones = vec![DeliveryZone::new("mars-zone", Point2::new(3.0, 1.5), 1.0, "mars")];
    let mut s = Session::new(config, zones, Vec::new());
    s.engine.place_entity("mars", SizeClass::Normal, Point2::new(-2.0, -1.0)).unwrap();

    let start = Point2::new(-2.0, -1.0);
    let goal = Point2::new(3.0, 1.5);
    s.tick(vec![s.hand(0, start).pinched()]);
    assert!(matches!(s.engine.hand(0).unwrap().phase(), GrabPhase::Grabbed(_)));

    let mut delivered = false;
    for step in 1..=40 {
        let t = step as f32 / 40.0;
        let p = Point2::new(start.x + (goal.x - start.x) * t, start.y + (goal.y - start.y) * t);
        let out = s.tick(vec![s.hand(0, p).pinched()]);
        s.assert_one_grab_per_hand();
        if delivers(&out) == vec![true] {
            delivered = true;
            break;
        }
    }
    assert!(delivered);
}

#[test]
fn test_release_drops_in_place() {
    let mut s = Session::with_zone("mars");
    s.engine.place_entity("mars", SizeClass::Normal, Point2::new(-3.0, 0.0)).unwrap();
    let here = Point2::new(-3.0, 0.0);

    s.tick(vec![s.hand(0, here).pinched()]);
    for _ in 0..5 {
        s.tick(vec![s.hand(0, here).pinched()]);
    }

    // The pinch survives until the grace period has passed.
    let mut released = None;
    for i in 0..30 {
        let out = s.tick(vec![s.hand(0, here).open()]);
        if out.has("grab_release") {
            released = Some(i);
            assert!(out.events.contains(&InteractionEvent::GrabRelease {
                entity_id: 1,
                hand: 0,
                reason: ReleaseReason::Manual,
            }));
            break;
        }
    }
    let open_ticks = released.unwrap() as u64 + 1;
    assert!(open_ticks * 16 > 250);
    assert!(!s.engine.entities()[0].is_grabbed());
}

#[test]
fn test_brief_dropout_keeps_grab() {
    let mut s = Session::with_zone("venus");
    s.engine.place_entity("mars", SizeClass::Normal, Point2::new(-3.0, 0.0)).unwrap();
    let here = Point2::new(-3.0, 0.0);
    s.tick(vec![s.hand(0, here).pinched()]);

    // 18 ticks = 288 ms without the hand.
    for _ in 0..18 {
        let out = s.tick(Vec::new());
        assert!(out.events.is_empty());
        assert!(out.cursors[0].is_none());
    }
    assert_eq!(s.engine.entities()[0].grabbed_by, Some(0));

    let out = s.tick(vec![s.hand(0, here).pinched()]);
    assert!(!out.has("grab_release"));
    assert!(!out.has("grab_start"));
    assert_eq!(s.engine.entities()[0].grabbed_by, Some(0));
}

#[test]
fn test_long_dropout_releases() {
    let mut s = Session::with_zone("venus");
    s.engine.place_entity("mars", SizeClass::Normal, Point2::new(-3.0, 0.0)).unwrap();
    s.tick(vec![s.hand(0, Point2::new(-3.0, 0.0)).pinched()]);

    let mut lost_at = None;
    for i in 1..=30 {
        let out = s.tick(Vec::new());
        if out.events.contains(&InteractionEvent::GrabRelease {
            entity_id: 1,
            hand: 0,
            reason: ReleaseReason::HandLost,
        }) {
            lost_at = Some(i);
            break;
        }
    }
    // First tick strictly past 300 ms.
    assert_eq!(lost_at, Some(19));
    assert_eq!(s.engine.entities()[0].grabbed_by, None);
    assert_eq!(s.engine.hand(0).unwrap().phase(), GrabPhase::Idle);
}

#[test]
fn test_two_hands_cannot_share_an_entity() {
    let mut s = Session::with_zone("venus");
    s.engine.place_entity("mars", SizeClass::Normal, Point2::new(-3.0, 0.0)).unwrap();
    let here = Point2::new(-3.0, 0.0);

    let out = s.tick(vec![s.hand(0, here).pinched(), s.hand(1, here).pinched()]);
    let starts: Vec<_> = out.events.iter().filter(|e| e.kind() == "grab_start").collect();
    assert_eq!(starts.len(), 1);
    assert_eq!(s.engine.entities()[0].grabbed_by, Some(0));
    s.assert_one_grab_per_hand();
}

#[test]
fn test_pause_releases_and_skips_evaluation() {
    let mut s = Session::with_zone("venus");
    s.engine.place_entity("mars", SizeClass::Normal, Point2::new(-3.0, 0.0)).unwrap();
    let here = Point2::new(-3.0, 0.0);
    s.tick(vec![s.hand(0, here).pinched()]);

    s.engine.set_paused(true);
    let out = s.tick(vec![s.hand(0, here).pinched()]);
    assert_eq!(
        out.events,
        vec![InteractionEvent::GrabRelease {
            entity_id: 1,
            hand: 0,
            reason: ReleaseReason::Paused,
        }]
    );
    assert!(out.cursors[0].is_some());

    for _ in 0..20 {
        let out = s.tick(vec![s.hand(0, here).open()]);
        assert!(out.events.is_empty());
        let out = s.tick(vec![s.hand(0, here).pinched()]);
        assert!(out.events.is_empty());
    }

    // A pinch held through the pause must open and close before it grabs.
    s.engine.set_paused(false);
    for _ in 0..5 {
        let out = s.tick(vec![s.hand(0, here).pinched()]);
        assert!(!out.has("grab_start"));
    }
    for _ in 0..20 {
        let out = s.tick(vec![s.hand(0, here).open()]);
        assert!(!out.has("grab_start"));
    }
    let out = s.tick(vec![s.hand(0, here).pinched()]);
    assert!(out.has("grab_start"));
}

#[test]
fn test_dwell_resets_the_tick_the_hand_leaves() {
    let mut config = EngineConfig::default();
    config.placement.seed = Some(3);
    let zones = vec![DeliveryZone::new("zone", Point2::new(-3.0, 1.5), 1.0, "mars")];
    let targets = vec![DwellTarget::new("panel", Point2::new(2.0, -1.0), 0.6, 1.5)];
    let mut s = Session::new(config, zones, targets);

    for _ in 0..10 {
        s.tick(vec![s.hand(0, Point2::new(2.0, -1.0)).open()]);
    }
    assert!(s.engine.dwell().target("panel").unwrap().progress > 0.0);

    // Just outside the radius; the smoothed cursor still lags inside.
    let out = s.tick(vec![s.hand(0, Point2::new(2.9, -1.0)).open()]);
    assert_eq!(s.engine.dwell().target("panel").unwrap().progress, 0.0);
    let shown = out.dwell_cursor.unwrap();
    assert!(shown.distance(&Point2::new(2.0, -1.0)) < 0.6);
}

#[test]
fn test_repeated_frame_does_not_double_deliver() {
    let mut s = Session::with_zone("mars");
    s.engine.place_entity("mars", SizeClass::Normal, Point2::ORIGIN).unwrap();
    s.tick(vec![s.hand(0, Point2::ORIGIN).pinched()]);

    let frame = LandmarkFrame::empty(500).with_hand(s.hand(0, Point2::ORIGIN).pinched().build());
    let first = s.tick_frame(frame.clone());
    let again = s.tick_frame(frame);
    assert_eq!(delivers(&first), vec![true]);
    assert!(again.skipped);
    assert!(again.events.is_empty());
    assert_eq!(s.engine.stats().deliveries, 1);
}

#[test]
fn test_malformed_hand_is_skipped() {
    let mut s = Session::with_zone("mars");
    s.engine.place_entity("mars", SizeClass::Normal, Point2::ORIGIN).unwrap();

    let mut bad = s.hand(0, Point2::ORIGIN).pinched().build();
    bad.landmarks[4].x = f32::NAN;
    let out = s.tick_frame(LandmarkFrame::empty(1).with_hand(bad));
    assert!(out.events.is_empty());
    assert!(out.cursors[0].is_none());
    assert!(s.engine.entities()[0].position.is_finite());
}

#[test]
fn test_dwell_completes_once_and_locks() {
    let mut config = EngineConfig::default();
    config.placement.seed = Some(2);
    let zones = vec![DeliveryZone::new("zone", Point2::new(-3.0, 1.5), 1.0, "mars")];
    let targets = vec![
        DwellTarget::new("fact", Point2::new(2.0, -1.0), 0.6, 0.5).locking(),
        DwellTarget::new("menu", Point2::new(-2.0, -1.0), 0.6, 0.5),
    ];
    let mut s = Session::new(config, zones, targets);
    let fact = Point2::new(2.0, -1.0);

    let mut completions = 0;
    let mut last = 0.0;
    for _ in 0..60 {
        let out = s.tick(vec![s.hand(0, fact).open()]);
        completions += out.events.iter().filter(|e| e.kind() == "dwell_complete").count();
        let progress = s.engine.dwell().target("fact").unwrap().progress;
        assert!(progress >= last);
        last = progress;
    }
    assert_eq!(completions, 1);
    assert!(s.engine.dwell().is_locked());

    // Background target stays frozen while the modal is open.
    for _ in 0..60 {
        let out = s.tick(vec![s.hand(0, Point2::new(-2.0, -1.0)).open()]);
        assert!(!out.has("dwell_complete"));
        assert_eq!(s.engine.dwell().target("menu").unwrap().progress, 0.0);
    }

    s.engine.dwell_mut().dismiss("fact");
    let mut fired = false;
    for _ in 0..60 {
        fired |= s.tick(vec![s.hand(0, Point2::new(-2.0, -1.0)).open()]).has("dwell_complete");
    }
    assert!(fired);
}

#[test]
fn test_pose_cursor_drives_dwell() {
    let mut config = EngineConfig::default();
    config.placement.seed = Some(4);
    config.dwell.cursor_source = CursorSource::Pose;
    let zones = vec![DeliveryZone::new("zone", Point2::new(-3.0, 1.5), 1.0, "mars")];
    let targets = vec![DwellTarget::new("organ", Point2::ORIGIN, 0.6, 0.3)];
    let mut s = Session::new(config, zones, targets);

    // Left index raised at the center, right hand lower and off-target.
    let tip = s.mapper.unmap(Point2::ORIGIN);
    let mut fired = false;
    for seq in 1..=40 {
        let frame = LandmarkFrame::empty(seq)
            .with_pose(pose_with_index_tips(tip, Point2::new(0.9, 0.9)));
        let out = s.tick_frame(frame);
        assert!(out.dwell_cursor.is_some());
        fired |= out.has("dwell_complete");
    }
    assert!(fired);
}

#[test]
fn test_populated_session_keeps_invariants() {
    let mut config = EngineConfig::default();
    config.placement.seed = Some(21);
    let layout = handplay_core::ExhibitLayout::default();
    let (engine, spawned) = InteractionEngine::from_layout(config.clone(), layout).unwrap();
    assert_eq!(spawned.len(), 6);

    let mapper = CoordinateMapper::new(config.mapper.clone());
    let mut s = Session {
        engine,
        mapper,
        seq: 0,
    };

    // Sweep both hands across the field, pinching on and off.
    for i in 0..300 {
        let t = i as f32 / 300.0;
        let a = Point2::new(-3.5 + 7.0 * t, -2.0 + 4.0 * t);
        let b = Point2::new(3.5 - 7.0 * t, 2.0 - 4.0 * t);
        let pinch = (i / 20) % 2 == 0;
        let hands = vec![
            if pinch { s.hand(0, a).pinched() } else { s.hand(0, a).open() },
            if !pinch { s.hand(1, b).pinched() } else { s.hand(1, b).open() },
        ];
        s.tick(hands);
        s.assert_one_grab_per_hand();
        assert!(s.engine.entities().iter().all(|e| e.position.is_finite()));
        assert_eq!(s.engine.entities().len(), 6);
    }
}
