//! Scripted claw-game session with a synthetic hand
//!
//! The hand glides to an entity, pinches it, carries it to its zone and lets
//! go. Every third round it aims for the wrong zone first to show the
//! rejection bounce. The session ends by dwelling on the first dwell target.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{bail, Result};
use handplay_core::input::synthetic::SyntheticHand;
use handplay_core::input::CoordinateMapper;
use handplay_core::{
    EngineConfig, ExhibitLayout, InteractionEngine, LandmarkFrame, Point2, SessionStats,
};
use tracing::info;

use crate::output::EventWriter;

/// Ticks spent on each glide segment
const GLIDE_TICKS: usize = 30;

struct Driver<W: Write> {
    engine: InteractionEngine,
    mapper: CoordinateMapper,
    writer: EventWriter<W>,
    tick: Duration,
    seq: u64,
    cursor: Point2,
}

impl<W: Write> Driver<W> {
    fn step(&mut self, hand: Option<SyntheticHand>) -> Result<bool> {
        self.seq += 1;
        let mut frame = LandmarkFrame::empty(self.seq);
        if let Some(hand) = hand {
            frame = frame.with_hand(hand.build());
        }
        let out = self.engine.update(self.tick, &frame);
        self.writer.events(out.sequence, self.engine.now(), &out.events)?;
        Ok(out.has("deliver"))
    }

    fn hand_at(&self, p: Point2) -> SyntheticHand {
        SyntheticHand::new(0).at_point(self.mapper.unmap(p))
    }

    /// Move from the current cursor to `to`, pinched or open
    fn glide(&mut self, to: Point2, pinched: bool) -> Result<bool> {
        let from = self.cursor;
        let mut delivered = false;
        for i in 1..=GLIDE_TICKS {
            let t = i as f32 / GLIDE_TICKS as f32;
            let p = Point2::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
            self.cursor = p;
            let hand = self.hand_at(p);
            let hand = if pinched { hand.pinched() } else { hand.open() };
            delivered |= self.step(Some(hand))?;
            if delivered {
                break;
            }
        }
        Ok(delivered)
    }

    /// Hold a shape in place for `ticks` frames
    fn hold(&mut self, pinched: bool, ticks: usize) -> Result<()> {
        for _ in 0..ticks {
            let hand = self.hand_at(self.cursor);
            let hand = if pinched { hand.pinched() } else { hand.open() };
            self.step(Some(hand))?;
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        let grace = self.engine.config().pinch.grace_period();
        let ticks = (grace.as_millis() / self.tick.as_millis().max(1)) as usize + 2;
        self.hold(false, ticks)
    }

    fn round(&mut self, round: usize) -> Result<()> {
        let Some(target) = self
            .engine
            .entities()
            .iter()
            .find(|e| !e.is_grabbed())
            .cloned()
        else {
            bail!("no entity left to pick up");
        };
        let zones = self.engine.zones().to_vec();
        let Some(home_zone) = zones.iter().find(|z| z.accepts(&target.category)) else {
            bail!("no zone accepts {}", target.category);
        };
        info!(round, entity = target.id, category = %target.category, "round start");

        self.glide(target.position.planar(), false)?;
        self.hold(true, 3)?;

        if round % 3 == 2 {
            if let Some(wrong) = zones.iter().find(|z| !z.accepts(&target.category)) {
                self.glide(wrong.position, true)?;
                self.release()?;
                // The rejected entity eases back home; pick it up again there.
                self.hold(false, 30)?;
                let again = self
                    .engine
                    .entities()
                    .iter()
                    .find(|e| e.id == target.id)
                    .map(|e| e.position.planar());
                if let Some(p) = again {
                    self.glide(p, false)?;
                    self.hold(true, 3)?;
                }
            }
        }

        if !self.glide(home_zone.position, true)? {
            self.hold(true, 5)?;
        }
        self.release()
    }
}

pub fn run(config: EngineConfig, layout: ExhibitLayout, rounds: usize, tick_ms: u64) -> Result<()> {
    let stdout = io::stdout();
    let stats = play(config, layout, rounds, tick_ms, stdout.lock())?;
    info!(score = stats.score, deliveries = stats.deliveries, "demo finished");
    Ok(())
}

/// Run the scripted session, writing event lines to `out`
fn play<W: Write>(
    config: EngineConfig,
    layout: ExhibitLayout,
    rounds: usize,
    tick_ms: u64,
    out: W,
) -> Result<SessionStats> {
    let mapper = CoordinateMapper::new(config.mapper.clone());
    let dwell_spot = layout.targets.first().map(|t| t.position);
    let (engine, spawned) = InteractionEngine::from_layout(config, layout)?;

    let mut writer = EventWriter::new(out);
    writer.events(0, engine.now(), &spawned)?;

    let mut driver = Driver {
        engine,
        mapper,
        writer,
        tick: Duration::from_millis(tick_ms.max(1)),
        seq: 0,
        cursor: Point2::ORIGIN,
    };

    for round in 0..rounds {
        driver.round(round)?;
    }

    if let Some(spot) = dwell_spot {
        driver.glide(spot, false)?;
        driver.hold(false, 120)?;
    }

    // Hand leaves the camera.
    for _ in 0..30 {
        driver.step(None)?;
    }

    let now = driver.engine.now();
    driver.writer.summary(now, driver.engine.stats())?;
    Ok(driver.engine.stats().clone())
}
