//! Replay recorded landmark streams
//!
//! Input is JSON lines, one frame per line:
//!
//! ```json
//! {"dt_ms": 16, "sequence": 1,
//!  "hands": [{"hand_id": 0, "landmarks": [{"x": 0.4, "y": 0.5, "z": 0.0}, ...]}]}
//! ```
//!
//! `dt_ms` defaults to 16 and `sequence` to the line number. A line may
//! carry `"paused": true|false` to toggle input pause from that frame on.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use handplay_core::{
    EngineConfig, ExhibitLayout, HandFrame, InteractionEngine, LandmarkFrame, Point3,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::output::EventWriter;

#[derive(Debug, Deserialize)]
struct ReplayFrame {
    #[serde(default = "default_dt_ms")]
    dt_ms: u64,
    #[serde(default)]
    sequence: Option<u64>,
    #[serde(default)]
    hands: Vec<HandFrame>,
    #[serde(default)]
    pose: Option<Vec<Point3>>,
    #[serde(default)]
    paused: Option<bool>,
}

fn default_dt_ms() -> u64 {
    16
}

pub fn run(config: EngineConfig, layout: ExhibitLayout, input: &Path) -> Result<()> {
    let reader: Box<dyn BufRead> = if input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(input)
            .with_context(|| format!("failed to open {}", input.display()))?;
        Box::new(BufReader::new(file))
    };

    let stdout = io::stdout();
    let mut writer = EventWriter::new(stdout.lock());
    let (mut engine, spawned) = InteractionEngine::from_layout(config, layout)?;
    writer.events(0, engine.now(), &spawned)?;

    let frames = replay(&mut engine, reader, &mut writer)?;
    info!(frames, score = engine.score(), "replay finished");
    writer.summary(engine.now(), engine.stats())?;
    Ok(())
}

/// Feed every line of `reader` through `engine`; returns the frame count
fn replay<W: Write>(
    engine: &mut InteractionEngine,
    reader: impl BufRead,
    writer: &mut EventWriter<W>,
) -> Result<u64> {
    let mut frames = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record: ReplayFrame = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping unparseable frame");
                continue;
            }
        };

        if let Some(paused) = record.paused {
            engine.set_paused(paused);
        }
        let frame = LandmarkFrame {
            sequence: record.sequence.unwrap_or(index as u64 + 1),
            hands: record.hands,
            pose: record.pose,
        };
        let out = engine.update(Duration::from_millis(record.dt_ms), &frame);
        writer.events(out.sequence, engine.now(), &out.events)?;
        frames += 1;
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use handplay_core::input::synthetic::SyntheticHand;
    use handplay_core::input::CoordinateMapper;
    use handplay_core::{DeliveryZone, Point2, SizeClass};
    use std::io::Cursor;

    fn line(hand: Option<HandFrame>, dt_ms: u64) -> String {
        let hands: Vec<_> = hand.into_iter().collect();
        serde_json::json!({ "dt_ms": dt_ms, "hands": hands }).to_string()
    }

    #[test]
    fn test_replay_grab_and_deliver() {
        let mut config = EngineConfig::default();
        config.placement.seed = Some(8);
        let zones = vec![DeliveryZone::new("mars", Point2::ORIGIN, 1.0, "mars")];
        let mut engine = InteractionEngine::new(config.clone(), zones, Vec::new()).unwrap();
        engine.place_entity("mars", SizeClass::Normal, Point2::ORIGIN).unwrap();

        let at = CoordinateMapper::new(config.mapper).unmap(Point2::ORIGIN);
        let pinched = SyntheticHand::new(0).at_point(at).pinched().build();
        let input = [
            line(Some(pinched.clone()), 16),
            "# comment".to_string(),
            "not json".to_string(),
            line(Some(pinched), 16),
            line(None, 16),
        ]
        .join("\n");

        let mut writer = EventWriter::new(Vec::new());
        let frames = replay(&mut engine, Cursor::new(input), &mut writer).unwrap();
        assert_eq!(frames, 3);
        assert_eq!(engine.now(), Duration::from_millis(48));
        assert_eq!(engine.stats().deliveries, 1);

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let kinds: Vec<String> = text
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["type"].to_string())
            .collect();
        assert_eq!(kinds, vec!["\"grab_start\"", "\"deliver\"", "\"spawned\""]);
    }

    #[test]
    fn test_pause_flag_is_applied() {
        let zones = vec![DeliveryZone::new("mars", Point2::ORIGIN, 1.0, "mars")];
        let mut engine =
            InteractionEngine::new(EngineConfig::default(), zones, Vec::new()).unwrap();
        let input = r#"{"paused": true}"#;
        let mut writer = EventWriter::new(Vec::new());
        replay(&mut engine, Cursor::new(input), &mut writer).unwrap();
        assert!(engine.is_paused());
    }
}
