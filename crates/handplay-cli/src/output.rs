//! JSON-lines event output

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use handplay_core::{InteractionEvent, SessionStats};
use serde::Serialize;

#[derive(Serialize)]
struct EventLine<'a> {
    sequence: u64,
    t_ms: u64,
    #[serde(flatten)]
    event: &'a InteractionEvent,
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    t_ms: u64,
    #[serde(flatten)]
    stats: &'a SessionStats,
}

/// Writes one JSON object per line
pub struct EventWriter<W: Write> {
    out: W,
}

impl<W: Write> EventWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn events(
        &mut self,
        sequence: u64,
        now: Duration,
        events: &[InteractionEvent],
    ) -> Result<()> {
        for event in events {
            let line = EventLine {
                sequence,
                t_ms: now.as_millis() as u64,
                event,
            };
            serde_json::to_writer(&mut self.out, &line)?;
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub fn summary(&mut self, now: Duration, stats: &SessionStats) -> Result<()> {
        let line = SummaryLine {
            kind: "summary",
            t_ms: now.as_millis() as u64,
            stats,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
