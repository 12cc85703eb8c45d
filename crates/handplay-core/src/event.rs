//! Events emitted by the engine
//!
//! Every observable state change leaves the engine as an [`InteractionEvent`];
//! rendering, audio and scoring layers subscribe to these instead of polling.

use serde::Serialize;

use crate::input::{HandId, HandPose, MAX_HANDS};
use crate::interaction::{Category, EntityId, SizeClass, TargetId, ZoneId};
use crate::spatial::{Point2, Point3};

/// Why a held entity was let go without a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    /// The visitor opened their fingers
    Manual,
    /// The hand stayed out of view past the grace period
    HandLost,
    /// Input was paused while holding
    Paused,
}

/// Engine output event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionEvent {
    /// A hand picked up an entity
    GrabStart { entity_id: EntityId, hand: HandId },

    /// A held entity was let go outside any zone
    GrabRelease {
        entity_id: EntityId,
        hand: HandId,
        reason: ReleaseReason,
    },

    /// A held entity reached a zone; `success` when the categories match
    Deliver {
        entity_id: EntityId,
        zone_id: ZoneId,
        hand: HandId,
        success: bool,
    },

    /// A new entity entered play
    Spawned {
        entity_id: EntityId,
        category: Category,
        size: SizeClass,
        position: Point3,
        /// Placed on the fallback ring after random sampling gave up
        fallback: bool,
    },

    /// A dwell target filled up
    DwellComplete { target_id: TargetId },

    /// A modal closed on its own timer
    DwellDismissed { target_id: TargetId },

    /// A hand held a watched pose long enough
    PoseHeld { hand: HandId, pose: HandPose },

    /// Both hands started pinching together
    TwoHandPinch { center: Point3 },
}

impl InteractionEvent {
    /// Short name, matching the serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            InteractionEvent::GrabStart { .. } => "grab_start",
            InteractionEvent::GrabRelease { .. } => "grab_release",
            InteractionEvent::Deliver { .. } => "deliver",
            InteractionEvent::Spawned { .. } => "spawned",
            InteractionEvent::DwellComplete { .. } => "dwell_complete",
            InteractionEvent::DwellDismissed { .. } => "dwell_dismissed",
            InteractionEvent::PoseHeld { .. } => "pose_held",
            InteractionEvent::TwoHandPinch { .. } => "two_hand_pinch",
        }
    }

    /// Check if this is a successful delivery
    pub fn is_success(&self) -> bool {
        matches!(self, InteractionEvent::Deliver { success: true, .. })
    }

    /// Check if this is a rejected delivery
    pub fn is_rejection(&self) -> bool {
        matches!(self, InteractionEvent::Deliver { success: false, .. })
    }
}

/// Everything one engine tick produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickOutput {
    /// Sequence number of the processed frame
    pub sequence: u64,
    /// True when the frame was a duplicate and nothing was evaluated
    pub skipped: bool,
    pub events: Vec<InteractionEvent>,
    /// Smoothed per-hand cursors in play space, indexed by hand slot
    pub cursors: [Option<Point3>; MAX_HANDS],
    /// Smoothed dwell cursor for drawing; dwell tests use the raw position
    pub dwell_cursor: Option<Point2>,
}

impl TickOutput {
    pub(crate) fn skipped(sequence: u64) -> Self {
        Self {
            sequence,
            skipped: true,
            ..Default::default()
        }
    }

    /// Whether any event of `kind` was emitted
    pub fn has(&self, kind: &str) -> bool {
        self.events.iter().any(|e| e.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = InteractionEvent::Deliver {
            entity_id: 4,
            zone_id: "mars-zone".into(),
            hand: 1,
            success: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "deliver");
        assert_eq!(json["zone_id"], "mars-zone");
        assert_eq!(json["success"], false);
        assert_eq!(event.kind(), "deliver");
        assert!(event.is_rejection());
    }

    #[test]
    fn test_release_reason_names() {
        let event = InteractionEvent::GrabRelease {
            entity_id: 1,
            hand: 0,
            reason: ReleaseReason::HandLost,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["reason"], "hand_lost");
    }

    #[test]
    fn test_skipped_tick_is_empty() {
        let out = TickOutput::skipped(9);
        assert!(out.skipped);
        assert!(out.events.is_empty());
        assert!(!out.has("deliver"));
    }
}
