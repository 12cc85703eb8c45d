//! Landmark data contract of the external hand/pose detector
//!
//! The detector reports, once per render tick, zero or more hands of 21
//! normalized points each and optionally one body pose of 33 points. The
//! engine only reads these frames.

use serde::{Deserialize, Serialize};

use crate::spatial::Point3;

/// Hand landmark indices (21-point hand model)
pub mod hand {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    pub const COUNT: usize = 21;
}

/// Body pose landmark indices (33-point pose model), only those we read
pub mod pose {
    pub const LEFT_INDEX: usize = 19;
    pub const RIGHT_INDEX: usize = 20;

    pub const COUNT: usize = 33;
}

/// Number of hand slots the engine tracks
pub const MAX_HANDS: usize = 2;

/// Physical hand slot reported by the detector
pub type HandId = u8;

/// One tracked hand for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Slot index, 0 or 1
    pub hand_id: HandId,
    /// 21 normalized points
    pub landmarks: Vec<Point3>,
}

impl HandFrame {
    pub fn new(hand_id: HandId, landmarks: Vec<Point3>) -> Self {
        Self { hand_id, landmarks }
    }

    pub fn thumb_tip(&self) -> Point3 {
        self.landmarks[hand::THUMB_TIP]
    }

    pub fn index_tip(&self) -> Point3 {
        self.landmarks[hand::INDEX_TIP]
    }

    /// Midpoint of thumb and index tips, the point that "holds" things
    pub fn pinch_point(&self) -> Point3 {
        self.thumb_tip().midpoint(&self.index_tip())
    }

    /// A complete, finite skeleton in a known slot.
    ///
    /// Hands failing this are skipped for the tick so that NaN never reaches
    /// a distance computation or an entity position.
    pub fn is_well_formed(&self) -> bool {
        (self.hand_id as usize) < MAX_HANDS
            && self.landmarks.len() >= hand::COUNT
            && self.landmarks.iter().all(Point3::is_finite)
    }
}

/// Everything the detector reported for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Monotonic tick token; a repeated value is ignored by the engine
    pub sequence: u64,
    #[serde(default)]
    pub hands: Vec<HandFrame>,
    /// Optional 33-point body pose
    #[serde(default)]
    pub pose: Option<Vec<Point3>>,
}

impl LandmarkFrame {
    /// A frame with no hands and no pose
    pub fn empty(sequence: u64) -> Self {
        Self {
            sequence,
            ..Default::default()
        }
    }

    pub fn with_hand(mut self, hand: HandFrame) -> Self {
        self.hands.push(hand);
        self
    }

    pub fn with_pose(mut self, pose: Vec<Point3>) -> Self {
        self.pose = Some(pose);
        self
    }

    /// The hand reported for `slot`, if present and well formed
    pub fn hand(&self, slot: usize) -> Option<&HandFrame> {
        self.hands
            .iter()
            .find(|h| h.hand_id as usize == slot && h.is_well_formed())
    }
}
