//! Coarse hand-shape classification: open palm, fist, pinch

use serde::{Deserialize, Serialize};

use super::landmarks::hand;
use super::HandFrame;

/// Tip/base joint pairs used to decide whether a finger is extended
const EXTENSION_PAIRS: [(usize, usize); 5] = [
    (hand::THUMB_TIP, hand::THUMB_MCP),
    (hand::INDEX_TIP, hand::INDEX_PIP),
    (hand::MIDDLE_TIP, hand::MIDDLE_PIP),
    (hand::RING_TIP, hand::RING_PIP),
    (hand::PINKY_TIP, hand::PINKY_PIP),
];

/// Tip/knuckle pairs used to decide whether a finger is curled (thumb excluded)
const CURL_PAIRS: [(usize, usize); 4] = [
    (hand::INDEX_TIP, hand::INDEX_MCP),
    (hand::MIDDLE_TIP, hand::MIDDLE_MCP),
    (hand::RING_TIP, hand::RING_MCP),
    (hand::PINKY_TIP, hand::PINKY_MCP),
];

const EXTENDED_RATIO: f32 = 1.1;
const CURLED_RATIO: f32 = 1.2;
const MIN_EXTENDED: usize = 4;
const MIN_CURLED: usize = 3;

/// Recognized static hand shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPose {
    /// Thumb and index together
    Pinch,
    /// At least four fingers extended
    OpenPalm,
    /// At least three fingers curled toward the palm
    Fist,
    /// Anything else
    Neutral,
}

impl HandPose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pinch => "pinch",
            Self::OpenPalm => "open_palm",
            Self::Fist => "fist",
            Self::Neutral => "neutral",
        }
    }
}

/// Classify a well-formed hand.
///
/// `is_pinching` comes from the debounced pinch detector and wins over the
/// other shapes, since an open hand with touching thumb and index is still
/// read as a pinch.
pub fn classify(frame: &HandFrame, is_pinching: bool) -> HandPose {
    if is_pinching {
        return HandPose::Pinch;
    }
    if extended_count(frame) >= MIN_EXTENDED {
        return HandPose::OpenPalm;
    }
    if curled_count(frame) >= MIN_CURLED {
        return HandPose::Fist;
    }
    HandPose::Neutral
}

fn wrist_distance(frame: &HandFrame, joint: usize) -> f32 {
    frame.landmarks[joint].planar_distance(&frame.landmarks[hand::WRIST])
}

/// Fingers whose tip is clearly farther from the wrist than their middle joint
pub fn extended_count(frame: &HandFrame) -> usize {
    EXTENSION_PAIRS
        .iter()
        .filter(|(tip, base)| {
            wrist_distance(frame, *tip) > wrist_distance(frame, *base) * EXTENDED_RATIO
        })
        .count()
}

/// Non-thumb fingers whose tip is folded back near their knuckle
pub fn curled_count(frame: &HandFrame) -> usize {
    CURL_PAIRS
        .iter()
        .filter(|(tip, base)| {
            wrist_distance(frame, *tip) < wrist_distance(frame, *base) * CURLED_RATIO
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::synthetic::SyntheticHand;

    #[test]
    fn test_open_hand() {
        let frame = SyntheticHand::new(0).open().build();
        assert_eq!(extended_count(&frame), 5);
        assert_eq!(classify(&frame, false), HandPose::OpenPalm);
    }

    #[test]
    fn test_fist() {
        let frame = SyntheticHand::new(0).fist().build();
        assert_eq!(curled_count(&frame), 4);
        assert_eq!(classify(&frame, false), HandPose::Fist);
    }

    #[test]
    fn test_pinch_overrides_shape() {
        let frame = SyntheticHand::new(0).open().build();
        assert_eq!(classify(&frame, true), HandPose::Pinch);
    }

    #[test]
    fn test_pose_names() {
        assert_eq!(HandPose::OpenPalm.as_str(), "open_palm");
        assert_eq!(HandPose::Fist.as_str(), "fist");
        for pose in [HandPose::Pinch, HandPose::OpenPalm, HandPose::Fist, HandPose::Neutral] {
            assert_eq!(serde_json::to_value(pose).unwrap(), pose.as_str());
        }
    }
}
