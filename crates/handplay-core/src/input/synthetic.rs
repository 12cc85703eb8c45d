//! Synthetic landmark generation
//!
//! Builds plausible 21-point hand skeletons and 33-point poses without a
//! camera, for scripted demos, replay fixtures and tests.

use crate::spatial::{Point2, Point3};

use super::landmarks::{hand, pose, HandFrame, HandId};

/// Hand shape to synthesize
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandShape {
    /// Fingers extended, thumb and index tips `gap` apart (normalized units)
    Pinch { gap: f32 },
    /// Fingers and thumb fully extended
    Open,
    /// Fingers curled, thumb tucked
    Fist,
}

/// Builder for a synthetic hand whose pinch-point sits at a chosen spot
#[derive(Debug, Clone)]
pub struct SyntheticHand {
    hand_id: HandId,
    anchor: Point2,
    depth: f32,
    shape: HandShape,
}

/// Column offsets of index, middle, ring and pinky from the palm center
const FINGER_COLUMNS: [f32; 4] = [-0.03, 0.0, 0.03, 0.06];

impl SyntheticHand {
    /// A relaxed open hand centered in the image
    pub fn new(hand_id: HandId) -> Self {
        Self {
            hand_id,
            anchor: Point2::new(0.5, 0.5),
            depth: 0.0,
            shape: HandShape::Open,
        }
    }

    /// Place the pinch-point (thumb/index midpoint) at a normalized position
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.anchor = Point2::new(x, y);
        self
    }

    pub fn at_point(self, p: Point2) -> Self {
        self.at(p.x, p.y)
    }

    pub fn depth(mut self, z: f32) -> Self {
        self.depth = z;
        self
    }

    pub fn shape(mut self, shape: HandShape) -> Self {
        self.shape = shape;
        self
    }

    /// Thumb and index `gap` apart
    pub fn pinch_gap(self, gap: f32) -> Self {
        self.shape(HandShape::Pinch { gap })
    }

    /// Firmly pinched
    pub fn pinched(self) -> Self {
        self.pinch_gap(0.02)
    }

    pub fn open(self) -> Self {
        self.shape(HandShape::Open)
    }

    pub fn fist(self) -> Self {
        self.shape(HandShape::Fist)
    }

    pub fn build(&self) -> HandFrame {
        let mut lm = match self.shape {
            HandShape::Fist => fist_skeleton(),
            HandShape::Open | HandShape::Pinch { .. } => open_skeleton(),
        };

        if let HandShape::Pinch { gap } = self.shape {
            let mid = lm[hand::THUMB_TIP].midpoint(&lm[hand::INDEX_TIP]);
            lm[hand::THUMB_TIP] = Point3::new(mid.x - gap / 2.0, mid.y, 0.0);
            lm[hand::INDEX_TIP] = Point3::new(mid.x + gap / 2.0, mid.y, 0.0);
        }

        // Translate so the pinch-point lands exactly on the anchor.
        let mid = lm[hand::THUMB_TIP].midpoint(&lm[hand::INDEX_TIP]);
        let dx = self.anchor.x - mid.x;
        let dy = self.anchor.y - mid.y;
        let landmarks = lm
            .iter()
            .map(|p| Point3::new(p.x + dx, p.y + dy, self.depth))
            .collect();

        HandFrame::new(self.hand_id, landmarks)
    }
}

/// Skeleton relative to a palm center at the origin, image y pointing down
fn open_skeleton() -> [Point3; hand::COUNT] {
    let mut lm = [Point3::ORIGIN; hand::COUNT];
    lm[hand::WRIST] = Point3::new(0.0, 0.1, 0.0);
    lm[hand::THUMB_CMC] = Point3::new(-0.05, 0.07, 0.0);
    lm[hand::THUMB_MCP] = Point3::new(-0.08, 0.04, 0.0);
    lm[hand::THUMB_IP] = Point3::new(-0.11, 0.01, 0.0);
    lm[hand::THUMB_TIP] = Point3::new(-0.14, -0.02, 0.0);
    for (finger, x) in FINGER_COLUMNS.iter().enumerate() {
        let base = hand::INDEX_MCP + finger * 4;
        lm[base] = Point3::new(*x, 0.0, 0.0);
        lm[base + 1] = Point3::new(*x, -0.04, 0.0);
        lm[base + 2] = Point3::new(*x, -0.07, 0.0);
        lm[base + 3] = Point3::new(*x, -0.10, 0.0);
    }
    lm
}

fn fist_skeleton() -> [Point3; hand::COUNT] {
    let mut lm = open_skeleton();
    // Thumb rests beside the fingers, clear of the pinch enter threshold.
    lm[hand::THUMB_IP] = Point3::new(-0.09, 0.05, 0.0);
    lm[hand::THUMB_TIP] = Point3::new(-0.12, 0.06, 0.0);
    for (finger, x) in FINGER_COLUMNS.iter().enumerate() {
        let base = hand::INDEX_MCP + finger * 4;
        lm[base + 1] = Point3::new(*x, -0.03, 0.0);
        lm[base + 2] = Point3::new(*x, -0.01, 0.0);
        lm[base + 3] = Point3::new(*x, 0.02, 0.0);
    }
    lm
}

/// A 33-point body pose with both index fingertips placed
pub fn pose_with_index_tips(left: Point2, right: Point2) -> Vec<Point3> {
    let mut points = vec![Point3::new(0.5, 0.5, 0.0); pose::COUNT];
    points[pose::LEFT_INDEX] = left.with_z(0.0);
    points[pose::RIGHT_INDEX] = right.with_z(0.0);
    points
}
