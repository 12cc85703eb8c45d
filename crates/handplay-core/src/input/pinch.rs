//! Pinch detection with hysteresis and a hold grace period
//!
//! Tracking noise near a single threshold makes a naive `distance < t`
//! flicker every frame. Two thresholds open a dead zone where the state
//! does not change, and the grace period keeps a pinch alive for a moment
//! after the last close sample, which swallows the occasional outlier frame.

use std::time::Duration;

use crate::config::PinchConfig;
use crate::spatial::Point3;

/// Per-hand pinch state, persisted across ticks for one hand slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinchState {
    /// Planar thumb-tip to index-tip distance from the latest sample
    pub raw_distance: f32,
    pub is_pinching: bool,
    /// Session time of the last sample that entered or refreshed a pinch,
    /// or of the release
    pub last_transition: Option<Duration>,
}

impl PinchState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Change of `is_pinching` caused by one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchEdge {
    /// false -> true
    Rising,
    /// true -> false
    Falling,
    None,
}

impl PinchEdge {
    pub fn is_rising(&self) -> bool {
        matches!(self, PinchEdge::Rising)
    }

    pub fn is_falling(&self) -> bool {
        matches!(self, PinchEdge::Falling)
    }
}

/// Stateless detector; state lives in [`PinchState`] owned by the caller
#[derive(Debug, Clone)]
pub struct PinchGestureDetector {
    config: PinchConfig,
}

impl PinchGestureDetector {
    pub fn new(config: PinchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PinchConfig {
        &self.config
    }

    /// Feed one thumb/index sample taken at session time `now`
    pub fn update(
        &self,
        state: &mut PinchState,
        thumb_tip: Point3,
        index_tip: Point3,
        now: Duration,
    ) -> PinchEdge {
        self.update_distance(state, thumb_tip.planar_distance(&index_tip), now)
    }

    /// Feed a precomputed planar distance
    pub fn update_distance(
        &self,
        state: &mut PinchState,
        distance: f32,
        now: Duration,
    ) -> PinchEdge {
        state.raw_distance = distance;

        if distance < self.config.enter_threshold {
            let was_pinching = state.is_pinching;
            state.is_pinching = true;
            state.last_transition = Some(now);
            return if was_pinching {
                PinchEdge::None
            } else {
                PinchEdge::Rising
            };
        }

        if distance > self.config.exit_threshold && state.is_pinching {
            let held_for = state
                .last_transition
                .map(|t| now.saturating_sub(t))
                .unwrap_or(Duration::MAX);
            if held_for > self.config.grace_period() {
                state.is_pinching = false;
                state.last_transition = Some(now);
                return PinchEdge::Falling;
            }
        }

        PinchEdge::None
    }
}

impl Default for PinchGestureDetector {
    fn default() -> Self {
        Self::new(PinchConfig::default())
    }
}
