//! Dwell-to-select
//!
//! A cursor that rests on a target fills its progress from 0 to 1 over the
//! target's dwell time; reaching 1 fires the target once. Leaving the target
//! resets progress to 0 immediately. Targets that open a modal (a fact panel)
//! lock the selector until dismissed, and while locked no other target can
//! accumulate progress.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::spatial::Point2;

/// Unique identifier for a dwell target
pub type TargetId = String;

/// A selectable region activated by dwelling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwellTarget {
    pub id: TargetId,
    pub position: Point2,
    pub radius: f32,
    /// Seconds of continuous dwell needed to fire
    pub dwell_seconds: f32,
    /// Fill fraction in `[0, 1]`
    #[serde(default)]
    pub progress: f32,
    /// Set when progress reaches 1; cleared by [`DwellSelector::dismiss`]
    #[serde(default)]
    pub fired: bool,
    /// Firing opens a modal that locks the selector
    #[serde(default)]
    pub locks_on_fire: bool,
    /// Close the modal automatically after this many seconds
    #[serde(default)]
    pub auto_dismiss_seconds: Option<f32>,
}

impl DwellTarget {
    pub fn new(id: impl Into<TargetId>, position: Point2, radius: f32, dwell_seconds: f32) -> Self {
        Self {
            id: id.into(),
            position,
            radius,
            dwell_seconds,
            progress: 0.0,
            fired: false,
            locks_on_fire: false,
            auto_dismiss_seconds: None,
        }
    }

    /// Open a modal lock when fired
    pub fn locking(mut self) -> Self {
        self.locks_on_fire = true;
        self
    }

    pub fn with_auto_dismiss(mut self, seconds: f32) -> Self {
        self.auto_dismiss_seconds = Some(seconds);
        self
    }

    /// Whether `cursor` is on this target (boundary inclusive)
    pub fn contains(&self, cursor: Point2) -> bool {
        self.position.distance(&cursor) <= self.radius
    }

    fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !self.position.is_finite() {
            return Err(EngineError::invalid(
                "targets",
                format!("target `{}` needs a finite position", self.id),
            ));
        }
        if !positive(self.radius) || !positive(self.dwell_seconds) {
            return Err(EngineError::invalid(
                "targets",
                format!("target `{}` needs a positive radius and dwell time", self.id),
            ));
        }
        if self.auto_dismiss_seconds.is_some_and(|s| !positive(s)) {
            return Err(EngineError::invalid(
                "targets",
                format!("target `{}` auto-dismiss must be positive", self.id),
            ));
        }
        Ok(())
    }

    fn advance(&mut self, dt: f32) -> bool {
        self.progress = (self.progress + dt / self.dwell_seconds).min(1.0);
        if self.progress >= 1.0 && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }
}

/// Modal opened by a locking target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalLock {
    pub target_id: TargetId,
    /// Seconds the modal has been open
    pub open_for: f32,
}

/// What changed during one [`DwellSelector::update`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DwellUpdate {
    /// Targets that completed their dwell this tick
    pub completed: Vec<TargetId>,
    /// Modal closed by its auto-dismiss timer this tick
    pub auto_dismissed: Option<TargetId>,
}

/// Tracks dwell progress over a fixed set of targets
#[derive(Debug, Clone, Default)]
pub struct DwellSelector {
    targets: Vec<DwellTarget>,
    lock: Option<ModalLock>,
}

impl DwellSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a target list, rejecting duplicate ids
    pub fn with_targets(targets: impl IntoIterator<Item = DwellTarget>) -> Result<Self> {
        let mut selector = Self::new();
        for target in targets {
            selector.add_target(target)?;
        }
        Ok(selector)
    }

    pub fn add_target(&mut self, target: DwellTarget) -> Result<()> {
        if self.target(&target.id).is_some() {
            return Err(EngineError::DuplicateTarget(target.id));
        }
        target.validate()?;
        self.targets.push(target);
        Ok(())
    }

    pub fn targets(&self) -> &[DwellTarget] {
        &self.targets
    }

    pub fn target(&self, id: &str) -> Option<&DwellTarget> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    pub fn lock(&self) -> Option<&ModalLock> {
        self.lock.as_ref()
    }

    /// Advance by `dt` seconds with the cursor at `cursor` (or absent)
    pub fn update(&mut self, cursor: Option<Point2>, dt: f32) -> DwellUpdate {
        let mut update = DwellUpdate {
            auto_dismissed: self.tick_lock(dt),
            ..Default::default()
        };

        if self.lock.is_some() {
            self.freeze_background();
            return update;
        }

        for target in &mut self.targets {
            match cursor {
                Some(c) if self.lock.is_none() && target.contains(c) => {
                    if target.advance(dt) {
                        tracing::debug!(target = %target.id, "dwell complete");
                        update.completed.push(target.id.clone());
                        if target.locks_on_fire {
                            self.lock = Some(ModalLock {
                                target_id: target.id.clone(),
                                open_for: 0.0,
                            });
                        }
                    }
                }
                _ => target.progress = 0.0,
            }
        }

        self.freeze_background();
        update
    }

    /// Advance only the modal's auto-dismiss timer; progress is left alone.
    ///
    /// Returns the target whose modal closed, if any.
    pub fn tick_lock(&mut self, dt: f32) -> Option<TargetId> {
        let lock = self.lock.as_mut()?;
        lock.open_for += dt;
        let limit = self
            .targets
            .iter()
            .find(|t| t.id == lock.target_id)
            .and_then(|t| t.auto_dismiss_seconds)?;
        if lock.open_for < limit {
            return None;
        }
        let id = lock.target_id.clone();
        self.dismiss(&id);
        Some(id)
    }

    /// Re-arm a fired target and close its modal if it holds the lock
    pub fn dismiss(&mut self, id: &str) -> bool {
        let Some(target) = self.targets.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        target.fired = false;
        target.progress = 0.0;
        if self.lock.as_ref().map(|l| l.target_id == id).unwrap_or(false) {
            self.lock = None;
        }
        true
    }

    /// Hold every target except the locked one at zero progress
    fn freeze_background(&mut self) {
        let Some(lock) = &self.lock else {
            return;
        };
        for target in self.targets.iter_mut().filter(|t| t.id != lock.target_id) {
            target.progress = 0.0;
        }
    }
}
