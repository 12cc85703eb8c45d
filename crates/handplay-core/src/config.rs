//! Engine configuration
//!
//! Every tuning constant lives here as a named, overridable default. The
//! values were tuned by feel on exhibit hardware; there is no derivation
//! behind them, so change them through config rather than in code.
//!
//! All sections use `#[serde(default)]`, so a TOML file only needs the keys
//! it overrides:
//!
//! ```toml
//! [pinch]
//! enter_threshold = 0.07
//!
//! [grab]
//! hand_loss_grace_ms = 400
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interaction::{DeliveryZone, DwellTarget, SizeClass};
use crate::spatial::{PlayBounds, Point2};

/// Pinch hysteresis thresholds (normalized image units)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PinchConfig {
    /// Thumb/index distance below which a pinch starts
    pub enter_threshold: f32,
    /// Thumb/index distance above which a pinch may end
    pub exit_threshold: f32,
    /// Minimum time since the last sub-threshold sample before a pinch can end
    pub grace_period_ms: u64,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            enter_threshold: 0.08,
            exit_threshold: 0.13,
            grace_period_ms: 250,
        }
    }
}

impl PinchConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

/// Image-space to play-space mapping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapperConfig {
    /// Mirror horizontally so the camera behaves like a mirror
    pub mirror_x: bool,
    /// Play-space width covered by the full image width
    pub width: f32,
    /// Play-space height covered by the full image height
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Multiplier on landmark z; 0 flattens everything onto the play plane
    pub depth_scale: f32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            mirror_x: true,
            width: 10.0,
            height: 6.0,
            offset_x: 0.0,
            offset_y: 0.0,
            depth_scale: 0.0,
        }
    }
}

/// A value per entity size class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SizeTable {
    pub normal: f32,
    pub small: f32,
}

impl SizeTable {
    pub fn get(&self, size: SizeClass) -> f32 {
        match size {
            SizeClass::Normal => self.normal,
            SizeClass::Small => self.small,
        }
    }
}

/// Grab, follow and delivery tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrabConfig {
    /// Grab radius for normal entities (play units)
    pub radius_normal: f32,
    /// Grab radius for small entities; smaller means harder to catch
    pub radius_small: f32,
    /// Natural frequency (rad/s) of the critically damped follow spring
    pub follow_frequency: f32,
    /// Fraction of the remaining distance an idle entity moves home per tick
    pub home_return_rate: f32,
    /// How long a vanished hand keeps its grab
    pub hand_loss_grace_ms: u64,
    /// Length of the bounce-back window after a rejected delivery
    pub bounce_window_ms: u64,
    /// Points awarded for each successful delivery
    pub delivery_score: u32,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            radius_normal: 1.8,
            radius_small: 1.1,
            follow_frequency: 18.0,
            home_return_rate: 0.1,
            hand_loss_grace_ms: 300,
            bounce_window_ms: 600,
            delivery_score: 100,
        }
    }
}

impl GrabConfig {
    pub fn radius(&self, size: SizeClass) -> f32 {
        match size {
            SizeClass::Normal => self.radius_normal,
            SizeClass::Small => self.radius_small,
        }
    }

    pub fn hand_loss_grace(&self) -> Duration {
        Duration::from_millis(self.hand_loss_grace_ms)
    }

    pub fn bounce_window(&self) -> Duration {
        Duration::from_millis(self.bounce_window_ms)
    }
}

/// Rejection-sampling placement tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlacementConfig {
    /// Reachable region entities may spawn in
    pub bounds: PlayBounds,
    /// Minimum distance between two entities, per size class
    pub min_entity_distance: SizeTable,
    /// Extra clearance added to each zone's snap radius
    pub zone_exclusion_margin: f32,
    /// Candidates drawn before falling back to a deterministic position
    pub max_attempts: u32,
    /// Radius of the fallback ring around the bounds center
    pub fallback_ring_radius: f32,
    /// Probability that a spawned entity is small
    pub small_ratio: f32,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            bounds: PlayBounds::default(),
            min_entity_distance: SizeTable {
                normal: 1.2,
                small: 0.8,
            },
            zone_exclusion_margin: 0.5,
            max_attempts: 100,
            fallback_ring_radius: 0.75,
            small_ratio: 0.3,
            seed: None,
        }
    }
}

/// Where the dwell cursor comes from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CursorSource {
    /// Pinch-point of the first tracked hand
    #[default]
    Hand,
    /// Higher index fingertip of the body pose
    Pose,
}

/// Dwell selection defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DwellConfig {
    /// Hover time used by targets that do not set their own
    pub default_seconds: f32,
    /// Hover radius used by targets that do not set their own
    pub default_radius: f32,
    pub cursor_source: CursorSource,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            default_seconds: 1.5,
            default_radius: 0.6,
            cursor_source: CursorSource::Hand,
        }
    }
}

/// Cursor smoothing for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmoothingConfig {
    pub enabled: bool,
    /// Weight of the newest sample (1.0 = no smoothing)
    pub alpha: f32,
    /// Jumps longer than this snap instead of easing
    pub snap_distance: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alpha: 0.4,
            snap_distance: 1.0,
        }
    }
}

/// Held-pose gestures (fist-to-reset)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoseHoldConfig {
    pub enabled: bool,
    pub fist_hold_ms: u64,
}

impl Default for PoseHoldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fist_hold_ms: 1500,
        }
    }
}

impl PoseHoldConfig {
    pub fn fist_hold(&self) -> Duration {
        Duration::from_millis(self.fist_hold_ms)
    }
}

/// Both-hands pinch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TwoHandConfig {
    pub cooldown_ms: u64,
}

impl Default for TwoHandConfig {
    fn default() -> Self {
        Self { cooldown_ms: 1000 }
    }
}

impl TwoHandConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub pinch: PinchConfig,
    pub mapper: MapperConfig,
    pub grab: GrabConfig,
    pub placement: PlacementConfig,
    pub dwell: DwellConfig,
    pub smoothing: SmoothingConfig,
    pub pose_hold: PoseHoldConfig,
    pub two_hand: TwoHandConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        let p = &self.pinch;
        positive("pinch.enter_threshold", p.enter_threshold)?;
        positive("pinch.exit_threshold", p.exit_threshold)?;
        if p.enter_threshold >= p.exit_threshold {
            return Err(EngineError::invalid(
                "pinch.exit_threshold",
                format!(
                    "must be greater than enter_threshold ({} >= {})",
                    p.enter_threshold, p.exit_threshold
                ),
            ));
        }

        let m = &self.mapper;
        positive("mapper.width", m.width)?;
        positive("mapper.height", m.height)?;
        finite("mapper.offset_x", m.offset_x)?;
        finite("mapper.offset_y", m.offset_y)?;
        finite("mapper.depth_scale", m.depth_scale)?;

        let g = &self.grab;
        positive("grab.radius_normal", g.radius_normal)?;
        positive("grab.radius_small", g.radius_small)?;
        positive("grab.follow_frequency", g.follow_frequency)?;
        unit_interval("grab.home_return_rate", g.home_return_rate)?;

        let pl = &self.placement;
        if !pl.bounds.is_valid() {
            return Err(EngineError::invalid(
                "placement.bounds",
                "corners must be finite with max > min on both axes",
            ));
        }
        positive("placement.min_entity_distance.normal", pl.min_entity_distance.normal)?;
        positive("placement.min_entity_distance.small", pl.min_entity_distance.small)?;
        non_negative("placement.zone_exclusion_margin", pl.zone_exclusion_margin)?;
        non_negative("placement.fallback_ring_radius", pl.fallback_ring_radius)?;
        unit_interval("placement.small_ratio", pl.small_ratio)?;
        if pl.max_attempts == 0 {
            return Err(EngineError::invalid("placement.max_attempts", "must be at least 1"));
        }

        positive("dwell.default_seconds", self.dwell.default_seconds)?;
        positive("dwell.default_radius", self.dwell.default_radius)?;

        let s = &self.smoothing;
        if !(s.alpha > 0.0 && s.alpha <= 1.0) {
            return Err(EngineError::invalid("smoothing.alpha", "must be in (0, 1]"));
        }
        positive("smoothing.snap_distance", s.snap_distance)?;

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::invalid(field, format!("must be finite, got {}", value)))
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(field, format!("must be positive, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(field, format!("must be >= 0, got {}", value)))
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::invalid(field, format!("must be in [0, 1], got {}", value)))
    }
}

/// Dwell target as written in a layout file; unset fields take [`DwellConfig`] defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetEntry {
    pub id: String,
    pub position: Point2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwell_seconds: Option<f32>,
    #[serde(default)]
    pub locks_on_fire: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_dismiss_seconds: Option<f32>,
}

impl TargetEntry {
    pub fn resolve(&self, defaults: &DwellConfig) -> DwellTarget {
        let mut target = DwellTarget::new(
            self.id.clone(),
            self.position,
            self.radius.unwrap_or(defaults.default_radius),
            self.dwell_seconds.unwrap_or(defaults.default_seconds),
        );
        target.locks_on_fire = self.locks_on_fire;
        target.auto_dismiss_seconds = self.auto_dismiss_seconds;
        target
    }
}

/// Zones, dwell targets and starting population of one exhibit.
///
/// ```toml
/// population = 6
///
/// [[zones]]
/// id = "mars"
/// position = { x = -3.0, y = 1.5 }
/// snap_radius = 1.0
/// accepted_category = "mars"
///
/// [[targets]]
/// id = "fact-panel"
/// position = { x = 3.5, y = -2.0 }
/// locks_on_fire = true
/// auto_dismiss_seconds = 6.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExhibitLayout {
    pub population: usize,
    pub zones: Vec<DeliveryZone>,
    pub targets: Vec<TargetEntry>,
}

impl Default for ExhibitLayout {
    fn default() -> Self {
        Self {
            population: 6,
            zones: vec![
                DeliveryZone::new("mars", Point2::new(-3.0, 1.5), 1.0, "mars"),
                DeliveryZone::new("venus", Point2::new(3.0, 1.5), 1.0, "venus"),
                DeliveryZone::new("jupiter", Point2::new(0.0, -1.8), 0.8, "jupiter"),
            ],
            targets: vec![TargetEntry {
                id: "fact-panel".into(),
                position: Point2::new(3.5, -2.0),
                radius: None,
                dwell_seconds: None,
                locks_on_fire: true,
                auto_dismiss_seconds: Some(6.0),
            }],
        }
    }
}

impl ExhibitLayout {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve target entries against dwell defaults
    pub fn dwell_targets(&self, defaults: &DwellConfig) -> Vec<DwellTarget> {
        self.targets.iter().map(|t| t.resolve(defaults)).collect()
    }
}
