//! Interaction rules
//!
//! - Entities, delivery zones and categories
//! - Per-hand grab / follow / deliver state machine
//! - Dwell-to-select with modal locking
//! - Sustained pose and two-hand pinch detectors

mod dwell;
mod entity;
mod follow;
mod grab;
mod hold;
mod two_hand;

pub use dwell::{DwellSelector, DwellTarget, DwellUpdate, ModalLock, TargetId};
pub use entity::{Category, DeliveryZone, EntityId, GrabbableEntity, SizeClass, ZoneId};
pub use follow::Follow;
pub use grab::{GrabPhase, GrabStateMachine, HandGrab, HandSample, HandStep};
pub use hold::PoseHoldTracker;
pub use two_hand::TwoHandPinchDetector;
