//! Pose analysis core.
//!
//! Turns one frame's body landmarks into joint angles, drives the per-exercise
//! hysteresis state machine that counts repetitions, and scores posture.
//!
//! ## Modules
//! - `geometry`: interior angle at a joint from three 2-D points
//! - `landmarks`: the 33-joint body enumeration and per-frame landmark set
//! - `exercise`: supported exercise kinds and their catalog entries
//! - `tracker`: generic two-threshold phase engine and per-exercise rules
//! - `detector`: owned rep-count state for one workout session
//! - `posture`: symmetry/visibility posture score

pub mod detector;
pub mod error;
pub mod exercise;
pub mod geometry;
pub mod landmarks;
pub mod posture;
pub mod tracker;

pub use detector::{ExerciseDetector, Measurement};
pub use error::PoseError;
pub use exercise::ExerciseKind;
pub use landmarks::{Joint, Landmark, LandmarkSet};
pub use posture::{assess_posture, PostureAssessment};
pub use tracker::{HysteresisRule, Phase};

#[cfg(test)]
pub(crate) mod testing;
