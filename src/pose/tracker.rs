//! Two-threshold phase engine shared by every exercise.
//!
//! Each frame is reduced to one scalar, the mean of the left and right joint
//! angles. The engine moves `Resting -> Contracted` when the enter threshold is
//! crossed and `Contracted -> Resting` when the exit threshold is crossed,
//! counting one repetition on the way back. The gap between the two thresholds
//! keeps jitter around a single crossing point from producing extra reps.

use serde::{Deserialize, Serialize};

use crate::pose::exercise::ExerciseKind;
use crate::pose::geometry::angle;
use crate::pose::landmarks::{Joint, LandmarkSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Below,
    Above,
}

impl Comparator {
    /// Strict comparison; a value equal to the threshold never fires.
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Below => value < threshold,
            Self::Above => value > threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub degrees: f64,
    pub when: Comparator,
}

impl Threshold {
    pub const fn below(degrees: f64) -> Self {
        Self {
            degrees,
            when: Comparator::Below,
        }
    }

    pub const fn above(degrees: f64) -> Self {
        Self {
            degrees,
            when: Comparator::Above,
        }
    }

    pub fn is_crossed(&self, value: f64) -> bool {
        self.when.holds(value, self.degrees)
    }
}

/// Three joints whose middle member is the angle vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTriple {
    pub proximal: Joint,
    pub vertex: Joint,
    pub distal: Joint,
}

impl JointTriple {
    pub const fn new(proximal: Joint, vertex: Joint, distal: Joint) -> Self {
        Self {
            proximal,
            vertex,
            distal,
        }
    }

    pub fn angle(&self, landmarks: &LandmarkSet) -> f64 {
        angle(
            landmarks.point(self.proximal),
            landmarks.point(self.vertex),
            landmarks.point(self.distal),
        )
    }
}

const LEFT_LEG: JointTriple = JointTriple::new(Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle);
const RIGHT_LEG: JointTriple =
    JointTriple::new(Joint::RightHip, Joint::RightKnee, Joint::RightAnkle);
const LEFT_ARM: JointTriple =
    JointTriple::new(Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist);
const RIGHT_ARM: JointTriple =
    JointTriple::new(Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisRule {
    pub left: JointTriple,
    pub right: JointTriple,
    pub enter: Threshold,
    pub exit: Threshold,
}

impl HysteresisRule {
    /// Knee angle: down below 120, count when back above 160.
    pub const SQUAT: Self = Self {
        left: LEFT_LEG,
        right: RIGHT_LEG,
        enter: Threshold::below(120.0),
        exit: Threshold::above(160.0),
    };

    /// Elbow angle: arms locked above 160, count when bent below 90.
    pub const PUSH_UP: Self = Self {
        left: LEFT_ARM,
        right: RIGHT_ARM,
        enter: Threshold::above(160.0),
        exit: Threshold::below(90.0),
    };

    /// Elbow angle: curled below 60, count when extended above 160.
    pub const BICEP_CURL: Self = Self {
        left: LEFT_ARM,
        right: RIGHT_ARM,
        enter: Threshold::below(60.0),
        exit: Threshold::above(160.0),
    };

    pub const fn for_exercise(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Squat => Self::SQUAT,
            ExerciseKind::PushUp => Self::PUSH_UP,
            ExerciseKind::BicepCurl => Self::BICEP_CURL,
        }
    }

    /// Mean of the left and right vertex angles for this frame.
    pub fn measure(&self, landmarks: &LandmarkSet) -> f64 {
        (self.left.angle(landmarks) + self.right.angle(landmarks)) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Resting,
    Contracted,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackerState {
    pub rep_count: u32,
    pub phase: Phase,
    /// `None` until the first frame after a reset has been seen.
    pub previous_angle: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next: TrackerState,
    pub rep_completed: bool,
}

/// Computes the state that follows `state` after observing `angle`.
///
/// Pure: the caller decides when to commit `next`. The first frame after a
/// reset only records the baseline angle. Afterwards at most one phase change
/// happens per call, chosen by the current phase.
pub fn step(rule: &HysteresisRule, state: &TrackerState, angle: f64) -> Transition {
    let mut next = TrackerState {
        previous_angle: Some(angle),
        ..*state
    };

    if state.previous_angle.is_none() {
        return Transition {
            next,
            rep_completed: false,
        };
    }

    let mut rep_completed = false;
    match state.phase {
        Phase::Resting if rule.enter.is_crossed(angle) => {
            next.phase = Phase::Contracted;
        }
        Phase::Contracted if rule.exit.is_crossed(angle) => {
            next.phase = Phase::Resting;
            next.rep_count = state.rep_count.saturating_add(1);
            rep_completed = true;
        }
        _ => {}
    }

    Transition {
        next,
        rep_completed,
    }
}
