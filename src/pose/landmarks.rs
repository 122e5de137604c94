//! Body landmark contract shared with the pose estimator.
//!
//! A frame yields exactly one landmark per [`Joint`], in the fixed 33-point
//! body topology order. A joint the model could not see is still present; it
//! just carries a low `visibility`.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::pose::error::PoseError;
use crate::pose::geometry::Point;

pub const JOINT_COUNT: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Nose,
        Joint::LeftEyeInner,
        Joint::LeftEye,
        Joint::LeftEyeOuter,
        Joint::RightEyeInner,
        Joint::RightEye,
        Joint::RightEyeOuter,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::MouthLeft,
        Joint::MouthRight,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftPinky,
        Joint::RightPinky,
        Joint::LeftIndex,
        Joint::RightIndex,
        Joint::LeftThumb,
        Joint::RightThumb,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
        Joint::LeftHeel,
        Joint::RightHeel,
        Joint::LeftFootIndex,
        Joint::RightFootIndex,
    ];

    /// Position of this joint in the estimator's output list.
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Relative depth; carried through but never used for angles.
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.visibility.is_finite()
    }
}

/// One frame's landmarks, one per [`Joint`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LandmarkSet(Vec<Landmark>);

impl LandmarkSet {
    /// Builds a set from the estimator's ordered output.
    ///
    /// An empty list means the model found no body. Any other length is a
    /// contract violation.
    pub fn new(landmarks: Vec<Landmark>) -> Result<Self, PoseError> {
        if landmarks.is_empty() {
            return Err(PoseError::NoDetection);
        }
        if landmarks.len() != JOINT_COUNT {
            return Err(PoseError::InvalidLandmarkSet {
                got: landmarks.len(),
            });
        }
        if let Some(index) = landmarks.iter().position(|lm| !lm.is_finite()) {
            return Err(PoseError::NonFiniteLandmark { index });
        }
        Ok(Self(landmarks))
    }

    pub fn point(&self, joint: Joint) -> Point {
        self[joint].point()
    }

    pub fn visibility(&self, joint: Joint) -> f64 {
        self[joint].visibility
    }

}

impl Index<Joint> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, joint: Joint) -> &Self::Output {
        &self.0[joint.index()]
    }
}
