//! Posture score from shoulder/hip symmetry and torso visibility.

use serde::{Serialize, Serializer};

use crate::pose::landmarks::{Joint, LandmarkSet};

/// Largest tolerated vertical offset between paired joints, in normalized units.
const LEVEL_TOLERANCE: f64 = 0.05;
const MIN_TORSO_VISIBILITY: f64 = 0.5;

const LEVEL_PENALTY: f64 = 15.0;
const VISIBILITY_PENALTY: f64 = 30.0;

const TORSO: [Joint; 4] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftHip,
    Joint::RightHip,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostureIssue {
    ShouldersNotLevel,
    HipsNotLevel,
    BodyNotVisible,
}

impl PostureIssue {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShouldersNotLevel => "Shoulders are not level",
            Self::HipsNotLevel => "Hips are not level",
            Self::BodyNotVisible => "Body not fully visible in frame",
        }
    }
}

impl Serialize for PostureIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Good,
    Fair,
    Poor,
}

impl Feedback {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Good
        } else if score >= 60.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "Good form!",
            Self::Fair => "Focus on form",
            Self::Poor => "Adjust your posture",
        }
    }
}

impl Serialize for Feedback {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostureAssessment {
    pub score: f64,
    pub feedback: Feedback,
    pub issues: Vec<PostureIssue>,
}

/// Scores one frame. All checks run independently; only the final score is clamped.
pub fn assess_posture(landmarks: &LandmarkSet) -> PostureAssessment {
    let mut score = 100.0;
    let mut issues = Vec::new();

    let shoulder_diff = (landmarks[Joint::LeftShoulder].y - landmarks[Joint::RightShoulder].y).abs();
    if shoulder_diff > LEVEL_TOLERANCE {
        issues.push(PostureIssue::ShouldersNotLevel);
        score -= LEVEL_PENALTY;
    }

    let hip_diff = (landmarks[Joint::LeftHip].y - landmarks[Joint::RightHip].y).abs();
    if hip_diff > LEVEL_TOLERANCE {
        issues.push(PostureIssue::HipsNotLevel);
        score -= LEVEL_PENALTY;
    }

    let visibility =
        TORSO.iter().map(|&j| landmarks.visibility(j)).sum::<f64>() / TORSO.len() as f64;
    if visibility < MIN_TORSO_VISIBILITY {
        issues.push(PostureIssue::BodyNotVisible);
        score -= VISIBILITY_PENALTY;
    }

    let score = f64::clamp(score, 0.0, 100.0);

    PostureAssessment {
        score,
        feedback: Feedback::from_score(score),
        issues,
    }
}
