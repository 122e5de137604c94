use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pose::error::PoseError;

/// Exercises the rep counter understands. Adding one means adding a
/// [`HysteresisRule`](crate::pose::tracker::HysteresisRule) for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExerciseKind {
    #[default]
    #[serde(rename = "squat")]
    Squat,
    #[serde(rename = "pushup")]
    PushUp,
    #[serde(rename = "bicep_curl")]
    BicepCurl,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 3] = [Self::Squat, Self::PushUp, Self::BicepCurl];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Squat => "squat",
            Self::PushUp => "pushup",
            Self::BicepCurl => "bicep_curl",
        }
    }

    pub fn info(self) -> ExerciseInfo {
        let (name, description) = match self {
            Self::Squat => ("Squat", "Lower body exercise"),
            Self::PushUp => ("Push-up", "Upper body exercise"),
            Self::BicepCurl => ("Bicep Curl", "Arm exercise"),
        };
        ExerciseInfo {
            id: self.as_str(),
            name,
            description,
        }
    }

    /// Resolves an optional caller-supplied tag, defaulting to squat when absent.
    pub fn resolve(raw: Option<&str>) -> Result<Self, PoseError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(tag) => tag.parse(),
            None => Ok(Self::default()),
        }
    }
}

pub fn catalog() -> Vec<ExerciseInfo> {
    ExerciseKind::ALL.iter().map(|kind| kind.info()).collect()
}

impl FromStr for ExerciseKind {
    type Err = PoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "squat" => Ok(Self::Squat),
            "pushup" | "push_up" | "push-up" => Ok(Self::PushUp),
            "bicep_curl" | "bicep-curl" | "bicepcurl" => Ok(Self::BicepCurl),
            _ => Err(PoseError::UnrecognizedExerciseKind(s.to_string())),
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
