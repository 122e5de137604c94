use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    #[error("no pose detected in frame")]
    NoDetection,
    #[error("unsupported exercise type: {0}")]
    UnrecognizedExerciseKind(String),
    #[error("expected 33 landmarks, got {got}")]
    InvalidLandmarkSet { got: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },
}
