use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::PoseConfig;
use crate::pose::landmarks::{Landmark, LandmarkSet, JOINT_COUNT};
use crate::pose::PoseError;

/// Maps one frame to body landmarks. `Ok(None)` means no body was found.
#[async_trait]
pub trait PoseEstimator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn estimate(&self, frame: &RgbImage) -> Result<Option<LandmarkSet>, EstimatorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    #[error("pose estimator is misconfigured: {0}")]
    Misconfigured(String),
    #[error("pose estimator request timed out")]
    Timeout,
    #[error("pose estimator network error: {0}")]
    Network(String),
    #[error("pose estimator api error: status={status}, message={message}")]
    ApiError { status: u16, message: String },
    #[error("pose estimator returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}

/// Builds the configured estimator. Remote mode needs `POSE_API_URL`.
pub fn build_estimator(config: &PoseConfig) -> Result<Arc<dyn PoseEstimator>, EstimatorError> {
    if config.mock {
        tracing::info!("Using mock pose estimator");
        return Ok(Arc::new(MockPoseEstimator));
    }
    if config.api_url.trim().is_empty() {
        return Err(EstimatorError::Misconfigured(
            "POSE_MOCK=false requires POSE_API_URL".to_string(),
        ));
    }
    tracing::info!(api_url = %config.api_url, "Using remote pose estimator");
    Ok(Arc::new(RemotePoseEstimator::new(config)))
}

/// Funnels every call through one lock so the model only ever sees a single
/// in-flight frame.
pub struct EstimatorHandle {
    inner: Arc<dyn PoseEstimator>,
    in_flight: Mutex<()>,
}

impl EstimatorHandle {
    pub fn new(inner: Arc<dyn PoseEstimator>) -> Self {
        Self {
            inner,
            in_flight: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    pub async fn estimate(&self, frame: &RgbImage) -> Result<Option<LandmarkSet>, EstimatorError> {
        let _guard = self.in_flight.lock().await;
        self.inner.estimate(frame).await
    }
}

/// Always reports the same upright standing pose, whatever the frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPoseEstimator;

const MOCK_VISIBILITY: f64 = 0.98;

const STANDING_POSE: [(f64, f64); JOINT_COUNT] = [
    (0.50, 0.12),
    (0.49, 0.10),
    (0.48, 0.10),
    (0.47, 0.10),
    (0.51, 0.10),
    (0.52, 0.10),
    (0.53, 0.10),
    (0.45, 0.11),
    (0.55, 0.11),
    (0.49, 0.14),
    (0.51, 0.14),
    (0.42, 0.30),
    (0.58, 0.30),
    (0.41, 0.45),
    (0.59, 0.45),
    (0.41, 0.60),
    (0.59, 0.60),
    (0.41, 0.63),
    (0.59, 0.63),
    (0.41, 0.64),
    (0.59, 0.64),
    (0.42, 0.62),
    (0.58, 0.62),
    (0.45, 0.55),
    (0.55, 0.55),
    (0.45, 0.72),
    (0.55, 0.72),
    (0.45, 0.90),
    (0.55, 0.90),
    (0.45, 0.92),
    (0.55, 0.92),
    (0.46, 0.95),
    (0.54, 0.95),
];

pub fn standing_pose() -> Vec<Landmark> {
    STANDING_POSE
        .iter()
        .map(|&(x, y)| Landmark::new(x, y, 0.0, MOCK_VISIBILITY))
        .collect()
}

/// Validates raw model output. An empty list is a frame without a body.
fn detection(landmarks: Vec<Landmark>) -> Result<Option<LandmarkSet>, EstimatorError> {
    match LandmarkSet::new(landmarks) {
        Ok(set) => Ok(Some(set)),
        Err(PoseError::NoDetection) => Ok(None),
        Err(e) => Err(EstimatorError::InvalidResponse(e.to_string())),
    }
}

#[async_trait]
impl PoseEstimator for MockPoseEstimator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn estimate(&self, _frame: &RgbImage) -> Result<Option<LandmarkSet>, EstimatorError> {
        detection(standing_pose())
    }
}

/// Posts the frame as base64 PNG to an external pose model service.
///
/// Expected response: `{"landmarks": [{x, y, z, visibility}, ...] | null}`.
#[derive(Debug, Clone)]
pub struct RemotePoseEstimator {
    client: reqwest::Client,
    api_url: String,
    min_detection_confidence: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EstimateRequest<'a> {
    image: &'a str,
    min_detection_confidence: f64,
}

#[derive(Deserialize)]
struct EstimateResponse {
    #[serde(default)]
    landmarks: Option<Vec<Landmark>>,
}

impl RemotePoseEstimator {
    pub fn new(config: &PoseConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_url: config.api_url.clone(),
            min_detection_confidence: config.min_detection_confidence,
        }
    }
}

fn encode_png(frame: &RgbImage) -> Result<String, EstimatorError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(frame.clone()).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(STANDARD.encode(buf))
}

fn map_request_error(e: reqwest::Error) -> EstimatorError {
    if e.is_timeout() {
        EstimatorError::Timeout
    } else {
        EstimatorError::Network(e.to_string())
    }
}

#[async_trait]
impl PoseEstimator for RemotePoseEstimator {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn estimate(&self, frame: &RgbImage) -> Result<Option<LandmarkSet>, EstimatorError> {
        let image = encode_png(frame)?;
        let response = self
            .client
            .post(&self.api_url)
            .json(&EstimateRequest {
                image: &image,
                min_detection_confidence: self.min_detection_confidence,
            })
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EstimatorError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: EstimateResponse = response
            .json()
            .await
            .map_err(|e| EstimatorError::InvalidResponse(e.to_string()))?;

        match body.landmarks {
            None => Ok(None),
            Some(landmarks) => detection(landmarks),
        }
    }
}
