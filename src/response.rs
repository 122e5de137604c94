use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pose::PoseError;
use crate::services::image_decode::DecodeError;
use crate::services::pose_estimator::EstimatorError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

/// Failure body. The request-id middleware adds `traceId` on the way out.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: &'a str,
    message: &'a str,
}

/// Handler error carrying its HTTP status and a stable machine-readable code.
///
/// Messages of internal errors are logged but never sent to the client.
#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub internal: bool,
}

impl AppError {
    fn client(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            internal: false,
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::client(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::client(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unprocessable(code: &'static str, message: impl Into<String>) -> Self {
        Self::client(StatusCode::UNPROCESSABLE_ENTITY, code, message)
    }

    pub fn bad_gateway(code: &'static str, message: impl Into<String>) -> Self {
        Self::client(StatusCode::BAD_GATEWAY, code, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            internal: true,
            ..Self::client(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.internal {
            tracing::error!(status = %self.status, code = self.code, error = %self.message, "request failed");
            "Internal server error"
        } else {
            tracing::warn!(status = %self.status, code = self.code, error = %self.message, "request rejected");
            self.message.as_str()
        };

        let body = ErrorBody {
            success: false,
            code: self.code,
            message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<PoseError> for AppError {
    fn from(value: PoseError) -> Self {
        let message = value.to_string();
        match value {
            PoseError::NoDetection => {
                AppError::unprocessable("NO_POSE_DETECTED", "No pose detected in image")
            }
            PoseError::UnrecognizedExerciseKind(_) => {
                AppError::bad_request("UNSUPPORTED_EXERCISE", message)
            }
            PoseError::InvalidLandmarkSet { .. } | PoseError::NonFiniteLandmark { .. } => {
                AppError::bad_request("INVALID_LANDMARKS", message)
            }
        }
    }
}

impl From<DecodeError> for AppError {
    fn from(value: DecodeError) -> Self {
        AppError::bad_request("INVALID_IMAGE", value.to_string())
    }
}

// Upstream failures keep a generic message; details only go to the log.
impl From<EstimatorError> for AppError {
    fn from(value: EstimatorError) -> Self {
        match value {
            EstimatorError::Encode(e) => AppError::internal(format!("frame encode failed: {e}")),
            EstimatorError::Misconfigured(msg) => AppError::internal(msg),
            other => {
                tracing::error!(error = %other, "Pose estimator call failed");
                AppError::bad_gateway("POSE_ESTIMATOR_UNAVAILABLE", "Pose estimator is unavailable")
            }
        }
    }
}

/// 200 with `{success: true, data}`.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}
