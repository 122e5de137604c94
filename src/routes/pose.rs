use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SESSION_ID;
use crate::extractors::{JsonBody, OptionalJsonBody};
use crate::metrics::{track_operation, Operation};
use crate::pose::exercise::catalog;
use crate::pose::posture::{Feedback, PostureIssue};
use crate::pose::{assess_posture, ExerciseKind, Landmark, LandmarkSet, Phase, PoseError};
use crate::response::{ok, AppError};
use crate::services::image_decode::decode_frame;
use crate::state::AppState;
use crate::validation::validate_session_id;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analyze-pose", post(analyze_pose))
        .route("/analyze-landmarks", post(analyze_landmarks))
        .route("/reset-detector", post(reset_detector))
        .route("/supported-exercises", get(supported_exercises))
}

fn default_true() -> bool {
    true
}

// Older camera clients send snake_case keys. Unknown keys are rejected, never ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AnalyzePoseRequest {
    image: String,
    #[serde(alias = "exercise_type")]
    exercise_type: Option<String>,
    #[serde(alias = "session_id")]
    session_id: Option<String>,
    #[serde(default = "default_true", alias = "include_landmarks")]
    include_landmarks: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AnalyzeLandmarksRequest {
    landmarks: Vec<Landmark>,
    #[serde(alias = "exercise_type")]
    exercise_type: Option<String>,
    #[serde(alias = "session_id")]
    session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ResetRequest {
    #[serde(alias = "session_id")]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResponse {
    session_id: String,
    rep_count: u32,
    pose_score: f64,
    feedback: Feedback,
    issues: Vec<PostureIssue>,
    angle: f64,
    phase: Phase,
    exercise_detected: ExerciseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    landmarks: Option<LandmarkSet>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetResponse {
    status: &'static str,
    session_id: String,
    rep_count: u32,
}

pub(crate) fn resolve_session_id(raw: Option<String>) -> Result<String, AppError> {
    match raw {
        None => Ok(DEFAULT_SESSION_ID.to_string()),
        Some(id) => {
            validate_session_id(&id)
                .map_err(|msg| AppError::bad_request("INVALID_SESSION_ID", msg))?;
            Ok(id)
        }
    }
}

async fn analyze_pose(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnalyzePoseRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let analysis = track_operation!(state.metrics(), Operation::AnalyzeFrame, {
        analyze_image(&state, req).await
    })?;
    Ok(ok(analysis))
}

async fn analyze_image(
    state: &AppState,
    req: AnalyzePoseRequest,
) -> Result<AnalysisResponse, AppError> {
    // Reject bad input before touching any session.
    let exercise = ExerciseKind::resolve(req.exercise_type.as_deref())?;
    let session_id = resolve_session_id(req.session_id)?;

    let image = req.image;
    let frame = track_operation!(state.metrics(), Operation::DecodeFrame, {
        match tokio::task::spawn_blocking(move || decode_frame(&image)).await {
            Ok(decoded) => decoded.map_err(AppError::from),
            Err(e) => Err(AppError::internal(format!("frame decode task failed: {e}"))),
        }
    })?;

    let detected = track_operation!(state.metrics(), Operation::EstimatePose, {
        state.estimator().estimate(&frame).await
    })?;
    let landmarks = detected.ok_or(PoseError::NoDetection)?;

    let mut analysis = apply_frame(state, session_id, &landmarks, exercise).await;
    if req.include_landmarks {
        analysis.landmarks = Some(landmarks);
    }
    Ok(analysis)
}

async fn analyze_landmarks(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AnalyzeLandmarksRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let analysis = track_operation!(state.metrics(), Operation::AnalyzeFrame, {
        async {
            let exercise = ExerciseKind::resolve(req.exercise_type.as_deref())?;
            let session_id = resolve_session_id(req.session_id)?;
            let landmarks = LandmarkSet::new(req.landmarks)?;
            Ok::<_, AppError>(apply_frame(&state, session_id, &landmarks, exercise).await)
        }
        .await
    })?;
    Ok(ok(analysis))
}

/// Scores posture and advances the session's rep counter for one detected body.
async fn apply_frame(
    state: &AppState,
    session_id: String,
    landmarks: &LandmarkSet,
    exercise: ExerciseKind,
) -> AnalysisResponse {
    let posture = assess_posture(landmarks);

    let session = state.sessions().acquire(&session_id).await;
    let measurement = session.lock().await.analyze(landmarks, exercise);

    tracing::debug!(
        session_id = %session_id,
        exercise = %exercise,
        angle = measurement.angle,
        rep_count = measurement.rep_count,
        pose_score = posture.score,
        "Frame analyzed"
    );

    AnalysisResponse {
        session_id,
        rep_count: measurement.rep_count,
        pose_score: posture.score,
        feedback: posture.feedback,
        issues: posture.issues,
        angle: measurement.angle,
        phase: measurement.phase,
        exercise_detected: measurement.exercise,
        landmarks: None,
    }
}

async fn reset_detector(
    State(state): State<AppState>,
    OptionalJsonBody(req): OptionalJsonBody<ResetRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let session_id = resolve_session_id(req.session_id)?;

    let rep_count = track_operation!(state.metrics(), Operation::ResetDetector, {
        let count = match state.sessions().get(&session_id).await {
            Some(session) => session.lock().await.reset(),
            None => 0,
        };
        Ok::<_, AppError>(count)
    })?;

    tracing::info!(session_id = %session_id, "Detector reset");

    Ok(ok(ResetResponse {
        status: "reset",
        session_id,
        rep_count,
    }))
}

async fn supported_exercises() -> impl axum::response::IntoResponse {
    ok(serde_json::json!({
        "exercises": catalog(),
    }))
}
