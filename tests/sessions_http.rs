mod common;

use axum::http::{Method, StatusCode};

use common::app::{spawn_test_app, spawn_test_app_with_capacity};
use common::fixtures::legs_at;
use common::http::{assert_json_error, assert_status_ok_json, request, response_json, send_frame};

#[tokio::test]
async fn it_get_session_reports_detector_state() {
    let app = spawn_test_app();
    send_frame(&app.app, legs_at(170.0), "squat", "view").await;
    send_frame(&app.app, legs_at(110.0), "squat", "view").await;

    let resp = request(&app.app, Method::GET, "/sessions/view", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);

    let data = &body["data"];
    assert_eq!(data["sessionId"], "view");
    assert_eq!(data["repCount"], 0);
    assert_eq!(data["phase"], "contracted");
    assert_eq!(data["exercise"], "squat");
    assert!((data["lastAngle"].as_f64().unwrap() - 110.0).abs() < 1e-6);
    assert!(data["createdAt"].is_string());
}

#[tokio::test]
async fn it_unknown_session_is_not_found() {
    let app = spawn_test_app();
    let resp = request(&app.app, Method::GET, "/sessions/ghost", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");
}

#[tokio::test]
async fn it_delete_session_then_gone() {
    let app = spawn_test_app();
    send_frame(&app.app, legs_at(170.0), "squat", "bye").await;

    let resp = request(&app.app, Method::DELETE, "/sessions/bye", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["deleted"], true);

    let again = request(&app.app, Method::DELETE, "/sessions/bye", None, &[]).await;
    let (status, _, _) = response_json(again).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) =
        response_json(request(&app.app, Method::GET, "/sessions/bye", None, &[]).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn it_deleted_session_restarts_from_baseline() {
    let app = spawn_test_app();
    for angle in [170.0, 100.0, 170.0] {
        send_frame(&app.app, legs_at(angle), "squat", "again").await;
    }
    request(&app.app, Method::DELETE, "/sessions/again", None, &[]).await;

    let fresh = send_frame(&app.app, legs_at(100.0), "squat", "again").await;
    assert_eq!(fresh["repCount"], 0);
    assert_eq!(fresh["phase"], "resting");
}

#[tokio::test]
async fn it_invalid_session_id_is_rejected() {
    let app = spawn_test_app();
    let resp = request(&app.app, Method::GET, "/sessions/bad.id", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_SESSION_ID");
}

#[tokio::test]
async fn it_capacity_evicts_least_recent_session() {
    let app = spawn_test_app_with_capacity(2);

    send_frame(&app.app, legs_at(170.0), "squat", "one").await;
    send_frame(&app.app, legs_at(170.0), "squat", "two").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    send_frame(&app.app, legs_at(170.0), "squat", "one").await;
    send_frame(&app.app, legs_at(170.0), "squat", "three").await;

    assert_eq!(app.state.sessions().len().await, 2);
    assert!(app.state.sessions().get("two").await.is_none());
    assert!(app.state.sessions().get("one").await.is_some());
}
