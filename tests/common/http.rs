use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("router is infallible")
}

/// Builds and sends one request; a JSON `body` also sets the content type.
pub async fn request(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
    headers: &[(&str, String)],
) -> Response {
    let builder = headers
        .iter()
        .fold(Request::builder().method(method).uri(path), |b, (name, value)| {
            b.header(*name, value.as_str())
        });

    let req = match body {
        Some(payload) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    };
    send(app, req.expect("valid request")).await
}

/// Sends `raw` verbatim as a JSON body, for malformed-payload cases.
pub async fn request_raw(app: &Router, method: Method, path: &str, raw: &str) -> Response {
    let req = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw.to_owned()))
        .expect("valid request");
    send(app, req).await
}

/// Status, headers and the parsed body (`{}` when the body is empty).
pub async fn response_json(resp: Response) -> (StatusCode, HeaderMap, Value) {
    let (parts, body) = resp.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.expect("readable body");
    let json = match bytes.is_empty() {
        true => json!({}),
        false => serde_json::from_slice(&bytes).expect("JSON body"),
    };
    (parts.status, parts.headers, json)
}

pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let (status, _, json) = response_json(request(app, Method::POST, path, Some(body), &[]).await).await;
    (status, json)
}

/// Posts one landmark frame and returns the unwrapped `data` on success.
pub async fn send_frame(app: &Router, landmarks: Vec<Value>, exercise: &str, session_id: &str) -> Value {
    let payload = json!({
        "landmarks": landmarks,
        "exerciseType": exercise,
        "sessionId": session_id,
    });
    let (status, body) = post_json(app, "/analyze-landmarks", payload).await;
    assert_status_ok_json(status, &body);
    body["data"].clone()
}

pub fn assert_json_error(body: &Value, code: &str) {
    assert_eq!(body["success"], false, "expected an error envelope: {body}");
    assert_eq!(body["code"], code, "{body}");
    assert!(body["message"].is_string(), "{body}");
}

pub fn assert_status_ok_json(status: StatusCode, body: &Value) {
    assert!(status.is_success(), "unexpected status {status}: {body}");
    assert_eq!(body["success"], true, "{body}");
    assert!(body.get("data").is_some(), "{body}");
}
