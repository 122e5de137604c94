//! Request ids, the per-request log line, and the JSON error envelope for
//! failures produced outside our handlers (body limit, unknown method).

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tracing::Instrument;

use crate::validation::is_safe_identifier;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Client-supplied id when it is safe to echo, otherwise a fresh v4 uuid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| is_safe_identifier(v))
            .map(|v| Self(v.to_string()))
            .unwrap_or_else(|| Self(uuid::Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    let span = tracing::info_span!(
        "request",
        request_id = %id.as_str(),
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        let status = response.status();
        tracing::info!(
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        let mut response = if status.is_client_error() || status.is_server_error() {
            stamp_error(response, &id).await
        } else {
            response
        };
        if let Ok(value) = HeaderValue::from_str(id.as_str()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

/// Adds `traceId` to JSON error bodies and rewrites anything else into the
/// standard `{success, code, message, traceId}` shape.
async fn stamp_error(response: Response, id: &RequestId) -> Response {
    let (mut parts, body) = response.into_parts();
    let bytes = body
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();

    let envelope = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut fields)) => {
            fields.insert("traceId".to_string(), Value::String(id.as_str().to_string()));
            Value::Object(fields)
        }
        _ => plain_error(parts.status, &bytes, id),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    let body = match serde_json::to_vec(&envelope) {
        Ok(encoded) => Body::from(encoded),
        Err(_) => Body::from(bytes),
    };
    Response::from_parts(parts, body)
}

fn plain_error(status: StatusCode, text: &Bytes, id: &RequestId) -> Value {
    let message = String::from_utf8_lossy(text).trim().to_string();
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("Error").to_string()
    } else {
        message
    };

    json!({
        "success": false,
        "code": status_code_name(status),
        "message": message,
        "traceId": id.as_str(),
    })
}

fn status_code_name(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        s if s.is_client_error() => "CLIENT_ERROR",
        _ => "INTERNAL_ERROR",
    }
}
