//! JSON body extractors whose rejections use the service's error envelope.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::response::AppError;

const INVALID_BODY: &str = "INVALID_REQUEST_BODY";

/// `axum::Json<T>`, but every rejection is a 400 `INVALID_REQUEST_BODY`.
pub struct JsonBody<T>(pub T);

/// Like [`JsonBody`], except an empty or all-whitespace body yields `T::default()`.
pub struct OptionalJsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| Self(value))
            .map_err(invalid_body)
    }
}

#[axum::async_trait]
impl<S, T> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::warn!(error = %e, "unreadable request body");
            AppError::bad_request(INVALID_BODY, "Invalid request body")
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        axum::Json::<T>::from_bytes(&bytes)
            .map(|axum::Json(value)| Self(value))
            .map_err(invalid_body)
    }
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    tracing::warn!(error = %rejection, "rejected request body");
    match rejection {
        // Names the offending field, e.g. an unknown key.
        JsonRejection::JsonDataError(e) => AppError::bad_request(INVALID_BODY, e.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request(INVALID_BODY, "Expected Content-Type: application/json")
        }
        _ => AppError::bad_request(INVALID_BODY, "Invalid request body"),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Reset {
        session: Option<String>,
    }

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn json_body_parses() {
        let JsonBody(reset) = JsonBody::<Reset>::from_request(
            request(Some("application/json"), r#"{"session":"s1"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(reset.session.as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn rejections_share_one_code() {
        for req in [
            request(Some("application/json"), "{oops"),
            request(None, r#"{"session":"s1"}"#),
            request(Some("application/json"), r#"{"sesion":"s1"}"#),
        ] {
            let err = JsonBody::<Reset>::from_request(req, &()).await.err().unwrap();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.code, INVALID_BODY);
        }
    }

    #[tokio::test]
    async fn unknown_field_is_named_in_message() {
        let err = JsonBody::<Reset>::from_request(
            request(Some("application/json"), r#"{"sesion":"s1"}"#),
            &(),
        )
        .await
        .err()
        .unwrap();
        assert!(err.message.contains("sesion"), "{}", err.message);
    }

    #[tokio::test]
    async fn optional_body_defaults_when_blank() {
        let OptionalJsonBody(reset) =
            OptionalJsonBody::<Reset>::from_request(request(None, "  \n"), &())
                .await
                .unwrap();
        assert_eq!(reset, Reset::default());

        let err = OptionalJsonBody::<Reset>::from_request(request(None, "[1,"), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code, INVALID_BODY);
    }
}
