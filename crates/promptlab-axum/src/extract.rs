//! JSON body extractors with `INVALID_JSON` rejections.
//!
//! Bodies are decoded regardless of `Content-Type` so plain `curl -d`
//! requests work.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::HttpError;

const INVALID_JSON: &str = "INVALID_JSON";

/// A required JSON body.
///
/// Empty bodies and `null` are rejected with "Request body must contain
/// JSON data".
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

/// An optional JSON body; empty bodies and `null` decode to `T::default()`.
#[derive(Debug, Clone)]
pub struct JsonBodyOrDefault<T>(pub T);

async fn read_body<S: Send + Sync>(req: Request, state: &S) -> Result<Bytes, HttpError> {
    Bytes::from_request(req, state)
        .await
        .map_err(|rejection| HttpError::bad_request(INVALID_JSON, rejection.body_text()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<Option<T>, HttpError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| {
        HttpError::bad_request(
            INVALID_JSON,
            format!("Request body must contain valid JSON data: {e}"),
        )
    })?;
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| HttpError::bad_request(INVALID_JSON, format!("Invalid request body: {e}")))
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = read_body(req, state).await?;
        decode(&bytes)?.map(Self).ok_or_else(|| {
            HttpError::bad_request(INVALID_JSON, "Request body must contain JSON data")
        })
    }
}

impl<S, T> FromRequest<S> for JsonBodyOrDefault<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = read_body(req, state).await?;
        Ok(Self(decode(&bytes)?.unwrap_or_default()))
    }
}
