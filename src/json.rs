use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Deserializer;

use crate::errors::AppError;

pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024; // 64 KiB upper bound for request bodies

/// JSON body extractor. Decodes the first JSON value in the body and
/// ignores anything after it; no Content-Type header is required.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

fn parsing_error(err: serde_path_to_error::Error<serde_json::Error>) -> AppError {
    let path = err.path().to_string();
    let error = err.into_inner();
    let message = if path.is_empty() || path == "." {
        error.to_string()
    } else {
        format!("{path}: {error}")
    };
    AppError::InvalidJson(message)
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge
            } else {
                AppError::InvalidJson(format!(
                    "failed to read request body: {}",
                    rejection.body_text()
                ))
            }
        })?;

        let mut deserializer = Deserializer::from_slice(body.as_ref());
        let value = serde_path_to_error::deserialize(&mut deserializer).map_err(parsing_error)?;

        Ok(JsonBody(value))
    }
}
