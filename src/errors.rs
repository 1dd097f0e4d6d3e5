use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error as StdError;
use thiserror::Error;
use tracing::Level;

use crate::logging::NoteEvent;
use crate::store::StoreError;

/// Errors surfaced at the HTTP boundary. Every variant renders as a
/// plain-text body carrying the message verbatim, newline-terminated.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidJson(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("404 page not found")]
    NotFound,

    #[error(transparent)]
    Storage(StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn event(&self) -> NoteEvent {
        match self {
            AppError::NotFound => NoteEvent::Missing,
            AppError::InvalidJson(_) | AppError::PayloadTooLarge => NoteEvent::DecodeRejected,
            AppError::Storage(_) => NoteEvent::StorageFailure,
        }
    }

    /// Client errors log at warn, server errors at error.
    fn log_level(&self) -> Level {
        if self.status_code().is_server_error() {
            Level::ERROR
        } else {
            Level::WARN
        }
    }

    fn log_error(&self) {
        let code = self.status_code();
        let event = self.event();
        if self.log_level() == Level::ERROR {
            tracing::error!(
                note_event = %event,
                error = %self,
                status_code = %code,
                source = ?self.source(),
                "Server error"
            );
        } else {
            tracing::warn!(
                note_event = %event,
                error = %self,
                status_code = %code,
                "Client error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log_error();
        (self.status_code(), format!("{}\n", self)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => AppError::NotFound,
            other => AppError::Storage(other),
        }
    }
}
