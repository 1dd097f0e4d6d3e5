use axum::{Extension, Router, extract::DefaultBodyLimit};

use crate::json::MAX_BODY_SIZE_BYTES;
use crate::store::SharedNoteStore;

pub mod notes;

/// Builds the application router around an injected note store.
pub fn create_router(store: SharedNoteStore) -> Router {
    tracing::debug!("Creating application router");
    Router::new()
        .merge(notes::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_BYTES))
        .layer(Extension(store))
}
