use axum::{Extension, Json, Router, extract::Path, http::StatusCode, routing::get};

use crate::errors::AppError;
use crate::json::JsonBody;
use crate::logging::{NoteEvent, SanitizedUrl};
use crate::models::{Note, NotePayload};
use crate::store::SharedNoteStore;

pub fn router() -> Router {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/:id", get(get_note))
}

#[tracing::instrument(name = "create_note", skip_all)]
pub async fn create_note(
    Extension(store): Extension<SharedNoteStore>,
    JsonBody(payload): JsonBody<Option<NotePayload>>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let note = payload.unwrap_or_default().into_note();
    let note = store.insert(note).await?;

    crate::log_note_event!(
        NoteEvent::Created,
        note_id = %note.note_id,
        content_url = %SanitizedUrl::new(&note.note_content_url),
        "Note created"
    );

    Ok((StatusCode::CREATED, Json(note)))
}

#[tracing::instrument(name = "get_note", skip(store))]
pub async fn get_note(
    Extension(store): Extension<SharedNoteStore>,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let note = store.find_by_id(&id).await?;

    crate::log_note_event!(NoteEvent::Fetched, note_id = %note.note_id, "Note fetched");

    Ok(Json(note))
}

#[tracing::instrument(name = "list_notes", skip_all)]
pub async fn list_notes(
    Extension(store): Extension<SharedNoteStore>,
) -> Result<Json<Vec<Note>>, AppError> {
    let notes = store.find_all().await?;

    crate::log_note_event!(NoteEvent::Listed, count = notes.len(), "Notes listed");

    Ok(Json(notes))
}
