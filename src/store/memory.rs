use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::Note;

use super::{NoteStore, StoreError, StoreResult};

/// Process-local store, mainly for tests. Notes are listed in insertion
/// order.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn insert(&self, note: Note) -> StoreResult<Note> {
        let mut guard = self.notes.write().await;
        if guard.iter().any(|existing| existing.note_id == note.note_id) {
            return Err(StoreError::Constraint(format!(
                "unique: note {} already exists",
                note.note_id
            )));
        }
        guard.push(note.clone());
        Ok(note)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Note> {
        let guard = self.notes.read().await;
        guard
            .iter()
            .find(|note| note.note_id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_all(&self) -> StoreResult<Vec<Note>> {
        Ok(self.notes.read().await.clone())
    }
}
