use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::{SqlitePool, SqlitePooledConn};
use crate::models::{Link, Note, NoteWithLinks};
use crate::schema::{links, notes};

use super::{NoteStore, StoreError, StoreResult};

/// `NoteStore` backed by the pooled SQLite file opened at startup.
#[derive(Clone)]
pub struct SqliteNoteStore {
    pool: SqlitePool,
}

impl SqliteNoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores a link between two existing notes. A dangling source or
    /// target fails with `StoreError::Constraint`.
    pub async fn insert_link(&self, source_note_id: &str, target_note_id: &str) -> StoreResult<Link> {
        let link = Link::new(source_note_id, target_note_id);
        let mut conn = self.conn().await?;

        let stored = diesel::insert_into(links::table)
            .values(&link)
            .returning(Link::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(stored)
    }

    /// Loads a note and every link whose source it is.
    pub async fn find_with_links(&self, id: &str) -> StoreResult<NoteWithLinks> {
        let mut conn = self.conn().await?;

        let note = notes::table
            .find(id)
            .select(Note::as_select())
            .first(&mut conn)
            .await?;

        let note_links = Link::belonging_to(&note)
            .select(Link::as_select())
            .order(links::link_created_at.asc())
            .load(&mut conn)
            .await?;

        Ok(NoteWithLinks { note, note_links })
    }

    async fn conn(&self) -> StoreResult<SqlitePooledConn<'_>> {
        self.pool
            .get()
            .await
            .map_err(|err| StoreError::Pool(err.to_string()))
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn insert(&self, note: Note) -> StoreResult<Note> {
        let mut conn = self.conn().await?;

        // Single INSERT ... RETURNING so the row is written and read back
        // atomically.
        let stored = diesel::insert_into(notes::table)
            .values(&note)
            .returning(Note::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(stored)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Note> {
        let mut conn = self.conn().await?;

        let note = notes::table
            .find(id)
            .select(Note::as_select())
            .first(&mut conn)
            .await?;
        Ok(note)
    }

    async fn find_all(&self) -> StoreResult<Vec<Note>> {
        let mut conn = self.conn().await?;

        let all = notes::table
            .select(Note::as_select())
            .load(&mut conn)
            .await?;
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize;

    async fn open_store() -> (tempfile::TempDir, SqliteNoteStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = initialize(&dir.path().join("notes.db")).await.unwrap();
        (dir, SqliteNoteStore::new(pool))
    }

    #[tokio::test]
    async fn test_insert_then_find_round_trips() {
        let (_dir, store) = open_store().await;
        let note = Note::new("Recipe", "http://x/1");

        let stored = store.insert(note.clone()).await.unwrap();
        assert_eq!(stored, note);

        let found = store.find_by_id(&note.note_id).await.unwrap();
        assert_eq!(found, note);
    }

    #[tokio::test]
    async fn test_find_missing_is_not_found() {
        let (_dir, store) = open_store().await;
        let result = store.find_by_id("00000000-0000-0000-0000-000000000000").await;
        assert!(matches!(result, Err(StoreError::NotFound)));

        // Ids are opaque; malformed ones are simply absent
        let result = store.find_by_id("not-a-uuid").await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_all_empty_then_populated() {
        let (_dir, store) = open_store().await;
        assert!(store.find_all().await.unwrap().is_empty());

        let first = store.insert(Note::new("a", "")).await.unwrap();
        let second = store.insert(Note::new("b", "")).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&first));
        assert!(all.contains(&second));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_constraint_error() {
        let (_dir, store) = open_store().await;
        let note = Note::new("a", "");
        store.insert(note.clone()).await.unwrap();

        let result = store.insert(note).await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_links_load_with_source_note() {
        let (_dir, store) = open_store().await;
        let source = store.insert(Note::new("source", "")).await.unwrap();
        let target = store.insert(Note::new("target", "")).await.unwrap();

        let link = store
            .insert_link(&source.note_id, &target.note_id)
            .await
            .unwrap();
        assert_eq!(link.link_created_at, link.link_updated_at);

        let loaded = store.find_with_links(&source.note_id).await.unwrap();
        assert_eq!(loaded.note, source);
        assert_eq!(loaded.note_links, vec![link]);

        let target_links = store.find_with_links(&target.note_id).await.unwrap();
        assert!(target_links.note_links.is_empty());

        // Plain lookups do not carry links
        let plain = serde_json::to_value(store.find_by_id(&source.note_id).await.unwrap()).unwrap();
        assert!(plain.get("note_links").is_none());
    }

    #[tokio::test]
    async fn test_dangling_link_is_rejected() {
        let (_dir, store) = open_store().await;
        let source = store.insert(Note::new("source", "")).await.unwrap();

        let result = store
            .insert_link(&source.note_id, "00000000-0000-0000-0000-000000000000")
            .await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));
    }
}
