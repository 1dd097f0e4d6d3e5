use std::sync::Arc;

use async_trait::async_trait;
use diesel::result::{ConnectionError, DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::models::note::Note;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryNoteStore;
pub use sqlite::SqliteNoteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error(transparent)]
    Database(DieselError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("storage file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub fn from_diesel(error: DieselError) -> Self {
        match error {
            DieselError::NotFound => StoreError::NotFound,
            DieselError::DatabaseError(
                kind @ (DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation),
                info,
            ) => {
                let what = match kind {
                    DatabaseErrorKind::UniqueViolation => "unique",
                    _ => "foreign key",
                };
                StoreError::Constraint(format!("{}: {}", what, info.message()))
            }
            other => StoreError::Database(other),
        }
    }
}

impl From<DieselError> for StoreError {
    fn from(error: DieselError) -> Self {
        StoreError::from_diesel(error)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence gateway used by the HTTP handlers.
///
/// `insert` expects the id and both timestamps already filled in by the
/// caller. `find_all` makes no ordering promise.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert(&self, note: Note) -> StoreResult<Note>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Note>;

    async fn find_all(&self) -> StoreResult<Vec<Note>>;
}

pub type SharedNoteStore = Arc<dyn NoteStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diesel_not_found_maps_to_not_found() {
        assert!(matches!(
            StoreError::from_diesel(DieselError::NotFound),
            StoreError::NotFound
        ));
    }

    #[test]
    fn test_other_diesel_errors_stay_database_errors() {
        let error = StoreError::from(DieselError::RollbackTransaction);
        assert!(matches!(error, StoreError::Database(_)));
        assert_eq!(error.to_string(), DieselError::RollbackTransaction.to_string());
    }
}
