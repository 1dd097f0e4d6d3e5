use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::note::Note;
use crate::schema::links;

/// Directed edge from one note to another. Only reachable through
/// `SqliteNoteStore`; no HTTP route creates or reads links.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Queryable,
    Selectable,
    Identifiable,
    Associations,
    Insertable,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = links)]
#[diesel(primary_key(link_id))]
#[diesel(belongs_to(Note, foreign_key = link_source_note_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Link {
    pub link_id: String,
    pub link_source_note_id: String,
    pub link_target_note_id: String,
    pub link_created_at: DateTime<Utc>,
    pub link_updated_at: DateTime<Utc>,
}

impl Link {
    pub fn new(source_note_id: impl Into<String>, target_note_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            link_id: Uuid::new_v4().to_string(),
            link_source_note_id: source_note_id.into(),
            link_target_note_id: target_note_id.into(),
            link_created_at: now,
            link_updated_at: now,
        }
    }
}
