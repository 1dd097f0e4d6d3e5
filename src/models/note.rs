use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::link::Link;
use crate::schema::notes;

/// A stored note. JSON keys mirror the column names, which is why a note
/// created from `{"title": ..}` comes back as `{"note_title": ..}`.
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Insertable, Serialize, Deserialize,
)]
#[diesel(table_name = notes)]
#[diesel(primary_key(note_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Note {
    pub note_id: String,
    pub note_title: String,
    pub note_content_url: String,
    pub note_created_at: DateTime<Utc>,
    pub note_updated_at: DateTime<Utc>,
}

impl Note {
    /// Fresh note with a new v4 id; both timestamps are the same instant.
    pub fn new(title: impl Into<String>, content_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            note_id: Uuid::new_v4().to_string(),
            note_title: title.into(),
            note_content_url: content_url.into(),
            note_created_at: now,
            note_updated_at: now,
        }
    }
}

/// Create-note request body. Missing or `null` fields decode to empty
/// strings; unknown fields are ignored. Only a JSON object is accepted.
#[derive(Debug, Default)]
pub struct NotePayload {
    title: Option<String>,
    content_url: Option<String>,
}

#[derive(Deserialize)]
struct NotePayloadFields {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content_url: Option<String>,
}

// The derived struct visitor also takes a sequence as positional fields,
// so go through an object first.
impl<'de> Deserialize<'de> for NotePayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let fields = NotePayloadFields::deserialize(Value::Object(object))
            .map_err(de::Error::custom)?;
        Ok(Self {
            title: fields.title,
            content_url: fields.content_url,
        })
    }
}

impl NotePayload {
    pub fn into_note(self) -> Note {
        Note::new(
            self.title.unwrap_or_default(),
            self.content_url.unwrap_or_default(),
        )
    }
}

/// A note together with the links whose source it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteWithLinks {
    #[serde(flatten)]
    pub note: Note,
    pub note_links: Vec<Link>,
}
