// Query-side view of the tables declared in `migrate::TABLES`.

diesel::table! {
    notes (note_id) {
        note_id -> Text,
        note_title -> Text,
        note_content_url -> Text,
        note_created_at -> TimestamptzSqlite,
        note_updated_at -> TimestamptzSqlite,
    }
}

diesel::table! {
    links (link_id) {
        link_id -> Text,
        link_source_note_id -> Text,
        link_target_note_id -> Text,
        link_created_at -> TimestamptzSqlite,
        link_updated_at -> TimestamptzSqlite,
    }
}

diesel::joinable!(links -> notes (link_source_note_id));

diesel::allow_tables_to_appear_in_same_query!(links, notes,);
