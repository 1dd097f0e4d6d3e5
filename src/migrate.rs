//! Declarative table definitions and the additive "ensure schema" step run
//! once at startup.
//!
//! Tables are created when absent. For tables that already exist, any
//! declared column missing from the file is added with `ALTER TABLE`.
//! Nothing is ever dropped or retyped, so an older database file keeps its
//! data across upgrades.

use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub nullable: bool,
    pub primary_key: bool,
    pub default: Option<&'static str>,
    pub references: Option<ForeignKey>,
}

impl ColumnDef {
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
            primary_key: false,
            default: None,
            references: None,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some(ForeignKey { table, column });
        self
    }

    /// Column clause as used inside `CREATE TABLE`.
    pub fn definition(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        if let Some(fk) = self.references {
            sql.push_str(&format!(" REFERENCES {}({})", fk.table, fk.column));
        }
        sql
    }

    /// `ALTER TABLE ... ADD COLUMN` for an existing table. SQLite refuses a
    /// NOT NULL column without a default here, so such columns are added
    /// as nullable.
    pub fn add_column_sql(&self, table: &str) -> String {
        let mut sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, self.name, self.sql_type);
        if let Some(default) = self.default {
            if !self.nullable {
                sql.push_str(" NOT NULL");
            }
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        if let Some(fk) = self.references {
            sql.push_str(&format!(" REFERENCES {}({})", fk.table, fk.column));
        }
        sql
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(ColumnDef::definition)
            .collect::<Vec<_>>()
            .join(",\n    ");
        format!("CREATE TABLE IF NOT EXISTS {} (\n    {}\n)", self.name, columns)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }
}

pub const NOTES: TableDef = TableDef {
    name: "notes",
    columns: &[
        ColumnDef::new("note_id", "TEXT").primary_key(),
        ColumnDef::new("note_title", "TEXT").not_null().default_value("''"),
        ColumnDef::new("note_content_url", "TEXT")
            .not_null()
            .default_value("''"),
        ColumnDef::new("note_created_at", "TIMESTAMP").not_null(),
        ColumnDef::new("note_updated_at", "TIMESTAMP").not_null(),
    ],
};

pub const LINKS: TableDef = TableDef {
    name: "links",
    columns: &[
        ColumnDef::new("link_id", "TEXT").primary_key(),
        ColumnDef::new("link_source_note_id", "TEXT")
            .not_null()
            .references("notes", "note_id"),
        ColumnDef::new("link_target_note_id", "TEXT")
            .not_null()
            .references("notes", "note_id"),
        ColumnDef::new("link_created_at", "TIMESTAMP").not_null(),
        ColumnDef::new("link_updated_at", "TIMESTAMP").not_null(),
    ],
};

/// Referenced tables come first.
pub const TABLES: &[TableDef] = &[NOTES, LINKS];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub created_tables: Vec<String>,
    pub added_columns: Vec<String>,
}

impl SchemaReport {
    pub fn is_unchanged(&self) -> bool {
        self.created_tables.is_empty() && self.added_columns.is_empty()
    }
}

#[derive(QueryableByName)]
struct ColumnName {
    #[diesel(sql_type = Text)]
    name: String,
}

pub fn existing_columns(conn: &mut SqliteConnection, table: &str) -> QueryResult<Vec<String>> {
    let rows = diesel::sql_query("SELECT name FROM pragma_table_info(?)")
        .bind::<Text, _>(table)
        .load::<ColumnName>(conn)?;
    Ok(rows.into_iter().map(|row| row.name).collect())
}

pub fn ensure_schema(conn: &mut SqliteConnection) -> QueryResult<SchemaReport> {
    conn.transaction(|conn| {
        let mut report = SchemaReport::default();

        for table in TABLES {
            let existing = existing_columns(conn, table.name)?;

            if existing.is_empty() {
                diesel::sql_query(table.create_sql()).execute(conn)?;
                tracing::debug!(table = table.name, "Created table");
                report.created_tables.push(table.name.to_string());
                continue;
            }

            for column in table.columns {
                if existing.iter().any(|name| name == column.name) {
                    continue;
                }

                if column.primary_key {
                    tracing::warn!(
                        table = table.name,
                        column = column.name,
                        "Primary key column missing from existing table; leaving it as is"
                    );
                    continue;
                }

                diesel::sql_query(column.add_column_sql(table.name)).execute(conn)?;
                tracing::debug!(table = table.name, column = column.name, "Added column");
                report
                    .added_columns
                    .push(format!("{}.{}", table.name, column.name));
            }
        }

        Ok(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::sql_types::BigInt;

    #[derive(QueryableByName)]
    struct Count {
        #[diesel(sql_type = BigInt)]
        count: i64,
    }

    fn open() -> SqliteConnection {
        SqliteConnection::establish(":memory:").unwrap()
    }

    #[test]
    fn test_create_sql_lists_constraints() {
        let sql = LINKS.create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS links ("));
        assert!(sql.contains("link_id TEXT PRIMARY KEY"));
        assert!(sql.contains("link_source_note_id TEXT NOT NULL REFERENCES notes(note_id)"));
        assert!(sql.contains("link_target_note_id TEXT NOT NULL REFERENCES notes(note_id)"));
    }

    #[test]
    fn test_add_column_sql_relaxes_not_null_without_default() {
        let created = NOTES.column("note_created_at").unwrap();
        assert_eq!(
            created.add_column_sql("notes"),
            "ALTER TABLE notes ADD COLUMN note_created_at TIMESTAMP"
        );

        let title = NOTES.column("note_title").unwrap();
        assert_eq!(
            title.add_column_sql("notes"),
            "ALTER TABLE notes ADD COLUMN note_title TEXT NOT NULL DEFAULT ''"
        );
    }

    #[test]
    fn test_ensure_schema_creates_all_tables() {
        let mut conn = open();
        let report = ensure_schema(&mut conn).unwrap();
        assert_eq!(report.created_tables, vec!["notes", "links"]);
        assert!(report.added_columns.is_empty());

        for table in TABLES {
            let columns = existing_columns(&mut conn, table.name).unwrap();
            let declared: Vec<&str> = table.columns.iter().map(|c| c.name).collect();
            assert_eq!(columns, declared);
        }
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let mut conn = open();
        ensure_schema(&mut conn).unwrap();
        let second = ensure_schema(&mut conn).unwrap();
        assert!(second.is_unchanged());
    }

    #[test]
    fn test_ensure_schema_adds_missing_columns_and_keeps_rows() {
        let mut conn = open();
        diesel::sql_query("CREATE TABLE notes (note_id TEXT PRIMARY KEY, legacy TEXT)")
            .execute(&mut conn)
            .unwrap();
        diesel::sql_query("INSERT INTO notes (note_id, legacy) VALUES ('n1', 'kept')")
            .execute(&mut conn)
            .unwrap();

        let report = ensure_schema(&mut conn).unwrap();
        assert_eq!(report.created_tables, vec!["links"]);
        assert_eq!(
            report.added_columns,
            vec![
                "notes.note_title",
                "notes.note_content_url",
                "notes.note_created_at",
                "notes.note_updated_at",
            ]
        );

        let columns = existing_columns(&mut conn, "notes").unwrap();
        assert!(columns.contains(&"legacy".to_string()));

        let rows: Count = diesel::sql_query(
            "SELECT COUNT(*) AS count FROM notes WHERE legacy = 'kept' AND note_title = ''",
        )
        .get_result(&mut conn)
        .unwrap();
        assert_eq!(rows.count, 1);
    }
}
