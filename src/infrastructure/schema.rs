// src/infrastructure/schema.rs
//
// Idempotent schema synchronisation for the card store.
use crate::domain::DomainError;
use crate::infrastructure::storage_error;
use rusqlite::Connection;
use tracing::{debug, info, instrument};

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT
)";

const CREATE_BOARDS: &str = "CREATE TABLE IF NOT EXISTS boards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
)";

const CREATE_CARDS: &str = "CREATE TABLE IF NOT EXISTS cards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(150) NOT NULL,
    description VARCHAR(500),
    responsable_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    creation_date TEXT NOT NULL,
    begin_date TEXT,
    due_date TEXT,
    state INTEGER NOT NULL DEFAULT 0,
    board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
    priority VARCHAR(10) CHECK (priority IN ('Baja', 'Media', 'Alta')),
    tags TEXT
)";

const CREATE_CARD_USER_ASSOCIATION: &str = "CREATE TABLE IF NOT EXISTS card_user_association (
    card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (card_id, user_id)
)";

const CREATE_INDEXES_AND_TRIGGERS: &str = "
CREATE INDEX IF NOT EXISTS idx_cards_board ON cards(board_id);
CREATE INDEX IF NOT EXISTS idx_card_user_association_user ON card_user_association(user_id);
CREATE TRIGGER IF NOT EXISTS cards_creation_date_immutable
BEFORE UPDATE OF creation_date ON cards
WHEN NEW.creation_date IS NOT OLD.creation_date
BEGIN
    SELECT RAISE(ABORT, 'creation_date is immutable');
END;
";

/// Tables in dependency order.
const TABLES: [(&str, &str); 4] = [
    ("users", CREATE_USERS),
    ("boards", CREATE_BOARDS),
    ("cards", CREATE_CARDS),
    ("card_user_association", CREATE_CARD_USER_ASSOCIATION),
];

/// Columns added to `cards` after its first release. Older databases get
/// them through `ALTER TABLE`.
const LATE_CARD_COLUMNS: [(&str, &str); 2] = [
    ("priority", "VARCHAR(10)"),
    ("tags", "TEXT"),
];

/// What a schema sync changed. Empty on an up-to-date database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    pub created_tables: Vec<String>,
    pub added_columns: Vec<String>,
}

impl SchemaReport {
    pub fn is_up_to_date(&self) -> bool {
        self.created_tables.is_empty() && self.added_columns.is_empty()
    }
}

/// Bring the database schema in line with the card model.
///
/// Safe to run on every start: existing tables are kept, missing tables,
/// columns, indexes and triggers are created.
#[instrument(level = "debug", skip(conn))]
pub fn sync_schema(conn: &Connection) -> Result<SchemaReport, DomainError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(storage_error)?;

    let mut report = SchemaReport::default();

    for (table, ddl) in TABLES {
        if table_exists(conn, table)? {
            debug!(table, "Table present");
            continue;
        }
        conn.execute(ddl, []).map_err(storage_error)?;
        info!(table, "Created table");
        report.created_tables.push(table.to_string());
    }

    let existing = column_names(conn, "cards")?;
    for (column, definition) in LATE_CARD_COLUMNS {
        if existing.iter().any(|c| c == column) {
            continue;
        }
        conn.execute(
            &format!("ALTER TABLE cards ADD COLUMN {column} {definition}"),
            [],
        )
        .map_err(storage_error)?;
        info!(column, "Added column to cards");
        report.added_columns.push(format!("cards.{column}"));
    }

    conn.execute_batch(CREATE_INDEXES_AND_TRIGGERS)
        .map_err(storage_error)?;

    Ok(report)
}

pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, DomainError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [table],
        |row| row.get::<_, bool>(0),
    )
    .map_err(storage_error)
}

pub fn column_names(conn: &Connection, table: &str) -> Result<Vec<String>, DomainError> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .map_err(storage_error)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(storage_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(storage_error)?;
    Ok(names)
}
