// src/infrastructure/sqlite.rs
use crate::application::{CardFilter, CardRepository};
use crate::domain::record::{format_timestamp, parse_timestamp};
use crate::domain::{Board, Card, CardState, CardUpdate, DomainError, NewCard, Priority, User};
use crate::infrastructure::schema::{self, SchemaReport};
use crate::infrastructure::storage_error;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

const CARD_COLUMNS: &str = "id, title, description, responsable_id, creation_date, begin_date, \
                            due_date, state, board_id, priority, tags";

pub struct SqliteCardRepository {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteCardRepository {
    /// Open (or create) the database file and sync its schema
    pub fn open<P: AsRef<Path>>(database_path: P, busy_timeout: Duration) -> Result<Self> {
        let repository = Self::connect(database_path, busy_timeout)?;
        let report = repository.sync_schema()?;
        info!(path = ?repository.path, ?report, "Opened card database");
        Ok(repository)
    }

    /// Open (or create) the database file without touching its schema
    pub fn connect<P: AsRef<Path>>(database_path: P, busy_timeout: Duration) -> Result<Self> {
        let path = PathBuf::from(database_path.as_ref());
        debug!(?path, "Opening card database");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.busy_timeout(busy_timeout)
            .context("Failed to set busy timeout")?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let repository = Self { conn, path: None };
        repository.sync_schema()?;
        Ok(repository)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn sync_schema(&self) -> Result<SchemaReport, DomainError> {
        schema::sync_schema(&self.conn)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn create_user(&mut self, username: &str, email: Option<&str>) -> Result<User, DomainError> {
        if username.trim().is_empty() {
            return Err(DomainError::MissingField("username"));
        }
        self.conn
            .execute(
                "INSERT INTO users (username, email) VALUES (?1, ?2)",
                params![username, email],
            )
            .map_err(storage_error)?;
        let id = self.conn.last_insert_rowid();
        info!(user_id = id, username, "Created user");
        self.get_user(id)
    }

    pub fn get_user(&self, id: i64) -> Result<User, DomainError> {
        self.conn
            .query_row(
                "SELECT id, username, email FROM users WHERE id = ?1",
                [id],
                user_from_row,
            )
            .optional()
            .map_err(storage_error)?
            .ok_or(DomainError::UserNotFound(id))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn create_board(&mut self, name: &str) -> Result<Board, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::MissingField("name"));
        }
        self.conn
            .execute("INSERT INTO boards (name) VALUES (?1)", [name])
            .map_err(storage_error)?;
        let id = self.conn.last_insert_rowid();
        info!(board_id = id, name, "Created board");
        self.get_board(id)
    }

    pub fn get_board(&self, id: i64) -> Result<Board, DomainError> {
        self.conn
            .query_row("SELECT id, name FROM boards WHERE id = ?1", [id], |row| {
                Ok(Board {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()
            .map_err(storage_error)?
            .ok_or(DomainError::BoardNotFound(id))
    }

    /// Delete a board together with its cards
    /// Returns the number of cards deleted
    #[instrument(level = "debug", skip(self))]
    pub fn delete_board(&mut self, id: i64) -> Result<usize, DomainError> {
        self.get_board(id)?;
        let tx = self.conn.transaction().map_err(storage_error)?;
        tx.execute(
            "DELETE FROM card_user_association
             WHERE card_id IN (SELECT id FROM cards WHERE board_id = ?1)",
            [id],
        )
        .map_err(storage_error)?;
        let cards_deleted = tx
            .execute("DELETE FROM cards WHERE board_id = ?1", [id])
            .map_err(storage_error)?;
        tx.execute("DELETE FROM boards WHERE id = ?1", [id])
            .map_err(storage_error)?;
        tx.commit().map_err(storage_error)?;

        info!(board_id = id, cards_deleted, "Deleted board");
        Ok(cards_deleted)
    }

    fn exists(&self, table: &str, id: i64) -> Result<bool, DomainError> {
        self.conn
            .query_row(
                &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
                [id],
                |row| row.get::<_, bool>(0),
            )
            .map_err(storage_error)
    }

    fn ensure_card(&self, id: i64) -> Result<(), DomainError> {
        if self.exists("cards", id)? {
            Ok(())
        } else {
            Err(DomainError::CardNotFound(id))
        }
    }

    fn ensure_user(&self, id: i64) -> Result<(), DomainError> {
        if self.exists("users", id)? {
            Ok(())
        } else {
            Err(DomainError::UserNotFound(id))
        }
    }

    fn ensure_board(&self, id: i64) -> Result<(), DomainError> {
        if self.exists("boards", id)? {
            Ok(())
        } else {
            Err(DomainError::BoardNotFound(id))
        }
    }

    /// Members in association insertion order
    fn load_members(&self, card_id: i64) -> Result<Vec<User>, DomainError> {
        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT u.id, u.username, u.email
                 FROM card_user_association a
                 JOIN users u ON u.id = a.user_id
                 WHERE a.card_id = ?1
                 ORDER BY a.rowid",
            )
            .map_err(storage_error)?;
        let members = stmt
            .query_map([card_id], user_from_row)
            .map_err(storage_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_error)?;
        Ok(members)
    }

    fn hydrate(&self, row: CardRow) -> Result<Card, DomainError> {
        let members = self.load_members(row.id)?;
        row.into_card(members)
    }
}

impl CardRepository for SqliteCardRepository {
    #[instrument(level = "debug", skip(self))]
    fn get_card(&mut self, id: i64) -> Result<Card, DomainError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
                [id],
                CardRow::from_row,
            )
            .optional()
            .map_err(storage_error)?
            .ok_or(DomainError::CardNotFound(id))?;
        self.hydrate(row)
    }

    #[instrument(level = "debug", skip(self))]
    fn list_cards(&mut self, filter: &CardFilter) -> Result<Vec<Card>, DomainError> {
        let mut conditions: Vec<&str> = vec![];
        let mut values: Vec<i64> = vec![];
        if let Some(board_id) = filter.board_id {
            conditions.push("board_id = ?");
            values.push(board_id);
        }
        if let Some(state) = filter.state {
            conditions.push("state = ?");
            values.push(i64::from(state.value()));
        }
        if let Some(member_id) = filter.member_id {
            conditions.push("id IN (SELECT card_id FROM card_user_association WHERE user_id = ?)");
            values.push(member_id);
        }

        let mut sql = format!("SELECT {CARD_COLUMNS} FROM cards");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql).map_err(storage_error)?;
        let rows = stmt
            .query_map(params_from_iter(values), CardRow::from_row)
            .map_err(storage_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_error)?;
        debug!(count = rows.len(), "Listed cards");

        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    #[instrument(level = "debug", skip(self, new_card), fields(title = %new_card.title))]
    fn create_card(&mut self, new_card: NewCard) -> Result<Card, DomainError> {
        new_card.validate()?;
        self.ensure_board(new_card.board_id)?;
        if let Some(responsible_id) = new_card.responsible_id {
            self.ensure_user(responsible_id)?;
        }
        let member_ids = new_card.unique_member_ids();
        for user_id in &member_ids {
            self.ensure_user(*user_id)?;
        }

        let creation_date = new_card
            .creation_date
            .unwrap_or_else(|| Utc::now().naive_utc());
        let tags = encode_tags(new_card.tags.as_deref())?;

        let tx = self.conn.transaction().map_err(storage_error)?;
        tx.execute(
            "INSERT INTO cards (title, description, responsable_id, creation_date, begin_date,
                                due_date, state, board_id, priority, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                new_card.title,
                new_card.description,
                new_card.responsible_id,
                format_timestamp(&creation_date),
                new_card.begin_date.as_ref().map(format_timestamp),
                new_card.due_date.as_ref().map(format_timestamp),
                new_card.state.value(),
                new_card.board_id,
                new_card.priority.map(Priority::as_str),
                tags,
            ],
        )
        .map_err(storage_error)?;
        let id = tx.last_insert_rowid();
        for user_id in &member_ids {
            tx.execute(
                "INSERT OR IGNORE INTO card_user_association (card_id, user_id) VALUES (?1, ?2)",
                params![id, user_id],
            )
            .map_err(storage_error)?;
        }
        tx.commit().map_err(storage_error)?;

        info!(card_id = id, members = member_ids.len(), "Inserted card");
        self.get_card(id)
    }

    #[instrument(level = "debug", skip(self, update))]
    fn update_card(&mut self, id: i64, update: &CardUpdate) -> Result<Card, DomainError> {
        let mut card = self.get_card(id)?;
        update.apply_to(&mut card)?;
        if let Some(responsible_id) = card.responsible_id {
            self.ensure_user(responsible_id)?;
        }

        let tags = encode_tags(card.tags.as_deref())?;
        self.conn
            .execute(
                "UPDATE cards
                 SET title = ?1, description = ?2, responsable_id = ?3, begin_date = ?4,
                     due_date = ?5, state = ?6, priority = ?7, tags = ?8
                 WHERE id = ?9",
                params![
                    card.title,
                    card.description,
                    card.responsible_id,
                    card.begin_date.as_ref().map(format_timestamp),
                    card.due_date.as_ref().map(format_timestamp),
                    card.state.value(),
                    card.priority.map(Priority::as_str),
                    tags,
                    id,
                ],
            )
            .map_err(storage_error)?;

        info!(card_id = id, "Updated card");
        self.get_card(id)
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_card(&mut self, id: i64) -> Result<usize, DomainError> {
        self.ensure_card(id)?;

        let tx = self.conn.transaction().map_err(storage_error)?;
        let memberships = tx
            .execute("DELETE FROM card_user_association WHERE card_id = ?1", [id])
            .map_err(storage_error)?;
        tx.execute("DELETE FROM cards WHERE id = ?1", [id])
            .map_err(storage_error)?;
        tx.commit().map_err(storage_error)?;

        info!(card_id = id, memberships, "Deleted card");
        Ok(memberships)
    }

    #[instrument(level = "debug", skip(self))]
    fn add_member(&mut self, card_id: i64, user_id: i64) -> Result<bool, DomainError> {
        self.ensure_card(card_id)?;
        self.ensure_user(user_id)?;
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO card_user_association (card_id, user_id) VALUES (?1, ?2)",
                params![card_id, user_id],
            )
            .map_err(storage_error)?;
        Ok(inserted > 0)
    }

    #[instrument(level = "debug", skip(self))]
    fn remove_member(&mut self, card_id: i64, user_id: i64) -> Result<bool, DomainError> {
        self.ensure_card(card_id)?;
        let removed = self
            .conn
            .execute(
                "DELETE FROM card_user_association WHERE card_id = ?1 AND user_id = ?2",
                params![card_id, user_id],
            )
            .map_err(storage_error)?;
        Ok(removed > 0)
    }
}

/// Raw `cards` row before decoding text columns.
struct CardRow {
    id: i64,
    title: String,
    description: Option<String>,
    responsible_id: Option<i64>,
    creation_date: String,
    begin_date: Option<String>,
    due_date: Option<String>,
    state: Value,
    board_id: i64,
    priority: Option<String>,
    tags: Option<String>,
}

impl CardRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            responsible_id: row.get(3)?,
            creation_date: row.get(4)?,
            begin_date: row.get(5)?,
            due_date: row.get(6)?,
            state: row.get(7)?,
            board_id: row.get(8)?,
            priority: row.get(9)?,
            tags: row.get(10)?,
        })
    }

    fn into_card(self, members: Vec<User>) -> Result<Card, DomainError> {
        Ok(Card {
            id: self.id,
            title: self.title,
            description: self.description,
            responsible_id: self.responsible_id,
            creation_date: parse_timestamp(&self.creation_date)?,
            begin_date: self.begin_date.as_deref().map(parse_timestamp).transpose()?,
            due_date: self.due_date.as_deref().map(parse_timestamp).transpose()?,
            state: decode_state(self.state)?,
            board_id: self.board_id,
            priority: self
                .priority
                .as_deref()
                .map(str::parse::<Priority>)
                .transpose()?,
            tags: decode_tags(self.tags.as_deref())?,
            members,
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
    })
}

fn encode_tags(tags: Option<&[String]>) -> Result<Option<String>, DomainError> {
    tags.map(serde_json::to_string)
        .transpose()
        .map_err(|e| DomainError::Storage(format!("Failed to encode tags: {e}")))
}

/// Tables written by older releases hold the state as text: either the
/// scalar (`'0'`) or the upper-case name (`'TODO'`).
fn decode_state(raw: Value) -> Result<CardState, DomainError> {
    match raw {
        Value::Integer(value) => CardState::from_value(value),
        Value::Text(text) => text.parse(),
        other => Err(DomainError::InvalidState(format!("{other:?}"))),
    }
}

/// A JSON `null` in the column means no tags.
fn decode_tags(raw: Option<&str>) -> Result<Option<Vec<String>>, DomainError> {
    raw.map(|s| serde_json::from_str::<Option<Vec<String>>>(s))
        .transpose()
        .map(Option::flatten)
        .map_err(|e| DomainError::Storage(format!("Failed to decode tags: {e}")))
}
