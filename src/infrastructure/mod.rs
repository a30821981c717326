// src/infrastructure/mod.rs
pub mod config;
pub mod schema;
pub mod sqlite;

pub use config::Config;
pub use schema::{sync_schema, SchemaReport};
pub use sqlite::SqliteCardRepository;

use crate::domain::DomainError;

pub(crate) fn storage_error(e: rusqlite::Error) -> DomainError {
    DomainError::Storage(e.to_string())
}
