use anyhow::{Context, Result};
use boardcards::domain::{Board, User};
use boardcards::infrastructure::SqliteCardRepository;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Test fixture for working with a temporary card database
#[allow(dead_code)]
pub struct TestDatabase {
    _temp_dir: TempDir,
    pub database_path: PathBuf,
}

#[allow(dead_code)]
impl TestDatabase {
    /// Create an empty database file with the schema in place
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()
            .context("Failed to create temporary directory")?;
        let database_path = temp_dir.path().join("cards.db");

        SqliteCardRepository::open(&database_path, Duration::from_millis(500))
            .context("Failed to create test database")?;

        Ok(Self {
            _temp_dir: temp_dir,
            database_path,
        })
    }

    /// Open repository for this test database
    pub fn open_repository(&self) -> Result<SqliteCardRepository> {
        SqliteCardRepository::open(&self.database_path, Duration::from_millis(500))
    }

    /// Seed one board and two users
    pub fn seed(&self) -> Result<Seed> {
        let mut repo = self.open_repository()?;
        let board = repo.create_board("Backlog")?;
        let ana = repo.create_user("ana", Some("ana@example.com"))?;
        let ben = repo.create_user("ben", None)?;
        Ok(Seed { board, ana, ben })
    }
}

#[allow(dead_code)]
pub struct Seed {
    pub board: Board,
    pub ana: User,
    pub ben: User,
}

/// Keys of the serialized card record, in declaration order
#[allow(dead_code)]
pub const CARD_RECORD_KEYS: [&str; 12] = [
    "id",
    "title",
    "description",
    "responsableId",
    "creationDate",
    "beginDate",
    "dueDate",
    "state",
    "boardId",
    "priority",
    "tags",
    "members",
];
