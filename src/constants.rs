// src/constants.rs
//
// Application-wide limits and default locations.

/// Maximum title length in characters, matching the `cards.title` column.
///
/// Used in: `domain/card.rs`
pub const MAX_TITLE_LEN: usize = 150;

/// Maximum description length in characters, matching `cards.description`.
///
/// Used in: `domain/card.rs`
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Directory below the platform data dir holding the default database.
pub const DATA_DIR_NAME: &str = "boardcards";

/// File name of the default database inside [`DATA_DIR_NAME`].
pub const DATABASE_FILE_NAME: &str = "cards.db";

/// File name of the config written by `init-config` below the platform config dir.
pub const CONFIG_FILE_NAME: &str = "boardcards.toml";

/// How long SQLite waits on a locked database before failing.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
