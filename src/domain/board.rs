// src/domain/board.rs
use serde::{Deserialize, Serialize};

/// Owning collection for cards. Every card belongs to exactly one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub name: String,
}
