// src/domain/state.rs
use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow stage of a card.
///
/// Persisted and serialized as its scalar value, never its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardState {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl CardState {
    pub const ALL: [CardState; 3] = [CardState::Todo, CardState::InProgress, CardState::Done];

    pub fn value(self) -> u8 {
        match self {
            CardState::Todo => 0,
            CardState::InProgress => 1,
            CardState::Done => 2,
        }
    }

    pub fn from_value(value: i64) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|state| i64::from(state.value()) == value)
            .ok_or_else(|| DomainError::InvalidState(value.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            CardState::Todo => "todo",
            CardState::InProgress => "in-progress",
            CardState::Done => "done",
        }
    }
}

impl fmt::Display for CardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the kebab-case name or the scalar value.
impl FromStr for CardState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::from_value(value);
        }
        let normalized = trimmed.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|state| state.name() == normalized)
            .ok_or_else(|| DomainError::InvalidState(s.to_string()))
    }
}
