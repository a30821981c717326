// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Card not found: {0}")]
    CardNotFound(i64),
    #[error("User not found: {0}")]
    UserNotFound(i64),
    #[error("Board not found: {0}")]
    BoardNotFound(i64),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid priority: {0} (expected Baja, Media or Alta)")]
    InvalidPriority(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
