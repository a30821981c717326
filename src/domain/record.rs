// src/domain/record.rs
use crate::domain::{DomainError, Priority};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Flat JSON shape of a card handed to the presentation layer.
///
/// Key names are part of the external contract, including the
/// `responsableId` spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CardRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub responsable_id: Option<i64>,
    pub creation_date: String,
    pub begin_date: Option<String>,
    pub due_date: Option<String>,
    pub state: u8,
    pub board_id: i64,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    pub members: Vec<UserRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

/// ISO-8601 without offset; microseconds only when non-zero.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() / 1_000 == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Parse an ISO-8601 timestamp, or a bare date meaning midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DomainError> {
    let raw = raw.trim();
    if let Ok(ts) = raw.parse::<NaiveDateTime>() {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| DomainError::Validation(format!("invalid timestamp: {raw}")))
}
