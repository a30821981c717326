// src/domain/card.rs
use crate::constants::{MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use crate::domain::record::format_timestamp;
use crate::domain::{CardRecord, CardState, DomainError, Priority, User};
use chrono::NaiveDateTime;
use serde::Deserialize;

/// A task on a board.
///
/// `members` keeps the association's iteration order and never holds the
/// same user twice. `creation_date` is fixed at insert.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub responsible_id: Option<i64>,
    pub creation_date: NaiveDateTime,
    pub begin_date: Option<NaiveDateTime>,
    pub due_date: Option<NaiveDateTime>,
    pub state: CardState,
    pub board_id: i64,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub members: Vec<User>,
}

/// Row of the card/user association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardMember {
    pub card_id: i64,
    pub user_id: i64,
}

impl Card {
    pub fn serialize(&self) -> CardRecord {
        CardRecord {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            responsable_id: self.responsible_id,
            creation_date: format_timestamp(&self.creation_date),
            begin_date: self.begin_date.as_ref().map(format_timestamp),
            due_date: self.due_date.as_ref().map(format_timestamp),
            state: self.state.value(),
            board_id: self.board_id,
            priority: self.priority,
            tags: self.tags.clone().unwrap_or_default(),
            members: self.members.iter().map(User::serialize).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.serialize())
    }

    pub fn is_member(&self, user_id: i64) -> bool {
        self.members.iter().any(|m| m.id == user_id)
    }

    /// Returns false if the user was already a member.
    pub fn add_member(&mut self, user: User) -> bool {
        if self.is_member(user.id) {
            return false;
        }
        self.members.push(user);
        true
    }

    pub fn remove_member(&mut self, user_id: i64) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id != user_id);
        self.members.len() != before
    }

    pub fn member_links(&self) -> Vec<CardMember> {
        self.members
            .iter()
            .map(|m| CardMember {
                card_id: self.id,
                user_id: m.id,
            })
            .collect()
    }
}

/// Input for inserting a card. `id` is assigned by storage; `creation_date`
/// defaults to the insert time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub title: String,
    pub description: Option<String>,
    pub responsible_id: Option<i64>,
    pub creation_date: Option<NaiveDateTime>,
    pub begin_date: Option<NaiveDateTime>,
    pub due_date: Option<NaiveDateTime>,
    pub state: CardState,
    pub board_id: i64,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub member_ids: Vec<i64>,
}

impl NewCard {
    pub fn new(title: impl Into<String>, board_id: i64) -> Self {
        Self {
            title: title.into(),
            description: None,
            responsible_id: None,
            creation_date: None,
            begin_date: None,
            due_date: None,
            state: CardState::default(),
            board_id,
            priority: None,
            tags: None,
            member_ids: vec![],
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())?;
        validate_schedule(self.begin_date, self.due_date)?;
        validate_tags(self.tags.as_deref())?;
        Ok(())
    }

    /// Member ids with duplicates removed, first occurrence wins.
    pub fn unique_member_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = Vec::with_capacity(self.member_ids.len());
        for id in &self.member_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

/// Partial update. The outer `Option` means "leave unchanged"; for nullable
/// columns the inner `None` clears the value.
/// `id`, `creation_date` and `board_id` are not updatable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub responsible_id: Option<Option<i64>>,
    pub begin_date: Option<Option<NaiveDateTime>>,
    pub due_date: Option<Option<NaiveDateTime>>,
    pub state: Option<CardState>,
    pub priority: Option<Option<Priority>>,
    pub tags: Option<Option<Vec<String>>>,
}

impl CardUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply onto a loaded card and validate the merged result.
    pub fn apply_to(&self, card: &mut Card) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(description) = &self.description {
            card.description = description.clone();
        }
        if let Some(responsible_id) = self.responsible_id {
            card.responsible_id = responsible_id;
        }
        if let Some(begin_date) = self.begin_date {
            card.begin_date = begin_date;
        }
        if let Some(due_date) = self.due_date {
            card.due_date = due_date;
        }
        if let Some(state) = self.state {
            card.state = state;
        }
        if let Some(priority) = self.priority {
            card.priority = priority;
        }
        if let Some(tags) = &self.tags {
            card.tags = tags.clone();
        }

        validate_title(&card.title)?;
        validate_description(card.description.as_deref())?;
        validate_schedule(card.begin_date, card.due_date)?;
        validate_tags(card.tags.as_deref())
    }
}

/// Loosely typed card input as it arrives from JSON or the command line.
///
/// Converting into a [`NewCard`] enforces the required fields and the
/// closed priority set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "responsableId")]
    pub responsible_id: Option<i64>,
    pub creation_date: Option<NaiveDateTime>,
    pub begin_date: Option<NaiveDateTime>,
    pub due_date: Option<NaiveDateTime>,
    pub state: Option<CardState>,
    pub board_id: Option<i64>,
    pub priority: Option<String>,
    pub tags: Option<Vec<String>>,
    pub members: Vec<i64>,
}

impl CardDraft {
    /// Fill every field that is unset here from `other`.
    pub fn or(self, other: CardDraft) -> CardDraft {
        CardDraft {
            title: self.title.or(other.title),
            description: self.description.or(other.description),
            responsible_id: self.responsible_id.or(other.responsible_id),
            creation_date: self.creation_date.or(other.creation_date),
            begin_date: self.begin_date.or(other.begin_date),
            due_date: self.due_date.or(other.due_date),
            state: self.state.or(other.state),
            board_id: self.board_id.or(other.board_id),
            priority: self.priority.or(other.priority),
            tags: self.tags.or(other.tags),
            members: if self.members.is_empty() {
                other.members
            } else {
                self.members
            },
        }
    }

    pub fn into_new_card(self, default_state: CardState) -> Result<NewCard, DomainError> {
        let title = self.title.ok_or(DomainError::MissingField("title"))?;
        let board_id = self.board_id.ok_or(DomainError::MissingField("boardId"))?;
        let priority = self
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?;

        let card = NewCard {
            title,
            description: self.description,
            responsible_id: self.responsible_id,
            creation_date: self.creation_date,
            begin_date: self.begin_date,
            due_date: self.due_date,
            state: self.state.unwrap_or(default_state),
            board_id,
            priority,
            tags: self.tags,
            member_ids: self.members,
        };
        card.validate()?;
        Ok(card)
    }
}

impl TryFrom<CardDraft> for NewCard {
    type Error = DomainError;

    fn try_from(draft: CardDraft) -> Result<Self, Self::Error> {
        draft.into_new_card(CardState::default())
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::MissingField("title"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::Validation(format!(
            "title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), DomainError> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LEN => Err(
            DomainError::Validation(format!("description exceeds {MAX_DESCRIPTION_LEN} characters")),
        ),
        _ => Ok(()),
    }
}

fn validate_schedule(
    begin_date: Option<NaiveDateTime>,
    due_date: Option<NaiveDateTime>,
) -> Result<(), DomainError> {
    match (begin_date, due_date) {
        (Some(begin), Some(due)) if due < begin => Err(DomainError::Validation(format!(
            "due date {} is before begin date {}",
            format_timestamp(&due),
            format_timestamp(&begin)
        ))),
        _ => Ok(()),
    }
}

fn validate_tags(tags: Option<&[String]>) -> Result<(), DomainError> {
    match tags {
        Some(tags) if tags.iter().any(|t| t.trim().is_empty()) => Err(DomainError::Validation(
            "tags must not contain empty labels".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn user(id: i64, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            email: None,
        }
    }

    fn card() -> Card {
        Card {
            id: 1,
            title: "Draft roadmap".to_string(),
            description: None,
            responsible_id: None,
            creation_date: ts(2024, 1, 1),
            begin_date: None,
            due_date: None,
            state: CardState::Todo,
            board_id: 7,
            priority: Some(Priority::High),
            tags: None,
            members: vec![],
        }
    }

    #[test]
    fn given_card_when_serializing_then_state_is_scalar() {
        let mut card = card();
        card.state = CardState::Done;

        let record = card.serialize();

        assert_eq!(record.state, 2);
    }

    #[test]
    fn given_absent_dates_and_tags_when_serializing_then_null_and_empty() {
        let record = card().serialize();

        assert_eq!(record.begin_date, None);
        assert_eq!(record.due_date, None);
        assert!(record.tags.is_empty());
        assert_eq!(record.creation_date, "2024-01-01T00:00:00");
    }

    #[test]
    fn given_members_when_serializing_then_keeps_iteration_order() {
        let mut card = card();
        card.add_member(user(5, "zoe"));
        card.add_member(user(2, "al"));

        let record = card.serialize();

        let ids: Vec<i64> = record.members.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![5, 2]);
    }

    #[test]
    fn given_existing_member_when_adding_again_then_ignored() {
        let mut card = card();

        assert!(card.add_member(user(3, "kim")));
        assert!(!card.add_member(user(3, "kim")));
        assert_eq!(card.members.len(), 1);
        assert_eq!(
            card.member_links(),
            vec![CardMember {
                card_id: 1,
                user_id: 3
            }]
        );
    }

    #[test]
    fn given_member_when_removing_then_reports_change() {
        let mut card = card();
        card.add_member(user(3, "kim"));

        assert!(card.remove_member(3));
        assert!(!card.remove_member(3));
    }

    #[test]
    fn given_blank_title_when_validating_then_missing_field() {
        let new_card = NewCard::new("   ", 1);

        assert!(matches!(
            new_card.validate(),
            Err(DomainError::MissingField("title"))
        ));
    }

    #[test]
    fn given_long_title_when_validating_then_rejects() {
        let new_card = NewCard::new("x".repeat(MAX_TITLE_LEN + 1), 1);

        assert!(matches!(new_card.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn given_due_before_begin_when_validating_then_rejects() {
        let mut new_card = NewCard::new("Plan", 1);
        new_card.begin_date = Some(ts(2024, 2, 1));
        new_card.due_date = Some(ts(2024, 1, 1));

        assert!(matches!(new_card.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn given_duplicate_member_ids_when_deduplicating_then_keeps_first_order() {
        let mut new_card = NewCard::new("Plan", 1);
        new_card.member_ids = vec![4, 2, 4, 9, 2];

        assert_eq!(new_card.unique_member_ids(), vec![4, 2, 9]);
    }

    #[test]
    fn given_draft_without_board_when_converting_then_missing_field() {
        let draft = CardDraft {
            title: Some("Plan".to_string()),
            ..Default::default()
        };

        let result = NewCard::try_from(draft);

        assert!(matches!(result, Err(DomainError::MissingField("boardId"))));
    }

    #[test]
    fn given_draft_with_unknown_priority_when_converting_then_rejects() {
        let draft = CardDraft {
            title: Some("Plan".to_string()),
            board_id: Some(1),
            priority: Some("Urgente".to_string()),
            ..Default::default()
        };

        let result = NewCard::try_from(draft);

        assert!(matches!(result, Err(DomainError::InvalidPriority(_))));
    }

    #[test]
    fn given_draft_json_when_deserializing_then_accepts_camel_case() {
        let draft: CardDraft = serde_json::from_str(
            r#"{"title":"Plan","boardId":3,"responsableId":8,"state":"done","priority":"Media","tags":["a"]}"#,
        )
        .unwrap();

        let new_card = draft.into_new_card(CardState::Todo).unwrap();

        assert_eq!(new_card.board_id, 3);
        assert_eq!(new_card.responsible_id, Some(8));
        assert_eq!(new_card.state, CardState::Done);
        assert_eq!(new_card.priority, Some(Priority::Medium));
        assert_eq!(new_card.tags, Some(vec!["a".to_string()]));
    }

    #[test]
    fn given_two_drafts_when_combining_then_left_wins() {
        let flags = CardDraft {
            title: Some("From flags".to_string()),
            ..Default::default()
        };
        let file = CardDraft {
            title: Some("From file".to_string()),
            board_id: Some(2),
            members: vec![1],
            ..Default::default()
        };

        let merged = flags.or(file);

        assert_eq!(merged.title.as_deref(), Some("From flags"));
        assert_eq!(merged.board_id, Some(2));
        assert_eq!(merged.members, vec![1]);
    }

    #[test]
    fn given_update_when_applying_then_creation_date_is_untouched() {
        let mut card = card();
        let update = CardUpdate {
            title: Some("Renamed".to_string()),
            description: Some(Some("details".to_string())),
            priority: Some(None),
            state: Some(CardState::InProgress),
            ..Default::default()
        };

        update.apply_to(&mut card).unwrap();

        assert_eq!(card.title, "Renamed");
        assert_eq!(card.description.as_deref(), Some("details"));
        assert_eq!(card.priority, None);
        assert_eq!(card.state, CardState::InProgress);
        assert_eq!(card.creation_date, ts(2024, 1, 1));
    }

    #[test]
    fn given_update_making_schedule_invalid_when_applying_then_rejects() {
        let mut card = card();
        card.due_date = Some(ts(2024, 1, 10));
        let update = CardUpdate {
            begin_date: Some(Some(ts(2024, 2, 1))),
            ..Default::default()
        };

        assert!(update.apply_to(&mut card).is_err());
    }
}
