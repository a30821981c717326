// src/util/testing.rs

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{CardFilter, CardRepository};
use crate::domain::{Card, CardState, CardUpdate, DomainError, NewCard, User};

/// Fixed timestamp used as creation date by the mock and the sample helpers.
pub fn sample_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub fn sample_card(id: i64, title: &str, board_id: i64) -> Card {
    Card {
        id,
        title: title.to_string(),
        description: None,
        responsible_id: None,
        creation_date: sample_timestamp(),
        begin_date: None,
        due_date: None,
        state: CardState::Todo,
        board_id,
        priority: None,
        tags: None,
        members: vec![],
    }
}

pub fn sample_user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: None,
    }
}

/// In-memory CardRepository for testing use cases
///
/// Behaves like the SQLite repository for the operations use cases rely on:
/// ids are assigned on insert, members must be known users and are never
/// duplicated.
///
/// # Examples
///
/// ```
/// use boardcards::util::testing::{sample_card, sample_user, MockCardRepository};
///
/// let mock = MockCardRepository::builder()
///     .with_card(sample_card(1, "Draft roadmap", 7))
///     .with_user(sample_user(3, "ana"))
///     .build();
/// ```
pub struct MockCardRepository {
    cards: BTreeMap<i64, Card>,
    users: HashMap<i64, User>,
    next_id: i64,
}

impl MockCardRepository {
    pub fn builder() -> MockCardRepositoryBuilder {
        MockCardRepositoryBuilder::new()
    }

    fn user(&self, id: i64) -> Result<User, DomainError> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(DomainError::UserNotFound(id))
    }

    fn card_mut(&mut self, id: i64) -> Result<&mut Card, DomainError> {
        self.cards.get_mut(&id).ok_or(DomainError::CardNotFound(id))
    }
}

impl CardRepository for MockCardRepository {
    fn get_card(&mut self, id: i64) -> Result<Card, DomainError> {
        self.cards
            .get(&id)
            .cloned()
            .ok_or(DomainError::CardNotFound(id))
    }

    fn list_cards(&mut self, filter: &CardFilter) -> Result<Vec<Card>, DomainError> {
        Ok(self
            .cards
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    fn create_card(&mut self, new_card: NewCard) -> Result<Card, DomainError> {
        new_card.validate()?;
        if let Some(responsible_id) = new_card.responsible_id {
            self.user(responsible_id)?;
        }
        let members = new_card
            .unique_member_ids()
            .into_iter()
            .map(|id| self.user(id))
            .collect::<Result<Vec<_>, _>>()?;

        let card = Card {
            id: self.next_id,
            title: new_card.title,
            description: new_card.description,
            responsible_id: new_card.responsible_id,
            creation_date: new_card.creation_date.unwrap_or_else(sample_timestamp),
            begin_date: new_card.begin_date,
            due_date: new_card.due_date,
            state: new_card.state,
            board_id: new_card.board_id,
            priority: new_card.priority,
            tags: new_card.tags,
            members,
        };
        self.next_id += 1;
        self.cards.insert(card.id, card.clone());
        Ok(card)
    }

    fn update_card(&mut self, id: i64, update: &CardUpdate) -> Result<Card, DomainError> {
        if let Some(Some(responsible_id)) = update.responsible_id {
            self.user(responsible_id)?;
        }
        let mut card = self.get_card(id)?;
        update.apply_to(&mut card)?;
        self.cards.insert(id, card.clone());
        Ok(card)
    }

    fn delete_card(&mut self, id: i64) -> Result<usize, DomainError> {
        self.cards
            .remove(&id)
            .map(|card| card.members.len())
            .ok_or(DomainError::CardNotFound(id))
    }

    fn add_member(&mut self, card_id: i64, user_id: i64) -> Result<bool, DomainError> {
        self.card_mut(card_id)?;
        let user = self.user(user_id)?;
        Ok(self.card_mut(card_id)?.add_member(user))
    }

    fn remove_member(&mut self, card_id: i64, user_id: i64) -> Result<bool, DomainError> {
        Ok(self.card_mut(card_id)?.remove_member(user_id))
    }
}

/// Builder for MockCardRepository
///
/// Provides a fluent interface for seeding the mock.
pub struct MockCardRepositoryBuilder {
    cards: BTreeMap<i64, Card>,
    users: HashMap<i64, User>,
}

impl MockCardRepositoryBuilder {
    pub fn new() -> Self {
        Self {
            cards: BTreeMap::new(),
            users: HashMap::new(),
        }
    }

    /// Add a card that can be retrieved by get_card
    ///
    /// Its members are registered as known users as well.
    pub fn with_card(mut self, card: Card) -> Self {
        for member in &card.members {
            self.users.insert(member.id, member.clone());
        }
        self.cards.insert(card.id, card);
        self
    }

    /// Add a user that can become a member or responsible
    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id, user);
        self
    }

    pub fn build(self) -> MockCardRepository {
        let next_id = self.cards.keys().max().map_or(1, |id| id + 1);
        MockCardRepository {
            cards: self.cards,
            users: self.users,
            next_id,
        }
    }
}

impl Default for MockCardRepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    let env_filter = match env::var("RUST_LOG") {
        Ok(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        Err(_) => EnvFilter::new("boardcards=trace"),
    };

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
