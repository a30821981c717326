// src/application/card_viewer.rs
use crate::application::CardFilter;
use crate::domain::{Card, CardRecord, CardUpdate, DomainError, NewCard};

pub trait CardRepository {
    fn get_card(&mut self, id: i64) -> Result<Card, DomainError>;

    /// Cards matching the filter, ordered by id
    fn list_cards(&mut self, filter: &CardFilter) -> Result<Vec<Card>, DomainError>;

    /// Validate and insert a card, returning it with its assigned id
    fn create_card(&mut self, new_card: NewCard) -> Result<Card, DomainError>;

    fn update_card(&mut self, id: i64, update: &CardUpdate) -> Result<Card, DomainError>;

    /// Delete a card and its member associations
    /// Returns the number of member associations removed with it
    fn delete_card(&mut self, id: i64) -> Result<usize, DomainError>;

    /// Returns false if the user already was a member
    fn add_member(&mut self, card_id: i64, user_id: i64) -> Result<bool, DomainError>;

    /// Returns false if the user was not a member
    fn remove_member(&mut self, card_id: i64, user_id: i64) -> Result<bool, DomainError>;
}

pub struct CardViewer<R: CardRepository> {
    repository: R,
}

impl<R: CardRepository> CardViewer<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn view_card(&mut self, card_id: i64) -> Result<Card, DomainError> {
        self.repository.get_card(card_id)
    }

    pub fn view_record(&mut self, card_id: i64) -> Result<CardRecord, DomainError> {
        Ok(self.view_card(card_id)?.serialize())
    }
}
