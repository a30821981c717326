// src/application/card_deleter.rs
use crate::application::CardRepository;
use crate::domain::DomainError;

pub struct CardDeleter<R: CardRepository> {
    repository: R,
}

impl<R: CardRepository> CardDeleter<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Delete a card and return the number of member associations removed with it
    pub fn delete_card(&mut self, card_id: i64) -> Result<usize, DomainError> {
        self.repository.delete_card(card_id)
    }
}
