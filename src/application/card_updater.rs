// src/application/card_updater.rs
use crate::application::CardRepository;
use crate::domain::{Card, CardUpdate, DomainError};
use tracing::debug;

pub struct CardUpdater<R: CardRepository> {
    repository: R,
}

impl<R: CardRepository> CardUpdater<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Apply a partial update. An empty update returns the card as stored.
    pub fn update_card(&mut self, card_id: i64, update: &CardUpdate) -> Result<Card, DomainError> {
        if update.is_empty() {
            debug!(card_id, "Empty update, nothing to write");
            return self.repository.get_card(card_id);
        }
        self.repository.update_card(card_id, update)
    }
}
