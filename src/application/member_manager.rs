// src/application/member_manager.rs
use crate::application::CardRepository;
use crate::domain::{Card, DomainError};
use tracing::info;

/// Maintains the card/user membership association.
pub struct MemberManager<R: CardRepository> {
    repository: R,
}

impl<R: CardRepository> MemberManager<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Add a member and return the card as stored afterwards
    pub fn add_member(&mut self, card_id: i64, user_id: i64) -> Result<Card, DomainError> {
        let added = self.repository.add_member(card_id, user_id)?;
        info!(card_id, user_id, added, "Add member");
        self.repository.get_card(card_id)
    }

    pub fn remove_member(&mut self, card_id: i64, user_id: i64) -> Result<Card, DomainError> {
        let removed = self.repository.remove_member(card_id, user_id)?;
        info!(card_id, user_id, removed, "Remove member");
        self.repository.get_card(card_id)
    }
}
