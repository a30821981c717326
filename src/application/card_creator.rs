// src/application/card_creator.rs
use crate::application::CardRepository;
use crate::domain::{Card, CardDraft, CardState, DomainError};
use tracing::{debug, info};

pub struct CardCreator<R: CardRepository> {
    repository: R,
    default_state: CardState,
}

impl<R: CardRepository> CardCreator<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            default_state: CardState::default(),
        }
    }

    /// State given to drafts that do not name one
    pub fn with_default_state(mut self, state: CardState) -> Self {
        self.default_state = state;
        self
    }

    /// Check the draft's required fields, then insert it
    pub fn create_card(&mut self, draft: CardDraft) -> Result<Card, DomainError> {
        let new_card = draft.into_new_card(self.default_state)?;
        debug!(?new_card, "Creating card");

        let card = self.repository.create_card(new_card)?;
        info!(card_id = card.id, board_id = card.board_id, "Created card");
        Ok(card)
    }
}
