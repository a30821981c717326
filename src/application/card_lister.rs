// src/application/card_lister.rs
use crate::application::CardRepository;
use crate::domain::{Card, CardState, DomainError};

/// Criteria for listing cards. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub board_id: Option<i64>,
    pub state: Option<CardState>,
    pub member_id: Option<i64>,
}

impl CardFilter {
    pub fn for_board(board_id: i64) -> Self {
        Self {
            board_id: Some(board_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, card: &Card) -> bool {
        self.board_id.map_or(true, |id| card.board_id == id)
            && self.state.map_or(true, |state| card.state == state)
            && self.member_id.map_or(true, |id| card.is_member(id))
    }
}

pub struct CardLister<R: CardRepository> {
    repository: R,
}

impl<R: CardRepository> CardLister<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// List cards matching the filter
    ///
    /// # Arguments
    /// * `filter` - Board, state and member criteria; the default lists everything
    pub fn list_cards(&mut self, filter: &CardFilter) -> Result<Vec<Card>, DomainError> {
        self.repository.list_cards(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{sample_card, sample_user, MockCardRepository};

    #[test]
    fn given_no_filter_when_listing_cards_then_returns_all_cards() {
        // Arrange
        let mock = MockCardRepository::builder()
            .with_card(sample_card(1, "First", 1))
            .with_card(sample_card(2, "Second", 2))
            .build();
        let mut lister = CardLister::new(mock);

        // Act
        let result = lister.list_cards(&CardFilter::default()).unwrap();

        // Assert
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn given_board_filter_when_listing_cards_then_returns_only_that_board() {
        // Arrange
        let mock = MockCardRepository::builder()
            .with_card(sample_card(1, "First", 1))
            .with_card(sample_card(2, "Second", 2))
            .with_card(sample_card(3, "Third", 2))
            .build();
        let mut lister = CardLister::new(mock);

        // Act
        let result = lister.list_cards(&CardFilter::for_board(2)).unwrap();

        // Assert
        let ids: Vec<i64> = result.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn given_member_and_state_filter_when_matching_then_requires_both() {
        // Arrange
        let mut card = sample_card(1, "First", 1);
        card.state = CardState::Done;
        card.add_member(sample_user(4, "ana"));
        let filter = CardFilter {
            state: Some(CardState::Done),
            member_id: Some(4),
            ..Default::default()
        };

        // Act & Assert
        assert!(filter.matches(&card));
        card.remove_member(4);
        assert!(!filter.matches(&card));
    }
}
