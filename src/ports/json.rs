// src/ports/json.rs
use crate::domain::{Card, CardRecord};
use crate::infrastructure::SchemaReport;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

/// Renders cards as the JSON records handed to the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct JsonPresenter {
    pretty: bool,
}

impl JsonPresenter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }

    #[instrument(level = "debug", skip(card), fields(card_id = card.id))]
    pub fn render_card(&self, card: &Card) -> serde_json::Result<String> {
        self.render(&card.serialize())
    }

    pub fn render_cards(&self, cards: &[Card]) -> serde_json::Result<String> {
        let records: Vec<CardRecord> = cards.iter().map(Card::serialize).collect();
        self.render(&records)
    }

    pub fn render_schema_report(&self, report: &SchemaReport) -> serde_json::Result<String> {
        self.render(&json!({
            "createdTables": report.created_tables,
            "addedColumns": report.added_columns,
            "upToDate": report.is_up_to_date(),
        }))
    }
}

impl Default for JsonPresenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::sample_card;

    #[test]
    fn given_compact_presenter_when_rendering_card_then_single_line() {
        let card = sample_card(1, "Draft roadmap", 7);

        let json = JsonPresenter::compact().render_card(&card).unwrap();

        assert!(!json.contains('\n'));
        assert!(json.contains(r#""boardId":7"#));
        assert!(json.contains(r#""tags":[]"#));
    }

    #[test]
    fn given_no_cards_when_rendering_list_then_empty_array() {
        let json = JsonPresenter::compact().render_cards(&[]).unwrap();

        assert_eq!(json, "[]");
    }

    #[test]
    fn given_up_to_date_report_when_rendering_then_flags_it() {
        let json = JsonPresenter::compact()
            .render_schema_report(&SchemaReport::default())
            .unwrap();

        assert!(json.contains(r#""upToDate":true"#));
    }
}
