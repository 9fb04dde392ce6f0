/*!
 * Inbound game descriptions, as posted in a synchronization batch
 */

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use itertools::Itertools;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{Association, CreditRole};

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameInput {
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub player_count: Option<String>,
    pub recommended_age: Option<i32>,
    pub playtime: Option<i32>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_extension: bool,
    pub base_game_id: Option<String>,
    #[serde(default = "available_by_default")]
    pub available: bool,
    pub difficulty_level_id: Option<String>,
    pub price_range_id: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub awards: Vec<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub illustrators: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub store_links: Vec<StoreLinkInput>,
    #[serde(default)]
    pub collections: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreLinkInput {
    pub store_id: String,
    pub url: String,
}

fn available_by_default() -> bool {
    true
}

/// A game whose required fields are present and well-formed
#[derive(Debug, Clone)]
pub struct GameDraft<'a> {
    pub input: &'a GameInput,
    pub title: &'a str,
    pub release_date: DateTime<Utc>,
}

/// Parse a request body. Anything but an array of objects is rejected as a whole.
pub fn parse_batch(payload: &[u8]) -> Result<Vec<GameInput>> {
    Ok(serde_json::from_slice(payload)?)
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_release_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

impl GameInput {
    /// How to name this game in errors and logs, even when it has no title
    pub fn label(&self, position: usize) -> String {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title.to_owned(),
            _ => format!("#{}", position + 1),
        }
    }

    /// The title is the lookup key and is kept byte for byte, surrounding whitespace
    /// included. Only blank titles are rejected.
    pub fn validate(&self, position: usize) -> Result<GameDraft<'_>> {
        let title = match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => {
                return Err(Error::MissingField { game: self.label(position), field: "title" })
            }
        };
        let raw_date = self
            .release_date
            .as_deref()
            .filter(|date| !date.trim().is_empty())
            .ok_or_else(|| Error::MissingField { game: title.to_owned(), field: "releaseDate" })?;
        let release_date = parse_release_date(raw_date).ok_or_else(|| Error::InvalidField {
            game: title.to_owned(),
            field: "releaseDate",
            value: raw_date.to_owned(),
        })?;

        Ok(GameDraft { input: self, title, release_date })
    }

    /// IDs requested for an association, duplicates collapsed, first occurrence first
    pub fn requested_ids(&self, association: Association) -> Vec<String> {
        let ids: Vec<&String> = match association {
            Association::Categories => self.categories.iter().collect(),
            Association::Awards => self.awards.iter().collect(),
            Association::Credits(CreditRole::Author) => self.authors.iter().collect(),
            Association::Credits(CreditRole::Illustrator) => self.illustrators.iter().collect(),
            Association::Credits(CreditRole::Publisher) => self.publishers.iter().collect(),
            Association::StoreLinks => self.store_links.iter().map(|l| &l.store_id).collect(),
            Association::Collections => self.collections.iter().collect(),
        };
        ids.into_iter().unique().cloned().collect()
    }

    /// URL posted alongside a store ID, matched on the ID rather than the position
    pub fn store_url(&self, store_id: &str) -> Option<&str> {
        self.store_links.iter().find(|l| l.store_id == store_id).map(|l| l.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn game(value: serde_json::Value) -> GameInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_a_batch() {
        let batch = parse_batch(
            br#"[
                {"title": "Catan", "releaseDate": "1995-01-01", "categories": ["cat-strategy"]},
                {"title": "Carcassonne", "releaseDate": "2000-06-01T00:00:00Z",
                 "isExtension": false}
            ]"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].categories, vec!["cat-strategy"]);
        assert!(batch[0].available);
        assert!(!batch[1].is_extension);
        assert!(batch[1].awards.is_empty());
    }

    #[test]
    fn rejects_a_non_array_body() {
        let err = parse_batch(br#"{"title": "Catan"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn release_date_formats() {
        let date = parse_release_date("1995-01-01").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (1995, 1, 1));
        assert!(parse_release_date("2001-03-04T10:00:00+02:00").is_some());
        assert!(parse_release_date("first of may").is_none());
    }

    #[test]
    fn missing_title_names_the_position() {
        let input = game(serde_json::json!({"releaseDate": "1995-01-01"}));
        match input.validate(2).unwrap_err() {
            Error::MissingField { game, field } => {
                assert_eq!(game, "#3");
                assert_eq!(field, "title");
            }
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[test]
    fn title_is_kept_verbatim() {
        let input = game(serde_json::json!({"title": "  Catan ", "releaseDate": "1995-01-01"}));
        assert_eq!(input.validate(0).unwrap().title, "  Catan ");
        assert_eq!(input.label(0), "  Catan ");

        let input = game(serde_json::json!({"title": "   ", "releaseDate": "1995-01-01"}));
        assert!(matches!(input.validate(0), Err(Error::MissingField { field: "title", .. })));
    }

    #[test]
    fn missing_or_bad_release_date() {
        let input = game(serde_json::json!({"title": "Catan"}));
        assert!(matches!(
            input.validate(0),
            Err(Error::MissingField { field: "releaseDate", .. })
        ));

        let input = game(serde_json::json!({"title": "Catan", "releaseDate": "soon"}));
        assert!(matches!(input.validate(0), Err(Error::InvalidField { field: "releaseDate", .. })));
    }

    #[test]
    fn requested_ids_are_deduplicated() {
        let input = game(serde_json::json!({
            "title": "Catan",
            "releaseDate": "1995-01-01",
            "authors": ["u-teuber", "u-other", "u-teuber"],
            "storeLinks": [
                {"storeId": "s-1", "url": "https://one.example/catan"},
                {"storeId": "s-2", "url": "https://two.example/catan"},
                {"storeId": "s-1", "url": "https://one.example/other"}
            ]
        }));
        assert_eq!(
            input.requested_ids(Association::Credits(CreditRole::Author)),
            vec!["u-teuber", "u-other"]
        );
        assert_eq!(input.requested_ids(Association::StoreLinks), vec!["s-1", "s-2"]);
        assert_eq!(input.store_url("s-1"), Some("https://one.example/catan"));
        assert!(input.requested_ids(Association::Collections).is_empty());
    }
}
