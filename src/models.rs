/*!
 * DB models for the catalog
 */

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

pub use crate::schema::{
    award, category, collection, difficulty_level, game, game_award, game_category, game_collection,
    game_credit, game_store_link, price_range, store, users,
};

#[derive(Queryable, Identifiable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = game)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub title: String,
    pub release_date: DateTime<Utc>,
    pub player_count: Option<String>,
    pub recommended_age: Option<i32>,
    pub playtime: Option<i32>,
    pub description: Option<String>,
    pub is_extension: bool,
    pub base_game_id: Option<String>,
    pub available: bool,
    pub difficulty_level_id: Option<String>,
    pub price_range_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = game)]
pub struct NewGame {
    pub id: String,
    pub title: String,
    pub release_date: DateTime<Utc>,
    pub player_count: Option<String>,
    pub recommended_age: Option<i32>,
    pub playtime: Option<i32>,
    pub description: Option<String>,
    pub is_extension: bool,
    pub base_game_id: Option<String>,
    pub available: bool,
    pub difficulty_level_id: Option<String>,
    pub price_range_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every mutable column of a game. `None` writes NULL.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = game, treat_none_as_null = true)]
pub struct GameChanges {
    pub release_date: DateTime<Utc>,
    pub player_count: Option<String>,
    pub recommended_age: Option<i32>,
    pub playtime: Option<i32>,
    pub description: Option<String>,
    pub is_extension: bool,
    pub base_game_id: Option<String>,
    pub available: bool,
    pub difficulty_level_id: Option<String>,
    pub price_range_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = game_category)]
pub struct NewGameCategory<'a> {
    pub game_id: &'a str,
    pub category_id: &'a str,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = game_award)]
pub struct NewGameAward<'a> {
    pub game_id: &'a str,
    pub award_id: &'a str,
    pub year: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = game_credit)]
pub struct NewGameCredit<'a> {
    pub game_id: &'a str,
    pub user_id: &'a str,
    pub role: &'a str,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = game_store_link)]
pub struct NewGameStoreLink<'a> {
    pub game_id: &'a str,
    pub store_id: &'a str,
    pub url: &'a str,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = game_collection)]
pub struct NewGameCollection<'a> {
    pub game_id: &'a str,
    pub collection_id: &'a str,
}

/// Lookup tables the reconciler validates against but never writes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reference {
    Category,
    Award,
    User,
    Store,
    Collection,
    DifficultyLevel,
    PriceRange,
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Category => "category",
            Self::Award => "award",
            Self::User => "user",
            Self::Store => "store",
            Self::Collection => "collection",
            Self::DifficultyLevel => "difficulty level",
            Self::PriceRange => "price range",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreditRole {
    Author,
    Illustrator,
    Publisher,
}

impl CreditRole {
    /// Value stored in `game_credit.role`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Illustrator => "illustrator",
            Self::Publisher => "publisher",
        }
    }
}

/// Many-to-many sets hanging off a game. Credits are one set per role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Association {
    Categories,
    Awards,
    Credits(CreditRole),
    StoreLinks,
    Collections,
}

impl Association {
    /// Processing order of a reconciliation
    pub const ALL: [Association; 7] = [
        Association::Categories,
        Association::Awards,
        Association::Credits(CreditRole::Author),
        Association::Credits(CreditRole::Illustrator),
        Association::Credits(CreditRole::Publisher),
        Association::StoreLinks,
        Association::Collections,
    ];

    pub fn reference(&self) -> Reference {
        match self {
            Self::Categories => Reference::Category,
            Self::Awards => Reference::Award,
            Self::Credits(_) => Reference::User,
            Self::StoreLinks => Reference::Store,
            Self::Collections => Reference::Collection,
        }
    }
}

impl Display for Association {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Categories => "categories",
            Self::Awards => "awards",
            Self::Credits(CreditRole::Author) => "authors",
            Self::Credits(CreditRole::Illustrator) => "illustrators",
            Self::Credits(CreditRole::Publisher) => "publishers",
            Self::StoreLinks => "store links",
            Self::Collections => "collections",
        })
    }
}

impl Serialize for Association {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One association row, minus the game id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub target_id: String,
    /// Award year
    pub year: Option<i32>,
    /// Store page
    pub url: Option<String>,
}

impl Link {
    pub fn to(target_id: impl Into<String>) -> Self {
        Link { target_id: target_id.into(), year: None, url: None }
    }
}

/// A reference table row flattened to what the catalog displays.
///
/// `detail` holds the category reference code, the description of collections and
/// difficulty levels, or the user pseudo. `avatar` is only set for users.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ReferenceEntry {
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        ReferenceEntry { id: id.into(), name: name.into(), detail: None, avatar: None }
    }
}
