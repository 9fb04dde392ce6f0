/*!
 * Read side of the catalog: game detail, extensions, collections and reference lists
 */

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::models::{Association, CreditRole, Game, Link, Reference, ReferenceEntry};
use crate::store::CatalogStore;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NamedView {
    pub name: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DescribedView {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryView {
    pub name: String,
    pub reference: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreditView {
    pub name: String,
    pub pseudo: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StoreLinkView {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AwardView {
    pub name: String,
    pub year: Option<i32>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Credits {
    pub authors: Vec<CreditView>,
    pub illustrators: Vec<CreditView>,
    pub publishers: Vec<CreditView>,
}

/// Short form used for base games, extensions and collection listings
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: String,
    pub title: String,
    pub release_date: DateTime<Utc>,
    pub recommended_age: Option<i32>,
    pub playtime: Option<i32>,
    pub difficulty_level: Option<DescribedView>,
    pub price_range: Option<NamedView>,
    pub categories: Vec<CategoryView>,
    #[serde(flatten)]
    pub credits: Credits,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameDetail {
    pub id: String,
    pub title: String,
    pub release_date: DateTime<Utc>,
    pub player_count: Option<String>,
    pub recommended_age: Option<i32>,
    pub playtime: Option<i32>,
    pub description: Option<String>,
    pub available: bool,
    pub difficulty_level: Option<DescribedView>,
    pub price_range: Option<NamedView>,
    pub categories: Vec<CategoryView>,
    pub stores_links: Vec<StoreLinkView>,
    pub game_awards: Vec<AwardView>,
    #[serde(flatten)]
    pub credits: Credits,
    pub collections: Vec<DescribedView>,
    pub is_extension: bool,
    pub base_game: Option<GameSummary>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CollectionGames {
    pub collection: CollectionView,
    pub games: Vec<GameSummary>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CollectionView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Links of one association joined with the reference rows they point to, in link order.
/// Dangling links are skipped.
async fn linked_entries<S>(
    store: &mut S,
    game_id: &str,
    association: Association,
) -> Result<Vec<(Link, ReferenceEntry)>>
where
    S: CatalogStore + ?Sized,
{
    let links = store.links(game_id, association).await?;
    if links.is_empty() {
        return Ok(vec![]);
    }
    let ids: Vec<String> = links.iter().map(|l| l.target_id.clone()).collect();
    let mut entries: HashMap<String, ReferenceEntry> = store
        .reference_entries(association.reference(), Some(ids.as_slice()))
        .await?
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect();
    Ok(links
        .into_iter()
        .filter_map(|l| {
            let entry = entries.remove(&l.target_id)?;
            Some((l, entry))
        })
        .collect())
}

async fn scalar_entry<S>(
    store: &mut S,
    reference: Reference,
    id: Option<&str>,
) -> Result<Option<ReferenceEntry>>
where
    S: CatalogStore + ?Sized,
{
    let ids = match id {
        Some(id) => [id.to_owned()],
        None => return Ok(None),
    };
    Ok(store.reference_entries(reference, Some(&ids[..])).await?.into_iter().next())
}

async fn categories<S>(store: &mut S, game_id: &str) -> Result<Vec<CategoryView>>
where
    S: CatalogStore + ?Sized,
{
    Ok(linked_entries(store, game_id, Association::Categories)
        .await?
        .into_iter()
        .map(|(_, e)| CategoryView { name: e.name, reference: e.detail })
        .collect())
}

async fn credited<S>(store: &mut S, game_id: &str, role: CreditRole) -> Result<Vec<CreditView>>
where
    S: CatalogStore + ?Sized,
{
    Ok(linked_entries(store, game_id, Association::Credits(role))
        .await?
        .into_iter()
        .map(|(_, e)| CreditView { name: e.name, pseudo: e.detail, avatar: e.avatar })
        .collect())
}

async fn credits<S>(store: &mut S, game_id: &str) -> Result<Credits>
where
    S: CatalogStore + ?Sized,
{
    Ok(Credits {
        authors: credited(store, game_id, CreditRole::Author).await?,
        illustrators: credited(store, game_id, CreditRole::Illustrator).await?,
        publishers: credited(store, game_id, CreditRole::Publisher).await?,
    })
}

async fn summary<S>(store: &mut S, game: Game) -> Result<GameSummary>
where
    S: CatalogStore + ?Sized,
{
    let difficulty_id = game.difficulty_level_id.as_deref();
    let difficulty_level = scalar_entry(store, Reference::DifficultyLevel, difficulty_id)
        .await?
        .map(|e| DescribedView { name: e.name, description: e.detail });
    let price_range = scalar_entry(store, Reference::PriceRange, game.price_range_id.as_deref())
        .await?
        .map(|e| NamedView { name: e.name });
    let categories = categories(store, &game.id).await?;
    let credits = credits(store, &game.id).await?;

    Ok(GameSummary {
        id: game.id,
        title: game.title,
        release_date: game.release_date,
        recommended_age: game.recommended_age,
        playtime: game.playtime,
        difficulty_level,
        price_range,
        categories,
        credits,
    })
}

/// A game with every association resolved, and a summary of its base game when it is an
/// extension
#[instrument(skip(store), err)]
pub async fn game_detail<S>(store: &mut S, id: &str) -> Result<GameDetail>
where
    S: CatalogStore + ?Sized,
{
    if id.trim().is_empty() {
        return Err(Error::MissingParameter("game id"));
    }
    let game = store
        .find_game(id)
        .await?
        .ok_or_else(|| Error::NotFound { what: "game", id: id.to_owned() })?;

    let base_game = match (game.is_extension, game.base_game_id.as_deref()) {
        (true, Some(base_id)) => match store.find_game(base_id).await? {
            Some(base) => Some(summary(store, base).await?),
            None => None,
        },
        _ => None,
    };

    let difficulty_id = game.difficulty_level_id.as_deref();
    let difficulty_level = scalar_entry(store, Reference::DifficultyLevel, difficulty_id)
        .await?
        .map(|e| DescribedView { name: e.name, description: e.detail });
    let price_range = scalar_entry(store, Reference::PriceRange, game.price_range_id.as_deref())
        .await?
        .map(|e| NamedView { name: e.name });
    let categories = categories(store, &game.id).await?;
    let stores_links = linked_entries(store, &game.id, Association::StoreLinks)
        .await?
        .into_iter()
        .map(|(l, e)| StoreLinkView { name: e.name, url: l.url })
        .collect();
    let game_awards = linked_entries(store, &game.id, Association::Awards)
        .await?
        .into_iter()
        .map(|(l, e)| AwardView { name: e.name, year: l.year })
        .collect();
    let credits = credits(store, &game.id).await?;
    let collections = linked_entries(store, &game.id, Association::Collections)
        .await?
        .into_iter()
        .map(|(_, e)| DescribedView { name: e.name, description: e.detail })
        .collect();

    Ok(GameDetail {
        id: game.id,
        title: game.title,
        release_date: game.release_date,
        player_count: game.player_count,
        recommended_age: game.recommended_age,
        playtime: game.playtime,
        description: game.description,
        available: game.available,
        difficulty_level,
        price_range,
        categories,
        stores_links,
        game_awards,
        credits,
        collections,
        is_extension: game.is_extension,
        base_game,
    })
}

#[instrument(skip(store), err)]
pub async fn extensions<S>(store: &mut S, base_game_id: &str) -> Result<Vec<GameSummary>>
where
    S: CatalogStore + ?Sized,
{
    if base_game_id.trim().is_empty() {
        return Err(Error::MissingParameter("base game id"));
    }
    let mut summaries = Vec::new();
    for game in store.extensions_of(base_game_id).await? {
        summaries.push(summary(store, game).await?);
    }
    Ok(summaries)
}

#[instrument(skip(store), err)]
pub async fn collection_games<S>(store: &mut S, collection_id: &str) -> Result<CollectionGames>
where
    S: CatalogStore + ?Sized,
{
    if collection_id.trim().is_empty() {
        return Err(Error::MissingParameter("collection id"));
    }
    let entry = scalar_entry(store, Reference::Collection, Some(collection_id))
        .await?
        .ok_or_else(|| Error::NotFound { what: "collection", id: collection_id.to_owned() })?;

    let mut games = Vec::new();
    for game in store.games_in_collection(collection_id).await? {
        games.push(summary(store, game).await?);
    }

    Ok(CollectionGames {
        collection: CollectionView { id: entry.id, name: entry.name, description: entry.detail },
        games,
    })
}

pub async fn list_references<S>(store: &mut S, reference: Reference) -> Result<Vec<ReferenceEntry>>
where
    S: CatalogStore + ?Sized,
{
    store.reference_entries(reference, None).await
}

pub async fn list_games<S>(store: &mut S) -> Result<Vec<Game>>
where
    S: CatalogStore + ?Sized,
{
    store.list_games().await
}
