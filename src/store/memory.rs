//! Vec-backed store for tests, with snapshot transactions.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use super::CatalogStore;
use crate::error::{Error, Result};
use crate::models::{Association, Game, GameChanges, Link, NewGame, Reference, ReferenceEntry};

#[derive(Clone, Debug, Default)]
struct Tables {
    games: Vec<Game>,
    references: HashMap<Reference, Vec<ReferenceEntry>>,
    links: Vec<(String, Association, Link)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Tables,
    snapshot: Option<Tables>,
    fail_inserts: Option<Association>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference(mut self, reference: Reference, id: &str, name: &str) -> Self {
        self.add_reference(reference, ReferenceEntry::named(id, name));
        self
    }

    pub fn add_reference(&mut self, reference: Reference, entry: ReferenceEntry) {
        self.tables.references.entry(reference).or_default().push(entry);
    }

    /// Make every insert into `association` fail, as a dropped connection would
    pub fn fail_inserts_into(&mut self, association: Association) {
        self.fail_inserts = Some(association);
    }

    pub fn games(&self) -> &[Game] {
        &self.tables.games
    }

    pub fn game_by_title(&self, title: &str) -> Option<&Game> {
        self.tables.games.iter().find(|g| g.title == title)
    }

    pub fn linked(&self, game_id: &str, association: Association) -> Vec<Link> {
        self.tables
            .links
            .iter()
            .filter(|(id, a, _)| id == game_id && *a == association)
            .map(|(_, _, link)| link.clone())
            .collect()
    }

    pub fn linked_ids(&self, game_id: &str, association: Association) -> Vec<String> {
        self.linked(game_id, association).into_iter().map(|l| l.target_id).collect()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn begin(&mut self) -> Result<()> {
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        if let Some(tables) = self.snapshot.take() {
            self.tables = tables;
        }
        Ok(())
    }

    async fn find_game(&mut self, id: &str) -> Result<Option<Game>> {
        Ok(self.tables.games.iter().find(|g| g.id == id).cloned())
    }

    async fn find_game_by_title(&mut self, title: &str) -> Result<Option<Game>> {
        Ok(self.game_by_title(title).cloned())
    }

    async fn list_games(&mut self) -> Result<Vec<Game>> {
        let mut games = self.tables.games.clone();
        games.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(games)
    }

    async fn extensions_of(&mut self, base_game_id: &str) -> Result<Vec<Game>> {
        let mut games: Vec<Game> = self
            .tables
            .games
            .iter()
            .filter(|g| g.is_extension && g.base_game_id.as_deref() == Some(base_game_id))
            .cloned()
            .collect();
        games.sort_by_key(|g| g.release_date);
        Ok(games)
    }

    async fn games_in_collection(&mut self, collection_id: &str) -> Result<Vec<Game>> {
        let ids: Vec<&String> = self
            .tables
            .links
            .iter()
            .filter(|(_, a, l)| *a == Association::Collections && l.target_id == collection_id)
            .map(|(id, _, _)| id)
            .collect();
        let mut games: Vec<Game> =
            self.tables.games.iter().filter(|g| ids.contains(&&g.id)).cloned().collect();
        games.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(games)
    }

    async fn create_game(&mut self, game: NewGame) -> Result<Game> {
        if self.game_by_title(&game.title).is_some() {
            let info =
                "duplicate key value violates unique constraint \"game_title_key\"".to_owned();
            let kind = DatabaseErrorKind::UniqueViolation;
            return Err(DieselError::DatabaseError(kind, Box::new(info)).into());
        }
        let game = Game {
            id: game.id,
            title: game.title,
            release_date: game.release_date,
            player_count: game.player_count,
            recommended_age: game.recommended_age,
            playtime: game.playtime,
            description: game.description,
            is_extension: game.is_extension,
            base_game_id: game.base_game_id,
            available: game.available,
            difficulty_level_id: game.difficulty_level_id,
            price_range_id: game.price_range_id,
            created_at: game.created_at,
            updated_at: game.updated_at,
        };
        self.tables.games.push(game.clone());
        Ok(game)
    }

    async fn update_game(&mut self, id: &str, changes: GameChanges) -> Result<Game> {
        let game = self
            .tables
            .games
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(Error::Db(DieselError::NotFound))?;
        game.release_date = changes.release_date;
        game.player_count = changes.player_count;
        game.recommended_age = changes.recommended_age;
        game.playtime = changes.playtime;
        game.description = changes.description;
        game.is_extension = changes.is_extension;
        game.base_game_id = changes.base_game_id;
        game.available = changes.available;
        game.difficulty_level_id = changes.difficulty_level_id;
        game.price_range_id = changes.price_range_id;
        game.updated_at = changes.updated_at;
        Ok(game.clone())
    }

    async fn existing_ids(&mut self, reference: Reference, ids: &[String]) -> Result<Vec<String>> {
        Ok(self
            .tables
            .references
            .get(&reference)
            .map(|rows| {
                rows.iter().filter(|r| ids.contains(&r.id)).map(|r| r.id.clone()).collect()
            })
            .unwrap_or_default())
    }

    async fn reference_entries(
        &mut self,
        reference: Reference,
        ids: Option<&[String]>,
    ) -> Result<Vec<ReferenceEntry>> {
        let rows = self.tables.references.get(&reference).cloned().unwrap_or_default();
        Ok(match ids {
            Some(ids) => rows.into_iter().filter(|r| ids.contains(&r.id)).collect(),
            None => rows,
        })
    }

    async fn links(&mut self, game_id: &str, association: Association) -> Result<Vec<Link>> {
        Ok(self.linked(game_id, association))
    }

    async fn delete_links(&mut self, game_id: &str, association: Association) -> Result<usize> {
        let before = self.tables.links.len();
        self.tables.links.retain(|(id, a, _)| !(id == game_id && *a == association));
        Ok(before - self.tables.links.len())
    }

    async fn insert_links(
        &mut self,
        game_id: &str,
        association: Association,
        links: &[Link],
    ) -> Result<usize> {
        if self.fail_inserts == Some(association) {
            return Err(DieselError::BrokenTransactionManager.into());
        }
        self.tables
            .links
            .extend(links.iter().map(|l| (game_id.to_owned(), association, l.clone())));
        Ok(links.len())
    }
}
