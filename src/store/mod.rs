/*!
 * Storage adapter the reconciler and the catalog reads are written against
 */

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Association, Game, GameChanges, Link, NewGame, Reference, ReferenceEntry};

#[cfg(test)]
pub mod memory;
pub mod pg;

pub use pg::PgStore;

/// A session on the catalog tables.
///
/// Reads and writes go through `&mut self` so an implementation can hold a single
/// connection, and `begin`/`commit`/`rollback` scope the writes made in between.
#[async_trait]
pub trait CatalogStore: Send {
    async fn begin(&mut self) -> Result<()>;
    async fn commit(&mut self) -> Result<()>;
    async fn rollback(&mut self) -> Result<()>;

    async fn find_game(&mut self, id: &str) -> Result<Option<Game>>;
    async fn find_game_by_title(&mut self, title: &str) -> Result<Option<Game>>;
    async fn list_games(&mut self) -> Result<Vec<Game>>;
    /// Games flagged as extensions of `base_game_id`
    async fn extensions_of(&mut self, base_game_id: &str) -> Result<Vec<Game>>;
    async fn games_in_collection(&mut self, collection_id: &str) -> Result<Vec<Game>>;
    async fn create_game(&mut self, game: NewGame) -> Result<Game>;
    async fn update_game(&mut self, id: &str, changes: GameChanges) -> Result<Game>;

    /// The subset of `ids` present in the reference table
    async fn existing_ids(&mut self, reference: Reference, ids: &[String]) -> Result<Vec<String>>;
    /// Rows of a reference table, restricted to `ids` when given
    async fn reference_entries(
        &mut self,
        reference: Reference,
        ids: Option<&[String]>,
    ) -> Result<Vec<ReferenceEntry>>;

    async fn links(&mut self, game_id: &str, association: Association) -> Result<Vec<Link>>;
    async fn delete_links(&mut self, game_id: &str, association: Association) -> Result<usize>;
    async fn insert_links(
        &mut self,
        game_id: &str,
        association: Association,
        links: &[Link],
    ) -> Result<usize>;
}
