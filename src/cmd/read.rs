/*!
 * Catalog read commands
 */

use crate::catalog;
use crate::framing::{self, Response};
use crate::store::CatalogStore;

use super::Table;

pub async fn show<S: CatalogStore + ?Sized>(store: &mut S, game_id: &str) -> Response {
    framing::read("Game retrieved successfully", catalog::game_detail(store, game_id).await)
}

pub async fn extensions<S: CatalogStore + ?Sized>(store: &mut S, base_game_id: &str) -> Response {
    let extensions = catalog::extensions(store, base_game_id).await;
    framing::read("Extensions retrieved successfully", extensions)
}

pub async fn collection<S: CatalogStore + ?Sized>(store: &mut S, collection_id: &str) -> Response {
    framing::read(
        "Games retrieved successfully from the collection",
        catalog::collection_games(store, collection_id).await,
    )
}

pub async fn list<S: CatalogStore + ?Sized>(store: &mut S, table: Table) -> Response {
    match table.reference() {
        Some(reference) => framing::read(
            "Entries retrieved successfully",
            catalog::list_references(store, reference).await,
        ),
        None => framing::read("Games retrieved successfully", catalog::list_games(store).await),
    }
}
