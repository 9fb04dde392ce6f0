/*!
 * Actual command handlers
 */

use clap::{Subcommand, ValueEnum};

use crate::config::BatchConfig;
use crate::framing::Response;
use crate::models::Reference;
use crate::store::CatalogStore;

pub mod read;
pub mod sync;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Synchronize a JSON array of games. `-` reads standard input.
    Sync { file: String },
    /// Show a game with its categories, credits, awards, stores and collections
    Show { game_id: String },
    /// List the extensions of a base game
    Extensions { base_game_id: String },
    /// List the games of a collection
    Collection { collection_id: String },
    /// Dump a table
    List { table: Table },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Games,
    Categories,
    Awards,
    Stores,
    Collections,
    Difficulties,
    PriceRanges,
    Users,
}

impl Table {
    /// `None` for the games table
    fn reference(self) -> Option<Reference> {
        match self {
            Self::Games => None,
            Self::Categories => Some(Reference::Category),
            Self::Awards => Some(Reference::Award),
            Self::Stores => Some(Reference::Store),
            Self::Collections => Some(Reference::Collection),
            Self::Difficulties => Some(Reference::DifficultyLevel),
            Self::PriceRanges => Some(Reference::PriceRange),
            Self::Users => Some(Reference::User),
        }
    }
}

pub async fn run<S>(store: &mut S, batch: &BatchConfig, command: &Command) -> Response
where
    S: CatalogStore + ?Sized,
{
    match command {
        Command::Sync { file } => sync::from_file(store, batch, file).await,
        Command::Show { game_id } => read::show(store, game_id).await,
        Command::Extensions { base_game_id } => read::extensions(store, base_game_id).await,
        Command::Collection { collection_id } => read::collection(store, collection_id).await,
        Command::List { table } => read::list(store, *table).await,
    }
}
