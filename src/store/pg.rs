/*!
 * Postgres store on top of diesel-async
 */

use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::{
    pooled_connection::deadpool::{Object, Pool},
    AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager,
};
use itertools::Itertools;
use tracing::instrument;

use super::CatalogStore;
use crate::error::{Error, Result};
use crate::models::*;

pub struct PgStore {
    conn: Object<AsyncPgConnection>,
}

impl PgStore {
    /// Check a connection out of the pool for the lifetime of the store
    pub async fn connect(pool: &Pool<AsyncPgConnection>) -> Result<Self> {
        Ok(PgStore { conn: pool.get().await? })
    }

    fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }
}

fn display_name(first: Option<String>, last: Option<String>) -> String {
    first.into_iter().chain(last).join(" ")
}

/// id, first name, last name, pseudo, avatar
type UserRow = (String, Option<String>, Option<String>, Option<String>, Option<String>);

/// Award rows carry the year stamped by the caller; a link without one is refused
fn award_rows<'a>(game_id: &'a str, links: &'a [Link]) -> Result<Vec<NewGameAward<'a>>> {
    links
        .iter()
        .map(|l| {
            let year = l.year.ok_or_else(|| {
                let message =
                    format!("award {} linked to game {} without a year", l.target_id, game_id);
                Error::Db(diesel::result::Error::QueryBuilderError(message.into()))
            })?;
            Ok(NewGameAward { game_id, award_id: &l.target_id, year })
        })
        .collect()
}

#[async_trait]
impl CatalogStore for PgStore {
    #[instrument(skip_all, err)]
    async fn begin(&mut self) -> Result<()> {
        AnsiTransactionManager::begin_transaction(self.conn()).await?;
        Ok(())
    }

    #[instrument(skip_all, err)]
    async fn commit(&mut self) -> Result<()> {
        AnsiTransactionManager::commit_transaction(self.conn()).await?;
        Ok(())
    }

    #[instrument(skip_all, err)]
    async fn rollback(&mut self) -> Result<()> {
        AnsiTransactionManager::rollback_transaction(self.conn()).await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn find_game(&mut self, id: &str) -> Result<Option<Game>> {
        Ok(game::table.find(id).first::<Game>(self.conn()).await.optional()?)
    }

    #[instrument(skip(self), err)]
    async fn find_game_by_title(&mut self, title: &str) -> Result<Option<Game>> {
        Ok(game::table
            .filter(game::title.eq(title))
            .first::<Game>(self.conn())
            .await
            .optional()?)
    }

    #[instrument(skip(self), err)]
    async fn list_games(&mut self) -> Result<Vec<Game>> {
        Ok(game::table.order(game::title.asc()).load::<Game>(self.conn()).await?)
    }

    #[instrument(skip(self), err)]
    async fn extensions_of(&mut self, base_game_id: &str) -> Result<Vec<Game>> {
        Ok(game::table
            .filter(game::base_game_id.eq(base_game_id))
            .filter(game::is_extension.eq(true))
            .order(game::release_date.asc())
            .load::<Game>(self.conn())
            .await?)
    }

    #[instrument(skip(self), err)]
    async fn games_in_collection(&mut self, collection_id: &str) -> Result<Vec<Game>> {
        Ok(game::table
            .inner_join(game_collection::table)
            .filter(game_collection::collection_id.eq(collection_id))
            .select(game::all_columns)
            .order(game::title.asc())
            .load::<Game>(self.conn())
            .await?)
    }

    #[instrument(skip(self, new_game), fields(title = %new_game.title), err)]
    async fn create_game(&mut self, new_game: NewGame) -> Result<Game> {
        Ok(diesel::insert_into(game::table)
            .values(&new_game)
            .get_result::<Game>(self.conn())
            .await?)
    }

    #[instrument(skip(self, changes), err)]
    async fn update_game(&mut self, id: &str, changes: GameChanges) -> Result<Game> {
        Ok(diesel::update(game::table.find(id))
            .set(&changes)
            .get_result::<Game>(self.conn())
            .await?)
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()), err)]
    async fn existing_ids(&mut self, reference: Reference, ids: &[String]) -> Result<Vec<String>> {
        let conn = self.conn();
        let found = match reference {
            Reference::Category => {
                category::table
                    .select(category::id)
                    .filter(category::id.eq_any(ids))
                    .load::<String>(conn)
                    .await?
            }
            Reference::Award => {
                award::table
                    .select(award::id)
                    .filter(award::id.eq_any(ids))
                    .load::<String>(conn)
                    .await?
            }
            Reference::User => {
                users::table
                    .select(users::id)
                    .filter(users::id.eq_any(ids))
                    .load::<String>(conn)
                    .await?
            }
            Reference::Store => {
                store::table
                    .select(store::id)
                    .filter(store::id.eq_any(ids))
                    .load::<String>(conn)
                    .await?
            }
            Reference::Collection => {
                collection::table
                    .select(collection::id)
                    .filter(collection::id.eq_any(ids))
                    .load::<String>(conn)
                    .await?
            }
            Reference::DifficultyLevel => {
                difficulty_level::table
                    .select(difficulty_level::id)
                    .filter(difficulty_level::id.eq_any(ids))
                    .load::<String>(conn)
                    .await?
            }
            Reference::PriceRange => {
                price_range::table
                    .select(price_range::id)
                    .filter(price_range::id.eq_any(ids))
                    .load::<String>(conn)
                    .await?
            }
        };
        Ok(found)
    }

    #[instrument(skip(self, ids), err)]
    async fn reference_entries(
        &mut self,
        reference: Reference,
        ids: Option<&[String]>,
    ) -> Result<Vec<ReferenceEntry>> {
        let conn = self.conn();
        let entries: Vec<ReferenceEntry> = match reference {
            Reference::Category => {
                let mut query = category::table
                    .select((category::id, category::name, category::reference))
                    .order(category::name.asc())
                    .into_boxed();
                if let Some(ids) = ids {
                    query = query.filter(category::id.eq_any(ids));
                }
                query
                    .load::<(String, String, Option<String>)>(conn)
                    .await?
                    .into_iter()
                    .map(|(id, name, detail)| ReferenceEntry { id, name, detail, avatar: None })
                    .collect()
            }
            Reference::Award => {
                let mut query = award::table
                    .select((award::id, award::name))
                    .order(award::name.asc())
                    .into_boxed();
                if let Some(ids) = ids {
                    query = query.filter(award::id.eq_any(ids));
                }
                query
                    .load::<(String, String)>(conn)
                    .await?
                    .into_iter()
                    .map(|(id, name)| ReferenceEntry::named(id, name))
                    .collect()
            }
            Reference::User => {
                let mut query = users::table
                    .select((
                        users::id,
                        users::first_name,
                        users::last_name,
                        users::pseudo,
                        users::avatar,
                    ))
                    .order((users::last_name.asc(), users::first_name.asc()))
                    .into_boxed();
                if let Some(ids) = ids {
                    query = query.filter(users::id.eq_any(ids));
                }
                query
                    .load::<UserRow>(conn)
                    .await?
                    .into_iter()
                    .map(|(id, first, last, pseudo, avatar)| ReferenceEntry {
                        id,
                        name: display_name(first, last),
                        detail: pseudo,
                        avatar,
                    })
                    .collect()
            }
            Reference::Store => {
                let mut query = store::table
                    .select((store::id, store::name))
                    .order(store::name.asc())
                    .into_boxed();
                if let Some(ids) = ids {
                    query = query.filter(store::id.eq_any(ids));
                }
                query
                    .load::<(String, String)>(conn)
                    .await?
                    .into_iter()
                    .map(|(id, name)| ReferenceEntry::named(id, name))
                    .collect()
            }
            Reference::Collection => {
                let mut query = collection::table
                    .select((collection::id, collection::name, collection::description))
                    .order(collection::name.asc())
                    .into_boxed();
                if let Some(ids) = ids {
                    query = query.filter(collection::id.eq_any(ids));
                }
                query
                    .load::<(String, String, Option<String>)>(conn)
                    .await?
                    .into_iter()
                    .map(|(id, name, detail)| ReferenceEntry { id, name, detail, avatar: None })
                    .collect()
            }
            Reference::DifficultyLevel => {
                let mut query = difficulty_level::table
                    .select((
                        difficulty_level::id,
                        difficulty_level::name,
                        difficulty_level::description,
                    ))
                    .order(difficulty_level::name.asc())
                    .into_boxed();
                if let Some(ids) = ids {
                    query = query.filter(difficulty_level::id.eq_any(ids));
                }
                query
                    .load::<(String, String, Option<String>)>(conn)
                    .await?
                    .into_iter()
                    .map(|(id, name, detail)| ReferenceEntry { id, name, detail, avatar: None })
                    .collect()
            }
            Reference::PriceRange => {
                let mut query = price_range::table
                    .select((price_range::id, price_range::name))
                    .order(price_range::name.asc())
                    .into_boxed();
                if let Some(ids) = ids {
                    query = query.filter(price_range::id.eq_any(ids));
                }
                query
                    .load::<(String, String)>(conn)
                    .await?
                    .into_iter()
                    .map(|(id, name)| ReferenceEntry::named(id, name))
                    .collect()
            }
        };
        Ok(entries)
    }

    #[instrument(skip(self), err)]
    async fn links(&mut self, game_id: &str, association: Association) -> Result<Vec<Link>> {
        let conn = self.conn();
        let links: Vec<Link> = match association {
            Association::Categories => game_category::table
                .filter(game_category::game_id.eq(game_id))
                .select(game_category::category_id)
                .load::<String>(conn)
                .await?
                .into_iter()
                .map(Link::to)
                .collect(),
            Association::Awards => game_award::table
                .filter(game_award::game_id.eq(game_id))
                .select((game_award::award_id, game_award::year))
                .load::<(String, i32)>(conn)
                .await?
                .into_iter()
                .map(|(target_id, year)| Link { target_id, year: Some(year), url: None })
                .collect(),
            Association::Credits(role) => game_credit::table
                .filter(game_credit::game_id.eq(game_id))
                .filter(game_credit::role.eq(role.as_str()))
                .select(game_credit::user_id)
                .load::<String>(conn)
                .await?
                .into_iter()
                .map(Link::to)
                .collect(),
            Association::StoreLinks => game_store_link::table
                .filter(game_store_link::game_id.eq(game_id))
                .select((game_store_link::store_id, game_store_link::url))
                .load::<(String, String)>(conn)
                .await?
                .into_iter()
                .map(|(target_id, url)| Link { target_id, year: None, url: Some(url) })
                .collect(),
            Association::Collections => game_collection::table
                .filter(game_collection::game_id.eq(game_id))
                .select(game_collection::collection_id)
                .load::<String>(conn)
                .await?
                .into_iter()
                .map(Link::to)
                .collect(),
        };
        Ok(links)
    }

    #[instrument(skip(self), err)]
    async fn delete_links(&mut self, game_id: &str, association: Association) -> Result<usize> {
        let conn = self.conn();
        let deleted = match association {
            Association::Categories => {
                diesel::delete(game_category::table.filter(game_category::game_id.eq(game_id)))
                    .execute(conn)
                    .await?
            }
            Association::Awards => {
                diesel::delete(game_award::table.filter(game_award::game_id.eq(game_id)))
                    .execute(conn)
                    .await?
            }
            Association::Credits(role) => {
                diesel::delete(
                    game_credit::table
                        .filter(game_credit::game_id.eq(game_id))
                        .filter(game_credit::role.eq(role.as_str())),
                )
                .execute(conn)
                .await?
            }
            Association::StoreLinks => {
                diesel::delete(game_store_link::table.filter(game_store_link::game_id.eq(game_id)))
                    .execute(conn)
                    .await?
            }
            Association::Collections => {
                diesel::delete(game_collection::table.filter(game_collection::game_id.eq(game_id)))
                    .execute(conn)
                    .await?
            }
        };
        Ok(deleted)
    }

    #[instrument(skip(self, links), fields(count = links.len()), err)]
    async fn insert_links(
        &mut self,
        game_id: &str,
        association: Association,
        links: &[Link],
    ) -> Result<usize> {
        if links.is_empty() {
            return Ok(0);
        }
        let conn = self.conn();
        let inserted = match association {
            Association::Categories => {
                let rows: Vec<_> = links
                    .iter()
                    .map(|l| NewGameCategory { game_id, category_id: &l.target_id })
                    .collect();
                diesel::insert_into(game_category::table).values(&rows).execute(conn).await?
            }
            Association::Awards => {
                let rows = award_rows(game_id, links)?;
                diesel::insert_into(game_award::table).values(&rows).execute(conn).await?
            }
            Association::Credits(role) => {
                let rows: Vec<_> = links
                    .iter()
                    .map(|l| NewGameCredit { game_id, user_id: &l.target_id, role: role.as_str() })
                    .collect();
                diesel::insert_into(game_credit::table).values(&rows).execute(conn).await?
            }
            Association::StoreLinks => {
                let rows: Vec<_> = links
                    .iter()
                    .map(|l| NewGameStoreLink {
                        game_id,
                        store_id: &l.target_id,
                        url: l.url.as_deref().unwrap_or_default(),
                    })
                    .collect();
                diesel::insert_into(game_store_link::table).values(&rows).execute(conn).await?
            }
            Association::Collections => {
                let rows: Vec<_> = links
                    .iter()
                    .map(|l| NewGameCollection { game_id, collection_id: &l.target_id })
                    .collect();
                diesel::insert_into(game_collection::table).values(&rows).execute(conn).await?
            }
        };
        Ok(inserted)
    }
}
