/*!
 * Game synchronization: upsert each game by title, then replace its association sets
 */

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::{debug, error, info, info_span, instrument, warn};
use tracing_futures::Instrument;
use uuid::Uuid;

use crate::config::BatchConfig;
use crate::error::{Error, Result};
use crate::input::{GameDraft, GameInput};
use crate::models::{Association, Game, GameChanges, Link, NewGame, Reference};
use crate::store::CatalogStore;

#[derive(Serialize, Debug, Default)]
pub struct ReconciliationReport {
    pub games: Vec<GameOutcome>,
}

impl ReconciliationReport {
    pub fn failed(&self) -> usize {
        self.games.iter().filter(|g| g.status == OutcomeStatus::Failed).count()
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    pub status: OutcomeStatus,
    /// On a failed game whose writes were not rolled back: the row write that stayed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<OutcomeStatus>,
    pub associations: Vec<AssociationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GameOutcome {
    fn pending(title: String) -> Self {
        GameOutcome {
            title,
            game_id: None,
            status: OutcomeStatus::Failed,
            persisted: None,
            associations: vec![],
            error: None,
        }
    }

    /// Turn whatever was reached into a failure. When the writes stay (`kept`), the game
    /// id and the association sets already replaced are reported with it.
    fn into_failure(mut self, error: &Error, kept: bool) -> Self {
        if kept && self.game_id.is_some() {
            self.persisted = Some(self.status);
        } else {
            self.game_id = None;
            self.associations.clear();
        }
        self.status = OutcomeStatus::Failed;
        self.error = Some(error.to_string());
        self
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Created,
    Updated,
    Failed,
}

/// What happened to one association set of one game
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssociationOutcome {
    pub association: Association,
    /// Distinct IDs in the input
    pub requested: usize,
    /// Rows written, i.e. the requested IDs that exist
    pub linked: usize,
    /// Rows deleted beforehand
    pub removed: usize,
}

/// A game that failed, with the outcome it had reached
struct Failure {
    error: Error,
    outcome: GameOutcome,
}

pub struct Reconciler {
    options: BatchConfig,
    clock: fn() -> DateTime<Utc>,
}

impl Reconciler {
    pub fn new(options: BatchConfig) -> Self {
        Reconciler { options, clock: Utc::now }
    }

    #[cfg(test)]
    pub fn with_clock(self, clock: fn() -> DateTime<Utc>) -> Self {
        Reconciler { clock, ..self }
    }

    /// Synchronize a batch, one game after the other.
    ///
    /// With `stop_on_first_error` the first failure is returned as is, and the games
    /// processed before it stay written. Otherwise failures are reported per game.
    pub async fn reconcile<S>(
        &self,
        store: &mut S,
        batch: &[GameInput],
    ) -> Result<ReconciliationReport>
    where
        S: CatalogStore + ?Sized,
    {
        let mut report = ReconciliationReport::default();
        for (position, input) in batch.iter().enumerate() {
            let label = input.label(position);
            let span = info_span!("reconcile_game", game = %label);
            match self.reconcile_game(store, input, position).instrument(span).await {
                Ok(outcome) => report.games.push(outcome),
                Err(Failure { error: e, .. }) if self.options.stop_on_first_error => {
                    error!(
                        game = %label,
                        "aborting batch after {} of {} games: {e}",
                        position,
                        batch.len()
                    );
                    return Err(e);
                }
                Err(Failure { error: e, outcome }) => {
                    error!(game = %label, persisted = ?outcome.persisted, "game failed: {e}");
                    report.games.push(outcome);
                }
            }
        }
        Ok(report)
    }

    async fn reconcile_game<S>(
        &self,
        store: &mut S,
        input: &GameInput,
        position: usize,
    ) -> std::result::Result<GameOutcome, Failure>
    where
        S: CatalogStore + ?Sized,
    {
        let mut outcome = GameOutcome::pending(input.label(position));
        let draft = match input.validate(position) {
            Ok(draft) => draft,
            Err(error) => {
                let outcome = outcome.into_failure(&error, false);
                return Err(Failure { error, outcome });
            }
        };

        if !self.options.transactional {
            return match self.apply(store, &draft, &mut outcome).await {
                Ok(()) => Ok(outcome),
                Err(error) => {
                    let outcome = outcome.into_failure(&error, true);
                    Err(Failure { error, outcome })
                }
            };
        }

        if let Err(error) = store.begin().await {
            let outcome = outcome.into_failure(&error, false);
            return Err(Failure { error, outcome });
        }
        let error = match self.apply(store, &draft, &mut outcome).await {
            Ok(()) => match store.commit().await {
                Ok(()) => return Ok(outcome),
                Err(error) => error,
            },
            Err(error) => error,
        };
        // Writes are only known to be gone once the rollback went through
        let kept = match store.rollback().await {
            Ok(()) => false,
            Err(rollback) => {
                warn!("rollback failed: {rollback}");
                true
            }
        };
        let outcome = outcome.into_failure(&error, kept);
        Err(Failure { error, outcome })
    }

    /// Upsert the game row then replace its association sets, recording progress in
    /// `outcome` as it goes
    async fn apply<S>(
        &self,
        store: &mut S,
        draft: &GameDraft<'_>,
        outcome: &mut GameOutcome,
    ) -> Result<()>
    where
        S: CatalogStore + ?Sized,
    {
        let now = (self.clock)();
        let input = draft.input;

        let difficulty = input.difficulty_level_id.as_deref();
        check_reference(store, draft, Reference::DifficultyLevel, difficulty).await?;
        check_reference(store, draft, Reference::PriceRange, input.price_range_id.as_deref())
            .await?;

        let (game, status) = match store.find_game_by_title(draft.title).await? {
            Some(previous) => {
                check_base_game(store, draft, Some(previous.id.as_str())).await?;
                let changes = GameChanges {
                    release_date: draft.release_date,
                    player_count: input.player_count.clone(),
                    recommended_age: input.recommended_age,
                    playtime: input.playtime,
                    description: input.description.clone(),
                    is_extension: input.is_extension,
                    base_game_id: input.base_game_id.clone(),
                    available: input.available,
                    difficulty_level_id: input
                        .difficulty_level_id
                        .clone()
                        .or(previous.difficulty_level_id),
                    price_range_id: input.price_range_id.clone().or(previous.price_range_id),
                    updated_at: now,
                };
                let game = store.update_game(&previous.id, changes).await?;
                info!(id = %game.id, "updated game {}", game.title);
                (game, OutcomeStatus::Updated)
            }
            None => {
                check_base_game(store, draft, None).await?;
                let new_game = NewGame {
                    id: Uuid::new_v4().to_string(),
                    title: draft.title.to_owned(),
                    release_date: draft.release_date,
                    player_count: input.player_count.clone(),
                    recommended_age: input.recommended_age,
                    playtime: input.playtime,
                    description: input.description.clone(),
                    is_extension: input.is_extension,
                    base_game_id: input.base_game_id.clone(),
                    available: input.available,
                    difficulty_level_id: input.difficulty_level_id.clone(),
                    price_range_id: input.price_range_id.clone(),
                    created_at: now,
                    updated_at: now,
                };
                let game = store.create_game(new_game).await?;
                info!(id = %game.id, "created game {}", game.title);
                (game, OutcomeStatus::Created)
            }
        };
        outcome.title = game.title.clone();
        outcome.game_id = Some(game.id.clone());
        outcome.status = status;

        for association in Association::ALL {
            if let Some(replaced) = replace_links(store, &game, input, association, now).await? {
                outcome.associations.push(replaced);
            }
        }
        Ok(())
    }
}

/// A scalar foreign key must resolve when it is given
async fn check_reference<S>(
    store: &mut S,
    draft: &GameDraft<'_>,
    reference: Reference,
    id: Option<&str>,
) -> Result<()>
where
    S: CatalogStore + ?Sized,
{
    let id = match id {
        Some(id) => id,
        None => return Ok(()),
    };
    let found = store.existing_ids(reference, &[id.to_owned()]).await?;
    if found.is_empty() {
        return Err(Error::UnknownReference {
            game: draft.title.to_owned(),
            reference,
            id: id.to_owned(),
        });
    }
    Ok(())
}

/// An extension's base game must exist, must not be an extension itself, and must not be
/// the game being written (`own_id`)
async fn check_base_game<S>(
    store: &mut S,
    draft: &GameDraft<'_>,
    own_id: Option<&str>,
) -> Result<()>
where
    S: CatalogStore + ?Sized,
{
    let base_id = match (draft.input.is_extension, draft.input.base_game_id.as_deref()) {
        (true, Some(id)) => id,
        _ => return Ok(()),
    };
    let game = || draft.title.to_owned();
    let invalid = || Error::InvalidBaseGame { game: game(), id: base_id.to_owned() };
    if own_id == Some(base_id) {
        return Err(invalid());
    }
    match store.find_game(base_id).await? {
        None => Err(Error::UnknownBaseGame { game: game(), id: base_id.to_owned() }),
        Some(base) if base.is_extension => Err(invalid()),
        Some(_) => Ok(()),
    }
}

/// Replace one association set of `game` with the valid IDs from `input`.
///
/// Untouched when the input list is empty. Otherwise the current rows are deleted before
/// the outcome of the validation is known: an all-invalid list deletes them and then fails.
#[instrument(skip(store, game, input, now), fields(game = %game.title))]
async fn replace_links<S>(
    store: &mut S,
    game: &Game,
    input: &GameInput,
    association: Association,
    now: DateTime<Utc>,
) -> Result<Option<AssociationOutcome>>
where
    S: CatalogStore + ?Sized,
{
    let requested = input.requested_ids(association);
    if requested.is_empty() {
        return Ok(None);
    }

    let existing = store.existing_ids(association.reference(), &requested).await?;
    let valid: Vec<&String> = requested.iter().filter(|id| existing.contains(id)).collect();

    let removed = store.delete_links(&game.id, association).await?;

    if valid.is_empty() {
        return Err(Error::NoValidReferences { game: game.title.clone(), association });
    }
    if valid.len() < requested.len() {
        let dropped: Vec<&String> = requested.iter().filter(|id| !existing.contains(id)).collect();
        warn!(?dropped, "ignoring unknown {association}");
    }

    let links: Vec<Link> = valid
        .into_iter()
        .map(|id| {
            let mut link = Link::to(id.as_str());
            match association {
                Association::Awards => link.year = Some(now.year()),
                Association::StoreLinks => link.url = input.store_url(id).map(str::to_owned),
                _ => {}
            }
            link
        })
        .collect();
    let linked = store.insert_links(&game.id, association, &links).await?;
    debug!(removed, linked, "replaced {association}");

    Ok(Some(AssociationOutcome { association, requested: requested.len(), linked, removed }))
}
