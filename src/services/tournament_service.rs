//! Fixture list maintenance: generation per format, manual fixtures and rotation continuation.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{MatchEntity, MatchPatch},
        repository::Repository,
    },
    dto::{
        sse::MatchChange,
        tournament::{FixtureView, ManualFixtureRequest},
    },
    error::ServiceError,
    services::{
        board_service::{fixture_views, team_name},
        fixtures::{self, FixtureFormat},
        match_service::{load_context, teams_of},
        placeholders::resolve_fixtures,
        sse_events::{broadcast_match_updated, reported},
    },
    state::{
        SharedState,
        kits::TeamId,
        session::Session,
        tournament::{Fixture, GameResult},
    },
};

/// Load a match the caller manages, with its team count and recorded results.
async fn managed(
    repository: &Repository,
    session: &Session,
    match_id: Uuid,
) -> Result<(MatchEntity, TeamId, Vec<GameResult>), ServiceError> {
    let (entity, field) = load_context(repository, match_id).await?;
    session.require_manager(entity.creator_id)?;
    let num_teams = teams_of(&entity, &field);
    let games = repository.list_games(match_id).await?;
    let results = games.iter().map(GameResult::from).collect();
    Ok((entity, num_teams, results))
}

/// Persist `fixtures` (and optionally the mode) and return them as views.
async fn store_fixtures(
    state: &SharedState,
    repository: &Repository,
    entity: &MatchEntity,
    fixtures: Vec<Fixture>,
    patch: MatchPatch,
) -> Result<Vec<FixtureView>, ServiceError> {
    let patch = MatchPatch {
        fixtures: Some(fixtures),
        ..patch
    };
    let updated = repository
        .update_match(entity.id, &patch)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{}` not found", entity.id)))?;

    let games = repository.list_games(entity.id).await?;
    let results: Vec<GameResult> = games.iter().map(GameResult::from).collect();
    broadcast_match_updated(state, entity.id, MatchChange::Fixtures);
    Ok(fixture_views(&updated.fixtures, &games, &results, |team| {
        team_name(&updated.team_configs, team)
    }))
}

/// Generate the fixtures of `format`, replacing any earlier fixtures of the same phase.
pub async fn generate(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    format: FixtureFormat,
) -> Result<Vec<FixtureView>, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let (entity, num_teams, _) = managed(&repository, session, match_id).await?;

        let generated = fixtures::generate(format, num_teams)?;
        let count = generated.len();
        let merged = fixtures::replace_phase(entity.fixtures.clone(), format.phase(), generated);
        let patch = MatchPatch {
            match_mode: Some(format.mode()),
            ..MatchPatch::default()
        };

        info!(match_id = %match_id, ?format, fixtures = count, "fixtures generated");
        store_fixtures(state, &repository, &entity, merged, patch).await
    })
    .await
}

/// Append a fixture entered by hand.
pub async fn add_fixture(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    request: ManualFixtureRequest,
) -> Result<Vec<FixtureView>, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let (entity, num_teams, _) = managed(&repository, session, match_id).await?;

        let fixture = fixtures::manual(&entity.fixtures, num_teams, request.into())?;
        info!(match_id = %match_id, phase = %fixture.phase, label = %fixture.label, "fixture added");
        let mut list = entity.fixtures.clone();
        list.push(fixture);
        store_fixtures(state, &repository, &entity, list, MatchPatch::default()).await
    })
    .await
}

pub async fn delete_fixture(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    fixture_id: Uuid,
) -> Result<Vec<FixtureView>, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let (entity, _, _) = managed(&repository, session, match_id).await?;

        if !entity.fixtures.iter().any(|fixture| fixture.id == fixture_id) {
            return Err(ServiceError::NotFound(format!(
                "fixture `{fixture_id}` not found"
            )));
        }
        let list: Vec<Fixture> = entity
            .fixtures
            .iter()
            .filter(|fixture| fixture.id != fixture_id)
            .cloned()
            .collect();
        info!(match_id = %match_id, fixture_id = %fixture_id, "fixture deleted");
        store_fixtures(state, &repository, &entity, list, MatchPatch::default()).await
    })
    .await
}

/// Write every placeholder that the recorded games already determine back as a team.
pub async fn persist_resolution(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
) -> Result<Vec<FixtureView>, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let (entity, _, results) = managed(&repository, session, match_id).await?;

        let resolved = resolve_fixtures(&entity.fixtures, &results);
        let bound = resolved
            .iter()
            .zip(&entity.fixtures)
            .filter(|(after, before)| after != before)
            .count();
        info!(match_id = %match_id, bound, "fixture placeholders resolved");
        store_fixtures(state, &repository, &entity, resolved, MatchPatch::default()).await
    })
    .await
}

/// Continue the winner stays rotation once its last fixture has a winner.
pub async fn next_winner_stays(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
) -> Result<Vec<FixtureView>, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let (entity, num_teams, results) = managed(&repository, session, match_id).await?;

        let next = fixtures::next_winner_stays_fixture(&entity.fixtures, &results, num_teams)?;
        info!(match_id = %match_id, label = %next.label, "winner stays rotation continued");
        let mut list = entity.fixtures.clone();
        list.push(next);
        store_fixtures(state, &repository, &entity, list, MatchPatch::default()).await
    })
    .await
}
