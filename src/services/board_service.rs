//! Read model of one match: capacity, teams, bench, games, fixtures and standings.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    dao::models::{EnrollmentEntity, FieldEntity, GameEntity, MatchEntity},
    dto::{
        board::{CapacityView, MatchBoard, TeamView},
        enrollment::EnrollmentSummary,
        matches::MatchSummary,
        tournament::{FixtureView, PhaseStandings, SlotView, StandingView},
    },
    error::ServiceError,
    services::{
        capacity,
        match_service::{load_context, teams_of},
        placeholders::resolve_fixtures,
        profile_service::{self, PlayerCard},
        standings::{
            StandingRow, compute_standings, phase_complete, phase_fixture_ids, phase_teams,
        },
    },
    state::{
        SharedState,
        board::BoardSnapshot,
        kits::{TeamConfigs, TeamId, fallback_kit},
        tournament::{Fixture, GameResult},
    },
};

/// Full board of a match, refreshing its cached enrollments on the way.
pub async fn match_board(state: &SharedState, id: Uuid) -> Result<MatchBoard, ServiceError> {
    let repository = state.repository().await?;
    let (entity, field) = load_context(&repository, id).await?;
    let enrollments = repository.list_enrollments(id).await?;
    let snapshot = state.boards().replace(id, enrollments);
    let games = repository.list_games(id).await?;
    let cards = profile_service::player_cards(&repository, &snapshot.enrollments).await?;
    Ok(assemble(&entity, &field, &snapshot, games, &cards))
}

/// Standings of every phase of the match.
pub async fn match_standings(
    state: &SharedState,
    id: Uuid,
) -> Result<Vec<PhaseStandings>, ServiceError> {
    let repository = state.repository().await?;
    let (entity, field) = load_context(&repository, id).await?;
    let games = repository.list_games(id).await?;
    let results: Vec<GameResult> = games.iter().map(GameResult::from).collect();
    Ok(phase_standings(
        &entity.fixtures,
        &results,
        teams_of(&entity, &field),
        &entity.team_configs,
    ))
}

/// Display name of a team: the name of its kit.
pub(crate) fn team_name(team_configs: &TeamConfigs, team: TeamId) -> String {
    team_configs
        .get(team)
        .map(|kit| kit.name.clone())
        .unwrap_or_else(|| fallback_kit(team).name)
}

fn assemble(
    entity: &MatchEntity,
    field: &FieldEntity,
    snapshot: &BoardSnapshot,
    games: Vec<GameEntity>,
    cards: &HashMap<Uuid, PlayerCard>,
) -> MatchBoard {
    let num_teams = teams_of(entity, field);
    let summarize = |enrollment: &EnrollmentEntity| {
        let card = cards
            .get(&enrollment.player_id)
            .cloned()
            .unwrap_or_else(profile_service::unknown_card);
        EnrollmentSummary::new(enrollment, card.display_name, card.rating)
    };

    let (excluded, active): (Vec<&EnrollmentEntity>, Vec<&EnrollmentEntity>) = snapshot
        .enrollments
        .iter()
        .partition(|enrollment| enrollment.is_excluded);

    let teams = (1..=num_teams)
        .map(|team| TeamView {
            team,
            kit: entity
                .team_configs
                .get(team)
                .cloned()
                .unwrap_or_else(|| fallback_kit(team)),
            players: active
                .iter()
                .filter(|enrollment| enrollment.team() == Some(team))
                .map(|enrollment| summarize(*enrollment))
                .collect(),
        })
        .collect();
    let bench = active
        .iter()
        .filter(|enrollment| enrollment.team().is_none_or(|team| team > num_teams))
        .map(|enrollment| summarize(*enrollment))
        .collect();

    let cost = capacity::match_cost(entity.fixed_cost, field.price_per_hour, entity.duration_minutes);
    let capacity = CapacityView {
        num_teams,
        players_per_team: field.players_per_team,
        total_needed: capacity::total_needed(num_teams, field.players_per_team),
        enrolled: active.len(),
        free_slots: usize::from(entity.max_players).saturating_sub(active.len()),
        cost,
        cost_per_player: capacity::split_cost(cost, active.len()),
        suggested_quota: capacity::suggested_quota(field.price_per_hour, field.players_per_team),
    };

    let results: Vec<GameResult> = games.iter().map(GameResult::from).collect();
    let name = |team: TeamId| team_name(&entity.team_configs, team);

    MatchBoard {
        summary: MatchSummary::from_entity(entity, num_teams),
        field: field.clone().into(),
        capacity,
        teams,
        bench,
        excluded: excluded.into_iter().map(summarize).collect(),
        fixtures: fixture_views(&entity.fixtures, &games, &results, name),
        standings: phase_standings(&entity.fixtures, &results, num_teams, &entity.team_configs),
        games: games.into_iter().map(Into::into).collect(),
        version: snapshot.version,
    }
}

/// Fixtures with their placeholders resolved and the game played for each.
pub(crate) fn fixture_views(
    fixtures: &[Fixture],
    games: &[GameEntity],
    results: &[GameResult],
    team_name: impl Fn(TeamId) -> String,
) -> Vec<FixtureView> {
    let resolved = resolve_fixtures(fixtures, results);
    fixtures
        .iter()
        .zip(resolved)
        .map(|(declared, resolved)| FixtureView {
            id: declared.id,
            phase: declared.phase.clone(),
            label: declared.label.clone(),
            stage: declared.stage.clone(),
            home: SlotView::new(&declared.home, &resolved.home, &team_name),
            away: SlotView::new(&declared.away, &resolved.away, &team_name),
            game_id: games
                .iter()
                .rev()
                .find(|game| game.fixture_id == Some(declared.id))
                .map(|game| game.id),
        })
        .collect()
}

/// One table per phase, in the order phases first appear. Without fixtures, a single table
/// over every game of the match.
pub(crate) fn phase_standings(
    fixtures: &[Fixture],
    results: &[GameResult],
    num_teams: TeamId,
    team_configs: &TeamConfigs,
) -> Vec<PhaseStandings> {
    let to_view = |rows: Vec<StandingRow>| -> Vec<StandingView> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| StandingView::new(index + 1, row, team_name(team_configs, row.team)))
            .collect()
    };

    if fixtures.is_empty() {
        let teams: Vec<TeamId> = (1..=num_teams).collect();
        return vec![PhaseStandings {
            phase: None,
            complete: false,
            rows: to_view(compute_standings(&teams, results, None)),
        }];
    }

    let resolved = resolve_fixtures(fixtures, results);
    let mut phases: Vec<&str> = Vec::new();
    for fixture in fixtures {
        if !phases.contains(&fixture.phase.as_str()) {
            phases.push(fixture.phase.as_str());
        }
    }

    phases
        .into_iter()
        .map(|phase| {
            let allowed = phase_fixture_ids(fixtures, phase);
            let teams = phase_teams(&resolved, phase);
            PhaseStandings {
                phase: Some(phase.to_owned()),
                complete: phase_complete(fixtures, phase, results),
                rows: to_view(compute_standings(&teams, results, Some(&allowed))),
            }
        })
        .collect()
}
