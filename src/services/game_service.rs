//! Recording, correcting and deleting the games played inside a match.

use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{GameEntity, GameValues, MatchEntity},
        repository::Repository,
    },
    dto::game::{GameRequest, GameSummary},
    error::ServiceError,
    services::{
        match_service::{load_context, load_match, teams_of},
        placeholders::resolve_fixtures,
        sse_events::{broadcast_game, reported},
    },
    state::{SharedState, kits::TeamId, session::Session, tournament::GameResult},
};

fn score(value: i32) -> Result<u16, ServiceError> {
    u16::try_from(value)
        .map_err(|_| ServiceError::InvalidInput(format!("score {value} must be a non-negative number")))
}

/// Check a game against the match and turn it into storable values.
///
/// `others` are the games already recorded for the match, without the one being edited.
fn validate_game(
    request: GameRequest,
    entity: &MatchEntity,
    num_teams: TeamId,
    others: &[GameEntity],
) -> Result<GameValues, ServiceError> {
    let (team1, team2) = (request.team1, request.team2);
    for team in [team1, team2] {
        if team == 0 || team > num_teams {
            return Err(ServiceError::InvalidInput(format!(
                "team {team} is not part of this match (1..={num_teams})"
            )));
        }
    }
    if team1 == team2 {
        return Err(ServiceError::InvalidInput(
            "a team cannot play against itself".into(),
        ));
    }
    let score1 = score(request.score1)?;
    let score2 = score(request.score2)?;

    if let Some(goal) = request
        .scorers
        .iter()
        .find(|goal| goal.team != team1 && goal.team != team2)
    {
        return Err(ServiceError::InvalidInput(format!(
            "scorer credited to team {} which is not playing",
            goal.team
        )));
    }

    if let Some(fixture_id) = request.fixture_id {
        let results: Vec<GameResult> = others.iter().map(GameResult::from).collect();
        let fixture = resolve_fixtures(&entity.fixtures, &results)
            .into_iter()
            .find(|fixture| fixture.id == fixture_id)
            .ok_or_else(|| ServiceError::NotFound(format!("fixture `{fixture_id}` not found")))?;

        if others.iter().any(|game| game.fixture_id == Some(fixture_id)) {
            return Err(ServiceError::InvalidState(format!(
                "`{}` already has a game recorded",
                fixture.label
            )));
        }
        let (Some(home), Some(away)) = (fixture.home.team(), fixture.away.team()) else {
            return Err(ServiceError::InvalidState(format!(
                "the teams of `{}` are not decided yet",
                fixture.label
            )));
        };
        let expected: HashSet<TeamId> = [home, away].into();
        let played: HashSet<TeamId> = [team1, team2].into();
        if expected != played {
            return Err(ServiceError::InvalidInput(format!(
                "`{}` is played by teams {home} and {away}",
                fixture.label
            )));
        }
    }

    Ok(GameValues {
        match_id: entity.id,
        team1,
        team2,
        score1,
        score2,
        scorers: request.scorers.into_iter().map(Into::into).collect(),
        fixture_id: request.fixture_id,
    })
}

async fn load_game(
    repository: &Repository,
    id: Uuid,
) -> Result<GameEntity, ServiceError> {
    repository
        .find_game(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))
}

/// Games of a match in the order they were recorded.
pub async fn list_games(
    state: &SharedState,
    match_id: Uuid,
) -> Result<Vec<GameSummary>, ServiceError> {
    let repository = state.repository().await?;
    load_match(&repository, match_id).await?;
    let games = repository.list_games(match_id).await?;
    Ok(games.into_iter().map(Into::into).collect())
}

pub async fn record_game(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    request: GameRequest,
) -> Result<GameSummary, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, match_id).await?;
        session.require_manager(entity.creator_id)?;
        if entity.is_canceled {
            return Err(ServiceError::InvalidState("match is canceled".into()));
        }

        let others = repository.list_games(match_id).await?;
        let values = validate_game(request, &entity, teams_of(&entity, &field), &others)?;
        let game = repository.create_game(&values).await?;

        info!(
            match_id = %match_id,
            game_id = %game.id,
            score = %format!("{}-{}", game.score1, game.score2),
            "game recorded"
        );
        broadcast_game(state, &game, false);
        Ok(game.into())
    })
    .await
}

/// Replace the teams, score and scorers of a recorded game.
pub async fn update_game(
    state: &SharedState,
    session: &Session,
    game_id: Uuid,
    request: GameRequest,
) -> Result<GameSummary, ServiceError> {
    let repository = state.repository().await?;
    let existing = load_game(&repository, game_id).await?;
    let match_id = existing.match_id;

    reported(state, match_id, async {
        let (entity, field) = load_context(&repository, match_id).await?;
        session.require_manager(entity.creator_id)?;

        let others: Vec<GameEntity> = repository
            .list_games(match_id)
            .await?
            .into_iter()
            .filter(|game| game.id != game_id)
            .collect();
        let values = validate_game(request, &entity, teams_of(&entity, &field), &others)?;
        let game = repository
            .update_game(game_id, &values)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` not found")))?;

        info!(match_id = %match_id, game_id = %game_id, "game corrected");
        broadcast_game(state, &game, false);
        Ok(game.into())
    })
    .await
}

pub async fn delete_game(
    state: &SharedState,
    session: &Session,
    game_id: Uuid,
) -> Result<(), ServiceError> {
    let repository = state.repository().await?;
    let existing = load_game(&repository, game_id).await?;

    reported(state, existing.match_id, async {
        let entity = load_match(&repository, existing.match_id).await?;
        session.require_manager(entity.creator_id)?;

        repository.delete_game(game_id).await?;
        info!(match_id = %existing.match_id, game_id = %game_id, "game deleted");
        broadcast_game(state, &existing, true);
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::{
        dto::game::GoalInput,
        services::{
            field_service::tests::{memory_state, session},
            fixtures::{elimination_from_standings, round_robin},
            match_service::{self, tests::scheduled},
        },
        state::{
            kits::TeamConfigs,
            tournament::{Fixture, MatchMode},
        },
    };

    fn request(team1: TeamId, team2: TeamId, score1: i32, score2: i32) -> GameRequest {
        GameRequest {
            team1,
            team2,
            score1,
            score2,
            scorers: Vec::new(),
            fixture_id: None,
        }
    }

    fn entity(fixtures: Vec<Fixture>) -> MatchEntity {
        MatchEntity {
            id: Uuid::new_v4(),
            field_id: Uuid::new_v4(),
            starts_at: datetime!(2030-05-01 20:00 UTC),
            duration_minutes: 60,
            max_players: 20,
            fixed_cost: None,
            team_configs: TeamConfigs::default(),
            is_locked: false,
            is_canceled: false,
            match_mode: MatchMode::default(),
            fixtures,
            creator_id: None,
            created_at: datetime!(2026-01-01 0:00 UTC),
        }
    }

    #[test]
    fn rejects_unknown_or_repeated_teams() {
        let entity = entity(Vec::new());
        assert!(validate_game(request(1, 5, 0, 0), &entity, 4, &[]).is_err());
        assert!(validate_game(request(2, 2, 0, 0), &entity, 4, &[]).is_err());
        assert!(validate_game(request(1, 2, -1, 0), &entity, 4, &[]).is_err());

        let mut with_scorer = request(1, 2, 1, 0);
        with_scorer.scorers.push(GoalInput {
            player_id: Uuid::new_v4(),
            team: 3,
            minute: None,
            own_goal: false,
        });
        assert!(validate_game(with_scorer, &entity, 4, &[]).is_err());

        let values = validate_game(request(2, 1, 3, 1), &entity, 4, &[]).unwrap();
        assert_eq!((values.team1, values.score1), (2, 3));
    }

    #[test]
    fn linked_games_follow_the_fixture() {
        let league = round_robin(4);
        let mut fixtures = league.clone();
        fixtures.extend(elimination_from_standings(4));
        let entity = entity(fixtures.clone());

        let mut first = request(2, 1, 0, 1);
        first.fixture_id = Some(league[0].id);
        assert!(validate_game(first, &entity, 4, &[]).is_ok());

        let mut wrong = request(1, 3, 0, 1);
        wrong.fixture_id = Some(league[0].id);
        assert!(matches!(
            validate_game(wrong, &entity, 4, &[]),
            Err(ServiceError::InvalidInput(_))
        ));

        let mut undecided = request(1, 4, 1, 0);
        undecided.fixture_id = Some(fixtures[6].id);
        assert!(matches!(
            validate_game(undecided, &entity, 4, &[]),
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn canceled_matches_take_no_games() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", false).await;
        let summary = scheduled(&state, &creator, 5, None).await;

        let game = record_game(&state, &creator, summary.id, request(1, 2, 2, 1))
            .await
            .unwrap();
        assert_eq!(list_games(&state, summary.id).await.unwrap().len(), 1);

        let corrected = update_game(&state, &creator, game.id, request(1, 2, 2, 2))
            .await
            .unwrap();
        assert_eq!(corrected.score2, 2);

        match_service::cancel_match(&state, &creator, summary.id)
            .await
            .unwrap();
        let err = record_game(&state, &creator, summary.id, request(1, 2, 0, 0))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid state: match is canceled");

        delete_game(&state, &creator, game.id).await.unwrap();
        assert!(list_games(&state, summary.id).await.unwrap().is_empty());
    }
}
