//! Match lifecycle: scheduling, locking, capacity changes, kits and team balancing.
//!
//! Every mutation checks that the caller manages the match, validates locally, then writes
//! through the repository and tells clients to refetch the board.

use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{
        models::{EnrollmentPatch, FieldEntity, MatchEntity, MatchPatch, NewMatch},
        repository::Repository,
    },
    dto::{
        board::MatchBoard,
        matches::{CreateMatchRequest, MatchSummary, ResizeResponse, UpdateMatchRequest},
        sse::MatchChange,
    },
    error::ServiceError,
    services::{
        balance, board_service, capacity, field_service::load_field, profile_service,
        sse_events::{broadcast_match_updated, reported},
    },
    state::{
        SharedState,
        kits::{MIN_TEAMS, TeamConfigs, TeamId},
        session::Session,
        tournament::MatchMode,
    },
};

/// Load a match or fail with [`ServiceError::NotFound`].
pub(crate) async fn load_match(
    repository: &Repository,
    id: Uuid,
) -> Result<MatchEntity, ServiceError> {
    repository
        .find_match(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{id}` not found")))
}

/// Load a match together with the field it is played on.
pub(crate) async fn load_context(
    repository: &Repository,
    id: Uuid,
) -> Result<(MatchEntity, FieldEntity), ServiceError> {
    let entity = load_match(repository, id).await?;
    let field = load_field(repository, entity.field_id).await?;
    Ok((entity, field))
}

/// Teams the match splits into on its field.
pub(crate) fn teams_of(entity: &MatchEntity, field: &FieldEntity) -> TeamId {
    capacity::num_teams(entity.max_players, field.players_per_team)
}

async fn save(
    repository: &Repository,
    id: Uuid,
    patch: &MatchPatch,
) -> Result<MatchEntity, ServiceError> {
    repository
        .update_match(id, patch)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{id}` not found")))
}

fn summarize(entity: &MatchEntity, field: &FieldEntity) -> MatchSummary {
    MatchSummary::from_entity(entity, teams_of(entity, field))
}

/// Matches ordered by kick-off. With `upcoming` only those not started yet.
pub async fn list_matches(
    state: &SharedState,
    upcoming: bool,
) -> Result<Vec<MatchSummary>, ServiceError> {
    let repository = state.repository().await?;
    let from = upcoming
        .then(|| {
            OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .ok()
        })
        .flatten();
    let matches = repository.list_matches(from.as_deref()).await?;
    let fields: HashMap<Uuid, FieldEntity> = repository
        .list_fields()
        .await?
        .into_iter()
        .map(|field| (field.id, field))
        .collect();

    Ok(matches
        .iter()
        .map(|entity| {
            let num_teams = fields
                .get(&entity.field_id)
                .map(|field| teams_of(entity, field))
                .unwrap_or(MIN_TEAMS);
            MatchSummary::from_entity(entity, num_teams)
        })
        .collect())
}

/// Schedule a match; the caller becomes its creator.
pub async fn create_match(
    state: &SharedState,
    session: &Session,
    request: CreateMatchRequest,
) -> Result<MatchSummary, ServiceError> {
    let repository = state.repository().await?;
    let field = load_field(&repository, request.field_id).await?;

    let ppt = field.players_per_team;
    let requested = request
        .max_players
        .unwrap_or_else(|| capacity::total_needed(MIN_TEAMS, ppt));
    let num_teams = capacity::num_teams(requested, ppt);

    let values = NewMatch {
        field_id: field.id,
        starts_at: request.starts_at,
        duration_minutes: request.duration_minutes,
        max_players: capacity::total_needed(num_teams, ppt),
        fixed_cost: request.fixed_cost,
        team_configs: TeamConfigs::default().normalized(num_teams, state.config().palette()),
        is_locked: false,
        is_canceled: false,
        match_mode: MatchMode::default(),
        fixtures: Vec::new(),
        creator_id: session.profile_id(),
    };
    let entity = repository.create_match(&values).await?;
    info!(match_id = %entity.id, field_id = %field.id, num_teams, "match created");
    broadcast_match_updated(state, entity.id, MatchChange::Created);
    Ok(summarize(&entity, &field))
}

/// Edit schedule, field, capacity or cost. Capacity is rounded to whole teams; players of
/// teams that disappear go to the bench.
pub async fn update_match(
    state: &SharedState,
    session: &Session,
    id: Uuid,
    request: UpdateMatchRequest,
) -> Result<MatchSummary, ServiceError> {
    reported(state, id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, id).await?;
        session.require_manager(entity.creator_id)?;

        let target_field = match request.field_id {
            Some(field_id) if field_id != field.id => load_field(&repository, field_id).await?,
            _ => field.clone(),
        };
        let ppt = target_field.players_per_team;
        let old_teams = teams_of(&entity, &field);
        let new_teams =
            capacity::num_teams(request.max_players.unwrap_or(entity.max_players), ppt);

        let mut team_configs = entity.team_configs.clone();
        for team in new_teams + 1..=old_teams {
            team_configs.remove(team);
        }
        let patch = MatchPatch {
            field_id: request.field_id,
            starts_at: request.starts_at,
            duration_minutes: request.duration_minutes,
            max_players: Some(capacity::total_needed(new_teams, ppt)),
            fixed_cost: request.fixed_cost,
            team_configs: Some(team_configs.normalized(new_teams, state.config().palette())),
            ..MatchPatch::default()
        };

        for team in new_teams + 1..=old_teams {
            let benched = repository.bench_team(id, team).await?;
            debug!(match_id = %id, team, benched = benched.len(), "team removed by update");
        }
        let updated = save(&repository, id, &patch).await?;
        refresh_board(state, &repository, id).await?;

        broadcast_match_updated(state, id, MatchChange::Updated);
        Ok(summarize(&updated, &target_field))
    })
    .await
}

/// Delete a match with its enrollments and games.
pub async fn delete_match(
    state: &SharedState,
    session: &Session,
    id: Uuid,
) -> Result<(), ServiceError> {
    reported(state, id, async {
        let repository = state.repository().await?;
        let entity = load_match(&repository, id).await?;
        session.require_manager(entity.creator_id)?;

        repository.delete_match(id).await?;
        state.boards().invalidate(id);
        info!(match_id = %id, "match deleted");
        broadcast_match_updated(state, id, MatchChange::Deleted);
        Ok(())
    })
    .await
}

/// Close or reopen enrollments.
pub async fn set_locked(
    state: &SharedState,
    session: &Session,
    id: Uuid,
    locked: bool,
) -> Result<MatchSummary, ServiceError> {
    reported(state, id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, id).await?;
        session.require_manager(entity.creator_id)?;
        if !locked && entity.is_canceled {
            return Err(ServiceError::InvalidState(format!(
                "match `{id}` is canceled"
            )));
        }

        let patch = MatchPatch {
            is_locked: Some(locked),
            ..MatchPatch::default()
        };
        let updated = save(&repository, id, &patch).await?;
        info!(match_id = %id, locked, "match lock changed");
        broadcast_match_updated(state, id, MatchChange::Updated);
        Ok(summarize(&updated, &field))
    })
    .await
}

/// Call the match off. A canceled match accepts no enrollments and no games.
pub async fn cancel_match(
    state: &SharedState,
    session: &Session,
    id: Uuid,
) -> Result<MatchSummary, ServiceError> {
    reported(state, id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, id).await?;
        session.require_manager(entity.creator_id)?;
        if entity.is_canceled {
            return Err(ServiceError::InvalidState(format!(
                "match `{id}` is already canceled"
            )));
        }

        let patch = MatchPatch {
            is_canceled: Some(true),
            is_locked: Some(true),
            ..MatchPatch::default()
        };
        let updated = save(&repository, id, &patch).await?;
        info!(match_id = %id, "match canceled");
        broadcast_match_updated(state, id, MatchChange::Updated);
        Ok(summarize(&updated, &field))
    })
    .await
}

pub async fn set_mode(
    state: &SharedState,
    session: &Session,
    id: Uuid,
    mode: MatchMode,
) -> Result<MatchSummary, ServiceError> {
    reported(state, id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, id).await?;
        session.require_manager(entity.creator_id)?;

        let patch = MatchPatch {
            match_mode: Some(mode),
            ..MatchPatch::default()
        };
        let updated = save(&repository, id, &patch).await?;
        broadcast_match_updated(state, id, MatchChange::Updated);
        Ok(summarize(&updated, &field))
    })
    .await
}

/// Add one team's worth of capacity with a random unused kit.
pub async fn expand_teams(
    state: &SharedState,
    session: &Session,
    id: Uuid,
) -> Result<ResizeResponse, ServiceError> {
    reported(state, id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, id).await?;
        session.require_manager(entity.creator_id)?;

        let resize = {
            let mut rng = rand::rng();
            capacity::expand(
                entity.max_players,
                field.players_per_team,
                entity.team_configs,
                state.config().palette(),
                &mut rng,
            )?
        };
        let patch = MatchPatch {
            max_players: Some(resize.max_players),
            team_configs: Some(resize.team_configs),
            ..MatchPatch::default()
        };
        save(&repository, id, &patch).await?;

        info!(match_id = %id, team = resize.team, "team added");
        broadcast_match_updated(state, id, MatchChange::Teams);
        Ok(ResizeResponse {
            team: resize.team,
            num_teams: resize.team,
            max_players: resize.max_players,
            benched: 0,
        })
    })
    .await
}

/// Remove the highest-numbered team and bench its players.
pub async fn shrink_teams(
    state: &SharedState,
    session: &Session,
    id: Uuid,
) -> Result<ResizeResponse, ServiceError> {
    reported(state, id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, id).await?;
        session.require_manager(entity.creator_id)?;

        let resize = capacity::shrink(
            entity.max_players,
            field.players_per_team,
            entity.team_configs,
        )?;
        let benched = repository.bench_team(id, resize.team).await?;
        let patch = MatchPatch {
            max_players: Some(resize.max_players),
            team_configs: Some(resize.team_configs),
            ..MatchPatch::default()
        };
        save(&repository, id, &patch).await?;
        refresh_board(state, &repository, id).await?;

        info!(match_id = %id, team = resize.team, benched = benched.len(), "team removed");
        broadcast_match_updated(state, id, MatchChange::Teams);
        Ok(ResizeResponse {
            team: resize.team,
            num_teams: resize.team - 1,
            max_players: resize.max_players,
            benched: benched.len(),
        })
    })
    .await
}

/// Give every team a fresh random kit, distinct while the palette allows it.
pub async fn shuffle_kits(
    state: &SharedState,
    session: &Session,
    id: Uuid,
) -> Result<MatchSummary, ServiceError> {
    reported(state, id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, id).await?;
        session.require_manager(entity.creator_id)?;

        let kits = {
            let mut rng = rand::rng();
            capacity::shuffle_kits(teams_of(&entity, &field), state.config().palette(), &mut rng)
        };
        let patch = MatchPatch {
            team_configs: Some(kits),
            ..MatchPatch::default()
        };
        let updated = save(&repository, id, &patch).await?;
        broadcast_match_updated(state, id, MatchChange::Teams);
        Ok(summarize(&updated, &field))
    })
    .await
}

/// Spread the non-excluded players over the teams by snake draft on their rating.
pub async fn balance_teams(
    state: &SharedState,
    session: &Session,
    id: Uuid,
) -> Result<MatchBoard, ServiceError> {
    reported(state, id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, id).await?;
        session.require_manager(entity.creator_id)?;

        let enrollments = repository.list_enrollments(id).await?;
        let cards = profile_service::player_cards(&repository, &enrollments).await?;
        let players: Vec<(Uuid, u8)> = enrollments
            .iter()
            .filter(|enrollment| !enrollment.is_excluded)
            .map(|enrollment| {
                let rating = cards
                    .get(&enrollment.player_id)
                    .map(|card| card.rating)
                    .unwrap_or_else(|| profile_service::unknown_card().rating);
                (enrollment.id, rating)
            })
            .collect();

        let draft = balance::snake_draft(&players, teams_of(&entity, &field), field.players_per_team);
        let current: HashMap<Uuid, Option<TeamId>> = enrollments
            .iter()
            .map(|enrollment| (enrollment.id, enrollment.team()))
            .collect();

        let mut moved = 0usize;
        for (enrollment_id, team) in draft {
            if current.get(&enrollment_id) == Some(&team) {
                continue;
            }
            let patch = EnrollmentPatch {
                team_assignment: Some(team),
                ..EnrollmentPatch::default()
            };
            repository.update_enrollment(enrollment_id, &patch).await?;
            moved += 1;
        }

        info!(match_id = %id, moved, "teams balanced");
        broadcast_match_updated(state, id, MatchChange::Teams);
        board_service::match_board(state, id).await
    })
    .await
}

/// Re-read the enrollments of a match into its cached board.
pub(crate) async fn refresh_board(
    state: &SharedState,
    repository: &Repository,
    id: Uuid,
) -> Result<(), ServiceError> {
    let enrollments = repository.list_enrollments(id).await?;
    state.boards().replace(id, enrollments);
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::{
        dao::models::NewEnrollment,
        services::field_service::{
            self,
            tests::{field_request, memory_state, session},
        },
    };

    pub(crate) async fn scheduled(
        state: &SharedState,
        manager: &Session,
        players_per_team: u8,
        max_players: Option<u16>,
    ) -> MatchSummary {
        let admin = session(state, "Field Admin", true).await;
        let field = field_service::create_field(state, &admin, field_request(players_per_team))
            .await
            .unwrap();
        create_match(
            state,
            manager,
            CreateMatchRequest {
                field_id: field.id,
                starts_at: datetime!(2030-05-01 20:00 UTC),
                duration_minutes: 90,
                max_players,
                fixed_cost: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn capacity_rounds_to_whole_teams() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", false).await;

        let summary = scheduled(&state, &creator, 5, Some(13)).await;
        assert_eq!(summary.num_teams, 3);
        assert_eq!(summary.max_players, 15);
        assert_eq!(summary.kits.len(), 3);
        assert_eq!(summary.creator_id, Some(creator.profile_id()));

        let default = scheduled(&state, &creator, 7, None).await;
        assert_eq!(default.num_teams, 2);
        assert_eq!(default.max_players, 14);
    }

    #[tokio::test]
    async fn only_managers_change_a_match() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", false).await;
        let other = session(&state, "Beto Ruiz", false).await;
        let summary = scheduled(&state, &creator, 5, None).await;
        let mut events = state.public_sse().subscribe();

        let err = set_locked(&state, &other, summary.id, true).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let banner = events.recv().await.unwrap();
        assert_eq!(banner.event.as_deref(), Some("banner"));

        let locked = set_locked(&state, &creator, summary.id, true).await.unwrap();
        assert!(locked.is_locked);

        let canceled = cancel_match(&state, &creator, summary.id).await.unwrap();
        assert!(canceled.is_canceled);
        assert!(matches!(
            set_locked(&state, &creator, summary.id, false).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn shrinking_benches_the_last_team() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", false).await;
        let summary = scheduled(&state, &creator, 5, Some(15)).await;
        let repository = state.repository().await.unwrap();

        let player = session(&state, "Dani Paz", false).await;
        repository
            .create_enrollment(&NewEnrollment {
                match_id: summary.id,
                player_id: player.profile_id(),
                paid: false,
                is_present: false,
                team_assignment: Some(3),
                is_excluded: false,
            })
            .await
            .unwrap();

        let resize = shrink_teams(&state, &creator, summary.id).await.unwrap();
        assert_eq!(resize.team, 3);
        assert_eq!(resize.num_teams, 2);
        assert_eq!(resize.max_players, 10);
        assert_eq!(resize.benched, 1);

        let enrollments = repository.list_enrollments(summary.id).await.unwrap();
        assert_eq!(enrollments[0].team(), None);

        assert!(matches!(
            shrink_teams(&state, &creator, summary.id).await,
            Err(ServiceError::InvalidState(_))
        ));

        let grown = expand_teams(&state, &creator, summary.id).await.unwrap();
        assert_eq!(grown.num_teams, 3);
        let entity = load_match(&repository, summary.id).await.unwrap();
        assert!(entity.team_configs.get(3).is_some());
    }

    #[tokio::test]
    async fn balance_fills_teams_by_rating() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", true).await;
        let summary = scheduled(&state, &creator, 1, Some(2)).await;
        let repository = state.repository().await.unwrap();

        for _ in 0..3 {
            let player = session(&state, "Jugador Uno", false).await;
            repository
                .create_enrollment(&NewEnrollment {
                    match_id: summary.id,
                    player_id: player.profile_id(),
                    paid: false,
                    is_present: false,
                    team_assignment: None,
                    is_excluded: false,
                })
                .await
                .unwrap();
        }

        let board = balance_teams(&state, &creator, summary.id).await.unwrap();
        assert_eq!(board.teams.len(), 2);
        assert!(board.teams.iter().all(|team| team.players.len() == 1));
        assert_eq!(board.bench.len(), 1);
    }
}
