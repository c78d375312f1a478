//! Enrollment flows: joining and leaving a match, payment and attendance toggles, team moves.
//!
//! Paid, present and excluded flags go through the optimistic board ledger; team moves and
//! removals are written first and the board is re-read afterwards.

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{
        models::{EnrollmentEntity, EnrollmentPatch, NewEnrollment},
        repository::Repository,
    },
    dto::enrollment::{EnrollRequest, EnrollmentSummary},
    error::ServiceError,
    services::{
        match_service::{load_context, load_match, refresh_board, teams_of},
        profile_service,
        sse_events::{broadcast_enrollment_removed, broadcast_enrollment_updated, reported},
    },
    state::{SharedState, kits::TeamId, session::Session},
};

async fn summarize(
    repository: &Repository,
    enrollment: &EnrollmentEntity,
) -> Result<EnrollmentSummary, ServiceError> {
    let cards = profile_service::player_cards(repository, std::slice::from_ref(enrollment)).await?;
    let card = cards
        .get(&enrollment.player_id)
        .cloned()
        .unwrap_or_else(profile_service::unknown_card);
    Ok(EnrollmentSummary::new(enrollment, card.display_name, card.rating))
}

/// Cached value of an enrollment of `match_id`, loading the board when it is cold.
async fn cached_enrollment(
    state: &SharedState,
    repository: &Repository,
    match_id: Uuid,
    enrollment_id: Uuid,
) -> Result<EnrollmentEntity, ServiceError> {
    let snapshot = match state.boards().snapshot(match_id) {
        Some(snapshot) => snapshot,
        None => {
            let enrollments = repository.list_enrollments(match_id).await?;
            state.boards().replace(match_id, enrollments)
        }
    };
    snapshot
        .enrollments
        .into_iter()
        .find(|enrollment| enrollment.id == enrollment_id)
        .ok_or_else(|| ServiceError::NotFound(format!("enrollment `{enrollment_id}` not found")))
}

/// Write `patch` optimistically and announce the confirmed row.
async fn apply_toggle(
    state: &SharedState,
    repository: &Repository,
    match_id: Uuid,
    enrollment_id: Uuid,
    patch: EnrollmentPatch,
) -> Result<EnrollmentSummary, ServiceError> {
    let confirmed = state
        .run_optimistic(match_id, enrollment_id, &patch, || async {
            repository
                .update_enrollment(enrollment_id, &patch)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("enrollment `{enrollment_id}` not found"))
                })
        })
        .await?;
    broadcast_enrollment_updated(state, &confirmed);
    summarize(repository, &confirmed).await
}

/// Enroll the caller, or another player when the caller manages the match.
pub async fn enroll(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    request: EnrollRequest,
) -> Result<EnrollmentSummary, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let entity = load_match(&repository, match_id).await?;

        let player_id = request.player_id.unwrap_or_else(|| session.profile_id());
        if player_id != session.profile_id() {
            session.require_manager(entity.creator_id)?;
        }
        if entity.is_canceled {
            return Err(ServiceError::InvalidState("match is canceled".into()));
        }
        if entity.is_locked {
            return Err(ServiceError::InvalidState("match is locked".into()));
        }
        if repository.find_profile(player_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("profile `{player_id}` not found")));
        }

        let enrollments = repository.list_enrollments(match_id).await?;
        if enrollments.iter().any(|e| e.player_id == player_id) {
            return Err(ServiceError::InvalidState(
                "player is already enrolled in this match".into(),
            ));
        }
        let taken = enrollments.iter().filter(|e| !e.is_excluded).count();
        if taken >= usize::from(entity.max_players) {
            return Err(ServiceError::InvalidState("match is full".into()));
        }

        let created = repository
            .create_enrollment(&NewEnrollment {
                match_id,
                player_id,
                paid: false,
                is_present: false,
                team_assignment: None,
                is_excluded: false,
            })
            .await?;
        refresh_board(state, &repository, match_id).await?;

        info!(match_id = %match_id, player_id = %player_id, "player enrolled");
        broadcast_enrollment_updated(state, &created);
        summarize(&repository, &created).await
    })
    .await
}

/// Withdraw the caller from a match that is still open.
pub async fn leave(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
) -> Result<(), ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let entity = load_match(&repository, match_id).await?;
        if !entity.is_open() {
            return Err(ServiceError::InvalidState(
                "enrollments of this match are closed".into(),
            ));
        }

        let enrollment = repository
            .find_player_enrollment(match_id, session.profile_id())
            .await?
            .ok_or_else(|| ServiceError::NotFound("you are not enrolled in this match".into()))?;
        repository.delete_enrollment(enrollment.id).await?;
        refresh_board(state, &repository, match_id).await?;

        info!(match_id = %match_id, player_id = %enrollment.player_id, "player left");
        broadcast_enrollment_removed(state, &enrollment);
        Ok(())
    })
    .await
}

/// Remove any enrollment of the match.
pub async fn remove(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    enrollment_id: Uuid,
) -> Result<(), ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let entity = load_match(&repository, match_id).await?;
        session.require_manager(entity.creator_id)?;

        let enrollment = cached_enrollment(state, &repository, match_id, enrollment_id).await?;
        repository.delete_enrollment(enrollment_id).await?;
        refresh_board(state, &repository, match_id).await?;

        info!(match_id = %match_id, enrollment_id = %enrollment_id, "enrollment removed");
        broadcast_enrollment_removed(state, &enrollment);
        Ok(())
    })
    .await
}

/// Mark an enrollment as paid or unpaid. Unpaying also clears attendance.
pub async fn set_paid(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    enrollment_id: Uuid,
    paid: bool,
) -> Result<EnrollmentSummary, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let entity = load_match(&repository, match_id).await?;
        session.require_manager(entity.creator_id)?;
        cached_enrollment(state, &repository, match_id, enrollment_id).await?;

        let patch = if paid {
            EnrollmentPatch {
                paid: Some(true),
                paid_at: Some(Some(OffsetDateTime::now_utc())),
                ..EnrollmentPatch::default()
            }
        } else {
            EnrollmentPatch {
                paid: Some(false),
                paid_at: Some(None),
                is_present: Some(false),
                ..EnrollmentPatch::default()
            }
        };
        apply_toggle(state, &repository, match_id, enrollment_id, patch).await
    })
    .await
}

/// Mark attendance. Only paid players can be marked present.
pub async fn set_present(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    enrollment_id: Uuid,
    present: bool,
) -> Result<EnrollmentSummary, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let entity = load_match(&repository, match_id).await?;
        session.require_manager(entity.creator_id)?;

        let current = cached_enrollment(state, &repository, match_id, enrollment_id).await?;
        if present && !current.paid {
            return Err(ServiceError::InvalidState(
                "a player must pay before being marked present".into(),
            ));
        }

        let patch = EnrollmentPatch {
            is_present: Some(present),
            ..EnrollmentPatch::default()
        };
        apply_toggle(state, &repository, match_id, enrollment_id, patch).await
    })
    .await
}

/// Exclude a player from the roster or bring them back. Excluded players are benched.
pub async fn set_excluded(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    enrollment_id: Uuid,
    excluded: bool,
) -> Result<EnrollmentSummary, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let entity = load_match(&repository, match_id).await?;
        session.require_manager(entity.creator_id)?;
        cached_enrollment(state, &repository, match_id, enrollment_id).await?;

        let patch = EnrollmentPatch {
            is_excluded: Some(excluded),
            team_assignment: excluded.then_some(None),
            ..EnrollmentPatch::default()
        };
        apply_toggle(state, &repository, match_id, enrollment_id, patch).await
    })
    .await
}

/// Move a player to a team, or to the bench with `None`.
pub async fn set_team(
    state: &SharedState,
    session: &Session,
    match_id: Uuid,
    enrollment_id: Uuid,
    team: Option<TeamId>,
) -> Result<EnrollmentSummary, ServiceError> {
    reported(state, match_id, async {
        let repository = state.repository().await?;
        let (entity, field) = load_context(&repository, match_id).await?;
        session.require_manager(entity.creator_id)?;

        let enrollments = repository.list_enrollments(match_id).await?;
        let current = enrollments
            .iter()
            .find(|enrollment| enrollment.id == enrollment_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("enrollment `{enrollment_id}` not found"))
            })?;

        if let Some(team) = team {
            let num_teams = teams_of(&entity, &field);
            if team == 0 || team > num_teams {
                return Err(ServiceError::InvalidInput(format!(
                    "team {team} is not part of this match (1..={num_teams})"
                )));
            }
            if current.is_excluded {
                return Err(ServiceError::InvalidState(
                    "excluded players cannot join a team".into(),
                ));
            }
            let size = enrollments
                .iter()
                .filter(|e| e.id != enrollment_id && !e.is_excluded && e.team() == Some(team))
                .count();
            if size >= usize::from(field.players_per_team) {
                return Err(ServiceError::InvalidState(format!("team {team} is full")));
            }
        }

        let patch = EnrollmentPatch {
            team_assignment: Some(team),
            ..EnrollmentPatch::default()
        };
        let updated = repository
            .update_enrollment(enrollment_id, &patch)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("enrollment `{enrollment_id}` not found"))
            })?;
        refresh_board(state, &repository, match_id).await?;

        debug!(match_id = %match_id, enrollment_id = %enrollment_id, ?team, "team assignment changed");
        broadcast_enrollment_updated(state, &updated);
        summarize(&repository, &updated).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        field_service::tests::{memory_state, session},
        match_service::{self, tests::scheduled},
    };

    #[tokio::test]
    async fn enrolling_respects_lock_duplicates_and_capacity() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", false).await;
        let summary = scheduled(&state, &creator, 1, Some(2)).await;

        let first = enroll(&state, &creator, summary.id, EnrollRequest::default())
            .await
            .unwrap();
        assert_eq!(first.display_name, "Carla");
        assert!(matches!(
            enroll(&state, &creator, summary.id, EnrollRequest::default()).await,
            Err(ServiceError::InvalidState(_))
        ));

        let second = session(&state, "Beto Ruiz", false).await;
        enroll(&state, &second, summary.id, EnrollRequest::default())
            .await
            .unwrap();
        let third = session(&state, "Dani Paz", false).await;
        let err = enroll(&state, &third, summary.id, EnrollRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid state: match is full");

        leave(&state, &second, summary.id).await.unwrap();
        match_service::set_locked(&state, &creator, summary.id, true)
            .await
            .unwrap();
        let err = enroll(&state, &third, summary.id, EnrollRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid state: match is locked");
    }

    #[tokio::test]
    async fn enrolling_someone_else_needs_a_manager() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", false).await;
        let other = session(&state, "Beto Ruiz", false).await;
        let summary = scheduled(&state, &creator, 5, None).await;

        let request = || EnrollRequest {
            player_id: Some(other.profile_id()),
        };
        let third = session(&state, "Dani Paz", false).await;
        assert!(matches!(
            enroll(&state, &third, summary.id, request()).await,
            Err(ServiceError::Forbidden(_))
        ));
        let enrolled = enroll(&state, &creator, summary.id, request()).await.unwrap();
        assert_eq!(enrolled.player_id, other.profile_id());
    }

    #[tokio::test]
    async fn presence_follows_payment() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", false).await;
        let summary = scheduled(&state, &creator, 5, None).await;
        let enrolled = enroll(&state, &creator, summary.id, EnrollRequest::default())
            .await
            .unwrap();

        let err = set_present(&state, &creator, summary.id, enrolled.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let paid = set_paid(&state, &creator, summary.id, enrolled.id, true)
            .await
            .unwrap();
        assert!(paid.paid);
        assert!(paid.paid_at.is_some());

        let present = set_present(&state, &creator, summary.id, enrolled.id, true)
            .await
            .unwrap();
        assert!(present.is_present);

        let unpaid = set_paid(&state, &creator, summary.id, enrolled.id, false)
            .await
            .unwrap();
        assert!(!unpaid.paid);
        assert!(!unpaid.is_present);
        assert_eq!(unpaid.paid_at, None);

        let snapshot = state.boards().snapshot(summary.id).unwrap();
        assert_eq!(snapshot.pending, 0);
        assert!(!snapshot.enrollments[0].is_present);
    }

    #[tokio::test]
    async fn failed_toggle_restores_the_board() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", false).await;
        let summary = scheduled(&state, &creator, 5, None).await;
        let enrolled = enroll(&state, &creator, summary.id, EnrollRequest::default())
            .await
            .unwrap();

        let repository = state.repository().await.unwrap();
        repository.delete_enrollment(enrolled.id).await.unwrap();

        let err = set_paid(&state, &creator, summary.id, enrolled.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let snapshot = state.boards().snapshot(summary.id).unwrap();
        assert_eq!(snapshot.pending, 0);
        assert!(!snapshot.enrollments[0].paid);
    }

    #[tokio::test]
    async fn team_moves_are_bounded() {
        let state = memory_state().await;
        let creator = session(&state, "Carla Rojas", false).await;
        let summary = scheduled(&state, &creator, 1, Some(2)).await;
        let first = enroll(&state, &creator, summary.id, EnrollRequest::default())
            .await
            .unwrap();
        let other = session(&state, "Beto Ruiz", false).await;
        let second = enroll(&state, &other, summary.id, EnrollRequest::default())
            .await
            .unwrap();

        assert!(matches!(
            set_team(&state, &creator, summary.id, first.id, Some(3)).await,
            Err(ServiceError::InvalidInput(_))
        ));
        let moved = set_team(&state, &creator, summary.id, first.id, Some(1))
            .await
            .unwrap();
        assert_eq!(moved.team, Some(1));
        assert!(matches!(
            set_team(&state, &creator, summary.id, second.id, Some(1)).await,
            Err(ServiceError::InvalidState(_))
        ));

        let excluded = set_excluded(&state, &creator, summary.id, first.id, true)
            .await
            .unwrap();
        assert!(excluded.is_excluded);
        assert_eq!(excluded.team, None);
    }
}
