//! Profiles: the caller's own profile, the public ranking and role management.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{EnrollmentEntity, ProfileEntity, ProfilePatch},
        repository::Repository,
    },
    dto::profile::{ProfileSummary, RankingEntry, UpdateProfileRequest},
    error::ServiceError,
    services::rating::{self, DEFAULT_RATING},
    state::{SharedState, session::Session},
};

/// Name and rating shown for a player on a match board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlayerCard {
    pub display_name: String,
    pub rating: u8,
}

/// Highest ELO of the community, used to scale every rating.
pub(crate) async fn community_max_elo(repository: &Repository) -> Result<i32, ServiceError> {
    let profiles = repository.all_profiles().await?;
    Ok(rating::community_max_elo(
        profiles.iter().map(|profile| profile.elo_rating),
    ))
}

/// Cards of every player enrolled in `enrollments`, keyed by profile id.
pub(crate) async fn player_cards(
    repository: &Repository,
    enrollments: &[EnrollmentEntity],
) -> Result<HashMap<Uuid, PlayerCard>, ServiceError> {
    let mut ids: Vec<Uuid> = enrollments.iter().map(|e| e.player_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let max_elo = community_max_elo(repository).await?;
    let profiles = repository.list_profiles(&ids).await?;
    Ok(profiles
        .into_iter()
        .map(|profile| {
            let card = PlayerCard {
                display_name: profile.display_name(),
                rating: rating::rating(profile.elo_rating, max_elo),
            };
            (profile.id, card)
        })
        .collect())
}

/// Card for a player whose profile is missing.
pub(crate) fn unknown_card() -> PlayerCard {
    PlayerCard {
        display_name: "?".into(),
        rating: DEFAULT_RATING,
    }
}

async fn summarize(
    repository: &Repository,
    profile: ProfileEntity,
) -> Result<ProfileSummary, ServiceError> {
    let max_elo = community_max_elo(repository).await?;
    let rating = rating::rating(profile.elo_rating, max_elo);
    Ok(ProfileSummary::new(profile, rating))
}

pub async fn me(state: &SharedState, session: &Session) -> Result<ProfileSummary, ServiceError> {
    let repository = state.repository().await?;
    summarize(&repository, session.profile().clone()).await
}

/// Re-read the caller's profile from the backend.
pub async fn refresh(
    state: &SharedState,
    session: &mut Session,
) -> Result<ProfileSummary, ServiceError> {
    let repository = state.repository().await?;
    let profile = session.refresh(&repository).await?.clone();
    summarize(&repository, profile).await
}

pub async fn update_me(
    state: &SharedState,
    session: &Session,
    request: UpdateProfileRequest,
) -> Result<ProfileSummary, ServiceError> {
    let repository = state.repository().await?;
    let patch = ProfilePatch {
        full_name: request.full_name.map(|name| name.trim().to_owned()),
        nickname: request.nickname.map(|nickname| {
            nickname
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        }),
        is_admin: None,
    };
    let profile = repository
        .update_profile(session.profile_id(), &patch)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("profile `{}` not found", session.profile_id())))?;
    summarize(&repository, profile).await
}

/// Every profile ordered by rating, best first, then by display name.
pub async fn ranking(state: &SharedState) -> Result<Vec<RankingEntry>, ServiceError> {
    let repository = state.repository().await?;
    let profiles = repository.all_profiles().await?;
    let max_elo = rating::community_max_elo(profiles.iter().map(|profile| profile.elo_rating));

    let mut rows: Vec<(u8, String, Uuid)> = profiles
        .into_iter()
        .map(|profile| {
            (
                rating::rating(profile.elo_rating, max_elo),
                profile.display_name(),
                profile.id,
            )
        })
        .collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(index, (rating, display_name, profile_id))| RankingEntry {
            position: index + 1,
            profile_id,
            display_name,
            rating,
        })
        .collect())
}

/// Grant or revoke the administrator role. Super admins only.
pub async fn set_role(
    state: &SharedState,
    session: &Session,
    profile_id: Uuid,
    is_admin: bool,
) -> Result<ProfileSummary, ServiceError> {
    session.require_super_admin()?;
    let repository = state.repository().await?;
    let patch = ProfilePatch {
        is_admin: Some(is_admin),
        ..ProfilePatch::default()
    };
    let profile = repository
        .update_profile(profile_id, &patch)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("profile `{profile_id}` not found")))?;
    info!(profile_id = %profile_id, is_admin, by = %session.profile_id(), "role updated");
    summarize(&repository, profile).await
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::services::field_service::tests::memory_state;

    fn profile(full_name: &str, nickname: Option<&str>, elo: Option<i32>) -> ProfileEntity {
        ProfileEntity {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            nickname: nickname.map(Into::into),
            elo_rating: elo,
            is_admin: false,
            is_super_admin: false,
            created_at: datetime!(2026-01-01 0:00 UTC),
        }
    }

    #[tokio::test]
    async fn ranking_orders_by_rating_then_name() {
        let state = memory_state().await;
        let repository = state.repository().await.unwrap();
        for entry in [
            profile("Zoe Paredes", None, None),
            profile("Ana Lopez", None, None),
            profile("Mario Vega", Some("Toro"), Some(2000)),
            profile("Luis Soto", None, Some(800)),
        ] {
            repository.insert_profile(&entry).await.unwrap();
        }

        let ranking = ranking(&state).await.unwrap();
        let names: Vec<&str> = ranking.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["Toro", "Ana", "Zoe", "Luis"]);
        assert_eq!(ranking[0].rating, 99);
        assert_eq!(ranking[1].rating, DEFAULT_RATING);
        assert_eq!(ranking[3].position, 4);
    }

    #[tokio::test]
    async fn only_super_admins_change_roles() {
        let state = memory_state().await;
        let repository = state.repository().await.unwrap();
        let target = repository
            .insert_profile(&profile("Pedro Diaz", None, None))
            .await
            .unwrap();
        let mut root = profile("Root", None, None);
        root.is_super_admin = true;
        let root = Session::new(repository.insert_profile(&root).await.unwrap());
        let player = Session::new(target.clone());

        assert!(matches!(
            set_role(&state, &player, target.id, true).await,
            Err(ServiceError::Forbidden(_))
        ));
        let updated = set_role(&state, &root, target.id, true).await.unwrap();
        assert!(updated.is_admin);

        let mut refreshed = player;
        assert!(refresh(&state, &mut refreshed).await.unwrap().is_admin);
        assert!(refreshed.is_admin());
    }

    #[tokio::test]
    async fn clearing_the_nickname_falls_back_to_the_first_name() {
        let state = memory_state().await;
        let repository = state.repository().await.unwrap();
        let stored = repository
            .insert_profile(&profile("Carla Rojas", Some("Pulga"), None))
            .await
            .unwrap();
        let session = Session::new(stored);
        assert_eq!(me(&state, &session).await.unwrap().display_name, "Pulga");

        let request = UpdateProfileRequest {
            full_name: None,
            nickname: Some(None),
        };
        let updated = update_me(&state, &session, request).await.unwrap();
        assert_eq!(updated.display_name, "Carla");
        assert_eq!(updated.nickname, None);
    }
}
