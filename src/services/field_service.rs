//! Field catalogue: public reads and admin maintenance.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{models::FieldEntity, repository::Repository},
    dto::field::{FieldRequest, FieldSummary, QuotaResponse},
    error::ServiceError,
    services::capacity,
    state::{SharedState, session::Session},
};

/// Load a field or fail with [`ServiceError::NotFound`].
pub(crate) async fn load_field(
    repository: &Repository,
    id: Uuid,
) -> Result<FieldEntity, ServiceError> {
    repository
        .find_field(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("field `{id}` not found")))
}

pub async fn list_fields(state: &SharedState) -> Result<Vec<FieldSummary>, ServiceError> {
    let repository = state.repository().await?;
    let fields = repository.list_fields().await?;
    Ok(fields.into_iter().map(Into::into).collect())
}

pub async fn get_field(state: &SharedState, id: Uuid) -> Result<FieldSummary, ServiceError> {
    let repository = state.repository().await?;
    Ok(load_field(&repository, id).await?.into())
}

/// Suggested per-player share of one hour on the field.
pub async fn field_quota(state: &SharedState, id: Uuid) -> Result<QuotaResponse, ServiceError> {
    let repository = state.repository().await?;
    let field = load_field(&repository, id).await?;
    Ok(QuotaResponse {
        field_id: field.id,
        players_per_team: field.players_per_team,
        price_per_hour: field.price_per_hour,
        suggested_quota: capacity::suggested_quota(field.price_per_hour, field.players_per_team),
    })
}

pub async fn create_field(
    state: &SharedState,
    session: &Session,
    request: FieldRequest,
) -> Result<FieldSummary, ServiceError> {
    session.require_admin()?;
    let repository = state.repository().await?;
    let field = repository.create_field(&request.into()).await?;
    info!(field_id = %field.id, name = %field.name, "field created");
    Ok(field.into())
}

pub async fn update_field(
    state: &SharedState,
    session: &Session,
    id: Uuid,
    request: FieldRequest,
) -> Result<FieldSummary, ServiceError> {
    session.require_admin()?;
    let repository = state.repository().await?;
    let field = repository
        .update_field(id, &request.into())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("field `{id}` not found")))?;
    info!(field_id = %field.id, "field updated");
    Ok(field.into())
}

/// Delete a field that no match is scheduled on.
pub async fn delete_field(
    state: &SharedState,
    session: &Session,
    id: Uuid,
) -> Result<(), ServiceError> {
    session.require_admin()?;
    let repository = state.repository().await?;
    load_field(&repository, id).await?;

    let in_use = repository
        .list_matches(None)
        .await?
        .iter()
        .any(|entity| entity.field_id == id);
    if in_use {
        return Err(ServiceError::InvalidState(format!(
            "field `{id}` still has matches scheduled"
        )));
    }

    repository.delete_field(id).await?;
    info!(field_id = %id, "field deleted");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{models::ProfileEntity, table_store::memory::MemoryStore},
        state::AppState,
    };

    pub(crate) async fn memory_state() -> SharedState {
        AppState::with_store(AppConfig::default(), Arc::new(MemoryStore::new())).await
    }

    pub(crate) async fn session(state: &SharedState, name: &str, is_admin: bool) -> Session {
        let repository = state.repository().await.unwrap();
        let profile = repository
            .insert_profile(&ProfileEntity {
                id: Uuid::new_v4(),
                full_name: name.into(),
                nickname: None,
                elo_rating: None,
                is_admin,
                is_super_admin: false,
                created_at: datetime!(2026-01-01 0:00 UTC),
            })
            .await
            .unwrap();
        Session::new(profile)
    }

    pub(crate) fn field_request(players_per_team: u8) -> FieldRequest {
        FieldRequest {
            name: " Cancha Norte ".into(),
            players_per_team,
            price_per_hour: 1000,
            address: None,
            contact: None,
        }
    }

    #[tokio::test]
    async fn admins_maintain_the_catalogue() {
        let state = memory_state().await;
        let admin = session(&state, "Ana Torres", true).await;
        let player = session(&state, "Beto Ruiz", false).await;

        let err = create_field(&state, &player, field_request(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let created = create_field(&state, &admin, field_request(5)).await.unwrap();
        assert_eq!(created.name, "Cancha Norte");
        assert_eq!(list_fields(&state).await.unwrap().len(), 1);

        let quota = field_quota(&state, created.id).await.unwrap();
        assert_eq!(quota.suggested_quota, 100);

        delete_field(&state, &admin, created.id).await.unwrap();
        assert!(matches!(
            get_field(&state, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
