//! Identity of the caller for one request.

use uuid::Uuid;

use crate::{
    dao::{models::ProfileEntity, repository::Repository},
    error::ServiceError,
};

/// Caller profile resolved from the `X-Profile-Id` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    profile: ProfileEntity,
}

impl Session {
    /// Build a session from an already loaded profile.
    pub fn new(profile: ProfileEntity) -> Self {
        Self { profile }
    }

    /// Resolve the session of `profile_id`, rejecting unknown profiles.
    pub async fn load(repository: &Repository, profile_id: Uuid) -> Result<Self, ServiceError> {
        repository
            .find_profile(profile_id)
            .await?
            .map(Self::new)
            .ok_or_else(|| ServiceError::Unauthorized(format!("unknown profile {profile_id}")))
    }

    /// Re-read the caller's profile from the backend.
    pub async fn refresh(&mut self, repository: &Repository) -> Result<&ProfileEntity, ServiceError> {
        *self = Self::load(repository, self.profile.id).await?;
        Ok(&self.profile)
    }

    pub fn profile(&self) -> &ProfileEntity {
        &self.profile
    }

    pub fn profile_id(&self) -> Uuid {
        self.profile.id
    }

    /// Admins and super admins.
    pub fn is_admin(&self) -> bool {
        self.profile.is_admin || self.profile.is_super_admin
    }

    pub fn is_super_admin(&self) -> bool {
        self.profile.is_super_admin
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("administrator role required".into()))
        }
    }

    pub fn require_super_admin(&self) -> Result<(), ServiceError> {
        if self.is_super_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("super administrator role required".into()))
        }
    }

    /// Whether the caller may manage a match created by `creator_id`.
    pub fn can_manage(&self, creator_id: Option<Uuid>) -> bool {
        self.is_admin() || creator_id == Some(self.profile.id)
    }

    pub fn require_manager(&self, creator_id: Option<Uuid>) -> Result<(), ServiceError> {
        if self.can_manage(creator_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "only an administrator or the match creator can do this".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use super::*;
    use crate::dao::{models::ProfilePatch, table_store::memory::MemoryStore};

    fn profile(is_admin: bool, is_super_admin: bool) -> ProfileEntity {
        ProfileEntity {
            id: Uuid::new_v4(),
            full_name: "Carla Rojas".into(),
            nickname: None,
            elo_rating: None,
            is_admin,
            is_super_admin,
            created_at: datetime!(2026-01-01 0:00 UTC),
        }
    }

    #[test]
    fn roles_gate_management() {
        let player = Session::new(profile(false, false));
        let admin = Session::new(profile(true, false));
        let root = Session::new(profile(false, true));

        assert!(player.require_admin().is_err());
        assert!(admin.require_admin().is_ok());
        assert!(root.require_admin().is_ok());
        assert!(admin.require_super_admin().is_err());

        assert!(player.can_manage(Some(player.profile_id())));
        assert!(!player.can_manage(Some(Uuid::new_v4())));
        assert!(!player.can_manage(None));
        assert!(admin.can_manage(None));
    }

    #[tokio::test]
    async fn load_and_refresh_read_the_backend() {
        let repository = Repository::new(Arc::new(MemoryStore::new()));
        let stored = repository
            .insert_profile(&profile(false, false))
            .await
            .unwrap();

        let mut session = Session::load(&repository, stored.id).await.unwrap();
        assert!(!session.is_admin());

        let patch = ProfilePatch {
            is_admin: Some(true),
            ..ProfilePatch::default()
        };
        repository.update_profile(stored.id, &patch).await.unwrap();
        assert!(session.refresh(&repository).await.unwrap().is_admin);
        assert!(session.is_admin());

        let err = Session::load(&repository, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }
}
