use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{dao::models::ProfileEntity, dto::validation::validate_not_blank};

const MAX_NAME_LEN: usize = 120;
const MAX_NICKNAME_LEN: usize = 30;

/// Profile as seen by its owner or an administrator.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub display_name: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elo_rating: Option<i32>,
    /// Display rating (40..=99).
    pub rating: u8,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

impl ProfileSummary {
    pub fn new(profile: ProfileEntity, rating: u8) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name(),
            full_name: profile.full_name,
            nickname: profile.nickname,
            elo_rating: profile.elo_rating,
            rating,
            is_admin: profile.is_admin,
            is_super_admin: profile.is_super_admin,
        }
    }
}

/// Edit of the caller's own profile.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    /// If not specified, does not change it.
    /// If null is specified, removes the nickname.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub nickname: Option<Option<String>>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref name) = self.full_name {
            if let Err(e) = validate_not_blank(name) {
                errors.add("full_name", e);
            } else if name.chars().count() > MAX_NAME_LEN {
                errors.add("full_name", too_long(MAX_NAME_LEN));
            }
        }

        if let Some(Some(ref nickname)) = self.nickname {
            if nickname.chars().count() > MAX_NICKNAME_LEN {
                errors.add("nickname", too_long(MAX_NICKNAME_LEN));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn too_long(max: usize) -> ValidationError {
    let mut err = ValidationError::new("length");
    err.message = Some(format!("Value must be at most {max} characters").into());
    err
}

/// Request to grant or revoke the administrator role.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleRequest {
    pub is_admin: bool,
}

/// One line of the community ranking.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankingEntry {
    pub position: usize,
    pub profile_id: Uuid,
    pub display_name: String,
    pub rating: u8,
}
