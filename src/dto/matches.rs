use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::MatchEntity,
    dto::format_timestamp,
    state::{
        kits::{Kit, TeamId},
        tournament::MatchMode,
    },
};

/// Payload used to schedule a match.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMatchRequest {
    pub field_id: Uuid,
    /// Kick-off time (RFC 3339).
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub starts_at: OffsetDateTime,
    #[validate(range(min = 10, max = 600))]
    pub duration_minutes: u16,
    /// Capacity; two full teams of the field when omitted.
    #[serde(default)]
    #[validate(range(min = 1, max = 66))]
    pub max_players: Option<u16>,
    /// Total cost overriding the field's prorated price.
    #[serde(default)]
    pub fixed_cost: Option<u32>,
}

/// Partial update of a match schedule. Omitted fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateMatchRequest {
    #[serde(default)]
    pub field_id: Option<Uuid>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub starts_at: Option<OffsetDateTime>,
    #[serde(default)]
    #[validate(range(min = 10, max = 600))]
    pub duration_minutes: Option<u16>,
    #[serde(default)]
    #[validate(range(min = 1, max = 66))]
    pub max_players: Option<u16>,
    /// If not specified, does not change it.
    /// If null is specified, removes the override.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<u32>)]
    pub fixed_cost: Option<Option<u32>>,
}

/// Filters of the match listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MatchListQuery {
    /// Only matches that have not started yet.
    #[serde(default)]
    pub upcoming: bool,
}

/// Request to switch the tournament format of a match.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MatchModeRequest {
    pub mode: MatchMode,
}

/// Kit worn by one team.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamKit {
    pub team: TeamId,
    pub kit: Kit,
}

/// Match as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchSummary {
    pub id: Uuid,
    pub field_id: Uuid,
    pub starts_at: String,
    pub duration_minutes: u16,
    pub max_players: u16,
    pub num_teams: TeamId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_cost: Option<u32>,
    pub is_locked: bool,
    pub is_canceled: bool,
    pub match_mode: MatchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<Uuid>,
    pub kits: Vec<TeamKit>,
    pub created_at: String,
}

impl MatchSummary {
    /// Project a match whose team count is already known.
    pub fn from_entity(entity: &MatchEntity, num_teams: TeamId) -> Self {
        Self {
            id: entity.id,
            field_id: entity.field_id,
            starts_at: format_timestamp(entity.starts_at),
            duration_minutes: entity.duration_minutes,
            max_players: entity.max_players,
            num_teams,
            fixed_cost: entity.fixed_cost,
            is_locked: entity.is_locked,
            is_canceled: entity.is_canceled,
            match_mode: entity.match_mode,
            creator_id: entity.creator_id,
            kits: entity
                .team_configs
                .iter()
                .filter(|(team, _)| *team <= num_teams)
                .map(|(team, kit)| TeamKit {
                    team,
                    kit: kit.clone(),
                })
                .collect(),
            created_at: format_timestamp(entity.created_at),
        }
    }
}

/// Outcome of adding or removing a team.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResizeResponse {
    /// Team that was added or removed.
    pub team: TeamId,
    pub num_teams: TeamId,
    pub max_players: u16,
    /// Players moved to the bench by a shrink.
    pub benched: usize,
}
