use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::EnrollmentEntity,
    dto::format_timestamp,
    state::kits::{MAX_TEAMS, TeamId},
};

/// Request to enroll into a match.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EnrollRequest {
    /// Player to enroll; the caller when omitted. Enrolling someone else requires
    /// managing the match.
    #[serde(default)]
    pub player_id: Option<Uuid>,
}

/// Request to set a boolean flag (paid, present, excluded).
#[derive(Debug, Deserialize, ToSchema)]
pub struct FlagRequest {
    pub value: bool,
}

/// Request to move a player to a team or to the bench.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TeamAssignmentRequest {
    /// Team number; `null` or `0` sends the player to the bench.
    #[serde(default)]
    #[validate(range(max = MAX_TEAMS))]
    pub team: Option<TeamId>,
}

impl TeamAssignmentRequest {
    /// Requested team with the bench normalized to `None`.
    pub fn team(&self) -> Option<TeamId> {
        self.team.filter(|team| *team != 0)
    }
}

/// Enrollment joined with the player's public profile.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrollmentSummary {
    pub id: Uuid,
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub display_name: String,
    /// Display rating (40..=99).
    pub rating: u8,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    pub is_present: bool,
    /// Team number, absent while on the bench.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamId>,
    pub is_excluded: bool,
    pub created_at: String,
}

impl EnrollmentSummary {
    pub fn new(enrollment: &EnrollmentEntity, display_name: String, rating: u8) -> Self {
        Self {
            id: enrollment.id,
            match_id: enrollment.match_id,
            player_id: enrollment.player_id,
            display_name,
            rating,
            paid: enrollment.paid,
            paid_at: enrollment.paid_at.map(format_timestamp),
            is_present: enrollment.is_present,
            team: enrollment.team(),
            is_excluded: enrollment.is_excluded,
            created_at: format_timestamp(enrollment.created_at),
        }
    }
}
