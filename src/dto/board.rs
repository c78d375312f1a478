use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{
        enrollment::EnrollmentSummary,
        field::FieldSummary,
        game::GameSummary,
        matches::MatchSummary,
        tournament::{FixtureView, PhaseStandings},
    },
    state::kits::{Kit, TeamId},
};

/// Capacity, quota and cost figures of a match.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CapacityView {
    pub num_teams: TeamId,
    pub players_per_team: u8,
    /// Players needed to fill every team.
    pub total_needed: u16,
    /// Enrollments that are not excluded.
    pub enrolled: usize,
    /// Slots left before the match is full.
    pub free_slots: usize,
    /// Total cost of the match.
    pub cost: u32,
    /// Share of the cost per enrolled player, rounded up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_player: Option<u32>,
    /// Suggested per-player share of one hour on the field.
    pub suggested_quota: u32,
}

/// Players of one team.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamView {
    pub team: TeamId,
    pub kit: Kit,
    pub players: Vec<EnrollmentSummary>,
}

/// Read model of one match.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchBoard {
    #[serde(rename = "match")]
    pub summary: MatchSummary,
    pub field: FieldSummary,
    pub capacity: CapacityView,
    pub teams: Vec<TeamView>,
    /// Enrolled players without a team.
    pub bench: Vec<EnrollmentSummary>,
    pub excluded: Vec<EnrollmentSummary>,
    pub games: Vec<GameSummary>,
    pub fixtures: Vec<FixtureView>,
    /// Standings of every phase that has fixtures, or of all games in free mode.
    pub standings: Vec<PhaseStandings>,
    /// Version of the cached board the enrollments come from.
    pub version: usize,
}
