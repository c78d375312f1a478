use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::validation::validate_not_blank,
    services::{
        fixtures::{FixtureFormat, ManualFixture},
        standings::StandingRow,
    },
    state::{
        kits::TeamId,
        tournament::{Slot, UNDECIDED_LABEL},
    },
};

/// Request to (re)generate the fixtures of one format.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateFixturesRequest {
    pub format: FixtureFormat,
}

/// Admin supplied fixture.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ManualFixtureRequest {
    #[validate(length(min = 1, max = 60), custom(function = "validate_not_blank"))]
    pub phase: String,
    /// Label; the next free "Juego N" of the phase when omitted.
    #[serde(default)]
    #[validate(length(max = 60))]
    pub label: Option<String>,
    #[serde(default)]
    #[validate(length(max = 60))]
    pub stage: Option<String>,
    /// Team number, or a placeholder such as "Ganador Juego 1" or "2º de Liguilla".
    #[schema(value_type = Object)]
    pub home: Slot,
    /// Team number, or a placeholder such as "Ganador Juego 1" or "2º de Liguilla".
    #[schema(value_type = Object)]
    pub away: Slot,
}

impl From<ManualFixtureRequest> for ManualFixture {
    fn from(request: ManualFixtureRequest) -> Self {
        Self {
            phase: request.phase,
            label: request.label,
            stage: request.stage,
            home: request.home,
            away: request.away,
        }
    }
}

/// One side of a fixture after placeholder resolution.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct SlotView {
    /// Concrete team, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    /// Rule the slot was declared with, when it is a placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Text to show: the team's kit name or "Por Definir".
    pub display: String,
}

impl SlotView {
    /// Build the view of `declared` given its resolution.
    pub fn new(declared: &Slot, resolved: &Slot, team_name: impl Fn(TeamId) -> String) -> Self {
        let team_id = resolved.team();
        Self {
            team_id,
            placeholder: declared.placeholder().map(ToString::to_string),
            display: team_id
                .map(team_name)
                .unwrap_or_else(|| UNDECIDED_LABEL.to_owned()),
        }
    }
}

/// Fixture as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FixtureView {
    pub id: Uuid,
    pub phase: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub home: SlotView,
    pub away: SlotView,
    /// Game recorded for this fixture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<Uuid>,
}

/// One line of a standings table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingView {
    pub position: usize,
    pub team: TeamId,
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i64,
    pub points: u32,
}

impl StandingView {
    pub fn new(position: usize, row: &StandingRow, team_name: String) -> Self {
        Self {
            position,
            team: row.team,
            team_name,
            played: row.played,
            wins: row.wins,
            draws: row.draws,
            losses: row.losses,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_diff: row.goal_diff(),
            points: row.points,
        }
    }
}

/// Standings of one phase, or of every game when `phase` is absent.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PhaseStandings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Whether every fixture of the phase has a recorded game.
    pub complete: bool,
    pub rows: Vec<StandingView>,
}
