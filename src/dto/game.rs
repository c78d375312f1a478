use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{GameEntity, GoalEntity},
    dto::format_timestamp,
    state::kits::{MAX_TEAMS, TeamId},
};

/// One goal supplied with a game result.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct GoalInput {
    pub player_id: Uuid,
    /// Team the goal counts for.
    #[validate(range(min = 1, max = MAX_TEAMS))]
    pub team: TeamId,
    #[serde(default)]
    #[validate(range(max = 200))]
    pub minute: Option<u16>,
    #[serde(default)]
    pub own_goal: bool,
}

impl From<GoalInput> for GoalEntity {
    fn from(goal: GoalInput) -> Self {
        Self {
            player_id: goal.player_id,
            team: goal.team,
            minute: goal.minute,
            own_goal: goal.own_goal,
        }
    }
}

impl From<GoalEntity> for GoalInput {
    fn from(goal: GoalEntity) -> Self {
        Self {
            player_id: goal.player_id,
            team: goal.team,
            minute: goal.minute,
            own_goal: goal.own_goal,
        }
    }
}

/// Payload used to record or correct a game.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GameRequest {
    #[validate(range(min = 1, max = MAX_TEAMS))]
    pub team1: TeamId,
    #[validate(range(min = 1, max = MAX_TEAMS))]
    pub team2: TeamId,
    #[validate(range(min = 0, max = 99))]
    pub score1: i32,
    #[validate(range(min = 0, max = 99))]
    pub score2: i32,
    #[serde(default)]
    #[validate(nested)]
    pub scorers: Vec<GoalInput>,
    /// Fixture the game was played for.
    #[serde(default)]
    pub fixture_id: Option<Uuid>,
}

/// Recorded game as exposed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: Uuid,
    pub match_id: Uuid,
    pub team1: TeamId,
    pub team2: TeamId,
    pub score1: u16,
    pub score2: u16,
    pub scorers: Vec<GoalInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<Uuid>,
    pub created_at: String,
}

impl From<GameEntity> for GameSummary {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            match_id: game.match_id,
            team1: game.team1,
            team2: game.team2,
            score1: game.score1,
            score2: game.score2,
            scorers: game.scorers.into_iter().map(Into::into).collect(),
            fixture_id: game.fixture_id,
            created_at: format_timestamp(game.created_at),
        }
    }
}
