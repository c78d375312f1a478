use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::{
    kits::{TeamConfigs, TeamId},
    tournament::{Fixture, GameResult, MatchMode},
};

/// Playing field that matches are scheduled on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldEntity {
    /// Primary key of the field.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Players on each side for this field (1..=11).
    pub players_per_team: u8,
    /// Rental price of one hour, in currency units.
    pub price_per_hour: u32,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Phone or other contact of the venue.
    #[serde(default)]
    pub contact: Option<String>,
    /// Creation timestamp assigned by the backend.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Values written when creating or replacing a field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldValues {
    pub name: String,
    pub players_per_team: u8,
    pub price_per_hour: u32,
    pub address: Option<String>,
    pub contact: Option<String>,
}

/// A scheduled match and its tournament structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// Field the match is played on.
    pub field_id: Uuid,
    /// Kick-off time.
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    /// Booked duration.
    pub duration_minutes: u16,
    /// Capacity, a multiple of the field's players per team.
    pub max_players: u16,
    /// Total cost overriding the field's prorated price.
    #[serde(default)]
    pub fixed_cost: Option<u32>,
    /// Kit worn by each team.
    #[serde(default)]
    pub team_configs: TeamConfigs,
    /// Whether enrollments are closed.
    #[serde(default)]
    pub is_locked: bool,
    /// Whether the match was called off.
    #[serde(default)]
    pub is_canceled: bool,
    /// Tournament format.
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Ordered pairing list.
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
    /// Profile that created the match.
    #[serde(default)]
    pub creator_id: Option<Uuid>,
    /// Creation timestamp assigned by the backend.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MatchEntity {
    /// Whether players can still enroll.
    pub fn is_open(&self) -> bool {
        !self.is_locked && !self.is_canceled
    }
}

/// Values written when creating a match.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewMatch {
    pub field_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    pub duration_minutes: u16,
    pub max_players: u16,
    pub fixed_cost: Option<u32>,
    pub team_configs: TeamConfigs,
    pub is_locked: bool,
    pub is_canceled: bool,
    pub match_mode: MatchMode,
    pub fixtures: Vec<Fixture>,
    pub creator_id: Uuid,
}

/// Partial update of a match; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MatchPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_id: Option<Uuid>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timestamp"
    )]
    pub starts_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_players: Option<u16>,
    /// `Some(None)` clears the override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_cost: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_configs: Option<TeamConfigs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_canceled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixtures: Option<Vec<Fixture>>,
}

/// A player's registration to a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrollmentEntity {
    /// Primary key of the enrollment.
    pub id: Uuid,
    /// Match the player enrolled into.
    pub match_id: Uuid,
    /// Enrolled profile.
    pub player_id: Uuid,
    /// Whether the player paid their share.
    #[serde(default)]
    pub paid: bool,
    /// When the payment was registered.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    /// Whether the player showed up.
    #[serde(default)]
    pub is_present: bool,
    /// Team number; `None` or `0` means the bench.
    #[serde(default)]
    pub team_assignment: Option<TeamId>,
    /// Whether the player was excluded from the match.
    #[serde(default)]
    pub is_excluded: bool,
    /// Creation timestamp assigned by the backend.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl EnrollmentEntity {
    /// Team the player is assigned to, `None` while on the bench.
    pub fn team(&self) -> Option<TeamId> {
        self.team_assignment.filter(|team| *team != 0)
    }
}

/// Values written when enrolling a player.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewEnrollment {
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub paid: bool,
    pub is_present: bool,
    pub team_assignment: Option<TeamId>,
    pub is_excluded: bool,
}

/// Partial update of an enrollment; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct EnrollmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    /// `Some(None)` clears the payment time.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_timestamp"
    )]
    pub paid_at: Option<Option<OffsetDateTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_present: Option<bool>,
    /// `Some(None)` moves the player to the bench.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_assignment: Option<Option<TeamId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_excluded: Option<bool>,
}

impl EnrollmentPatch {
    /// Apply the patch to an in-memory copy of the enrollment.
    pub fn apply_to(&self, enrollment: &mut EnrollmentEntity) {
        if let Some(paid) = self.paid {
            enrollment.paid = paid;
        }
        if let Some(paid_at) = self.paid_at {
            enrollment.paid_at = paid_at;
        }
        if let Some(is_present) = self.is_present {
            enrollment.is_present = is_present;
        }
        if let Some(team) = self.team_assignment {
            enrollment.team_assignment = team;
        }
        if let Some(is_excluded) = self.is_excluded {
            enrollment.is_excluded = is_excluded;
        }
    }
}

/// One goal of a recorded game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalEntity {
    /// Player credited with the goal.
    pub player_id: Uuid,
    /// Team the goal counts for.
    pub team: TeamId,
    /// Minute of play, when known.
    #[serde(default)]
    pub minute: Option<u16>,
    /// Whether the player scored into their own goal.
    #[serde(default)]
    pub own_goal: bool,
}

/// A recorded game between two teams of a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Match the game belongs to.
    pub match_id: Uuid,
    pub team1: TeamId,
    pub team2: TeamId,
    pub score1: u16,
    pub score2: u16,
    /// Per-goal detail.
    #[serde(default)]
    pub scorers: Vec<GoalEntity>,
    /// Fixture the game was played for.
    #[serde(default)]
    pub fixture_id: Option<Uuid>,
    /// Creation timestamp assigned by the backend.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Values written when recording or correcting a game.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GameValues {
    pub match_id: Uuid,
    pub team1: TeamId,
    pub team2: TeamId,
    pub score1: u16,
    pub score2: u16,
    pub scorers: Vec<GoalEntity>,
    pub fixture_id: Option<Uuid>,
}

impl From<&GameEntity> for GameResult {
    fn from(game: &GameEntity) -> Self {
        Self {
            team1: game.team1,
            team2: game.team2,
            score1: game.score1,
            score2: game.score2,
            fixture_id: game.fixture_id,
        }
    }
}

/// Player profile mirrored from the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileEntity {
    /// Primary key, shared with the auth provider.
    pub id: Uuid,
    /// Legal or full name.
    #[serde(default)]
    pub full_name: String,
    /// Preferred public name.
    #[serde(default)]
    pub nickname: Option<String>,
    /// Skill rating; absent until the player is rated.
    #[serde(default)]
    pub elo_rating: Option<i32>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_super_admin: bool,
    /// Creation timestamp assigned by the backend.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ProfileEntity {
    /// Public name: the nickname when set, otherwise the first word of the full name.
    pub fn display_name(&self) -> String {
        if let Some(nickname) = self
            .nickname
            .as_deref()
            .map(str::trim)
            .filter(|nickname| !nickname.is_empty())
        {
            return nickname.to_owned();
        }
        self.full_name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_owned()
    }
}

/// Partial update of a profile; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// `Some(None)` clears the nickname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

fn serialize_timestamp<S: Serializer>(
    value: &Option<OffsetDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    time::serde::rfc3339::option::serialize(value, serializer)
}

fn serialize_optional_timestamp<S: Serializer>(
    value: &Option<Option<OffsetDateTime>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(inner) => time::serde::rfc3339::option::serialize(inner, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    fn profile(full_name: &str, nickname: Option<&str>) -> ProfileEntity {
        ProfileEntity {
            id: Uuid::new_v4(),
            full_name: full_name.into(),
            nickname: nickname.map(Into::into),
            elo_rating: None,
            is_admin: false,
            is_super_admin: false,
            created_at: datetime!(2026-01-01 0:00 UTC),
        }
    }

    #[test]
    fn display_name_prefers_nickname_then_first_name() {
        assert_eq!(profile("Juan Pérez Soto", Some("Pibe")).display_name(), "Pibe");
        assert_eq!(profile("Juan Pérez Soto", Some("  ")).display_name(), "Juan");
        assert_eq!(profile("  Ana  ", None).display_name(), "Ana");
        assert_eq!(profile("", None).display_name(), "");
    }

    #[test]
    fn patches_only_carry_set_fields() {
        let patch = EnrollmentPatch {
            paid: Some(false),
            paid_at: Some(None),
            team_assignment: Some(None),
            ..EnrollmentPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"paid": false, "paid_at": null, "team_assignment": null})
        );

        let patch = MatchPatch {
            starts_at: Some(datetime!(2026-03-01 20:00 UTC)),
            fixed_cost: Some(None),
            ..MatchPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"starts_at": "2026-03-01T20:00:00Z", "fixed_cost": null})
        );
    }

    #[test]
    fn bench_is_null_or_zero() {
        let row = json!({
            "id": Uuid::new_v4(),
            "match_id": Uuid::new_v4(),
            "player_id": Uuid::new_v4(),
            "team_assignment": 0,
            "created_at": "2026-01-01T00:00:00Z",
        });
        let enrollment: EnrollmentEntity = serde_json::from_value(row).unwrap();
        assert_eq!(enrollment.team(), None);
        assert!(!enrollment.paid);
        assert_eq!(enrollment.paid_at, None);
    }
}
