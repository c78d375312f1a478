//! Tournament structure stored on a match: modes, fixtures, slots and placeholders.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::kits::TeamId;

/// Phase holding the round-robin group stage.
pub const LEAGUE_PHASE: &str = "Liguilla";
/// Phase holding knockout fixtures.
pub const ELIMINATION_PHASE: &str = "Eliminatoria";
/// Phase holding the "winner stays" rotation.
pub const WINNER_STAYS_PHASE: &str = "Ganador se queda";
/// Text shown for a slot whose team is not known yet.
pub const UNDECIDED_LABEL: &str = "Por Definir";

/// Tournament format a match is played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Loose games with no fixture list.
    #[default]
    Free,
    /// Round-robin group stage, optionally followed by a knockout.
    League,
    /// Knockout only.
    Elimination,
    /// The winner keeps playing against the next team in rotation.
    WinnerStays,
}

/// A fixture slot that is bound to a team by a rule rather than directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Placeholder {
    /// Winner of the fixture labeled "Juego N" in the same phase.
    WinnerOf(u32),
    /// Loser of the fixture labeled "Juego N" in the same phase.
    LoserOf(u32),
    /// Team at `rank` (1-based) of the standings of `phase`.
    Rank {
        /// 1-based position in the standings table.
        rank: u8,
        /// Phase whose standings are consulted.
        phase: String,
    },
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::WinnerOf(game) => write!(f, "Ganador Juego {game}"),
            Placeholder::LoserOf(game) => write!(f, "Perdedor Juego {game}"),
            Placeholder::Rank { rank, phase } => write!(f, "{rank}º de {phase}"),
        }
    }
}

/// Error returned when a placeholder label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised placeholder `{0}`")]
pub struct PlaceholderParseError(pub String);

impl FromStr for Placeholder {
    type Err = PlaceholderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlaceholderParseError(s.to_owned());
        let trimmed = s.trim();

        if let Some(game) = trimmed.strip_prefix("Ganador ") {
            return parse_game_number(game).map(Placeholder::WinnerOf).ok_or_else(invalid);
        }
        if let Some(game) = trimmed.strip_prefix("Perdedor ") {
            return parse_game_number(game).map(Placeholder::LoserOf).ok_or_else(invalid);
        }
        if let Some((rank, phase)) = trimmed.split_once("º de ") {
            let rank = rank.trim().parse::<u8>().map_err(|_| invalid())?;
            let phase = phase.trim();
            if rank == 0 || phase.is_empty() {
                return Err(invalid());
            }
            return Ok(Placeholder::Rank {
                rank,
                phase: phase.to_owned(),
            });
        }

        Err(invalid())
    }
}

/// Parse a "Juego N" label into `N`.
pub fn parse_game_number(label: &str) -> Option<u32> {
    label
        .trim()
        .strip_prefix("Juego ")
        .and_then(|number| number.trim().parse().ok())
}

/// Label of the N-th game of a phase.
pub fn game_label(number: u32) -> String {
    format!("Juego {number}")
}

/// One side of a fixture.
///
/// Persisted untagged: a JSON number is a team, a string is a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    /// Concrete team number.
    Team(TeamId),
    /// Team bound later by a rule.
    Placeholder(Placeholder),
}

impl Slot {
    /// Concrete team of this slot, if it is already bound.
    pub fn team(&self) -> Option<TeamId> {
        match self {
            Slot::Team(team) => Some(*team),
            Slot::Placeholder(_) => None,
        }
    }

    /// Placeholder rule of this slot, if it is not bound yet.
    pub fn placeholder(&self) -> Option<&Placeholder> {
        match self {
            Slot::Team(_) => None,
            Slot::Placeholder(placeholder) => Some(placeholder),
        }
    }
}

/// A pairing inside a match's tournament structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Identifier referenced by games recorded for this fixture.
    pub id: Uuid,
    /// Phase the fixture belongs to.
    pub phase: String,
    /// Label, normally "Juego N", unique inside the phase.
    pub label: String,
    /// Optional round name ("Semifinal", "Final", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// First side.
    pub home: Slot,
    /// Second side.
    pub away: Slot,
}

impl Fixture {
    /// Create a fixture labeled "Juego `number`" with a fresh id.
    pub fn numbered(
        phase: &str,
        number: u32,
        stage: Option<&str>,
        home: Slot,
        away: Slot,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: phase.to_owned(),
            label: game_label(number),
            stage: stage.map(str::to_owned),
            home,
            away,
        }
    }

    /// Game number parsed from the label, when it follows the "Juego N" convention.
    pub fn number(&self) -> Option<u32> {
        parse_game_number(&self.label)
    }

    /// Whether both sides are bound to concrete teams.
    pub fn is_concrete(&self) -> bool {
        self.home.team().is_some() && self.away.team().is_some()
    }
}

/// Outcome of one recorded game, reduced to what tournament computations need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    /// First team.
    pub team1: TeamId,
    /// Second team.
    pub team2: TeamId,
    /// Goals scored by `team1`.
    pub score1: u16,
    /// Goals scored by `team2`.
    pub score2: u16,
    /// Fixture the game was played for.
    pub fixture_id: Option<Uuid>,
}

impl GameResult {
    /// Team with the higher score; `None` on a draw.
    pub fn winner(&self) -> Option<TeamId> {
        match self.score1.cmp(&self.score2) {
            std::cmp::Ordering::Greater => Some(self.team1),
            std::cmp::Ordering::Less => Some(self.team2),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Team with the lower score; `None` on a draw.
    pub fn loser(&self) -> Option<TeamId> {
        match self.score1.cmp(&self.score2) {
            std::cmp::Ordering::Greater => Some(self.team2),
            std::cmp::Ordering::Less => Some(self.team1),
            std::cmp::Ordering::Equal => None,
        }
    }
}
