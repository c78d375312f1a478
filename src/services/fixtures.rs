//! Fixture list generation for the supported tournament formats.

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::{
    kits::{MAX_TEAMS, MIN_TEAMS, TeamId},
    tournament::{
        ELIMINATION_PHASE, Fixture, GameResult, LEAGUE_PHASE, MatchMode, Placeholder, Slot,
        WINNER_STAYS_PHASE, game_label,
    },
};

const SEMIFINAL: &str = "Semifinal";
const THIRD_PLACE: &str = "Tercer lugar";
const FINAL: &str = "Final";

/// Format requested when generating fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FixtureFormat {
    /// Every team plays every other team once.
    Liguilla,
    /// Knockout seeded from the league standings.
    TournamentStandings,
    /// Knockout with a random draw.
    TournamentRandom,
    /// The winner keeps the field against the next challenger.
    WinnerStays,
}

impl FixtureFormat {
    /// Phase the generated fixtures belong to.
    pub fn phase(self) -> &'static str {
        match self {
            FixtureFormat::Liguilla => LEAGUE_PHASE,
            FixtureFormat::TournamentStandings | FixtureFormat::TournamentRandom => {
                ELIMINATION_PHASE
            }
            FixtureFormat::WinnerStays => WINNER_STAYS_PHASE,
        }
    }

    /// Match mode implied by the format.
    pub fn mode(self) -> MatchMode {
        match self {
            FixtureFormat::Liguilla | FixtureFormat::TournamentStandings => MatchMode::League,
            FixtureFormat::TournamentRandom => MatchMode::Elimination,
            FixtureFormat::WinnerStays => MatchMode::WinnerStays,
        }
    }
}

/// Errors raised while building fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// Formats need between two and six teams.
    #[error("fixtures need between {MIN_TEAMS} and {MAX_TEAMS} teams (got {0})")]
    TeamCount(TeamId),
    /// A slot references a team that does not exist in the match.
    #[error("team {0} is not part of this match")]
    UnknownTeam(TeamId),
    /// Both slots reference the same team.
    #[error("a team cannot play against itself")]
    SameTeam,
    /// The phase name is empty.
    #[error("phase name must not be empty")]
    EmptyPhase,
    /// Another fixture of the phase already uses the label.
    #[error("label `{label}` is already used in phase `{phase}`")]
    DuplicateLabel {
        /// Phase holding the conflicting fixture.
        phase: String,
        /// Conflicting label.
        label: String,
    },
    /// No "winner stays" fixture exists yet.
    #[error("the winner stays rotation has not been generated")]
    NoRotation,
    /// The last rotation fixture has no decisive result yet.
    #[error("`{0}` has no winner yet")]
    Undecided(String),
}

/// Admin supplied fixture.
#[derive(Debug, Clone)]
pub struct ManualFixture {
    /// Phase the fixture belongs to.
    pub phase: String,
    /// Label; the next free "Juego N" of the phase when omitted.
    pub label: Option<String>,
    /// Optional round name.
    pub stage: Option<String>,
    /// First side.
    pub home: Slot,
    /// Second side.
    pub away: Slot,
}

/// Generate the fixtures of `format` for `num_teams` teams using the thread RNG.
pub fn generate(format: FixtureFormat, num_teams: TeamId) -> Result<Vec<Fixture>, FixtureError> {
    generate_with_rng(format, num_teams, &mut rand::rng())
}

/// Generate the fixtures of `format` for `num_teams` teams.
pub fn generate_with_rng<R>(
    format: FixtureFormat,
    num_teams: TeamId,
    rng: &mut R,
) -> Result<Vec<Fixture>, FixtureError>
where
    R: Rng + ?Sized,
{
    if !(MIN_TEAMS..=MAX_TEAMS).contains(&num_teams) {
        return Err(FixtureError::TeamCount(num_teams));
    }

    Ok(match format {
        FixtureFormat::Liguilla => round_robin(num_teams),
        FixtureFormat::TournamentStandings => elimination_from_standings(num_teams),
        FixtureFormat::TournamentRandom => random_draw(num_teams, rng),
        FixtureFormat::WinnerStays => winner_stays(num_teams),
    })
}

/// All unordered pairs `i < j` in lexicographic order.
pub fn round_robin(num_teams: TeamId) -> Vec<Fixture> {
    let mut fixtures = Vec::new();
    let mut number = 1;
    for home in 1..=num_teams {
        for away in (home + 1)..=num_teams {
            fixtures.push(Fixture::numbered(
                LEAGUE_PHASE,
                number,
                None,
                Slot::Team(home),
                Slot::Team(away),
            ));
            number += 1;
        }
    }
    fixtures
}

/// Knockout seeded from the league standings.
pub fn elimination_from_standings(num_teams: TeamId) -> Vec<Fixture> {
    let rank = |rank: u8| {
        Slot::Placeholder(Placeholder::Rank {
            rank,
            phase: LEAGUE_PHASE.to_owned(),
        })
    };

    match num_teams {
        0..=2 => vec![Fixture::numbered(
            ELIMINATION_PHASE,
            1,
            Some(FINAL),
            Slot::Team(1),
            Slot::Team(2),
        )],
        3 => vec![Fixture::numbered(
            ELIMINATION_PHASE,
            1,
            Some(FINAL),
            rank(1),
            rank(2),
        )],
        _ => vec![
            Fixture::numbered(ELIMINATION_PHASE, 1, Some(SEMIFINAL), rank(1), rank(4)),
            Fixture::numbered(ELIMINATION_PHASE, 2, Some(SEMIFINAL), rank(2), rank(3)),
            Fixture::numbered(
                ELIMINATION_PHASE,
                3,
                Some(THIRD_PLACE),
                Slot::Placeholder(Placeholder::LoserOf(1)),
                Slot::Placeholder(Placeholder::LoserOf(2)),
            ),
            Fixture::numbered(
                ELIMINATION_PHASE,
                4,
                Some(FINAL),
                Slot::Placeholder(Placeholder::WinnerOf(1)),
                Slot::Placeholder(Placeholder::WinnerOf(2)),
            ),
        ],
    }
}

/// Shuffle the teams and pair them consecutively. With an odd count the last team drawn
/// gets a bye.
pub fn random_draw<R>(num_teams: TeamId, rng: &mut R) -> Vec<Fixture>
where
    R: Rng + ?Sized,
{
    let mut teams: Vec<TeamId> = (1..=num_teams).collect();
    teams.shuffle(rng);

    let pairs = teams.len() / 2;
    let stage = (pairs == 1).then_some(FINAL);
    teams
        .chunks_exact(2)
        .zip(1..)
        .map(|(pair, number)| {
            Fixture::numbered(
                ELIMINATION_PHASE,
                number,
                stage,
                Slot::Team(pair[0]),
                Slot::Team(pair[1]),
            )
        })
        .collect()
}

/// Next challenger of the "winner stays" rotation.
///
/// `(max(team1, team2) % num_teams) + 1`, moving one further when that is the winner.
pub fn next_challenger(team1: TeamId, team2: TeamId, winner: TeamId, num_teams: TeamId) -> TeamId {
    let num_teams = num_teams.max(1);
    let challenger = team1.max(team2) % num_teams + 1;
    if challenger == winner {
        challenger % num_teams + 1
    } else {
        challenger
    }
}

/// Initial "winner stays" rotation: `1 vs 2`, then the previous winner against each
/// following team.
pub fn winner_stays(num_teams: TeamId) -> Vec<Fixture> {
    let mut fixtures = vec![Fixture::numbered(
        WINNER_STAYS_PHASE,
        1,
        None,
        Slot::Team(1),
        Slot::Team(2),
    )];

    let mut challenger: TeamId = 2;
    for number in 2..u32::from(num_teams) {
        challenger = challenger % num_teams + 1;
        fixtures.push(Fixture::numbered(
            WINNER_STAYS_PHASE,
            number,
            None,
            Slot::Placeholder(Placeholder::WinnerOf(number - 1)),
            Slot::Team(challenger),
        ));
    }
    fixtures
}

/// Fixture continuing the rotation once its last fixture has a decisive result.
pub fn next_winner_stays_fixture(
    fixtures: &[Fixture],
    games: &[GameResult],
    num_teams: TeamId,
) -> Result<Fixture, FixtureError> {
    let last = fixtures
        .iter()
        .filter(|fixture| fixture.phase == WINNER_STAYS_PHASE)
        .max_by_key(|fixture| fixture.number().unwrap_or(0))
        .ok_or(FixtureError::NoRotation)?;

    let game = games
        .iter()
        .rev()
        .find(|game| game.fixture_id == Some(last.id))
        .ok_or_else(|| FixtureError::Undecided(last.label.clone()))?;
    let winner = game
        .winner()
        .ok_or_else(|| FixtureError::Undecided(last.label.clone()))?;

    let challenger = next_challenger(game.team1, game.team2, winner, num_teams);
    let number = last.number().unwrap_or(0) + 1;
    Ok(Fixture::numbered(
        WINNER_STAYS_PHASE,
        number,
        None,
        Slot::Team(winner),
        Slot::Team(challenger),
    ))
}

/// Validate an admin supplied fixture against the existing list.
pub fn manual(
    existing: &[Fixture],
    num_teams: TeamId,
    input: ManualFixture,
) -> Result<Fixture, FixtureError> {
    let phase = input.phase.trim();
    if phase.is_empty() {
        return Err(FixtureError::EmptyPhase);
    }

    for team in [input.home.team(), input.away.team()].into_iter().flatten() {
        if team == 0 || team > num_teams {
            return Err(FixtureError::UnknownTeam(team));
        }
    }
    if input.home == input.away {
        return Err(FixtureError::SameTeam);
    }

    let in_phase: Vec<&Fixture> = existing.iter().filter(|f| f.phase == phase).collect();
    let label = match input.label.map(|label| label.trim().to_owned()) {
        Some(label) if !label.is_empty() => {
            if in_phase.iter().any(|fixture| fixture.label == label) {
                return Err(FixtureError::DuplicateLabel {
                    phase: phase.to_owned(),
                    label,
                });
            }
            label
        }
        _ => {
            let next = in_phase
                .iter()
                .filter_map(|fixture| fixture.number())
                .max()
                .unwrap_or(0)
                + 1;
            game_label(next)
        }
    };

    let mut fixture = Fixture::numbered(phase, 0, input.stage.as_deref(), input.home, input.away);
    fixture.label = label;
    Ok(fixture)
}

/// Replace the fixtures of `phase` with `generated`, keeping every other phase.
pub fn replace_phase(existing: Vec<Fixture>, phase: &str, generated: Vec<Fixture>) -> Vec<Fixture> {
    existing
        .into_iter()
        .filter(|fixture| fixture.phase != phase)
        .chain(generated)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn teams(fixture: &Fixture) -> (TeamId, TeamId) {
        (fixture.home.team().unwrap(), fixture.away.team().unwrap())
    }

    #[test]
    fn round_robin_covers_every_pair_once() {
        for n in MIN_TEAMS..=MAX_TEAMS {
            let fixtures = round_robin(n);
            let expected = usize::from(n) * usize::from(n - 1) / 2;
            assert_eq!(fixtures.len(), expected);

            let pairs: HashSet<_> = fixtures.iter().map(teams).collect();
            assert_eq!(pairs.len(), expected);
            assert!(pairs.iter().all(|(a, b)| a < b));
        }

        let labels: Vec<_> = round_robin(3).into_iter().map(|f| f.label).collect();
        assert_eq!(labels, vec!["Juego 1", "Juego 2", "Juego 3"]);
        assert_eq!(teams(&round_robin(4)[3]), (2, 3));
    }

    #[test]
    fn standings_elimination_for_four_teams() {
        let fixtures = elimination_from_standings(4);
        assert_eq!(fixtures.len(), 4);

        let labels: Vec<String> = fixtures
            .iter()
            .map(|f| {
                format!(
                    "{} vs {}",
                    f.home.placeholder().unwrap(),
                    f.away.placeholder().unwrap()
                )
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                "1º de Liguilla vs 4º de Liguilla",
                "2º de Liguilla vs 3º de Liguilla",
                "Perdedor Juego 1 vs Perdedor Juego 2",
                "Ganador Juego 1 vs Ganador Juego 2",
            ]
        );
        assert_eq!(fixtures[3].stage.as_deref(), Some("Final"));
        assert!(fixtures.iter().all(|f| f.phase == ELIMINATION_PHASE));
    }

    #[test]
    fn standings_elimination_for_small_counts() {
        let two = elimination_from_standings(2);
        assert_eq!(two.len(), 1);
        assert_eq!(teams(&two[0]), (1, 2));

        let three = elimination_from_standings(3);
        assert_eq!(three.len(), 1);
        assert_eq!(three[0].home.placeholder().unwrap().to_string(), "1º de Liguilla");
        assert_eq!(three[0].away.placeholder().unwrap().to_string(), "2º de Liguilla");
    }

    #[test]
    fn random_draw_pairs_distinct_teams_with_a_bye_when_odd() {
        let mut rng = StdRng::seed_from_u64(7);
        let fixtures = random_draw(5, &mut rng);
        assert_eq!(fixtures.len(), 2);

        let seen: HashSet<TeamId> = fixtures
            .iter()
            .flat_map(|f| {
                let (a, b) = teams(f);
                [a, b]
            })
            .collect();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|team| (1..=5).contains(team)));

        let final_only = random_draw(2, &mut rng);
        assert_eq!(final_only[0].stage.as_deref(), Some("Final"));
    }

    #[test]
    fn winner_stays_has_one_fixture_less_than_teams() {
        for n in MIN_TEAMS..=MAX_TEAMS {
            assert_eq!(winner_stays(n).len(), usize::from(n) - 1);
        }

        let fixtures = winner_stays(4);
        assert_eq!(teams(&fixtures[0]), (1, 2));
        assert_eq!(fixtures[1].home.placeholder(), Some(&Placeholder::WinnerOf(1)));
        assert_eq!(fixtures[1].away.team(), Some(3));
        assert_eq!(fixtures[2].home.placeholder(), Some(&Placeholder::WinnerOf(2)));
        assert_eq!(fixtures[2].away.team(), Some(4));
    }

    #[test]
    fn challenger_rule_is_literal() {
        assert_eq!(next_challenger(1, 2, 1, 4), 3);
        assert_eq!(next_challenger(3, 4, 3, 4), 1);
        // (4 % 4) + 1 = 1 is the winner, so the rotation moves on to 2.
        assert_eq!(next_challenger(1, 4, 1, 4), 2);
        assert_eq!(next_challenger(1, 2, 1, 2), 2);
    }

    #[test]
    fn rotation_continues_after_a_decisive_result() {
        let fixtures = winner_stays(3);
        let last = &fixtures[1];
        let games = [GameResult {
            team1: 1,
            team2: 3,
            score1: 0,
            score2: 2,
            fixture_id: Some(last.id),
        }];

        let next = next_winner_stays_fixture(&fixtures, &games, 3).unwrap();
        assert_eq!(next.label, "Juego 3");
        assert_eq!(teams(&next), (3, 1));

        let drawn = [GameResult {
            score2: 0,
            ..games[0]
        }];
        assert_eq!(
            next_winner_stays_fixture(&fixtures, &drawn, 3),
            Err(FixtureError::Undecided("Juego 2".into()))
        );
        assert_eq!(
            next_winner_stays_fixture(&round_robin(3), &games, 3),
            Err(FixtureError::NoRotation)
        );
    }

    #[test]
    fn generation_validates_team_count() {
        assert_eq!(
            generate(FixtureFormat::Liguilla, 1),
            Err(FixtureError::TeamCount(1))
        );
        assert_eq!(
            generate(FixtureFormat::WinnerStays, 7),
            Err(FixtureError::TeamCount(7))
        );
        assert_eq!(generate(FixtureFormat::Liguilla, 6).unwrap().len(), 15);
    }

    #[test]
    fn manual_fixtures_get_the_next_label() {
        let existing = round_robin(3);
        let fixture = manual(
            &existing,
            3,
            ManualFixture {
                phase: LEAGUE_PHASE.into(),
                label: None,
                stage: None,
                home: Slot::Team(1),
                away: Slot::Team(3),
            },
        )
        .unwrap();
        assert_eq!(fixture.label, "Juego 4");

        let duplicate = manual(
            &existing,
            3,
            ManualFixture {
                phase: LEAGUE_PHASE.into(),
                label: Some("Juego 1".into()),
                stage: None,
                home: Slot::Team(1),
                away: Slot::Team(2),
            },
        );
        assert!(matches!(duplicate, Err(FixtureError::DuplicateLabel { .. })));

        let unknown = manual(
            &existing,
            3,
            ManualFixture {
                phase: "Amistoso".into(),
                label: None,
                stage: None,
                home: Slot::Team(1),
                away: Slot::Team(5),
            },
        );
        assert_eq!(unknown.unwrap_err(), FixtureError::UnknownTeam(5));
    }

    #[test]
    fn regenerating_replaces_only_the_same_phase() {
        let mut fixtures = round_robin(4);
        fixtures.extend(elimination_from_standings(4));

        let regenerated = replace_phase(fixtures, LEAGUE_PHASE, round_robin(3));
        assert_eq!(regenerated.len(), 4 + 3);
        assert_eq!(
            regenerated
                .iter()
                .filter(|f| f.phase == ELIMINATION_PHASE)
                .count(),
            4
        );
    }
}
