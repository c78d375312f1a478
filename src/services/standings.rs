//! Standings table computed from recorded game results.

use std::collections::HashSet;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::state::{
    kits::TeamId,
    tournament::{Fixture, GameResult},
};

/// Points awarded for a win.
pub const WIN_POINTS: u32 = 3;
/// Points awarded to each side of a draw.
pub const DRAW_POINTS: u32 = 1;

/// One line of the standings table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingRow {
    /// Team the line belongs to.
    pub team: TeamId,
    /// Games played.
    pub played: u32,
    /// Games won.
    pub wins: u32,
    /// Games drawn.
    pub draws: u32,
    /// Games lost.
    pub losses: u32,
    /// Goals scored.
    pub goals_for: u32,
    /// Goals conceded.
    pub goals_against: u32,
    /// Accumulated points.
    pub points: u32,
}

impl StandingRow {
    fn new(team: TeamId) -> Self {
        Self {
            team,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
        }
    }

    /// Goals scored minus goals conceded.
    pub fn goal_diff(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }

    fn record(&mut self, scored: u16, conceded: u16) {
        self.played += 1;
        self.goals_for += u32::from(scored);
        self.goals_against += u32::from(conceded);
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.wins += 1;
                self.points += WIN_POINTS;
            }
            std::cmp::Ordering::Equal => {
                self.draws += 1;
                self.points += DRAW_POINTS;
            }
            std::cmp::Ordering::Less => self.losses += 1,
        }
    }
}

/// Compute the standings of `teams` from `games`.
///
/// When `allowlist` is given only games linked to one of those fixtures count. Games
/// involving a team outside `teams` are skipped. Rows are sorted by points, then goal
/// difference; remaining ties keep the order of `teams`.
pub fn compute_standings(
    teams: &[TeamId],
    games: &[GameResult],
    allowlist: Option<&HashSet<Uuid>>,
) -> Vec<StandingRow> {
    let mut table: IndexMap<TeamId, StandingRow> = teams
        .iter()
        .map(|team| (*team, StandingRow::new(*team)))
        .collect();

    for game in games {
        if let Some(allowed) = allowlist {
            match game.fixture_id {
                Some(fixture_id) if allowed.contains(&fixture_id) => {}
                _ => continue,
            }
        }
        if !table.contains_key(&game.team1) || !table.contains_key(&game.team2) {
            continue;
        }

        if let Some(row) = table.get_mut(&game.team1) {
            row.record(game.score1, game.score2);
        }
        if let Some(row) = table.get_mut(&game.team2) {
            row.record(game.score2, game.score1);
        }
    }

    let mut rows: Vec<StandingRow> = table.into_values().collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.goal_diff().cmp(&a.goal_diff()))
    });
    rows
}

/// Ids of the fixtures that belong to `phase`.
pub fn phase_fixture_ids(fixtures: &[Fixture], phase: &str) -> HashSet<Uuid> {
    fixtures
        .iter()
        .filter(|fixture| fixture.phase == phase)
        .map(|fixture| fixture.id)
        .collect()
}

/// Concrete teams appearing in `phase`, ascending.
pub fn phase_teams(fixtures: &[Fixture], phase: &str) -> Vec<TeamId> {
    let mut teams: Vec<TeamId> = fixtures
        .iter()
        .filter(|fixture| fixture.phase == phase)
        .flat_map(|fixture| [fixture.home.team(), fixture.away.team()])
        .flatten()
        .collect();
    teams.sort_unstable();
    teams.dedup();
    teams
}

/// Whether every fixture of `phase` has a game linked to it.
///
/// A phase without fixtures is never complete.
pub fn phase_complete(fixtures: &[Fixture], phase: &str, games: &[GameResult]) -> bool {
    let played: HashSet<Uuid> = games.iter().filter_map(|game| game.fixture_id).collect();
    let mut in_phase = fixtures.iter().filter(|fixture| fixture.phase == phase).peekable();
    in_phase.peek().is_some() && in_phase.all(|fixture| played.contains(&fixture.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::round_robin;

    fn game(team1: TeamId, team2: TeamId, score1: u16, score2: u16) -> GameResult {
        GameResult {
            team1,
            team2,
            score1,
            score2,
            fixture_id: None,
        }
    }

    #[test]
    fn awards_three_points_per_win_and_one_per_draw() {
        let games = [game(1, 2, 2, 0), game(2, 3, 1, 1), game(3, 1, 0, 0)];
        let table = compute_standings(&[1, 2, 3], &games, None);

        let total: u32 = table.iter().map(|row| row.points).sum();
        assert_eq!(total, 3 + 2 + 2);

        assert_eq!(table[0].team, 1);
        assert_eq!(table[0].points, 4);
        assert_eq!(table[0].wins, 1);
        assert_eq!(table[0].draws, 1);
    }

    #[test]
    fn ties_on_points_break_by_goal_difference() {
        let games = [game(1, 3, 1, 0), game(2, 3, 5, 0), game(1, 2, 0, 0)];
        let table = compute_standings(&[1, 2, 3], &games, None);

        assert_eq!(table[0].team, 2);
        assert_eq!(table[0].goal_diff(), 5);
        assert_eq!(table[1].team, 1);
        assert_eq!(table[2].team, 3);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let games = [game(1, 2, 1, 1)];
        let table = compute_standings(&[2, 1, 3], &games, None);
        let order: Vec<_> = table.iter().map(|row| row.team).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn allowlist_restricts_to_phase_games() {
        let fixtures = round_robin(3);
        let allowed = phase_fixture_ids(&fixtures, &fixtures[0].phase);
        let linked = GameResult {
            fixture_id: Some(fixtures[0].id),
            ..game(1, 2, 3, 0)
        };
        let friendly = game(2, 1, 4, 0);

        let table = compute_standings(&[1, 2, 3], &[linked, friendly], Some(&allowed));
        assert_eq!(table[0].team, 1);
        assert_eq!(table[0].points, 3);
        assert_eq!(table.iter().map(|row| row.played).sum::<u32>(), 2);
    }

    #[test]
    fn ignores_games_with_unknown_teams() {
        let table = compute_standings(&[1, 2], &[game(1, 5, 3, 0)], None);
        assert!(table.iter().all(|row| row.played == 0));
    }

    #[test]
    fn phase_completion_requires_every_fixture() {
        let fixtures = round_robin(3);
        let mut games: Vec<GameResult> = fixtures
            .iter()
            .take(2)
            .map(|fixture| GameResult {
                fixture_id: Some(fixture.id),
                ..game(1, 2, 1, 0)
            })
            .collect();
        let phase = fixtures[0].phase.clone();
        assert!(!phase_complete(&fixtures, &phase, &games));

        games.push(GameResult {
            fixture_id: Some(fixtures[2].id),
            ..game(2, 3, 0, 0)
        });
        assert!(phase_complete(&fixtures, &phase, &games));
        assert!(!phase_complete(&fixtures, "Eliminatoria", &games));
        assert_eq!(phase_teams(&fixtures, &phase), vec![1, 2, 3]);
    }
}
