//! Binding of placeholder slots to concrete teams from recorded results.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    services::standings::{compute_standings, phase_complete, phase_fixture_ids, phase_teams},
    state::{
        kits::TeamId,
        tournament::{Fixture, GameResult, Placeholder, Slot},
    },
};

/// Lookup tables built once per fixture list.
pub struct Resolver<'a> {
    results: HashMap<Uuid, &'a GameResult>,
    numbered: HashMap<&'a str, HashMap<u32, Uuid>>,
    rankings: HashMap<&'a str, Vec<TeamId>>,
}

impl<'a> Resolver<'a> {
    /// Index `fixtures` and `games`. When several games are linked to one fixture the last
    /// one counts.
    pub fn new(fixtures: &'a [Fixture], games: &'a [GameResult]) -> Self {
        let results = games
            .iter()
            .filter_map(|game| game.fixture_id.map(|id| (id, game)))
            .collect();

        let mut numbered: HashMap<&str, HashMap<u32, Uuid>> = HashMap::new();
        for fixture in fixtures {
            if let Some(number) = fixture.number() {
                numbered
                    .entry(fixture.phase.as_str())
                    .or_default()
                    .insert(number, fixture.id);
            }
        }

        let mut rankings = HashMap::new();
        for fixture in fixtures {
            for slot in [&fixture.home, &fixture.away] {
                let Some(Placeholder::Rank { phase, .. }) = slot.placeholder() else {
                    continue;
                };
                if rankings.contains_key(phase.as_str())
                    || !phase_complete(fixtures, phase, games)
                {
                    continue;
                }
                let allowed = phase_fixture_ids(fixtures, phase);
                let table = compute_standings(&phase_teams(fixtures, phase), games, Some(&allowed));
                rankings.insert(
                    phase.as_str(),
                    table.into_iter().map(|row| row.team).collect(),
                );
            }
        }

        Self {
            results,
            numbered,
            rankings,
        }
    }

    /// Game linked to the fixture labeled "Juego `number`" of `phase`.
    fn result_of(&self, phase: &str, number: u32) -> Option<&GameResult> {
        let id = self.numbered.get(phase)?.get(&number)?;
        self.results.get(id).copied()
    }

    /// Team bound to `placeholder` for a fixture of `phase`, if already determined.
    pub fn team_for(&self, phase: &str, placeholder: &Placeholder) -> Option<TeamId> {
        match placeholder {
            Placeholder::WinnerOf(number) => self.result_of(phase, *number)?.winner(),
            Placeholder::LoserOf(number) => self.result_of(phase, *number)?.loser(),
            Placeholder::Rank { rank, phase } => {
                let index = usize::from(rank.checked_sub(1)?);
                self.rankings.get(phase.as_str())?.get(index).copied()
            }
        }
    }

    /// Concrete team of `slot`, if bound or resolvable.
    pub fn team_of(&self, phase: &str, slot: &Slot) -> Option<TeamId> {
        match slot {
            Slot::Team(team) => Some(*team),
            Slot::Placeholder(placeholder) => self.team_for(phase, placeholder),
        }
    }

    /// Copy of `fixture` with every resolvable placeholder replaced by its team.
    pub fn resolve(&self, fixture: &Fixture) -> Fixture {
        let bind = |slot: &Slot| {
            self.team_of(&fixture.phase, slot)
                .map(Slot::Team)
                .unwrap_or_else(|| slot.clone())
        };
        Fixture {
            home: bind(&fixture.home),
            away: bind(&fixture.away),
            ..fixture.clone()
        }
    }
}

/// Replace the placeholders of `fixtures` that `games` already determine.
pub fn resolve_fixtures(fixtures: &[Fixture], games: &[GameResult]) -> Vec<Fixture> {
    let resolver = Resolver::new(fixtures, games);
    fixtures
        .iter()
        .map(|fixture| resolver.resolve(fixture))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{elimination_from_standings, round_robin};

    fn played(fixture: &Fixture, score1: u16, score2: u16) -> GameResult {
        GameResult {
            team1: fixture.home.team().unwrap(),
            team2: fixture.away.team().unwrap(),
            score1,
            score2,
            fixture_id: Some(fixture.id),
        }
    }

    #[test]
    fn winner_of_follows_the_linked_game() {
        let fixtures = elimination_from_standings(2)
            .into_iter()
            .chain(std::iter::once(Fixture::numbered(
                "Eliminatoria",
                2,
                None,
                Slot::Placeholder(Placeholder::WinnerOf(1)),
                Slot::Placeholder(Placeholder::LoserOf(1)),
            )))
            .collect::<Vec<_>>();

        let unresolved = resolve_fixtures(&fixtures, &[]);
        assert_eq!(unresolved[1].home.team(), None);

        let home_win = [played(&fixtures[0], 2, 1)];
        let resolved = resolve_fixtures(&fixtures, &home_win);
        assert_eq!(resolved[1].home, Slot::Team(1));
        assert_eq!(resolved[1].away, Slot::Team(2));

        let away_win = [played(&fixtures[0], 0, 1)];
        let resolved = resolve_fixtures(&fixtures, &away_win);
        assert_eq!(resolved[1].home, Slot::Team(2));

        let draw = [played(&fixtures[0], 1, 1)];
        let resolved = resolve_fixtures(&fixtures, &draw);
        assert!(resolved[1].home.placeholder().is_some());
        assert!(resolved[1].away.placeholder().is_some());
    }

    #[test]
    fn four_team_league_seeds_the_knockout() {
        let league = round_robin(4);
        // Lower team number always wins.
        let games: Vec<GameResult> = league.iter().map(|f| played(f, 1, 0)).collect();

        let table = compute_standings(&[1, 2, 3, 4], &games, None);
        let points: Vec<(TeamId, u32)> = table.iter().map(|r| (r.team, r.points)).collect();
        assert_eq!(points, vec![(1, 9), (2, 6), (3, 3), (4, 0)]);

        let mut fixtures = league;
        fixtures.extend(elimination_from_standings(4));
        let resolved = resolve_fixtures(&fixtures, &games);

        let semis: Vec<(Slot, Slot)> = resolved[6..8]
            .iter()
            .map(|f| (f.home.clone(), f.away.clone()))
            .collect();
        assert_eq!(
            semis,
            vec![
                (Slot::Team(1), Slot::Team(4)),
                (Slot::Team(2), Slot::Team(3)),
            ]
        );
        assert!(resolved[8].home.placeholder().is_some());
        assert!(resolved[9].home.placeholder().is_some());
    }

    #[test]
    fn ranks_stay_open_until_the_phase_is_complete() {
        let league = round_robin(4);
        let games: Vec<GameResult> = league.iter().take(5).map(|f| played(f, 1, 0)).collect();

        let mut fixtures = league;
        fixtures.extend(elimination_from_standings(4));
        let resolved = resolve_fixtures(&fixtures, &games);
        assert!(resolved[6].home.placeholder().is_some());
    }
}
