//! Team balancing by snake draft over display ratings.

use uuid::Uuid;

use crate::state::kits::TeamId;

/// Assign each `(enrollment, rating)` to a team, strongest first, in snake order
/// (`1..n`, `n..1`, ...). Each team takes at most `players_per_team`; the rest go to the
/// bench (`None`). Equal ratings keep their input order.
pub fn snake_draft(
    players: &[(Uuid, u8)],
    num_teams: TeamId,
    players_per_team: u8,
) -> Vec<(Uuid, Option<TeamId>)> {
    let mut ranked = players.to_vec();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let capacity = usize::from(num_teams) * usize::from(players_per_team);
    let order: Vec<TeamId> = (1..=num_teams).chain((1..=num_teams).rev()).collect();

    ranked
        .into_iter()
        .enumerate()
        .map(|(pick, (enrollment, _))| {
            let team = (pick < capacity && !order.is_empty()).then(|| order[pick % order.len()]);
            (enrollment, team)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(ratings: &[u8]) -> Vec<(Uuid, u8)> {
        ratings.iter().map(|r| (Uuid::new_v4(), *r)).collect()
    }

    #[test]
    fn drafts_in_snake_order() {
        let input = players(&[90, 80, 70, 60, 50, 40]);
        let drafted = snake_draft(&input, 2, 3);
        let teams: Vec<_> = drafted.iter().map(|(_, team)| *team).collect();
        assert_eq!(
            teams,
            vec![Some(1), Some(2), Some(2), Some(1), Some(1), Some(2)]
        );
        assert_eq!(drafted[0].0, input[0].0);
    }

    #[test]
    fn overflow_goes_to_the_bench() {
        let input = players(&[60, 99, 70, 80, 41]);
        let drafted = snake_draft(&input, 2, 2);
        assert_eq!(drafted.iter().filter(|(_, t)| t.is_some()).count(), 4);
        assert_eq!(drafted.last().unwrap(), &(input[4].0, None));
        assert_eq!(drafted[0], (input[1].0, Some(1)));
    }

    #[test]
    fn team_sizes_never_exceed_players_per_team() {
        let input = players(&[60; 17]);
        let drafted = snake_draft(&input, 3, 5);
        for team in 1..=3 {
            let size = drafted.iter().filter(|(_, t)| *t == Some(team)).count();
            assert_eq!(size, 5);
        }
    }
}
