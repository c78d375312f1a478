//! Capacity, quota and cost arithmetic plus the kit bookkeeping that comes with resizing.

use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};
use thiserror::Error;

use crate::state::kits::{Kit, MAX_TEAMS, MIN_TEAMS, TeamConfigs, TeamId, fallback_kit};

/// Errors raised when resizing a match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// The match already has the maximum number of teams.
    #[error("a match cannot have more than {MAX_TEAMS} teams")]
    AtMaximum,
    /// The match already has the minimum number of teams.
    #[error("a match needs at least {MIN_TEAMS} teams")]
    AtMinimum,
    /// The field has no players per team configured.
    #[error("the field has no players per team configured")]
    NoPlayersPerTeam,
}

/// Number of teams a match of `max_players` splits into.
pub fn num_teams(max_players: u16, players_per_team: u8) -> TeamId {
    if players_per_team == 0 {
        return MIN_TEAMS;
    }
    let per_team = u32::from(players_per_team);
    let rounded = (2 * u32::from(max_players) + per_team) / (2 * per_team);
    rounded.clamp(u32::from(MIN_TEAMS), u32::from(MAX_TEAMS)) as TeamId
}

/// Players needed to fill `num_teams` teams.
pub fn total_needed(num_teams: TeamId, players_per_team: u8) -> u16 {
    u16::from(num_teams) * u16::from(players_per_team)
}

/// Suggested per-player share of one hour: `ceil(price / (2 * players_per_team))`.
pub fn suggested_quota(price_per_hour: u32, players_per_team: u8) -> u32 {
    let divisor = 2 * u32::from(players_per_team.max(1));
    price_per_hour.div_ceil(divisor)
}

/// Total cost of a match: the fixed override, else the field price prorated by duration.
pub fn match_cost(fixed_cost: Option<u32>, price_per_hour: u32, duration_minutes: u16) -> u32 {
    fixed_cost.unwrap_or_else(|| {
        let prorated = u64::from(price_per_hour) * u64::from(duration_minutes) / 60;
        u32::try_from(prorated).unwrap_or(u32::MAX)
    })
}

/// Per-head share of `cost`, rounded up. `None` when nobody is counted.
pub fn split_cost(cost: u32, headcount: usize) -> Option<u32> {
    let headcount = u32::try_from(headcount).ok().filter(|count| *count > 0)?;
    Some(cost.div_ceil(headcount))
}

/// Result of adding or removing one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resize {
    /// Team that was added or removed.
    pub team: TeamId,
    /// New capacity of the match.
    pub max_players: u16,
    /// Kits after the change.
    pub team_configs: TeamConfigs,
}

/// Add one team's worth of capacity and give the new team a random unused kit.
pub fn expand<R>(
    max_players: u16,
    players_per_team: u8,
    team_configs: TeamConfigs,
    palette: &[Kit],
    rng: &mut R,
) -> Result<Resize, CapacityError>
where
    R: Rng + ?Sized,
{
    if players_per_team == 0 {
        return Err(CapacityError::NoPlayersPerTeam);
    }
    let current = num_teams(max_players, players_per_team);
    if current >= MAX_TEAMS {
        return Err(CapacityError::AtMaximum);
    }

    let team = current + 1;
    let mut team_configs = team_configs.normalized(current, palette);
    let kit = pick_unused_kit(palette, &team_configs.used_kits(), rng)
        .unwrap_or_else(|| fallback_kit(team));
    team_configs.insert(team, kit);

    Ok(Resize {
        team,
        max_players: total_needed(team, players_per_team),
        team_configs,
    })
}

/// Remove the highest-numbered team. Its players must be moved to the bench by the caller.
pub fn shrink(
    max_players: u16,
    players_per_team: u8,
    team_configs: TeamConfigs,
) -> Result<Resize, CapacityError> {
    if players_per_team == 0 {
        return Err(CapacityError::NoPlayersPerTeam);
    }
    let current = num_teams(max_players, players_per_team);
    if current <= MIN_TEAMS {
        return Err(CapacityError::AtMinimum);
    }

    let mut team_configs = team_configs;
    for team in current..=MAX_TEAMS {
        team_configs.remove(team);
    }

    Ok(Resize {
        team: current,
        max_players: total_needed(current - 1, players_per_team),
        team_configs,
    })
}

/// Random palette kit not in `used`; any palette kit once every one is taken.
pub fn pick_unused_kit<R>(palette: &[Kit], used: &[Kit], rng: &mut R) -> Option<Kit>
where
    R: Rng + ?Sized,
{
    let unused: Vec<&Kit> = palette.iter().filter(|kit| !used.contains(kit)).collect();
    match unused.choose(rng) {
        Some(kit) => Some((*kit).clone()),
        None => palette.choose(rng).cloned(),
    }
}

/// Fresh random kits for teams `1..=num_teams`, distinct while the palette allows it.
pub fn shuffle_kits<R>(num_teams: TeamId, palette: &[Kit], rng: &mut R) -> TeamConfigs
where
    R: Rng + ?Sized,
{
    let mut kits = palette.to_vec();
    kits.shuffle(rng);

    (1..=num_teams)
        .map(|team| {
            let kit = if kits.is_empty() {
                fallback_kit(team)
            } else {
                kits[usize::from(team - 1) % kits.len()].clone()
            };
            (team, kit)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn palette() -> Vec<Kit> {
        ["Rojo", "Azul", "Verde", "Negro", "Blanco", "Amarillo", "Naranja"]
            .into_iter()
            .map(|name| Kit::new(name, "#000000", "#ffffff"))
            .collect()
    }

    #[test]
    fn team_count_rounds_and_has_a_floor() {
        assert_eq!(num_teams(10, 5), 2);
        assert_eq!(num_teams(15, 5), 3);
        assert_eq!(num_teams(17, 5), 3);
        assert_eq!(num_teams(18, 5), 4);
        assert_eq!(num_teams(1, 7), 2);
        assert_eq!(num_teams(0, 0), 2);
        for max in 1..200 {
            assert!(num_teams(max, 6) >= 2);
        }
        assert_eq!(total_needed(3, 5), 15);
    }

    #[test]
    fn quota_is_within_one_share_of_the_price() {
        for price in [0, 1, 59, 100, 4_999, 60_000] {
            for per_team in 1..=11u8 {
                let quota = suggested_quota(price, per_team);
                let collected = quota * 2 * u32::from(per_team);
                assert!(collected >= price);
                assert!(collected - price < 2 * u32::from(per_team));
            }
        }
        assert_eq!(suggested_quota(100, 5), 10);
        assert_eq!(suggested_quota(101, 5), 11);
    }

    #[test]
    fn cost_prefers_fixed_override() {
        assert_eq!(match_cost(Some(500), 1200, 90), 500);
        assert_eq!(match_cost(None, 1200, 90), 1800);
        assert_eq!(split_cost(1800, 7), Some(258));
        assert_eq!(split_cost(1800, 0), None);
    }

    #[test]
    fn expand_adds_a_team_with_an_unused_kit() {
        let mut rng = StdRng::seed_from_u64(3);
        let configs = TeamConfigs::default().normalized(2, &palette());

        let resized = expand(10, 5, configs.clone(), &palette(), &mut rng).unwrap();
        assert_eq!(resized.team, 3);
        assert_eq!(resized.max_players, 15);
        let added = resized.team_configs.get(3).unwrap();
        assert!(!configs.used_kits().contains(added));
    }

    #[test]
    fn expand_stops_at_six_teams() {
        let mut rng = StdRng::seed_from_u64(1);
        let configs = TeamConfigs::default().normalized(6, &palette());
        assert_eq!(
            expand(30, 5, configs, &palette(), &mut rng),
            Err(CapacityError::AtMaximum)
        );
    }

    #[test]
    fn expand_reuses_palette_when_exhausted() {
        let mut rng = StdRng::seed_from_u64(9);
        let small = &palette()[..2];
        let configs = TeamConfigs::default().normalized(2, small);
        let resized = expand(10, 5, configs, small, &mut rng).unwrap();
        assert!(small.contains(resized.team_configs.get(3).unwrap()));
    }

    #[test]
    fn shrink_removes_the_last_team() {
        let configs = TeamConfigs::default().normalized(3, &palette());
        let resized = shrink(15, 5, configs).unwrap();
        assert_eq!(resized.team, 3);
        assert_eq!(resized.max_players, 10);
        assert!(resized.team_configs.get(3).is_none());
        assert_eq!(resized.team_configs.len(), 2);

        let configs = TeamConfigs::default().normalized(2, &palette());
        assert_eq!(shrink(10, 5, configs), Err(CapacityError::AtMinimum));
    }

    #[test]
    fn shuffled_kits_are_distinct() {
        let mut rng = StdRng::seed_from_u64(5);
        let configs = shuffle_kits(6, &palette(), &mut rng);
        let mut names: Vec<_> = configs.iter().map(|(_, kit)| kit.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }
}
