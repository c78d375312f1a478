//! Team kits and the per-match team configuration map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::ToSchema;

/// Team number inside a match. `0` is never a team: it marks the bench.
pub type TeamId = u8;

/// Smallest number of teams a match can be split into.
pub const MIN_TEAMS: TeamId = 2;
/// Largest number of teams a match can be split into.
pub const MAX_TEAMS: TeamId = 6;

/// Visual identity of a team for one match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Kit {
    /// Human readable label (e.g. "Rojo").
    pub name: String,
    /// Shirt color as a `#rrggbb` string.
    pub shirt: String,
    /// Foreground color used for text drawn over the shirt color.
    pub text: String,
}

impl Kit {
    /// Build a kit from its three components.
    pub fn new(name: impl Into<String>, shirt: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shirt: shirt.into(),
            text: text.into(),
        }
    }
}

/// Mapping from team number to the kit it wears.
///
/// Persisted as a JSON object keyed by the team number rendered as a string
/// (`{"1": {...}, "2": {...}}`).
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamConfigs(#[serde_as(as = "BTreeMap<DisplayFromStr, _>")] BTreeMap<TeamId, Kit>);

impl TeamConfigs {
    /// Kit assigned to `team`, if any.
    pub fn get(&self, team: TeamId) -> Option<&Kit> {
        self.0.get(&team)
    }

    /// Assign `kit` to `team`, replacing any previous kit.
    pub fn insert(&mut self, team: TeamId, kit: Kit) {
        self.0.insert(team, kit);
    }

    /// Drop the kit of `team`, returning it.
    pub fn remove(&mut self, team: TeamId) -> Option<Kit> {
        self.0.remove(&team)
    }

    /// Iterate over `(team, kit)` pairs in ascending team order.
    pub fn iter(&self) -> impl Iterator<Item = (TeamId, &Kit)> {
        self.0.iter().map(|(team, kit)| (*team, kit))
    }

    /// Kits currently worn by any team.
    pub fn used_kits(&self) -> Vec<Kit> {
        self.0.values().cloned().collect()
    }

    /// Number of configured teams.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no team has a kit yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ensure every team in `1..=num_teams` has a kit.
    ///
    /// Missing entries take the first palette kit not already worn; once the palette is
    /// exhausted the palette is cycled by team number.
    pub fn normalized(mut self, num_teams: TeamId, palette: &[Kit]) -> Self {
        for team in 1..=num_teams {
            if self.0.contains_key(&team) {
                continue;
            }
            let used = self.used_kits();
            let kit = palette
                .iter()
                .find(|candidate| !used.contains(candidate))
                .or_else(|| {
                    (!palette.is_empty()).then(|| &palette[usize::from(team - 1) % palette.len()])
                })
                .cloned()
                .unwrap_or_else(|| fallback_kit(team));
            self.0.insert(team, kit);
        }
        self
    }
}

impl FromIterator<(TeamId, Kit)> for TeamConfigs {
    fn from_iter<I: IntoIterator<Item = (TeamId, Kit)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Plain kit used when no palette is available at all.
pub fn fallback_kit(team: TeamId) -> Kit {
    Kit::new(format!("Equipo {team}"), "#ffffff", "#000000")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Vec<Kit> {
        vec![
            Kit::new("Rojo", "#d32f2f", "#ffffff"),
            Kit::new("Azul", "#1976d2", "#ffffff"),
            Kit::new("Blanco", "#ffffff", "#000000"),
        ]
    }

    #[test]
    fn serializes_with_string_keys() {
        let configs: TeamConfigs = [(1, palette()[0].clone())].into_iter().collect();
        let json = serde_json::to_value(&configs).unwrap();
        assert_eq!(json["1"]["name"], "Rojo");

        let back: TeamConfigs = serde_json::from_value(json).unwrap();
        assert_eq!(back, configs);
    }

    #[test]
    fn normalized_fills_missing_teams_with_unused_kits() {
        let configs: TeamConfigs = [(2, palette()[0].clone())].into_iter().collect();
        let configs = configs.normalized(3, &palette());

        assert_eq!(configs.len(), 3);
        assert_eq!(configs.get(1).unwrap().name, "Azul");
        assert_eq!(configs.get(2).unwrap().name, "Rojo");
        assert_eq!(configs.get(3).unwrap().name, "Blanco");
    }

    #[test]
    fn normalized_cycles_palette_when_exhausted() {
        let configs = TeamConfigs::default().normalized(5, &palette());
        assert_eq!(configs.get(4).unwrap().name, "Rojo");
        assert_eq!(configs.get(5).unwrap().name, "Azul");
    }

    #[test]
    fn normalized_without_palette_uses_fallback() {
        let configs = TeamConfigs::default().normalized(2, &[]);
        assert_eq!(configs.get(2).unwrap().name, "Equipo 2");
    }
}
