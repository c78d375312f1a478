//! Mapping from raw ELO values to the 40-99 rating shown on player cards.

/// Rating shown for players without an ELO value.
pub const DEFAULT_RATING: u8 = 60;
/// ELO value that maps to [`DEFAULT_RATING`].
pub const BASE_ELO: i32 = 1000;
/// Lower bound applied to the community max ELO before scaling.
pub const MAX_ELO_FLOOR: i32 = 2000;

const MIN_RATING: f64 = 40.0;
const MAX_RATING: f64 = 99.0;
const RATING_SPAN: f64 = 39.0;

/// Map `elo` onto the display scale using the community maximum `max_elo`.
pub fn rating(elo: Option<i32>, max_elo: i32) -> u8 {
    let Some(elo) = elo else {
        return DEFAULT_RATING;
    };

    let ceiling = f64::from(max_elo.max(MAX_ELO_FLOOR));
    let base = f64::from(BASE_ELO);
    let scaled =
        f64::from(DEFAULT_RATING) + (f64::from(elo) - base) / (ceiling - base) * RATING_SPAN;

    scaled.floor().clamp(MIN_RATING, MAX_RATING) as u8
}

/// Highest ELO among `elos`, never below [`MAX_ELO_FLOOR`].
pub fn community_max_elo<I>(elos: I) -> i32
where
    I: IntoIterator<Item = Option<i32>>,
{
    elos.into_iter()
        .flatten()
        .max()
        .unwrap_or(MAX_ELO_FLOOR)
        .max(MAX_ELO_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_elo_maps_to_sixty() {
        for max in [0, 1500, 2000, 2400, 3100] {
            assert_eq!(rating(Some(BASE_ELO), max), 60);
        }
    }

    #[test]
    fn missing_elo_is_default() {
        assert_eq!(rating(None, 2500), DEFAULT_RATING);
    }

    #[test]
    fn community_max_maps_to_ninety_nine() {
        assert_eq!(rating(Some(2000), 2000), 99);
        assert_eq!(rating(Some(2600), 2600), 99);
    }

    #[test]
    fn output_is_clamped() {
        assert_eq!(rating(Some(-5000), 2000), 40);
        assert_eq!(rating(Some(i32::MAX), 2000), 99);
        assert_eq!(rating(Some(i32::MIN), i32::MAX), 40);
    }

    #[test]
    fn non_decreasing_in_elo() {
        let max = 2300;
        let mut previous = rating(Some(0), max);
        for elo in (0..3000).step_by(7) {
            let current = rating(Some(elo), max);
            assert!(current >= previous, "rating dropped at elo {elo}");
            previous = current;
        }
    }

    #[test]
    fn floors_fractional_ratings() {
        // 60 + 150 / 1000 * 39 = 65.85
        assert_eq!(rating(Some(1150), 2000), 65);
    }

    #[test]
    fn community_max_respects_floor() {
        assert_eq!(community_max_elo([Some(1200), None, Some(1800)]), MAX_ELO_FLOOR);
        assert_eq!(community_max_elo([Some(2450), Some(1800)]), 2450);
        assert_eq!(community_max_elo(Vec::new()), MAX_ELO_FLOOR);
    }
}
