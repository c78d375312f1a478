//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a free-text name has visible characters.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Cancha 5") // Ok
/// validate_not_blank("   ")      // Err
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a `#rrggbb` color string.
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('#').unwrap_or_default();
    if value.len() != 7 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        let mut err = ValidationError::new("hex_color");
        err.message = Some(format!("Color must look like #rrggbb (got {value})").into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(validate_not_blank("Cancha 5").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t").is_err());
    }

    #[test]
    fn hex_colors_need_six_digits() {
        assert!(validate_hex_color("#1976d2").is_ok());
        assert!(validate_hex_color("#FFF").is_err());
        assert!(validate_hex_color("1976d2").is_err());
        assert!(validate_hex_color("#19g6d2").is_err());
    }
}
