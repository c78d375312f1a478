//! Application-level configuration loading: kit palette and banner timing.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{dto::validation::validate_hex_color, state::kits::Kit};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PICHANGA_CONFIG_PATH";
/// How long clients keep a status banner on screen unless configured otherwise.
const DEFAULT_BANNER_DISMISS_MS: u64 = 4_000;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    palette: Vec<Kit>,
    banner_dismiss: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        kits = app_config.palette.len(),
                        "loaded kit palette from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Kits teams can wear, in preference order.
    pub fn palette(&self) -> &[Kit] {
        &self.palette
    }

    /// Delay after which clients hide a status banner.
    pub fn banner_dismiss(&self) -> Duration {
        self.banner_dismiss
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            banner_dismiss: Duration::from_millis(DEFAULT_BANNER_DISMISS_MS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    kits: Vec<RawKit>,
    #[serde(default)]
    banner_dismiss_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let kits: Vec<Kit> = value
            .kits
            .into_iter()
            .filter(|kit| {
                let valid = validate_hex_color(&kit.shirt).is_ok()
                    && validate_hex_color(&kit.text).is_ok();
                if !valid {
                    warn!(kit = %kit.name, "ignoring kit with invalid colors");
                }
                valid
            })
            .map(Into::into)
            .collect();
        let palette = if kits.is_empty() {
            default_palette()
        } else {
            kits
        };
        let banner_dismiss =
            Duration::from_millis(value.banner_dismiss_ms.unwrap_or(DEFAULT_BANNER_DISMISS_MS));
        Self {
            palette,
            banner_dismiss,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single kit inside the configuration file.
struct RawKit {
    name: String,
    shirt: String,
    #[serde(default = "default_text_color")]
    text: String,
}

impl From<RawKit> for Kit {
    fn from(value: RawKit) -> Self {
        Kit::new(value.name, value.shirt, value.text)
    }
}

fn default_text_color() -> String {
    "#ffffff".into()
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in palette shipped with the binary.
fn default_palette() -> Vec<Kit> {
    [
        ("Rojo", "#d32f2f", "#ffffff"),
        ("Azul", "#1976d2", "#ffffff"),
        ("Verde", "#388e3c", "#ffffff"),
        ("Amarillo", "#fbc02d", "#000000"),
        ("Blanco", "#fafafa", "#000000"),
        ("Negro", "#212121", "#ffffff"),
        ("Naranja", "#f57c00", "#000000"),
        ("Morado", "#7b1fa2", "#ffffff"),
        ("Celeste", "#4fc3f7", "#000000"),
    ]
    .into_iter()
    .map(|(name, shirt, text)| Kit::new(name, shirt, text))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_overrides_palette_and_delay() {
        let raw: RawConfig = serde_json::from_str(
            r##"{"kits": [{"name": "Granate", "shirt": "#800000"}], "banner_dismiss_ms": 2500}"##,
        )
        .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.palette(), &[Kit::new("Granate", "#800000", "#ffffff")]);
        assert_eq!(config.banner_dismiss(), Duration::from_millis(2500));
    }

    #[test]
    fn kits_with_invalid_colors_are_skipped() {
        let raw: RawConfig = serde_json::from_str(
            r##"{"kits": [{"name": "Malo", "shirt": "red"}, {"name": "Oro", "shirt": "#ffd700", "text": "#000000"}]}"##,
        )
        .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.palette(), &[Kit::new("Oro", "#ffd700", "#000000")]);
    }

    #[test]
    fn empty_config_keeps_defaults() {
        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.palette(), default_palette().as_slice());
        assert_eq!(
            config.banner_dismiss(),
            Duration::from_millis(DEFAULT_BANNER_DISMISS_MS)
        );
    }
}
