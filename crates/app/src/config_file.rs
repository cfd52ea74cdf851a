//! Optional JSON file with the grid and session settings.
//!
//! ```json
//! { "grid": { "cell_size": 0.5 }, "placement": { "rotation_step_degrees": 45 } }
//! ```
//!
//! Missing keys take their defaults. A missing file is not an error.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use placement::grid::GridConfig;
use placement::session::PlacementSettings;

pub const DEFAULT_CONFIG_PATH: &str = "placement.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub grid: GridConfig,
    pub placement: PlacementSettings,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "read failed: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn parse(text: &str) -> Result<ConfigFile, ConfigError> {
    serde_json::from_str(text).map_err(ConfigError::Parse)
}

/// `Ok(None)` when there is no file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<Option<ConfigFile>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Io(e)),
    };
    parse(&text).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = parse(r#"{ "grid": { "cell_size": 0.5 } }"#).unwrap();
        assert_eq!(file.grid.cell_size, 0.5);
        assert_eq!(file.grid.origin, [0.0; 3]);
        assert_eq!(file.placement, PlacementSettings::default());
    }

    #[test]
    fn test_settings_override() {
        let file = parse(
            r#"{ "placement": { "rotation_step_degrees": 45.0, "controller_hand": "Left" } }"#,
        )
        .unwrap();
        assert_eq!(file.placement.rotation_step_degrees, 45.0);
        assert_eq!(file.placement.controller_hand, placement::interaction::Hand::Left);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        assert!(load("/nonexistent/placement.json").unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_is_reported() {
        assert!(matches!(parse("{ grid: "), Err(ConfigError::Parse(_))));
    }
}
