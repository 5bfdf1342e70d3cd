//! Optional JSON settings file.

use std::{
    fs, io,
    path::{Path, PathBuf},
    result::Result as StdResult,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    family::{AutoCollapse, LayoutConfig},
    viewport::ViewportConfig,
};

const CONFIG_FILE: &str = "genealogy-tui/config.json";

/// Default location: `<config_dir>/genealogy-tui/config.json`.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_FILE))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub auto_collapse: AutoCollapse,
}

impl Config {
    /// Load from `path`, or from [`default_path`] when `None`.
    ///
    /// An explicit path must exist. A missing default file yields the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Unreadable {
                    path,
                    reason: e.to_string(),
                }
                .into())
            }
        };

        let config = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StdResult<(), ConfigError> {
        self.layout.validate()?;
        self.viewport.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.auto_collapse.enabled);
        assert_eq!(config.auto_collapse.generation, 8);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_json_str(
            r#"{"layout": {"card_width": 200}, "auto_collapse": {"enabled": false}}"#,
        )
        .unwrap();
        assert!((config.layout.card_width - 200.0).abs() < f64::EPSILON);
        assert!((config.layout.card_height - 80.0).abs() < f64::EPSILON);
        assert!(!config.auto_collapse.enabled);
        assert_eq!(config.auto_collapse.generation, 8);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = Config::from_json_str(r#"{"viewport": {"min_scale": 5.0}}"#).unwrap_err();
        assert!(
            matches!(err, Error::Config(ConfigError::ScaleRange { .. })),
            "unexpected error: {err}"
        );

        let err = Config::from_json_str(r#"{"layout": {"couple_gap": -2}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Negative { .. })));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = Config::from_json_str("{ layout: ").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_reported() {
        let path = std::env::temp_dir().join("genealogy-tui-missing-config.json");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::Unreadable { .. })
        ));
    }
}
