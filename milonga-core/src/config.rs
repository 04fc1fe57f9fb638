//! User preferences from `~/.milonga/config.yaml`.
//!
//! The file is optional. Every field has a default, so a partial file only
//! overrides what it names.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::program::clamp_slot_count;
use crate::store::{home, milonga_dir_at};
use crate::types::{hhmm, DEFAULT_SLOTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Slot count for new plans; clamped to 4–30 on load.
    pub default_slots: usize,
    #[serde(with = "hhmm")]
    pub default_start_time: NaiveTime,
    pub default_track_count: u8,
    /// User catalog YAML used instead of the bundled one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_slots: DEFAULT_SLOTS,
            default_start_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default(),
            default_track_count: 4,
            catalog_path: None,
        }
    }
}

/// `<home>/.milonga/config.yaml`, pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    milonga_dir_at(home).join("config.yaml")
}

/// Read the config under `home`. A missing file yields defaults.
pub fn load_at(home: &Path) -> Result<Config, StoreError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    let mut config: Config = if contents.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse {
            path: path.clone(),
            source: e,
        })?
    };
    config.default_slots = clamp_slot_count(config.default_slots);
    config.default_track_count = config.default_track_count.clamp(3, 4);
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, StoreError> {
    load_at(&home()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(home: &TempDir, body: &str) {
        let dir = milonga_dir_at(home.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.yaml"), body).unwrap();
    }

    #[test]
    fn missing_file_gives_defaults() {
        let home = TempDir::new().unwrap();
        let config = load_at(home.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_slots, 14);
        assert_eq!(config.default_start_time.to_string(), "21:00:00");
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let home = TempDir::new().unwrap();
        write_config(&home, "default_slots: 50\ndefault_start_time: '22:30'\n");
        let config = load_at(home.path()).unwrap();
        assert_eq!(config.default_slots, 30);
        assert_eq!(config.default_start_time, NaiveTime::from_hms_opt(22, 30, 0).unwrap());
        assert_eq!(config.default_track_count, 4);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let home = TempDir::new().unwrap();
        write_config(&home, "default_slots: [not, a, number]\n");
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
