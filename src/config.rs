// Game configuration
//
// Loaded in order of precedence:
// 1. MILESTONES_CONFIG (path to a TOML file)
// 2. ~/.config/milestones/config.toml
// 3. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_ENV: &str = "MILESTONES_CONFIG";
const CONFIG_DIR: &str = "milestones";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Points added for every resolved pair
    pub match_reward: u32,
    /// Points removed for a mismatch; the score never drops below zero
    pub mismatch_penalty: u32,
    pub mismatch_delay_ms: u64,
    pub hint_delay_ms: u64,
    pub tick_ms: u64,
    pub hints_enabled: bool,
    /// Fixed shuffle seed, mostly useful for reproducing a board
    pub seed: Option<u64>,
    /// Alternate catalog JSON; the bundled achievements are used when unset
    pub catalog_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            match_reward: 100,
            mismatch_penalty: 10,
            mismatch_delay_ms: 1000,
            hint_delay_ms: 1000,
            tick_ms: 1000,
            hints_enabled: true,
            seed: None,
            catalog_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl GameConfig {
    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_delay_ms)
    }

    pub fn hint_delay(&self) -> Duration {
        Duration::from_millis(self.hint_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml(&raw, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_rules() {
        let config = GameConfig::default();
        assert_eq!(config.match_reward, 100);
        assert_eq!(config.mismatch_penalty, 10);
        assert_eq!(config.mismatch_delay(), Duration::from_secs(1));
        assert_eq!(config.hint_delay(), Duration::from_secs(1));
        assert!(config.hints_enabled);
        assert!(config.seed.is_none());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = GameConfig::from_toml(
            "match_reward = 250\nseed = 9\nhints_enabled = false\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.match_reward, 250);
        assert_eq!(config.seed, Some(9));
        assert!(!config.hints_enabled);
        assert_eq!(config.mismatch_penalty, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn bad_toml_reports_the_path() {
        let err = GameConfig::from_toml("match_reward = \"lots\"", Path::new("bad.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("milestones-config-does-not-exist.toml");
        assert_eq!(GameConfig::load_from(&path).unwrap(), GameConfig::default());
    }

    #[test]
    fn zero_tick_is_clamped() {
        let config = GameConfig {
            tick_ms: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }
}
