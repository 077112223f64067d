use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::categories::Theme;
use crate::difficulty::{DEFAULT_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS, MIN_TIME_LIMIT_SECS};
use crate::memory::MAX_LEVEL;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_theme: Theme,
    pub starting_time_limit_secs: u32,
    pub memory_level: u32,
    pub tick_rate_ms: u64,
    pub record_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_theme: Theme::Animals,
            starting_time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            memory_level: 1,
            tick_rate_ms: 100,
            record_history: true,
        }
    }
}

impl Config {
    /// Pull hand-edited values back into their playable ranges
    pub fn normalized(mut self) -> Self {
        self.memory_level = self.memory_level.clamp(1, MAX_LEVEL);
        self.starting_time_limit_secs = self
            .starting_time_limit_secs
            .clamp(MIN_TIME_LIMIT_SECS, MAX_TIME_LIMIT_SECS);
        self.tick_rate_ms = self.tick_rate_ms.max(10);
        self
    }

    /// Saved memory level, but never past what the player has unlocked
    pub fn memory_start_level(&self, unlocked_levels: u32) -> u32 {
        self.memory_level
            .clamp(1, unlocked_levels.clamp(1, MAX_LEVEL))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        serde_json::from_slice::<Config>(&bytes)
            .map(Config::normalized)
            .unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "invalid config, using defaults");
                Config::default()
            })
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("cfg").join("config.json"));
        let cfg = Config {
            default_theme: Theme::Countries,
            starting_time_limit_secs: 20,
            memory_level: 4,
            tick_rate_ms: 50,
            record_history: false,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"default_theme":"fruits"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.default_theme, Theme::Fruits);
        assert_eq!(cfg.starting_time_limit_secs, DEFAULT_TIME_LIMIT_SECS);
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"][").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            br#"{"memory_level":0,"starting_time_limit_secs":90,"tick_rate_ms":0}"#,
        )
        .unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.memory_level, 1);
        assert_eq!(cfg.starting_time_limit_secs, MAX_TIME_LIMIT_SECS);
        assert_eq!(cfg.tick_rate_ms, 10);

        fs::write(&path, br#"{"memory_level":99}"#).unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load().memory_level, MAX_LEVEL);
    }

    #[test]
    fn memory_start_level_respects_unlocks() {
        let cfg = Config {
            memory_level: 7,
            ..Config::default()
        };
        assert_eq!(cfg.memory_start_level(3), 3);
        assert_eq!(cfg.memory_start_level(MAX_LEVEL), 7);
        assert_eq!(cfg.memory_start_level(0), 1);
    }
}
