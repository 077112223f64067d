use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::error::{MindplayError, Result};
use crate::memory::{LevelResult, MAX_LEVEL};

pub const UNLOCKED_LEVELS_KEY: &str = "memoryGame_unlockedLevels";
pub const SETTINGS_KEY: &str = "memoryGame_settings";
pub const LEVEL_PERFORMANCE_KEY: &str = "memoryGame_levelPerformance";

/// Results kept per level; older ones are dropped
pub const MAX_RESULTS_PER_LEVEL: usize = 10;

/// Per-user string key/value storage
pub trait LocalStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

impl<T: LocalStorage + ?Sized> LocalStorage for Box<T> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

/// Key/value pairs kept as one JSON object on disk
#[derive(Debug, Clone)]
pub struct FileLocalStorage {
    path: PathBuf,
    items: HashMap<String, String>,
    /// Set when an existing file could not be read; writes are refused
    unreadable: Option<io::ErrorKind>,
}

impl FileLocalStorage {
    pub fn open() -> Self {
        Self::with_path(AppDirs::local_storage_path())
    }

    /// A missing or corrupt file starts empty and the next write replaces it.
    /// A file that exists but cannot be read is left alone: reads see an
    /// empty store and writes fail.
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        let path = p.as_ref().to_path_buf();
        let mut unreadable = None;
        let items = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring corrupt local storage");
                HashMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "local storage unreadable, not saving progress");
                unreadable = Some(e.kind());
                HashMap::new()
            }
        };
        Self {
            path,
            items,
            unreadable,
        }
    }

    fn persist(&self) -> Result<()> {
        if let Some(kind) = self.unreadable {
            return Err(io::Error::new(
                kind,
                format!("refusing to overwrite unreadable {}", self.path.display()),
            )
            .into());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&self.items)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl LocalStorage for FileLocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        self.items.insert(key.to_string(), value);
        self.persist()
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if self.items.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLocalStorage {
    items: HashMap<String, String>,
}

impl LocalStorage for MemoryLocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub sound_enabled: bool,
    pub music_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
        }
    }
}

/// What the memory game remembers between runs
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub unlocked_levels: u32,
    pub settings: Settings,
    pub level_performance: BTreeMap<u32, Vec<LevelResult>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            unlocked_levels: 1,
            settings: Settings::default(),
            level_performance: BTreeMap::new(),
        }
    }
}

impl SessionState {
    pub fn is_unlocked(&self, level: u32) -> bool {
        (1..=self.unlocked_levels).contains(&level)
    }

    /// Results for a level, oldest first
    pub fn history(&self, level: u32) -> &[LevelResult] {
        self.level_performance
            .get(&level)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append a result; a win unlocks the following level
    pub fn record_level_result(&mut self, result: LevelResult) {
        if result.won {
            let next = (result.level + 1).min(MAX_LEVEL);
            self.unlocked_levels = self.unlocked_levels.max(next);
        }
        let results = self.level_performance.entry(result.level).or_default();
        results.push(result);
        if results.len() > MAX_RESULTS_PER_LEVEL {
            let excess = results.len() - MAX_RESULTS_PER_LEVEL;
            results.drain(..excess);
        }
    }
}

/// Loads and saves `SessionState` through a `LocalStorage`
pub struct SessionStore<S: LocalStorage> {
    storage: S,
}

impl<S: LocalStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Missing or corrupt keys fall back to their defaults
    pub fn load(&self) -> SessionState {
        let defaults = SessionState::default();

        let unlocked_levels = self
            .storage
            .get_item(UNLOCKED_LEVELS_KEY)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(|n| n.clamp(1, MAX_LEVEL))
            .unwrap_or(defaults.unlocked_levels);

        SessionState {
            unlocked_levels,
            settings: self.read_json(SETTINGS_KEY).unwrap_or(defaults.settings),
            level_performance: self
                .read_json(LEVEL_PERFORMANCE_KEY)
                .unwrap_or(defaults.level_performance),
        }
    }

    pub fn save(&mut self, state: &SessionState) -> Result<()> {
        self.storage
            .set_item(UNLOCKED_LEVELS_KEY, state.unlocked_levels.to_string())?;
        self.storage
            .set_item(SETTINGS_KEY, serde_json::to_string(&state.settings)?)?;
        self.storage.set_item(
            LEVEL_PERFORMANCE_KEY,
            serde_json::to_string(&state.level_performance)?,
        )?;
        Ok(())
    }

    /// Forget all progress
    pub fn reset(&mut self) -> Result<()> {
        for key in [UNLOCKED_LEVELS_KEY, SETTINGS_KEY, LEVEL_PERFORMANCE_KEY] {
            self.storage.remove_item(key)?;
        }
        Ok(())
    }

    /// Load, check the level is playable, and hand back the state
    pub fn load_for_level(&self, level: u32) -> Result<SessionState> {
        let state = self.load();
        if state.is_unlocked(level) {
            Ok(state)
        } else {
            Err(MindplayError::LevelLocked(level))
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.storage.get_item(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable stored value");
                None
            }
        }
    }
}
