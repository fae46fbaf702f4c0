//! TOML-based application configuration.
//!
//! Stores:
//! - Default focus/break durations for new profiles
//! - Achievement granting policy
//! - Profile storage backend
//!
//! Configuration is stored at `~/.config/focusmate/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{data_dir, MemoryProfileStore, ProfileStore, SqliteProfileStore};
use crate::error::{ConfigError, StoreError};
use crate::habits::AchievementPolicy;
use crate::profile::FocusSettings;

/// Focus durations (minutes) installed into new profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusConfig {
    #[serde(default = "default_work")]
    pub work: u32,
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    #[serde(default = "default_long_break")]
    pub long_break: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AchievementsConfig {
    /// Grant each streak milestone at most once per profile.
    #[serde(default)]
    pub deduplicate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// SQLite file; defaults to `<data dir>/focusmate.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focusmate/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub focus: FocusConfig,
    #[serde(default)]
    pub achievements: AchievementsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_work() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            work: default_work(),
            short_break: default_short_break(),
            long_break: default_long_break(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<u64>()
                        .map_err(|e| invalid(e.to_string()))?
                        .into(),
                ),
                _ => serde_json::Value::String(value.to_string()),
            };
            obj.insert(part.to_string(), new_value);
        }
        Ok(())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::DataDir(e.to_string()))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory only.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn focus_settings(&self) -> FocusSettings {
        FocusSettings {
            work: self.focus.work,
            short_break: self.focus.short_break,
            long_break: self.focus.long_break,
        }
    }

    pub fn achievement_policy(&self) -> AchievementPolicy {
        if self.achievements.deduplicate {
            AchievementPolicy::Once
        } else {
            AchievementPolicy::PerCrossing
        }
    }

    /// Open the configured profile store.
    pub fn open_store(&self) -> Result<Arc<dyn ProfileStore>, StoreError> {
        let defaults = self.focus_settings();
        match self.storage.backend {
            StorageBackend::Memory => Ok(Arc::new(MemoryProfileStore::new(defaults))),
            StorageBackend::Sqlite => {
                let path = match &self.storage.path {
                    Some(path) => path.clone(),
                    None => data_dir()
                        .map_err(|e| StoreError::OpenFailed {
                            path: PathBuf::from("focusmate.db"),
                            message: e.to_string(),
                        })?
                        .join("focusmate.db"),
                };
                tracing::info!(path = %path.display(), "opening sqlite profile store");
                Ok(Arc::new(SqliteProfileStore::open(&path, defaults)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.focus.work, 25);
        assert_eq!(parsed.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[focus]\nwork = 50\n").unwrap();
        assert_eq!(parsed.focus.work, 50);
        assert_eq!(parsed.focus.short_break, 5);
        assert!(!parsed.achievements.deduplicate);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("focus.work").as_deref(), Some("25"));
        assert_eq!(cfg.get("achievements.deduplicate").as_deref(), Some("false"));
        assert_eq!(cfg.get("storage.backend").as_deref(), Some("memory"));
        assert!(cfg.get("focus.missing").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("focus.long_break", "20").unwrap();
        cfg.set("achievements.deduplicate", "true").unwrap();
        cfg.set("storage.backend", "sqlite").unwrap();
        assert_eq!(cfg.focus.long_break, 20);
        assert_eq!(cfg.achievement_policy(), AchievementPolicy::Once);
        assert_eq!(cfg.storage.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.set("focus.nap", "5"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(cfg.set("", "5"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("focus.work", "long"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("storage.backend", "postgres").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("focus.work", "40").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().focus.work, 40);
    }

    #[test]
    fn sqlite_backend_opens_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.storage.backend = StorageBackend::Sqlite;
        cfg.storage.path = Some(dir.path().join("profiles.db"));
        let store = cfg.open_store().unwrap();
        assert_eq!(store.get(3).unwrap().focus.work, 25);
        assert!(dir.path().join("profiles.db").exists());
    }
}
