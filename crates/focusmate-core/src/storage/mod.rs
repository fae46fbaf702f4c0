//! Profile storage and configuration.
//!
//! [`ProfileStore`] is the only shared mutable resource of the assistant.
//! Callers serialize work per user through [`UserLocks`]: take the user's
//! lock, `get`, mutate a copy, `save` once, release.

mod config;
pub mod database;
mod memory;

pub use config::{AchievementsConfig, Config, FocusConfig, StorageBackend, StorageConfig};
pub use database::SqliteProfileStore;
pub use memory::MemoryProfileStore;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StoreError;
use crate::profile::{UserId, UserProfile};

/// Keyed store of user profiles.
pub trait ProfileStore: Send + Sync {
    /// The user's profile, created with defaults on first access.
    fn get(&self, user: UserId) -> Result<UserProfile, StoreError>;

    fn save(&self, user: UserId, profile: &UserProfile) -> Result<(), StoreError>;

    /// Every user id with a stored profile, ascending.
    fn users(&self) -> Result<Vec<UserId>, StoreError>;
}

/// One mutex per user id.
///
/// Requests and timer firings for the same user are totally ordered by this
/// lock; different users never contend.
#[derive(Debug, Default)]
pub struct UserLocks {
    slots: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's lock. Hold the returned mutex's guard for the whole operation.
    pub fn slot(&self, user: UserId) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(user).or_default())
    }
}

/// Returns `~/.config/focusmate[-dev]/` based on FOCUSMATE_ENV.
///
/// Set FOCUSMATE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSMATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusmate-dev")
    } else {
        base_dir.join("focusmate")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
