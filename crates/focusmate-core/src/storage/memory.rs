use std::collections::HashMap;
use std::sync::Mutex;

use super::ProfileStore;
use crate::error::StoreError;
use crate::profile::{FocusSettings, UserId, UserProfile};

/// Volatile profile store. Everything is lost with the process.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    defaults: FocusSettings,
    profiles: Mutex<HashMap<UserId, UserProfile>>,
}

impl MemoryProfileStore {
    /// `defaults` seeds the focus durations of newly created profiles.
    pub fn new(defaults: FocusSettings) -> Self {
        Self {
            defaults,
            profiles: Mutex::new(HashMap::new()),
        }
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, user: UserId) -> Result<UserProfile, StoreError> {
        let mut profiles = self.profiles.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(profiles
            .entry(user)
            .or_insert_with(|| UserProfile::new(user, self.defaults))
            .clone())
    }

    fn save(&self, user: UserId, profile: &UserProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().map_err(|_| StoreError::Poisoned)?;
        profiles.insert(user, profile.clone());
        Ok(())
    }

    fn users(&self) -> Result<Vec<UserId>, StoreError> {
        let profiles = self.profiles.lock().map_err(|_| StoreError::Poisoned)?;
        let mut users: Vec<UserId> = profiles.keys().copied().collect();
        users.sort_unstable();
        Ok(users)
    }
}
