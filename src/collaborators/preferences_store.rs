//! Preference store contract (§6, C9).

use crate::domain::{PreferencesPatch, UserId, UserPreferences};
use dashmap::DashMap;

/// Reads and updates per-user notification-routing preferences.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, user_id: UserId) -> Option<UserPreferences>;
    fn update(&self, user_id: UserId, patch: PreferencesPatch);
}

/// A process-local preference store backed by a concurrent map. A
/// reasonable default for tests and single-process deployments; a real
/// deployment would back this with the identity/credential store (§1).
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    preferences: DashMap<UserId, UserPreferences>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get(&self, user_id: UserId) -> Option<UserPreferences> {
        self.preferences.get(&user_id).map(|p| p.clone())
    }

    fn update(&self, user_id: UserId, patch: PreferencesPatch) {
        let mut entry = self.preferences.entry(user_id).or_default();
        entry.apply_patch(patch);
    }
}
