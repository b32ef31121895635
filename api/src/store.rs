use serde::{de::DeserializeOwned, Serialize};

use crate::consts::*;
use crate::error::Result;
use crate::state::{EarningState, OfflineEarningsSnapshot, UserId};
use crate::storage::Storage;

/// Typed view over one user's namespaced storage keys.
pub struct EarningsStore<S> {
    storage: S,
    user_id: UserId,
}

impl<S: Storage> EarningsStore<S> {
    pub fn new(storage: S, user_id: UserId) -> Self {
        Self { storage, user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    pub fn load_state(&self) -> Result<Option<EarningState>> {
        self.read(EARNINGS_STATE_KEY)
    }

    pub fn save_state(&mut self, state: &EarningState) -> Result<()> {
        self.write(EARNINGS_STATE_KEY, state)
    }

    pub fn last_sync(&self) -> Result<Option<i64>> {
        self.read(LAST_SYNC_KEY)
    }

    pub fn set_last_sync(&mut self, at: i64) -> Result<()> {
        self.write(LAST_SYNC_KEY, &at)
    }

    pub fn save_snapshot(&mut self, snapshot: &OfflineEarningsSnapshot) -> Result<()> {
        self.write(OFFLINE_SNAPSHOT_KEY, snapshot)
    }

    /// Returns the offline snapshot and removes it, so it is credited once.
    pub fn take_snapshot(&mut self) -> Result<Option<OfflineEarningsSnapshot>> {
        let snapshot = self.read(OFFLINE_SNAPSHOT_KEY)?;
        if snapshot.is_some() {
            let key = self.key(OFFLINE_SNAPSHOT_KEY);
            self.storage.remove(&key)?;
        }
        Ok(snapshot)
    }

    pub fn has_seen_onboarding(&self) -> Result<bool> {
        Ok(self.read::<bool>(ONBOARDING_SEEN_KEY)?.unwrap_or(false))
    }

    pub fn mark_onboarding_seen(&mut self) -> Result<()> {
        self.write(ONBOARDING_SEEN_KEY, &true)
    }

    pub fn claim_cooldown_until(&self) -> Result<Option<i64>> {
        self.read(CLAIM_COOLDOWN_KEY)
    }

    pub fn set_claim_cooldown_until(&mut self, until: i64) -> Result<()> {
        self.write(CLAIM_COOLDOWN_KEY, &until)
    }

    /// Removes every key owned by this user.
    pub fn clear(&mut self) -> Result<()> {
        for prefix in [
            EARNINGS_STATE_KEY,
            LAST_SYNC_KEY,
            OFFLINE_SNAPSHOT_KEY,
            ONBOARDING_SEEN_KEY,
            CLAIM_COOLDOWN_KEY,
        ] {
            let key = self.key(prefix);
            self.storage.remove(&key)?;
        }
        Ok(())
    }

    fn key(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.user_id)
    }

    fn read<T: DeserializeOwned>(&self, prefix: &str) -> Result<Option<T>> {
        match self.storage.get(&self.key(prefix))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, prefix: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let key = self.key(prefix);
        self.storage.set(&key, &raw)
    }
}
