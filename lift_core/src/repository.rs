//! Typed access to persisted records.
//!
//! Every record type has its own load/save pair on [`Repository`]; the
//! JSON boundary lives here and nowhere else. Records that fail to
//! deserialize are logged and replaced by their defaults.

use crate::store::KeyValueStore;
use crate::{
    RecoverySnapshot, Result, ScheduleDefinition, SessionLog, UserProfile, UserSettings,
    WorkoutHistory,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Storage keys
pub mod keys {
    pub const ONBOARDING_COMPLETE: &str = "onboarding_complete";
    pub const USER_PROFILE: &str = "user_profile";
    pub const USER_SETTINGS: &str = "user_settings";
    pub const WORKOUT_SCHEDULE: &str = "workout_schedule";
    pub const WORKOUT_HISTORY: &str = "workout_history";
    pub const ACTIVE_SESSION: &str = "active_session";
}

/// Typed repository over a key-value store
#[derive(Debug)]
pub struct Repository<S> {
    store: S,
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Ok(self.store.get(key)?.and_then(|value| decode(key, value)))
    }

    fn save<T: Serialize>(&mut self, key: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record)?;
        self.store.set(key, value)
    }

    /// Load, change and save one record under the store's writer lock
    fn modify<T, F>(&mut self, key: &str, mut change: F) -> Result<()>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnMut(&mut T),
    {
        self.store.update(key, &mut |current| {
            let mut record: T = current
                .and_then(|value| decode(key, value))
                .unwrap_or_default();
            change(&mut record);
            Ok(serde_json::to_value(&record)?)
        })
    }

    // ------------------------------------------------------------------
    // Onboarding and user records
    // ------------------------------------------------------------------

    pub fn is_onboarded(&self) -> Result<bool> {
        Ok(self
            .load::<bool>(keys::ONBOARDING_COMPLETE)?
            .unwrap_or(false))
    }

    pub fn set_onboarded(&mut self, done: bool) -> Result<()> {
        self.save(keys::ONBOARDING_COMPLETE, &done)
    }

    pub fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.load(keys::USER_PROFILE)
    }

    pub fn save_profile(&mut self, profile: &UserProfile) -> Result<()> {
        self.save(keys::USER_PROFILE, profile)
    }

    pub fn load_settings(&self) -> Result<UserSettings> {
        Ok(self.load(keys::USER_SETTINGS)?.unwrap_or_default())
    }

    pub fn save_settings(&mut self, settings: &UserSettings) -> Result<()> {
        self.save(keys::USER_SETTINGS, settings)
    }

    // ------------------------------------------------------------------
    // Schedule
    // ------------------------------------------------------------------

    /// Stored schedule, or the default Push/Pull/Legs rotation
    pub fn load_schedule(&self) -> Result<ScheduleDefinition> {
        Ok(self.load(keys::WORKOUT_SCHEDULE)?.unwrap_or_default())
    }

    pub fn save_schedule(&mut self, schedule: &ScheduleDefinition) -> Result<()> {
        self.save(keys::WORKOUT_SCHEDULE, schedule)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn load_history(&self) -> Result<WorkoutHistory> {
        Ok(self.load(keys::WORKOUT_HISTORY)?.unwrap_or_default())
    }

    pub fn save_history(&mut self, history: &WorkoutHistory) -> Result<()> {
        self.save(keys::WORKOUT_HISTORY, history)
    }

    pub fn get_workout_log(&self, date: NaiveDate) -> Result<Option<SessionLog>> {
        Ok(self.load_history()?.get(date).cloned())
    }

    /// Store a log, replacing any log for the same date
    pub fn save_workout_log(&mut self, log: &SessionLog) -> Result<()> {
        self.modify(keys::WORKOUT_HISTORY, |history: &mut WorkoutHistory| {
            if history.insert(log.clone()).is_some() {
                tracing::info!("Replaced existing workout log for {}", log.date);
            }
        })
    }

    // ------------------------------------------------------------------
    // Recovery snapshot
    // ------------------------------------------------------------------

    pub fn load_recovery(&self) -> Result<Option<RecoverySnapshot>> {
        self.load(keys::ACTIVE_SESSION)
    }

    pub fn save_recovery(&mut self, snapshot: &RecoverySnapshot) -> Result<()> {
        self.save(keys::ACTIVE_SESSION, snapshot)
    }

    pub fn clear_recovery(&mut self) -> Result<()> {
        self.store.remove(keys::ACTIVE_SESSION)
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: serde_json::Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("Ignoring malformed {} record: {}", key, e);
            None
        }
    }
}
