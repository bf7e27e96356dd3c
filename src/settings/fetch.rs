use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::keys;
use crate::error::AppError;
use crate::store::Store;

/// What an absent row means for a given read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// Optional setting introduced after first deployment: absence is "no override".
    UseDefault,
    /// Required setting: absence is a failure the caller recovers from.
    Fail,
}

/// Outcome of one settings read.
#[derive(Debug)]
pub enum Fetched<T> {
    Value(T),
    UsingDefault,
    Failed(AppError),
}

/// Cache slot for one key. `generation` moves on every write so a read that
/// raced a write can tell its value is stale.
#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    value: Option<Option<Value>>,
}

/// Cached access to the settings table. Only the keys in `keys::CACHED` are
/// cached; each is cached until a write through this client invalidates it.
/// There is no optimistic local patching, the next read goes back to the
/// store.
pub struct SettingsClient {
    store: Arc<dyn Store>,
    cache: DashMap<String, Slot>,
}

impl SettingsClient {
    pub fn new(store: Arc<dyn Store>) -> Self {
        SettingsClient {
            store,
            cache: DashMap::new(),
        }
    }

    fn read(&self, key: &str) -> Result<Option<Value>, AppError> {
        if !keys::CACHED.contains(&key) {
            return self.store.setting_get(key);
        }
        let generation = {
            let slot = self.cache.entry(key.to_string()).or_default();
            if let Some(hit) = &slot.value {
                return Ok(hit.clone());
            }
            slot.generation
        };
        let value = self.store.setting_get(key)?;
        self.fill(key, generation, &value);
        Ok(value)
    }

    /// Store a read in the cache unless a write happened since `generation`
    /// was taken.
    fn fill(&self, key: &str, generation: u64, value: &Option<Value>) {
        if let Some(mut slot) = self.cache.get_mut(key) {
            if slot.generation == generation {
                slot.value = Some(value.clone());
            }
        }
    }

    pub fn fetch(&self, key: &str, missing: Missing) -> Fetched<Value> {
        match self.read(key) {
            Ok(Some(v)) => Fetched::Value(v),
            Ok(None) => match missing {
                Missing::UseDefault => Fetched::UsingDefault,
                Missing::Fail => Fetched::Failed(AppError::NotFound(format!("setting '{}'", key))),
            },
            Err(e) => Fetched::Failed(e),
        }
    }

    /// Like `fetch`, parsing into `T`. A stored value of the wrong shape is
    /// a failure, never a partial parse.
    pub fn fetch_as<T: DeserializeOwned>(&self, key: &str, missing: Missing) -> Fetched<T> {
        match self.fetch(key, missing) {
            Fetched::Value(v) => match serde_json::from_value(v) {
                Ok(parsed) => Fetched::Value(parsed),
                Err(e) => Fetched::Failed(AppError::Invalid(format!("setting '{}': {}", key, e))),
            },
            Fetched::UsingDefault => Fetched::UsingDefault,
            Fetched::Failed(e) => Fetched::Failed(e),
        }
    }

    /// Typed read that always yields something renderable.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str, missing: Missing) -> T {
        match self.fetch_as(key, missing) {
            Fetched::Value(v) => v,
            Fetched::UsingDefault => T::default(),
            Fetched::Failed(e) => {
                log::warn!("[settings] '{}' unavailable, using default: {}", key, e);
                T::default()
            }
        }
    }

    /// Partial update of an existing object setting.
    pub fn patch(&self, key: &str, partial: &Value) -> Result<Value, AppError> {
        let result = self.store.setting_patch(key, partial);
        self.invalidate(key);
        result
    }

    pub fn put(&self, key: &str, value: &Value) -> Result<(), AppError> {
        let result = self.store.setting_put(key, value);
        self.invalidate(key);
        result
    }

    pub fn invalidate(&self, key: &str) {
        if let Some(mut slot) = self.cache.get_mut(key) {
            slot.generation += 1;
            slot.value = None;
        }
    }
}
