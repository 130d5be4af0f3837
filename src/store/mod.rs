pub mod migrations;
pub mod sqlite;

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::estimate::Estimate;

pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<bool>;
    fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.keys().cloned().collect())
    }
}

const ESTIMATE_PREFIX: &str = "estimate:";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedEstimate {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub estimate: Estimate,
}

fn estimate_key(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("estimate name is empty"));
    }
    Ok(format!("{ESTIMATE_PREFIX}{name}"))
}

pub fn save_estimate(store: &dyn Store, name: &str, estimate: &Estimate) -> Result<SavedEstimate> {
    let key = estimate_key(name)?;
    let saved = SavedEstimate {
        name: name.trim().to_string(),
        saved_at: Utc::now(),
        estimate: estimate.clone(),
    };
    store.set(&key, &serde_json::to_string(&saved)?)?;
    Ok(saved)
}

pub fn load_estimate(store: &dyn Store, name: &str) -> Result<Option<SavedEstimate>> {
    let key = estimate_key(name)?;
    let Some(raw) = store.get(&key)? else {
        return Ok(None);
    };
    let saved = serde_json::from_str(&raw)
        .with_context(|| format!("saved estimate {name} is corrupt"))?;
    Ok(Some(saved))
}

pub fn delete_estimate(store: &dyn Store, name: &str) -> Result<bool> {
    store.remove(&estimate_key(name)?)
}

pub fn list_estimates(store: &dyn Store) -> Result<Vec<SavedEstimate>> {
    let mut out = Vec::new();
    for key in store.keys()? {
        let Some(name) = key.strip_prefix(ESTIMATE_PREFIX) else {
            continue;
        };
        if let Some(saved) = load_estimate(store, name)? {
            out.push(saved);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::material::{estimate_material, MaterialPricing, ZoneSpec};
    use crate::estimate::schema::MixType;

    fn sample_estimate() -> Estimate {
        let zone = ZoneSpec::new(100.0, 20.0, 2.0, MixType::Standard);
        estimate_material(&[zone], &MaterialPricing::default())
            .expect("estimate")
            .into()
    }

    #[test]
    fn saves_and_lists_estimates_by_name() {
        let store = MemoryStore::new();
        store.set("unrelated", "x").unwrap();
        save_estimate(&store, " lot-a ", &sample_estimate()).unwrap();

        let loaded = load_estimate(&store, "lot-a").unwrap().expect("saved");
        assert_eq!(loaded.name, "lot-a");
        assert_eq!(loaded.estimate.kind(), "material");

        let all = list_estimates(&store).unwrap();
        assert_eq!(all.len(), 1);
        assert!(delete_estimate(&store, "lot-a").unwrap());
        assert!(load_estimate(&store, "lot-a").unwrap().is_none());
    }

    #[test]
    fn rejects_blank_names_and_corrupt_records() {
        let store = MemoryStore::new();
        assert!(save_estimate(&store, "  ", &sample_estimate()).is_err());
        store.set("estimate:broken", "{not json").unwrap();
        assert!(load_estimate(&store, "broken").is_err());
    }

    #[test]
    fn sqlite_backend_round_trips_saved_estimate() {
        let store = sqlite::SqliteStore::open_in_memory().unwrap();
        let estimate = sample_estimate();
        save_estimate(&store, "driveway", &estimate).unwrap();
        let loaded = load_estimate(&store, "driveway").unwrap().unwrap();
        assert_eq!(loaded.estimate, estimate);
    }
}
