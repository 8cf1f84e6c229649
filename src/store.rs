//! Named scenario store backed by a single JSON file
//!
//! Keys are user-chosen names; values are the raw parameters exactly as
//! entered plus a free-text description, so a saved scenario round-trips.

use crate::error::{StoreError, StoreResult};
use crate::params::RawParameters;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the store file used by the binaries
pub const STORE_PATH_ENV: &str = "PROJECTION_STORE";

/// Default store file in the working directory
pub const DEFAULT_STORE_PATH: &str = "scenarios.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedScenario {
    pub description: String,
    pub parameters: RawParameters,
    pub saved_at: DateTime<Utc>,
}

/// Key-value store of named scenarios
#[derive(Debug)]
pub struct ScenarioStore {
    path: PathBuf,
    scenarios: BTreeMap<String, SavedScenario>,
}

impl ScenarioStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let scenarios = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            BTreeMap::new()
        };
        debug!("Opened scenario store {} ({} entries)", path.display(), scenarios.len());
        Ok(Self { path, scenarios })
    }

    /// Store path from `PROJECTION_STORE`, falling back to `scenarios.json`
    pub fn default_path() -> PathBuf {
        std::env::var_os(STORE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace a scenario and write the store to disk
    pub fn save(&mut self, name: &str, description: &str, parameters: RawParameters) -> StoreResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let entry = SavedScenario {
            description: description.to_string(),
            parameters,
            saved_at: Utc::now(),
        };
        if self.scenarios.insert(name.to_string(), entry).is_some() {
            info!("Replaced scenario '{}'", name);
        } else {
            info!("Saved scenario '{}'", name);
        }
        self.flush()
    }

    pub fn load(&self, name: &str) -> StoreResult<&SavedScenario> {
        self.scenarios
            .get(name.trim())
            .ok_or_else(|| StoreError::NotFound { name: name.to_string() })
    }

    /// Remove a scenario and write the store to disk
    pub fn remove(&mut self, name: &str) -> StoreResult<SavedScenario> {
        let removed = self
            .scenarios
            .remove(name.trim())
            .ok_or_else(|| StoreError::NotFound { name: name.to_string() })?;
        self.flush()?;
        info!("Removed scenario '{}'", name);
        Ok(removed)
    }

    /// Names and descriptions in name order
    pub fn list(&self) -> impl Iterator<Item = (&str, &SavedScenario)> {
        self.scenarios.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Write the full store, replacing the file via a temporary sibling
    pub fn flush(&self) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(&self.scenarios)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawRate;

    fn temp_store_path(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "startup_projection_store_{}_{}",
            tag,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir.join("scenarios.json")
    }

    #[test]
    fn test_save_and_reopen_round_trip() {
        let path = temp_store_path("round_trip");
        let _ = fs::remove_file(&path);

        let params = RawParameters {
            horizon_months: 48,
            free_churn_pct: RawRate::Text("4.5%".to_string()),
            ..Default::default()
        };

        let mut store = ScenarioStore::open(&path).unwrap();
        assert!(store.is_empty());
        store.save("aggressive", "high growth, low churn", params.clone()).unwrap();

        let reopened = ScenarioStore::open(&path).unwrap();
        let saved = reopened.load("aggressive").unwrap();
        assert_eq!(saved.parameters, params);
        assert_eq!(saved.description, "high growth, low churn");
        assert_eq!(reopened.list().map(|(name, _)| name).collect::<Vec<_>>(), vec!["aggressive"]);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_and_empty_names() {
        let path = temp_store_path("missing");
        let _ = fs::remove_file(&path);

        let mut store = ScenarioStore::open(&path).unwrap();
        assert!(matches!(store.load("nope"), Err(StoreError::NotFound { .. })));
        assert!(matches!(store.remove("nope"), Err(StoreError::NotFound { .. })));
        assert!(matches!(
            store.save("  ", "blank", RawParameters::default()),
            Err(StoreError::EmptyName)
        ));
    }

    #[test]
    fn test_remove_persists() {
        let path = temp_store_path("remove");
        let _ = fs::remove_file(&path);

        let mut store = ScenarioStore::open(&path).unwrap();
        store.save("base", "", RawParameters::default()).unwrap();
        store.save("beta", "with beta", RawParameters { beta_months: 3, ..Default::default() }).unwrap();
        assert_eq!(store.len(), 2);

        store.remove("base").unwrap();
        let reopened = ScenarioStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.load("beta").is_ok());

        let _ = fs::remove_file(&path);
    }
}
