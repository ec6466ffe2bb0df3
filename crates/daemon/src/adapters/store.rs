// SPDX-License-Identifier: MIT

//! Persisted daemon state: string-keyed settings surviving restarts
//! (`deployment`, `genesis`, `app`, `period`, `ttl-factor`, `configsTar`,
//! `etcTar`, ...).

use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{error, warn};

/// Key/value store collaborator. Saves report success as a bool rather than
/// an error; callers log and move on.
pub trait StateStore: Send + Sync {
    fn save(&self, key: &str, value: Value) -> bool;
    fn get(&self, key: &str) -> Option<Value>;

    /// Deployment name this node's configs came from, empty when unknown.
    fn deployment_name(&self) -> String {
        self.get("deployment")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    /// Whether this node is part of the genesis deployment. Defaults to
    /// true: genesis nodes ship installed, bootstrapped nodes get the flag
    /// set explicitly.
    fn is_genesis(&self) -> bool {
        self.get("genesis").and_then(|v| v.as_bool()).unwrap_or(true)
    }
}

/// JSON-file-backed store.
pub struct JsonStateStore {
    path: PathBuf,
    cache: Mutex<Map<String, Value>>,
}

impl JsonStateStore {
    pub fn open(path: PathBuf) -> Self {
        let cache = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "state file unreadable, starting empty");
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };
        Self { path, cache: Mutex::new(cache) }
    }

    fn flush(&self, map: &Map<String, Value>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(map).map_err(std::io::Error::other)?;
        std::fs::write(&self.path, contents)
    }
}

impl StateStore for JsonStateStore {
    fn save(&self, key: &str, value: Value) -> bool {
        let mut map = self.cache.lock();
        map.insert(key.to_string(), value);
        match self.flush(&map) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "failed to persist daemon state");
                false
            }
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.cache.lock().get(key).cloned()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
