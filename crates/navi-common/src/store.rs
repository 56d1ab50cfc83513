/// File-backed key/value state store with graceful degradation.
///
/// One JSON object file maps string keys to string values, mirroring a
/// browser localStorage area. All operations are total: on any I/O or
/// decode failure the operation logs a warning and returns `None`/`false`,
/// so callers degrade (the access gate fails closed, treating a reader
/// failure as "no record").
///
/// Access is synchronous and unlocked. Writes are last-write-wins; the store
/// is not meant for concurrent cross-process mutation.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

pub struct StateStore {
    path: Option<PathBuf>,
}

impl StateStore {
    /// Open a store backed by the given file. `None` produces a store that
    /// always degrades (every read misses, every write is dropped) — the
    /// behavior of a non-interactive execution context with no storage.
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }

    /// True when a backing file is configured and its parent directory is
    /// usable. The file itself may not exist yet.
    pub fn is_available(&self) -> bool {
        let Some(path) = &self.path else {
            return false;
        };
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.exists() || std::fs::create_dir_all(dir).is_ok(),
            _ => true,
        }
    }

    /// Get the value stored under `key`. `None` when the store is
    /// unavailable, the file is missing or corrupt, or the key is absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let map = self.read_map()?;
        map.get(key).cloned()
    }

    /// Store `value` under `key`, replacing any prior value. Returns `true`
    /// on success. A corrupt backing file is replaced wholesale.
    pub fn set(&self, key: &str, value: &str) -> bool {
        let Some(path) = &self.path else {
            return false;
        };
        let mut map = self.read_map().unwrap_or_default();
        map.insert(key.to_string(), value.to_string());
        self.write_map(path, &map)
    }

    /// Delete the value stored under `key`. Returns `true` on success
    /// (including when the key was already absent).
    pub fn delete(&self, key: &str) -> bool {
        let Some(path) = &self.path else {
            return false;
        };
        let mut map = match self.read_map() {
            Some(map) => map,
            None => return !path.exists(),
        };
        map.remove(key);
        self.write_map(path, &map)
    }

    fn read_map(&self) -> Option<BTreeMap<String, String>> {
        let path = self.path.as_ref()?;
        if !path.exists() {
            return Some(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(path)
            .inspect_err(|e| warn!(error = %e, path = %path.display(), "state file read failed"))
            .ok()?;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, path = %path.display(), "state file corrupt"))
            .ok()
    }

    fn write_map(&self, path: &Path, map: &BTreeMap<String, String>) -> bool {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    warn!(error = %e, path = %path.display(), "state directory create failed");
                    return false;
                }
            }
        }
        let json = match serde_json::to_string_pretty(map) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "state serialization failed");
                return false;
            }
        };
        std::fs::write(path, json)
            .inspect_err(|e| warn!(error = %e, path = %path.display(), "state file write failed"))
            .is_ok()
    }
}
