//! JSON file backed session store

use super::SessionStore;
use crate::session::SessionRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores the saved-sessions list as one JSON array in `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for slot `key` under `dir`
    pub fn new<P: AsRef<Path>>(dir: P, key: &str) -> Self {
        let file_name = format!("{}.json", crate::utils::safe_filename(key));
        Self {
            path: dir.as_ref().join(file_name),
        }
    }

    /// Create a store from the storage section of the config
    pub fn from_config(config: &crate::config::StorageConfig) -> Self {
        Self::new(crate::utils::expand_tilde(&config.dir), &config.key)
    }

    /// Location of the slot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> crate::Result<Vec<SessionRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut records: Vec<SessionRecord> = serde_json::from_str(&content)?;
        for record in &mut records {
            record.refresh_counters();
        }
        Ok(records)
    }
}

impl SessionStore for JsonFileStore {
    fn load_all(&self) -> Vec<SessionRecord> {
        if !self.path.exists() {
            debug!("No session slot at {:?}, starting empty", self.path);
            return Vec::new();
        }

        match self.read() {
            Ok(records) => {
                debug!("Loaded {} sessions from {:?}", records.len(), self.path);
                records
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable session slot {:?}: {}",
                    self.path, e
                );
                Vec::new()
            }
        }
    }

    fn save_all(&self, records: &[SessionRecord]) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            crate::utils::ensure_dir(parent)?;
        }

        let content = serde_json::to_string_pretty(records)?;

        // Write beside the slot, then rename over it
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            crate::Error::Storage(format!(
                "failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("Wrote {} sessions to {:?}", records.len(), self.path);
        Ok(())
    }

    fn name(&self) -> &str {
        "json-file"
    }
}
