//! Persisted per-plugin enablement policy.
//!
//! The store maps plugin ids to [`EnablementRecord`]s and writes the whole
//! map as one pretty-printed JSON document after every mutation. One mutex
//! guards both the in-memory map and the disk write, so a successful call
//! leaves memory and disk in agreement. A failed write keeps the in-memory
//! change; the next successful write reconciles the file.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::PluginError;
use crate::sync::lock;

/// Tracing target for enablement store operations.
const STORE_TARGET: &str = "trim_plugins::store";

/// Persisted state for one plugin id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnablementRecord {
    /// Whether the plugin should run.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Version of the plugin the last time its load hook succeeded.
    #[serde(default)]
    pub version: Option<String>,
    /// Opaque plugin settings.
    #[serde(default)]
    pub settings: BTreeMap<String, Value>,
}

impl Default for EnablementRecord {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            version: None,
            settings: BTreeMap::new(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}

/// JSON-backed enablement store.
///
/// # Example
///
/// ```
/// use trim_plugins::EnablementStore;
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let path = dir.path().join("config.json");
///
/// let store = EnablementStore::open(&path);
/// assert!(store.is_enabled("org.example.eq"));
/// store.set_enabled("org.example.eq", false).expect("persist");
///
/// let reopened = EnablementStore::open(&path);
/// assert!(!reopened.is_enabled("org.example.eq"));
/// ```
#[derive(Debug)]
pub struct EnablementStore {
    path: PathBuf,
    records: Mutex<BTreeMap<String, EnablementRecord>>,
}

impl EnablementStore {
    /// Opens the store at `path`.
    ///
    /// A missing or whitespace-only file yields an empty store and an empty
    /// `{}` document is written in its place. An unreadable or malformed file
    /// is logged and treated as empty; it is left untouched until the next
    /// mutation overwrites it.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let document = path.into();
        let (records, regenerate) = load(&document);
        let store = Self {
            path: document,
            records: Mutex::new(records),
        };
        if regenerate && store.save().is_ok() {
            debug!(target: STORE_TARGET, path = %store.path.display(), "wrote empty enablement file");
        }
        store
    }

    /// Location of the enablement document.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Returns the stored flag for `id`, or `true` when no record exists.
    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        lock(&self.records)
            .get(id)
            .is_none_or(|record| record.enabled)
    }

    /// Returns a copy of the record for `id`.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<EnablementRecord> {
        lock(&self.records).get(id).cloned()
    }

    /// Returns a copy of every record.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, EnablementRecord> {
        lock(&self.records).clone()
    }

    /// Records the enablement flag for `id` and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Persistence`] when the document cannot be
    /// written. The in-memory flag is updated regardless.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), PluginError> {
        self.update(id, |record| {
            record.enabled = enabled;
            true
        })
    }

    /// Records the version of a plugin whose load hook succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Persistence`] when the document cannot be
    /// written.
    pub fn record_version(&self, id: &str, version: &str) -> Result<(), PluginError> {
        self.update(id, |record| {
            if record.version.as_deref() == Some(version) {
                return false;
            }
            record.version = Some(version.to_owned());
            true
        })
    }

    /// Creates a default record for a newly discovered id. Existing records
    /// are left untouched and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Persistence`] when a new record cannot be
    /// written.
    pub fn observe(&self, id: &str) -> Result<(), PluginError> {
        let mut records = lock(&self.records);
        if records.contains_key(id) {
            return Ok(());
        }
        records.insert(id.to_owned(), EnablementRecord::default());
        self.persist(&records)
    }

    /// Returns the setting `key` for plugin `id`.
    #[must_use]
    pub fn setting(&self, id: &str, key: &str) -> Option<Value> {
        lock(&self.records)
            .get(id)
            .and_then(|record| record.settings.get(key).cloned())
    }

    /// Stores the setting `key` for plugin `id`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Persistence`] when the document cannot be
    /// written.
    pub fn set_setting(
        &self,
        id: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), PluginError> {
        let setting_key = key.into();
        let setting_value = value.into();
        self.update(id, move |record| {
            record.settings.insert(setting_key, setting_value);
            true
        })
    }

    /// Removes every trace of `id`. Returns whether a record existed.
    ///
    /// Records are never removed implicitly; this is the only way to prune
    /// history for plugins that are no longer installed.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Persistence`] when the document cannot be
    /// written.
    pub fn forget(&self, id: &str) -> Result<bool, PluginError> {
        let mut records = lock(&self.records);
        if records.remove(id).is_none() {
            return Ok(false);
        }
        self.persist(&records)?;
        Ok(true)
    }

    /// Writes the current records to disk.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Persistence`] when the document cannot be
    /// written.
    pub fn save(&self) -> Result<(), PluginError> {
        let records = lock(&self.records);
        self.persist(&records)
    }

    fn update<F>(&self, id: &str, apply: F) -> Result<(), PluginError>
    where
        F: FnOnce(&mut EnablementRecord) -> bool,
    {
        let mut records = lock(&self.records);
        let changed = apply(records.entry(id.to_owned()).or_default());
        if changed {
            self.persist(&records)
        } else {
            Ok(())
        }
    }

    fn persist(&self, records: &BTreeMap<String, EnablementRecord>) -> Result<(), PluginError> {
        write_document(&self.path, records).map_err(|source| {
            warn!(
                target: STORE_TARGET,
                path = %self.path.display(),
                error = %source,
                "failed to persist enablement file; keeping in-memory state"
            );
            PluginError::Persistence {
                path: self.path.clone(),
                source: Arc::new(source),
            }
        })
    }
}

/// Reads the document at `path`. The flag reports whether an empty document
/// should be written back.
fn load(path: &Path) -> (BTreeMap<String, EnablementRecord>, bool) {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(target: STORE_TARGET, path = %path.display(), "no enablement file");
            return (BTreeMap::new(), true);
        }
        Err(error) => {
            warn!(
                target: STORE_TARGET,
                path = %path.display(),
                error = %error,
                "failed to read enablement file; starting empty"
            );
            return (BTreeMap::new(), false);
        }
    };

    if contents.trim().is_empty() {
        return (BTreeMap::new(), true);
    }

    let records = serde_json::from_str(&contents).unwrap_or_else(|error| {
        warn!(
            target: STORE_TARGET,
            path = %path.display(),
            error = %error,
            "malformed enablement file; starting empty"
        );
        BTreeMap::new()
    });
    (records, false)
}

fn write_document(path: &Path, records: &BTreeMap<String, EnablementRecord>) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(records)?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(&json)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
