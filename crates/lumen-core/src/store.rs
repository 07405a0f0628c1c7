//! Durable per-module state
//!
//! One JSON document holds every module's exported state under its module
//! key, plus a `last_saved` timestamp. Loading degrades to an empty document
//! on a missing or corrupt file; saving replaces the whole document through a
//! temp-file rename so a crash mid-write leaves the previous document intact.
//! Unknown keys are carried through untouched, so an older build can host a
//! newer document without shedding data.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StoreError;

// ----------------------------------------------------------------------------
// Persisted Document
// ----------------------------------------------------------------------------

/// The whole durable document: module name -> opaque state, plus metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedBlob {
    /// RFC 3339 timestamp of the last successful save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<String>,

    /// Per-module opaque state, keyed by module name. Flattened so the keys
    /// sit at the document top level and unknown keys land here too.
    #[serde(flatten)]
    pub modules: BTreeMap<String, Value>,
}

impl PersistedBlob {
    /// Read a document from disk. Missing file -> empty document; corrupt
    /// file -> logged and treated as empty (never fatal).
    pub fn read_from(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no state file yet, starting empty");
                return Self::default();
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "state file unreadable, starting empty");
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(path = %path.display(), %err, "state file corrupt, starting empty");
                Self::default()
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Persistent Store
// ----------------------------------------------------------------------------

/// Owner of the durable document and its backing file.
///
/// Saves are synchronous and whole-document; callers coalesce them (once per
/// screen transition, once at shutdown) rather than saving per tick. The
/// backing file is single-writer: only the UI thread holds a store.
#[derive(Debug)]
pub struct PersistentStore {
    path: PathBuf,
    blob: PersistedBlob,
}

impl PersistentStore {
    /// Open the store, loading whatever document exists at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let blob = PersistedBlob::read_from(&path);
        Self { path, blob }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// State previously exported by the named module, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.blob.modules.get(name)
    }

    /// Replace one module's state and save the whole document immediately.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Result<(), StoreError> {
        self.blob.modules.insert(name.into(), value);
        self.save()
    }

    /// Replace one module's state without saving. For callers batching
    /// several updates ahead of a single [`save`](Self::save), e.g. the
    /// shutdown sweep.
    pub fn put(&mut self, name: impl Into<String>, value: Value) {
        self.blob.modules.insert(name.into(), value);
    }

    /// Serialize the document with a fresh timestamp and atomically replace
    /// the backing file.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.blob.last_saved = Some(chrono::Local::now().to_rfc3339());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let serialized = serde_json::to_string_pretty(&self.blob)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), modules = self.blob.modules.len(), "state saved");
        Ok(())
    }

    pub fn blob(&self) -> &PersistedBlob {
        &self.blob
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
