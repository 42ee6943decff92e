//! Persistent execution state.
//!
//! The store maps script keys to the outcome of their latest attempt. It is
//! read fully into memory when opened and rewritten on every mutation,
//! using the write-to-temp-then-rename pattern so the file is never left
//! partially written. A writable store holds an advisory lock for its whole
//! lifetime.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{OmniforgeError, Result};

use super::entry::{format_line, parse_line, ScriptStatus, StateEntry};
use super::lock::StateLock;

/// Key → latest status map backed by a line-delimited JSON file.
#[derive(Debug)]
pub struct ExecutionStateStore {
    path: PathBuf,
    entries: BTreeMap<String, StateEntry>,
    lock: Option<StateLock>,
}

impl ExecutionStateStore {
    /// Open the store for writing, taking the lock and loading the file.
    ///
    /// A missing file is an empty store; its parent directory is created.
    ///
    /// # Errors
    ///
    /// Returns `StateLocked` if another writer holds the lock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock = StateLock::acquire(&sibling(&path, ".lock"))?;
        let entries = read_entries(&path)?;
        debug!("Loaded {} state entries from {}", entries.len(), path.display());

        Ok(Self {
            path,
            entries,
            lock: Some(lock),
        })
    }

    /// Load a read-only view without taking the lock.
    pub fn snapshot(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = read_entries(&path)?;
        Ok(Self {
            path,
            entries,
            lock: None,
        })
    }

    /// Parse state file content. Later lines win; bad lines are skipped.
    pub fn parse(content: &str) -> BTreeMap<String, StateEntry> {
        let mut entries = BTreeMap::new();
        for (index, line) in content.lines().enumerate() {
            match parse_line(line) {
                Ok(Some((key, entry))) => {
                    entries.insert(key, entry);
                }
                Ok(None) => {}
                Err(reason) => {
                    warn!("Skipping corrupt state line {}: {}", index + 1, reason);
                }
            }
        }
        entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.lock.is_none()
    }

    /// True iff the latest entry for `key` is `success`.
    pub fn has_succeeded(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(StateEntry::is_success)
    }

    pub fn entry(&self, key: &str) -> Option<&StateEntry> {
        self.entries.get(key)
    }

    /// Record a success, refreshing the timestamp. Durable on return.
    pub fn mark_success(&mut self, key: &str) -> Result<()> {
        self.record(key, ScriptStatus::Success)
    }

    /// Record a failed attempt. Durable on return.
    pub fn mark_failed(&mut self, key: &str) -> Result<()> {
        self.record(key, ScriptStatus::Failed)
    }

    /// Remove the entry for `key`. Returns whether one existed.
    pub fn clear(&mut self, key: &str) -> Result<bool> {
        self.ensure_writable()?;
        let existed = self.entries.remove(key).is_some();
        if existed {
            self.save()?;
        }
        Ok(existed)
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear_all(&mut self) -> Result<usize> {
        self.ensure_writable()?;
        let removed = self.entries.len();
        self.entries.clear();
        self.save()?;
        Ok(removed)
    }

    /// Successful keys with their timestamps, ordered by key.
    pub fn list_completed(&self) -> Vec<(&str, DateTime<Utc>)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.is_success())
            .map(|(k, e)| (k.as_str(), e.timestamp))
            .collect()
    }

    /// Number of keys whose latest entry is `success`.
    pub fn count(&self) -> usize {
        self.entries.values().filter(|e| e.is_success()).count()
    }

    fn record(&mut self, key: &str, status: ScriptStatus) -> Result<()> {
        self.ensure_writable()?;
        self.entries.insert(key.to_string(), StateEntry::now(status));
        self.save()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.is_read_only() {
            return Err(OmniforgeError::StateReadOnly {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    /// Atomic rewrite: temp file, fsync, rename, fsync of the directory.
    fn save(&self) -> Result<()> {
        let mut content = String::new();
        for (key, entry) in &self.entries {
            content.push_str(&format_line(key, entry));
            content.push('\n');
        }

        let temp_path = sibling(&self.path, ".tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        sync_parent_dir(&self.path)?;
        Ok(())
    }
}

/// Flush the directory entry so a completed rename survives power loss.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, StateEntry>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(ExecutionStateStore::parse(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

/// `state.jsonl` → `state.jsonl<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
