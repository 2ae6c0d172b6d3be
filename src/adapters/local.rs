//! File-backed directory and audit trail
//!
//! The directory is a JSON object keyed by badge identifier:
//!
//! ```json
//! {
//!   "01020304": { "given_name": "Ada", "family_name": "Lovelace", "authorized_zones": ["IT"] }
//! }
//! ```
//!
//! Audit records are appended to a JSON-lines file, one record per line.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::access::{AuditRecord, AuthorizationRecord};
use crate::ports::{AuditError, AuditLogger, DirectoryClient, DirectoryError, LookupOutcome};
use crate::types::{BadgeId, ConfigError};

/// One directory entry as stored in the file; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Given name
    #[serde(default)]
    pub given_name: Option<String>,
    /// Family name
    #[serde(default)]
    pub family_name: Option<String>,
    /// Zones the badge may enter
    #[serde(default)]
    pub authorized_zones: Vec<String>,
}

impl DirectoryEntry {
    fn to_record(&self) -> AuthorizationRecord {
        AuthorizationRecord::from_name_parts(
            self.given_name.as_deref(),
            self.family_name.as_deref(),
            self.authorized_zones.iter().cloned(),
        )
    }
}

/// In-memory directory loaded from a JSON file
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    entries: HashMap<BadgeId, DirectoryEntry>,
    reachable: Arc<AtomicBool>,
}

impl LocalDirectory {
    /// Load the directory file
    ///
    /// Keys are parsed as badge identifiers, so `"deadbeef"` and `"DEADBEEF"`
    /// name the same badge.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let raw: HashMap<String, DirectoryEntry> = serde_json::from_str(&content)?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (key, entry) in raw {
            let badge = BadgeId::parse(&key).map_err(|err| {
                ConfigError::InvalidDirectoryKey { key: key.clone(), reason: err }
            })?;
            entries.insert(badge, entry);
        }

        info!(path = %path.display(), entries = entries.len(), "Loaded local directory");
        Ok(Self::from_entries(entries))
    }

    /// Build a directory from entries already in memory
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (BadgeId, DirectoryEntry)>,
    {
        Self {
            entries: entries.into_iter().collect(),
            reachable: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Handle that toggles simulated connectivity
    pub fn reachability(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.reachable)
    }

    /// Simulate losing or regaining connectivity
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of badges in the directory
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DirectoryClient for LocalDirectory {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    fn lookup(&self, badge: &BadgeId) -> Result<LookupOutcome, DirectoryError> {
        if !self.is_reachable() {
            return Err(DirectoryError::Unreachable("local directory offline".to_string()));
        }
        Ok(match self.entries.get(badge) {
            Some(entry) => LookupOutcome::Found(entry.to_record()),
            None => LookupOutcome::NotFound,
        })
    }
}

/// Append-only JSON-lines audit file
#[derive(Debug, Clone)]
pub struct JsonlAuditLog {
    path: PathBuf,
}

impl JsonlAuditLog {
    /// Audit log writing to `path`; the file is created on first submission
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// File records are appended to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, in submission order
    pub fn read_all(&self) -> Result<Vec<AuditRecord>, AuditError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            records.push(serde_json::from_str(line)?);
        }
        Ok(records)
    }
}

impl AuditLogger for JsonlAuditLog {
    fn submit(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        debug!(path = %self.path.display(), "Audit record appended");
        Ok(())
    }
}
