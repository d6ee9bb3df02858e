pub mod names;
pub mod sampler;
pub mod teams;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// --- Types ---

/// A roster entry. The full name is a single display string, never split
/// into first/last parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NameEntry {
    pub id: u64,
    pub full_name: String,
}

// --- Store ---

/// In-memory roster: id-keyed entries plus a monotonic id counter.
///
/// Ids start at 1 and are never reused, even after deletions. Entries are
/// never mutated in place, so ascending id equals insertion order.
#[derive(Debug)]
pub struct NameStore {
    entries: HashMap<u64, NameEntry>,
    next_id: u64,
}

impl NameStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 1,
        }
    }

    /// All entries in insertion order.
    pub fn list(&self) -> Vec<NameEntry> {
        let mut entries: Vec<NameEntry> = self.entries.values().cloned().collect();
        entries.sort_by_key(|e| e.id);
        entries
    }

    /// Add an entry under the next id. The caller guarantees the name is
    /// non-empty; no uniqueness constraint is enforced here.
    pub fn add(&mut self, full_name: &str) -> NameEntry {
        let entry = NameEntry {
            id: self.next_id,
            full_name: full_name.to_string(),
        };
        self.next_id += 1;
        self.entries.insert(entry.id, entry.clone());
        entry
    }

    /// Remove the entry with the given id. Returns false if no such entry
    /// existed; that is a normal outcome, not an error.
    pub fn remove(&mut self, id: u64) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// The full names only, in insertion order.
    pub fn full_names(&self) -> Vec<String> {
        self.list().into_iter().map(|e| e.full_name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NameStore {
    fn default() -> Self {
        Self::new()
    }
}

// --- Storage ---

/// Resolve the default data directory (~/.roster/).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".roster")
}
