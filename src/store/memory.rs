//! In-memory library store.
//!
//! Libraries live in a map keyed by name; each one keeps its entries ordered by
//! name. The whole store can be written to and read from a JSON snapshot.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

use super::models::EntryInfo;
use super::traits::{LibraryHandle, LibraryStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredEntry {
    mod_time: i64,
    comment_len: usize,
    /// Comment bytes followed by content bytes.
    payload: Vec<u8>,
}

impl StoredEntry {
    fn info(&self) -> EntryInfo {
        EntryInfo {
            mod_time: self.mod_time,
            comment_len: self.comment_len,
            data_len: self.payload.len(),
        }
    }
}

/// One library: a unicode flag and its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLibrary {
    pub unicode: bool,
    entries: BTreeMap<String, StoredEntry>,
}

impl MemoryLibrary {
    pub fn new(unicode: bool) -> Self {
        Self { unicode, entries: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Raw payload of `name`, comment bytes first.
    pub fn payload(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(|entry| entry.payload.as_slice())
    }

    fn encode_name(&self, name: &str) -> Vec<u8> {
        if self.unicode {
            name.encode_utf16().flat_map(u16::to_le_bytes).collect()
        } else {
            name.as_bytes().to_vec()
        }
    }
}

type SharedLibrary = Arc<Mutex<MemoryLibrary>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Library store kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    libraries: Mutex<BTreeMap<String, SharedLibrary>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty library. Returns false if `name` already exists.
    pub fn create_library(&self, name: &str, unicode: bool) -> bool {
        let mut libraries = lock(&self.libraries);
        if libraries.contains_key(name) {
            return false;
        }
        tracing::debug!(library = name, unicode, "Created library");
        libraries.insert(name.to_string(), Arc::new(Mutex::new(MemoryLibrary::new(unicode))));
        true
    }

    pub fn library_names(&self) -> Vec<String> {
        lock(&self.libraries).keys().cloned().collect()
    }

    /// Copy of the current state of `name`.
    pub fn library(&self, name: &str) -> Option<MemoryLibrary> {
        lock(&self.libraries).get(name).map(|library| lock(library).clone())
    }

    pub fn snapshot(&self) -> BTreeMap<String, MemoryLibrary> {
        lock(&self.libraries)
            .iter()
            .map(|(name, library)| (name.clone(), lock(library).clone()))
            .collect()
    }

    pub fn from_snapshot(snapshot: BTreeMap<String, MemoryLibrary>) -> Self {
        let libraries = snapshot
            .into_iter()
            .map(|(name, library)| (name, Arc::new(Mutex::new(library))))
            .collect();
        Self { libraries: Mutex::new(libraries) }
    }

    /// Load a store from a JSON snapshot. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = serde_json::from_str(&json)
            .with_context(|| format!("Invalid snapshot {}", path.display()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Saved store snapshot");
        Ok(())
    }
}

impl LibraryStore for MemoryStore {
    fn open(&self, library: &str, read_write: bool) -> Option<Box<dyn LibraryHandle>> {
        let shared = lock(&self.libraries).get(library).cloned()?;
        Some(Box::new(MemoryHandle { library: shared, read_write, current: None }))
    }
}

/// Handle returned by [`MemoryStore::open`].
///
/// Data operations act on the entry found by the last successful seek.
struct MemoryHandle {
    library: SharedLibrary,
    read_write: bool,
    current: Option<String>,
}

impl MemoryHandle {
    fn current(&self) -> Result<&str> {
        match &self.current {
            Some(name) => Ok(name),
            None => bail!("No entry selected"),
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        ensure!(self.read_write, "Library opened read-only");
        Ok(())
    }
}

impl LibraryHandle for MemoryHandle {
    fn is_unicode(&self) -> bool {
        lock(&self.library).unicode
    }

    /// A created entry only becomes visible once data is written to it.
    fn seek_entry(&mut self, name: &str, create: bool) -> Option<EntryInfo> {
        let found = lock(&self.library).entries.get(name).map(StoredEntry::info);
        let info = match found {
            Some(info) => info,
            None if create && self.read_write => StoredEntry::default().info(),
            None => return None,
        };
        self.current = Some(name.to_string());
        Some(info)
    }

    fn read_entry_data(&mut self, info: &EntryInfo, out: &mut [u8]) -> Result<()> {
        let name = self.current()?;
        let library = lock(&self.library);
        let entry = library.entries.get(name).with_context(|| format!("Entry vanished: {name}"))?;
        ensure!(
            out.len() == entry.payload.len() && info.data_len == entry.payload.len(),
            "Entry {name} holds {} bytes, caller expected {}",
            entry.payload.len(),
            out.len()
        );
        out.copy_from_slice(&entry.payload);
        Ok(())
    }

    fn update_entry_data(
        &mut self,
        info: &EntryInfo,
        data: &[u8],
        content_len: usize,
        comment_len: usize,
    ) -> Result<()> {
        self.ensure_writable()?;
        ensure!(
            content_len + comment_len == data.len(),
            "Lengths {comment_len} + {content_len} do not match {} payload bytes",
            data.len()
        );
        let name = self.current()?;
        let mut library = lock(&self.library);
        library.entries.insert(
            name.to_string(),
            StoredEntry { mod_time: info.mod_time, comment_len, payload: data.to_vec() },
        );
        Ok(())
    }

    fn delete_entry(&mut self, _info: &EntryInfo) -> Result<()> {
        self.ensure_writable()?;
        let name = self.current()?.to_string();
        let removed = lock(&self.library).entries.remove(&name);
        ensure!(removed.is_some(), "Entry vanished: {name}");
        self.current = None;
        Ok(())
    }

    fn enumerate(&mut self, visitor: &mut dyn FnMut(&[u8], i64) -> bool) {
        let listing: Vec<(Vec<u8>, i64)> = {
            let library = lock(&self.library);
            library
                .entries
                .iter()
                .map(|(name, entry)| (library.encode_name(name), entry.mod_time))
                .collect()
        };
        for (name, mod_time) in listing {
            if !visitor(&name, mod_time) {
                break;
            }
        }
    }
}
