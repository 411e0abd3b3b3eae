//! Journaled, size-bounded LRU store
//!
//! Each entry is one payload file `<key>.0` inside the cache directory. Writes go to
//! `<key>.0.tmp` first and are renamed over the payload only once the bytes are synced,
//! so readers see either the previous or the new value. The journal (see
//! [`journal`](super::journal)) records every edit so an interrupted write can be
//! detected and discarded when the store is reopened.
//!
//! The in-memory index is an unbounded [`LruCache`] ordered by recency; the byte budget
//! is enforced by popping the least recently used entries after each commit.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::journal::{
    self, JOURNAL_FILE, JOURNAL_FILE_BACKUP, JournalWriter, Record, remove_if_exists,
};
use super::key::validate_key;
use crate::config::{DiskCacheConfig, Validator};
use crate::error::{Result, StorageError};

const CLEAN_SUFFIX: &str = ".0";
const DIRTY_SUFFIX: &str = ".0.tmp";

/// Index entry for one key
#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    /// Payload size in bytes; meaningful only when `readable`
    size: u64,
    /// A committed payload exists
    readable: bool,
    /// A writer currently owns the key
    editing: bool,
}

#[derive(Debug)]
struct StoreState {
    index: LruCache<String, Entry>,
    size: u64,
    max_size: u64,
    journal: JournalWriter,
    redundant_ops: usize,
    evictions: u64,
}

impl StoreState {
    fn append(&mut self, record: Record) -> io::Result<()> {
        self.journal.append(&record)
    }
}

/// Persistent key/value store bounded by total payload bytes
///
/// Keys must match `[a-z0-9_-]{1,120}`; see [`hash_key`](super::hash_key) for turning
/// arbitrary strings into valid keys. Opening the same directory from two live stores is
/// not supported.
#[derive(Debug)]
pub struct DiskLruStore {
    directory: PathBuf,
    app_version: u32,
    compaction_threshold: usize,
    state: Mutex<StoreState>,
}

impl DiskLruStore {
    /// Open the store in `config.directory`, creating it if needed
    ///
    /// An unreadable or foreign journal (including one written with another
    /// `app_version`) discards the directory contents and starts empty. Entries whose last
    /// edit never committed are deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or if the directory or a fresh
    /// journal cannot be created.
    pub fn open(config: &DiskCacheConfig) -> Result<Self> {
        config.validate()?;
        let directory = config.directory.clone();
        fs::create_dir_all(&directory)?;

        let journal_path = directory.join(JOURNAL_FILE);
        let backup_path = directory.join(JOURNAL_FILE_BACKUP);
        if backup_path.exists() {
            if journal_path.exists() {
                fs::remove_file(&backup_path)?;
            } else {
                fs::rename(&backup_path, &journal_path)?;
            }
        }

        if journal_path.exists() {
            match Self::recover(config) {
                Ok(store) => return Ok(store),
                Err(err) => {
                    warn!(
                        target: "netcache::disk",
                        directory = %directory.display(),
                        error = %err,
                        "Discarding unreadable cache directory"
                    );
                    fs::remove_dir_all(&directory)?;
                    fs::create_dir_all(&directory)?;
                }
            }
        }

        journal::write_journal(&directory, config.app_version, Vec::new())?;
        let writer = JournalWriter::open(journal_path)?;
        Ok(Self::with_state(config, LruCache::unbounded(), 0, writer))
    }

    fn with_state(
        config: &DiskCacheConfig,
        index: LruCache<String, Entry>,
        redundant_ops: usize,
        journal: JournalWriter,
    ) -> Self {
        let size = index
            .iter()
            .filter(|(_, entry)| entry.readable)
            .map(|(_, entry)| entry.size)
            .sum();
        Self {
            directory: config.directory.clone(),
            app_version: config.app_version,
            compaction_threshold: config.compaction_threshold,
            state: Mutex::new(StoreState {
                index,
                size,
                max_size: config.max_size_bytes,
                journal,
                redundant_ops,
                evictions: 0,
            }),
        }
    }

    /// Rebuild the index from an existing journal
    fn recover(config: &DiskCacheConfig) -> Result<Self> {
        let directory = &config.directory;
        let journal_path = directory.join(JOURNAL_FILE);
        let replay = journal::read_journal(&journal_path, config.app_version)?;
        let record_count = replay.records.len();

        let mut index: LruCache<String, Entry> = LruCache::unbounded();
        for record in replay.records {
            match record {
                Record::Clean(key, size) => {
                    let entry = Entry {
                        size,
                        readable: true,
                        editing: false,
                    };
                    if let Some(existing) = index.get_mut(&key) {
                        *existing = entry;
                    } else {
                        index.put(key, entry);
                    }
                }
                Record::Dirty(key) => {
                    if let Some(existing) = index.get_mut(&key) {
                        existing.editing = true;
                    } else {
                        index.put(
                            key,
                            Entry {
                                editing: true,
                                ..Entry::default()
                            },
                        );
                    }
                }
                Record::Remove(key) => {
                    index.pop(&key);
                }
                Record::Read(key) => {
                    index.promote(&key);
                }
            }
        }

        let incomplete: Vec<String> = index
            .iter()
            .filter(|(_, entry)| entry.editing)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &incomplete {
            index.pop(key);
            remove_if_exists(&clean_path(directory, key))?;
            remove_if_exists(&dirty_path(directory, key))?;
        }
        if !incomplete.is_empty() {
            debug!(
                target: "netcache::disk",
                discarded = incomplete.len(),
                "Discarded incomplete cache entries"
            );
        }

        let redundant_ops = record_count.saturating_sub(index.len());
        let writer = JournalWriter::open(journal_path)?;
        let store = Self::with_state(config, index, redundant_ops, writer);

        {
            let mut guard = store.state.lock();
            let state = &mut *guard;
            if replay.truncated || !incomplete.is_empty() {
                store.rebuild_journal(state)?;
            }
            store.trim_to_size(state);
        }

        Ok(store)
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if the key is not a valid store key
    /// - `EntryBusy` if another writer is editing the same key
    /// - `Io` if staging the payload fails, in which case the previous value (if any)
    ///   stays readable, or if the commit cannot be journaled, in which case the entry
    ///   is dropped along with its previous value
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.begin_edit(key)?;
        let written = self.write_payload(key, value.as_bytes());
        self.complete_edit(key, written)
    }

    fn begin_edit(&self, key: &str) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let previous = match state.index.peek_mut(key) {
            Some(entry) if entry.editing => {
                return Err(StorageError::EntryBusy(key.to_owned()));
            }
            Some(entry) => {
                entry.editing = true;
                Some(*entry)
            }
            None => {
                state.index.put(
                    key.to_owned(),
                    Entry {
                        editing: true,
                        ..Entry::default()
                    },
                );
                None
            }
        };

        if let Err(err) = state.append(Record::Dirty(key.to_owned())) {
            match previous {
                Some(entry) => {
                    state.index.put(key.to_owned(), entry);
                }
                None => {
                    state.index.pop(key);
                }
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Stage the payload and rename it into place; runs without holding the index lock
    fn write_payload(&self, key: &str, bytes: &[u8]) -> io::Result<u64> {
        let staging = self.dirty_path(key);
        let result = (|| {
            let mut file = File::create(&staging)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&staging, self.clean_path(key))
        })();

        match result {
            Ok(()) => Ok(bytes.len() as u64),
            Err(err) => {
                let _ = remove_if_exists(&staging);
                Err(err)
            }
        }
    }

    fn complete_edit(&self, key: &str, written: io::Result<u64>) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let new_size = match written {
            Ok(size) => size,
            Err(err) => {
                self.abort_edit(state, key);
                return Err(err.into());
            }
        };

        let old_size = match state.index.get_mut(key) {
            Some(entry) => {
                let old = if entry.readable { entry.size } else { 0 };
                *entry = Entry {
                    size: new_size,
                    readable: true,
                    editing: false,
                };
                old
            }
            None => {
                state.index.put(
                    key.to_owned(),
                    Entry {
                        size: new_size,
                        readable: true,
                        editing: false,
                    },
                );
                0
            }
        };
        state.size = state.size - old_size + new_size;
        state.redundant_ops += 1;

        if let Err(err) = state.append(Record::Clean(key.to_owned(), new_size)) {
            // Without a CLEAN record the entry would be discarded on reopen anyway.
            if let Some(entry) = state.index.pop(key) {
                state.size -= entry.size;
            }
            let _ = remove_if_exists(&self.clean_path(key));
            return Err(err.into());
        }

        debug!(
            target: "netcache::disk",
            key,
            size = new_size,
            total = state.size,
            "Committed cache entry"
        );

        self.trim_to_size(state);
        self.compact_if_needed(state);
        Ok(())
    }

    /// Give up an edit, leaving the previously committed payload (if any) readable
    fn abort_edit(&self, state: &mut StoreState, key: &str) {
        state.redundant_ops += 1;
        let record = match state.index.peek_mut(key) {
            Some(entry) if entry.readable => {
                entry.editing = false;
                Record::Clean(key.to_owned(), entry.size)
            }
            _ => {
                state.index.pop(key);
                Record::Remove(key.to_owned())
            }
        };
        if let Err(err) = state.append(record) {
            warn!(
                target: "netcache::disk",
                key,
                error = %err,
                "Failed to journal aborted edit"
            );
        }
    }

    /// Read the value stored under `key`, marking it most recently used
    ///
    /// Returns `Ok(None)` when the key is absent, still being written for the first time,
    /// or its payload file has disappeared.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if the key is not a valid store key
    /// - `Io` if the journal or payload cannot be accessed
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let readable = state.index.get(key).is_some_and(|entry| entry.readable);
            if !readable {
                return Ok(None);
            }
            state.redundant_ops += 1;
            state.append(Record::Read(key.to_owned()))?;
            self.compact_if_needed(state);
        }

        match fs::read_to_string(self.clean_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete the entry for `key`
    ///
    /// Returns `Ok(false)` if there was nothing to delete or the entry is being written.
    ///
    /// # Errors
    ///
    /// - `InvalidKey` if the key is not a valid store key
    /// - `Io` if the payload or journal cannot be updated
    pub fn remove(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let removed = self.remove_entry(state, key)?;
        if removed {
            self.compact_if_needed(state);
        }
        Ok(removed)
    }

    fn remove_entry(&self, state: &mut StoreState, key: &str) -> io::Result<bool> {
        match state.index.peek(key) {
            None => return Ok(false),
            Some(entry) if entry.editing => return Ok(false),
            Some(_) => {}
        }

        remove_if_exists(&self.clean_path(key))?;
        if let Some(entry) = state.index.pop(key) {
            if entry.readable {
                state.size -= entry.size;
            }
        }
        state.redundant_ops += 1;
        state.append(Record::Remove(key.to_owned()))?;
        Ok(true)
    }

    /// Evict least recently used entries until the store fits its budget
    fn trim_to_size(&self, state: &mut StoreState) {
        while state.size > state.max_size {
            let victim = state
                .index
                .iter()
                .rev()
                .find(|(_, entry)| !entry.editing)
                .map(|(key, _)| key.clone());
            let Some(key) = victim else {
                break;
            };

            match self.remove_entry(state, &key) {
                Ok(_) => {
                    state.evictions += 1;
                    debug!(
                        target: "netcache::disk",
                        key = %key,
                        total = state.size,
                        max = state.max_size,
                        "Evicted least recently used entry"
                    );
                }
                Err(err) => {
                    warn!(
                        target: "netcache::disk",
                        key = %key,
                        error = %err,
                        "Failed to evict cache entry"
                    );
                    break;
                }
            }
        }
    }

    fn compact_if_needed(&self, state: &mut StoreState) {
        if state.redundant_ops >= self.compaction_threshold
            && state.redundant_ops >= state.index.len()
        {
            if let Err(err) = self.rebuild_journal(state) {
                warn!(
                    target: "netcache::disk",
                    journal = %state.journal.path().display(),
                    error = %err,
                    "Failed to compact journal"
                );
            }
        }
    }

    /// Rewrite the journal from the index, least recently used first
    fn rebuild_journal(&self, state: &mut StoreState) -> io::Result<()> {
        let records: Vec<Record> = state
            .index
            .iter()
            .rev()
            .map(|(key, entry)| {
                if entry.editing {
                    Record::Dirty(key.clone())
                } else {
                    Record::Clean(key.clone(), entry.size)
                }
            })
            .collect();

        journal::write_journal(&self.directory, self.app_version, records)?;
        state.journal = JournalWriter::open(self.directory.join(JOURNAL_FILE))?;
        state.redundant_ops = 0;
        debug!(
            target: "netcache::disk",
            entries = state.index.len(),
            "Rebuilt journal"
        );
        Ok(())
    }

    /// Whether a committed value exists for `key`; does not affect recency
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.state
            .lock()
            .index
            .peek(key)
            .is_some_and(|entry| entry.readable)
    }

    /// Total bytes of committed payloads
    #[must_use]
    pub fn size(&self) -> u64 {
        self.state.lock().size
    }

    #[must_use]
    pub fn max_size(&self) -> u64 {
        self.state.lock().max_size
    }

    /// Change the byte budget, evicting immediately if the store is over it
    pub fn set_max_size(&self, max_size: u64) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.max_size = max_size;
        self.trim_to_size(state);
    }

    /// Number of committed entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .index
            .iter()
            .filter(|(_, entry)| entry.readable)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries evicted for size since the store was opened
    #[must_use]
    pub fn evictions(&self) -> u64 {
        self.state.lock().evictions
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Force the journal to stable storage
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be synced.
    pub fn flush(&self) -> Result<()> {
        self.state.lock().journal.sync()?;
        Ok(())
    }

    /// Remove every entry that is not currently being written
    ///
    /// # Errors
    ///
    /// Returns the first I/O error hit while deleting; entries before it are gone.
    pub fn clear(&self) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let keys: Vec<String> = state
            .index
            .iter()
            .filter(|(_, entry)| !entry.editing)
            .map(|(key, _)| key.clone())
            .collect();
        for key in keys {
            self.remove_entry(state, &key)?;
        }
        self.compact_if_needed(state);
        Ok(())
    }

    /// Close the store and delete its directory with everything in it
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn delete(self) -> Result<()> {
        let Self {
            directory, state, ..
        } = self;
        drop(state);
        fs::remove_dir_all(&directory)?;
        Ok(())
    }

    fn clean_path(&self, key: &str) -> PathBuf {
        clean_path(&self.directory, key)
    }

    fn dirty_path(&self, key: &str) -> PathBuf {
        dirty_path(&self.directory, key)
    }
}

fn clean_path(directory: &Path, key: &str) -> PathBuf {
    directory.join(format!("{key}{CLEAN_SUFFIX}"))
}

fn dirty_path(directory: &Path, key: &str) -> PathBuf {
    directory.join(format!("{key}{DIRTY_SUFFIX}"))
}
