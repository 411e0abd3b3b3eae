//! Append-only operation journal
//!
//! The journal is the store's index on disk. It starts with a five line header
//!
//! ```text
//! netcache.DiskLruStore
//! 1
//! <app version>
//! 1
//!
//! ```
//!
//! followed by one record per line:
//!
//! - `DIRTY <key>` - an edit started; the entry is unreadable until a matching `CLEAN`
//! - `CLEAN <key> <size>` - an edit committed a payload of `size` bytes
//! - `REMOVE <key>` - the entry was deleted or its edit was abandoned
//! - `READ <key>` - the entry was read, which only moves it up the LRU order
//!
//! Replaying the records in order rebuilds both the entry set and its recency.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::key::is_valid_key;
use crate::error::{Result, StorageError};

pub(crate) const JOURNAL_FILE: &str = "journal";
pub(crate) const JOURNAL_FILE_TMP: &str = "journal.tmp";
pub(crate) const JOURNAL_FILE_BACKUP: &str = "journal.bkp";

pub(crate) const MAGIC: &str = "netcache.DiskLruStore";
pub(crate) const JOURNAL_VERSION: &str = "1";
pub(crate) const VALUE_COUNT: usize = 1;

const DIRTY: &str = "DIRTY";
const CLEAN: &str = "CLEAN";
const REMOVE: &str = "REMOVE";
const READ: &str = "READ";

/// One journal line
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Record {
    Dirty(String),
    Clean(String, u64),
    Remove(String),
    Read(String),
}

impl Record {
    pub(crate) fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split(' ');
        let record = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(DIRTY), Some(key), None, None) => Record::Dirty(key.to_owned()),
            (Some(CLEAN), Some(key), Some(size), None) => {
                let size = size.parse::<u64>().map_err(|_| corrupt_line(line))?;
                Record::Clean(key.to_owned(), size)
            }
            (Some(REMOVE), Some(key), None, None) => Record::Remove(key.to_owned()),
            (Some(READ), Some(key), None, None) => Record::Read(key.to_owned()),
            _ => return Err(corrupt_line(line)),
        };

        if is_valid_key(record.key()) {
            Ok(record)
        } else {
            Err(corrupt_line(line))
        }
    }

    pub(crate) fn key(&self) -> &str {
        match self {
            Record::Dirty(key) | Record::Clean(key, _) | Record::Remove(key) | Record::Read(key) => {
                key
            }
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Dirty(key) => write!(f, "{DIRTY} {key}"),
            Record::Clean(key, size) => write!(f, "{CLEAN} {key} {size}"),
            Record::Remove(key) => write!(f, "{REMOVE} {key}"),
            Record::Read(key) => write!(f, "{READ} {key}"),
        }
    }
}

fn corrupt_line(line: &str) -> StorageError {
    StorageError::CorruptJournal(format!("unexpected journal line: {line:?}"))
}

fn header(app_version: u32) -> [String; 5] {
    [
        MAGIC.to_owned(),
        JOURNAL_VERSION.to_owned(),
        app_version.to_string(),
        VALUE_COUNT.to_string(),
        String::new(),
    ]
}

/// Records recovered from an existing journal
#[derive(Debug, Default)]
pub(crate) struct Replay {
    pub records: Vec<Record>,
    /// The final line had no newline, i.e. an append was cut short
    pub truncated: bool,
}

/// Read and validate a journal
///
/// A missing trailing newline means the last append was interrupted; that partial line
/// is skipped and reported through [`Replay::truncated`].
pub(crate) fn read_journal(path: &Path, app_version: u32) -> Result<Replay> {
    let contents = fs::read_to_string(path)?;
    let truncated = !contents.is_empty() && !contents.ends_with('\n');

    let mut lines: Vec<&str> = contents.split('\n').collect();
    // Either the empty string after the final newline or the partial last line.
    lines.pop();

    let expected = header(app_version);
    let header_matches = lines.len() >= expected.len()
        && lines
            .iter()
            .zip(expected.iter())
            .all(|(line, want)| *line == want.as_str());
    if !header_matches {
        let found = &lines[..lines.len().min(expected.len())];
        return Err(StorageError::CorruptJournal(format!(
            "unexpected journal header: {found:?}"
        )));
    }

    let records = lines[expected.len()..]
        .iter()
        .map(|line| Record::parse(line))
        .collect::<Result<Vec<_>>>()?;

    Ok(Replay { records, truncated })
}

/// Atomically replace the journal in `directory` with `records`
///
/// The new journal is written to `journal.tmp` and synced, the current journal is kept as
/// `journal.bkp` during the swap, and the backup is dropped once the swap succeeds.
pub(crate) fn write_journal<I>(directory: &Path, app_version: u32, records: I) -> io::Result<()>
where
    I: IntoIterator<Item = Record>,
{
    let tmp = directory.join(JOURNAL_FILE_TMP);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        for line in header(app_version) {
            writeln!(writer, "{line}")?;
        }
        for record in records {
            writeln!(writer, "{record}")?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    let journal = directory.join(JOURNAL_FILE);
    let backup = directory.join(JOURNAL_FILE_BACKUP);
    if journal.exists() {
        fs::rename(&journal, &backup)?;
    }
    fs::rename(&tmp, &journal)?;
    remove_if_exists(&backup)
}

/// Handle appending records to the live journal
#[derive(Debug)]
pub(crate) struct JournalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JournalWriter {
    pub(crate) fn open(path: PathBuf) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Append one record and push it to the OS
    pub(crate) fn append(&mut self, record: &Record) -> io::Result<()> {
        writeln!(self.writer, "{record}")?;
        self.writer.flush()
    }

    /// Flush and sync the journal to stable storage
    pub(crate) fn sync(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
