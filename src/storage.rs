use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::models::{DailyTaskStatus, Task, TaskGroup};

/// Name of the persisted blob, without extension.
pub const STORAGE_KEY: &str = "daily-planner-storage";

/// Version written into every blob. Blobs carrying any other version are rejected.
pub const SCHEMA_VERSION: u32 = 1;

/// A durable slot holding one serialized blob.
///
/// The store reads it once at startup and overwrites it after every mutation.
pub trait StateSlot {
    /// Returns `None` when nothing has been saved yet.
    fn read(&self) -> io::Result<Option<String>>;
    fn write(&self, blob: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

impl<T: StateSlot + ?Sized> StateSlot for &T {
    fn read(&self) -> io::Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, blob: &str) -> io::Result<()> {
        (**self).write(blob)
    }

    fn clear(&self) -> io::Result<()> {
        (**self).clear()
    }
}

/// Returns the path of the storage file.
///
/// The path is determined in the following order:
/// 1. `DAYPLAN_DB` environment variable.
/// 2. `~/.local/share/dayplan/daily-planner-storage.json` (on Linux).
/// 3. `./daily-planner-storage.json` (fallback).
pub fn default_path() -> PathBuf {
    std::env::var("DAYPLAN_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let file = format!("{}.json", STORAGE_KEY);
        match dirs::data_local_dir() {
            Some(mut p) => {
                p.push("dayplan");
                p.push(file);
                p
            }
            None => PathBuf::from(file),
        }
    })
}

/// Stores the blob as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSlot {
    path: PathBuf,
}

impl JsonFileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSlot { path: path.into() }
    }

    /// A slot at [`default_path`].
    pub fn from_env() -> Self {
        Self::new(default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateSlot for JsonFileSlot {
    /// Bytes that are not UTF-8 are reported as [`ErrorKind::InvalidData`].
    fn read(&self) -> io::Result<Option<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
    }

    /// Writes to a sibling temp file first, then renames it over the target.
    fn write(&self, blob: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.temp_path();
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)?;
        f.write_all(blob.as_bytes())?;
        f.sync_all()?;
        fs::rename(&tmp, &self.path)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Keeps the blob in memory. Used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    blob: RefCell<Option<String>>,
}

impl MemorySlot {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        MemorySlot { blob: RefCell::new(Some(blob.into())) }
    }

    /// The last blob written, if any.
    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

impl StateSlot for MemorySlot {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.blob())
    }

    fn write(&self, blob: &str) -> io::Result<()> {
        *self.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.blob.borrow_mut() = None;
        Ok(())
    }
}

/// The three collections as they appear in the blob.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub task_groups: Vec<TaskGroup>,
    pub tasks: Vec<Task>,
    pub daily_statuses: Vec<DailyTaskStatus>,
}

/// Borrowed view of the collections, so saving does not clone them.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StateRef<'a> {
    pub task_groups: &'a [TaskGroup],
    pub tasks: &'a [Task],
    pub daily_statuses: Vec<&'a DailyTaskStatus>,
}

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    version: u32,
    state: StateRef<'a>,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    version: u32,
    state: serde_json::Value,
}

/// Serializes the collections into a versioned, pretty-printed blob.
pub(crate) fn encode(state: StateRef<'_>) -> Result<String> {
    let envelope = EnvelopeOut { version: SCHEMA_VERSION, state };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parses a blob produced by [`encode`].
///
/// The version is checked before the state is interpreted, so a future schema
/// is reported as [`StoreError::UnsupportedVersion`] rather than a parse error.
pub fn decode(blob: &str) -> Result<AppState> {
    let envelope: EnvelopeIn = serde_json::from_str(blob)?;
    if envelope.version != SCHEMA_VERSION {
        return Err(StoreError::UnsupportedVersion(envelope.version));
    }
    Ok(serde_json::from_value(envelope.state)?)
}
