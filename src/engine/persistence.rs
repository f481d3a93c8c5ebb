use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use serde_json::Value;
use tempfile::NamedTempFile;
use crate::{Result, Student};
use log::{debug, warn};

/// Handles disk I/O for the [`FileStore`](crate::engine::FileStore).
///
/// The whole collection lives in one JSON file as an array of five-element arrays.
/// A single mutex serializes every [`load`](Self::load) against every [`save`](Self::save),
/// so a reader never observes a half-written file from this process.
pub struct Persistence {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Persistence {
    /// Opens the backing file at `path`.
    ///
    /// Missing parent directories are created, and a missing file is initialized
    /// with an empty array.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let persistence = Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        };

        if let Some(parent) = persistence.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        if !persistence.path.exists() {
            fs::write(&persistence.path, b"[]")?;
        }

        Ok(persistence)
    }

    /// Reads the whole collection.
    ///
    /// This never fails: a missing file, an unreadable file, invalid JSON or a
    /// top-level value that is not an array all read as an empty collection.
    /// The underlying error is logged. Rows that are not arrays, or whose id is
    /// blank, are skipped.
    pub fn load(&self) -> Vec<Student> {
        let _guard = self.acquire();

        if !self.path.exists() {
            debug!("Backing file {:?} does not exist, treating as empty", self.path);
            return Vec::new();
        }

        let content = match fs::read(&self.path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Could not read backing file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        let rows = match serde_json::from_slice::<Value>(&content) {
            Ok(Value::Array(rows)) => rows,
            Ok(other) => {
                warn!("Backing file {:?} does not hold an array (found {}), treating as empty", self.path, kind(&other));
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not parse backing file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        rows.iter()
            .filter_map(|row| {
                let student = Student::from_row(row);
                if student.is_none() {
                    warn!("Skipping malformed row in {:?}: {}", self.path, row);
                }
                student
            })
            .collect()
    }

    /// Replaces the backing file with `students`.
    ///
    /// The data is written to a temporary file in the same directory and then
    /// renamed over the target. The target's permissions carry over to the new file.
    pub fn save(&self, students: &[Student]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(students)?;

        let _guard = self.acquire();
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        if let Ok(meta) = fs::metadata(&self.path) {
            temp.as_file().set_permissions(meta.permissions())?;
        }
        temp.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }

    fn acquire(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
