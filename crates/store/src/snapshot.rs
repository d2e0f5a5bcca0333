//! JSON snapshot files for the in-memory stores.
//!
//! Writes go to a sibling temp file first and are renamed into place, so
//! a crash mid-write never leaves a truncated snapshot behind.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use st_domain::error::{Error, Result};

pub(crate) struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    /// Snapshot at `dir/file_name`, creating `dir` if needed.
    pub(crate) fn new(dir: &Path, file_name: &str) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(Error::Io)?;
        Ok(Self {
            path: dir.join(file_name),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot.  `Ok(None)` when the file does not exist yet.
    pub(crate) fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path).map_err(Error::Io)?;
        let value = serde_json::from_str(&raw).map_err(|e| {
            Error::Storage(format!("parsing {}: {e}", self.path.display()))
        })?;
        Ok(Some(value))
    }

    pub(crate) fn write<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| Error::Storage(format!("serializing snapshot: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(Error::Io)?;
        std::fs::rename(&tmp, &self.path).map_err(Error::Io)?;
        Ok(())
    }
}
