//! HEAD persisted as a single hex-encoded file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use shelf_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::traits::RefStore;

/// File-backed [`RefStore`]: `<dir>/HEAD` holds the hex id of the current
/// commit followed by a newline. A missing file means "no commit yet".
#[derive(Debug)]
pub struct FileRefStore {
    path: PathBuf,
}

impl FileRefStore {
    /// Use `<dir>/HEAD`. The directory must already exist.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("HEAD"),
        }
    }
}

impl RefStore for FileRefStore {
    fn head(&self) -> Result<Option<ObjectId>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(ObjectId::from_hex(&content)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_head(&self, commit: ObjectId) -> Result<()> {
        if commit.is_null() {
            return Err(RefError::NullTarget);
        }
        let dir = self
            .path
            .parent()
            .ok_or_else(|| io::Error::other("HEAD path has no parent"))?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        writeln!(tmp, "{}", commit.to_hex())?;
        tmp.persist(&self.path).map_err(|e| RefError::Io(e.error))?;
        debug!(head = %commit.short_hex(), "HEAD updated");
        Ok(())
    }
}
