//! The filesystem collaborator.
//!
//! Everything the worktree learns about the live filesystem goes through the
//! [`Filesystem`] trait. Metadata always has `lstat` semantics: symbolic
//! links are reported as links and never followed.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use shelf_index::StatInfo;
use shelf_store::EntryMode;

/// Errors raised by a [`Filesystem`].
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The path does not exist.
    #[error("no such file or directory: {}", .0.display())]
    NotExist(PathBuf),

    /// A directory entry name is not valid UTF-8.
    #[error("file name is not valid UTF-8: {}", .0.display())]
    NonUtf8Name(PathBuf),

    /// Any other I/O failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Wrap an I/O error, separating "not found" from everything else.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotExist(path.to_path_buf())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

pub type FsResult<T> = Result<T, FsError>;

/// What a path is, without following links.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
    /// Sockets, FIFOs and device nodes. Never tracked.
    Other,
}

/// `lstat` result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub kind: FileKind,
    pub len: u64,
    /// Raw `st_mode` bits (type and permissions).
    pub mode: u32,
    pub mtime: SystemTime,
    pub ctime: Option<SystemTime>,
    pub dev: u64,
    pub inode: u64,
    pub uid: u32,
    pub gid: u32,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    /// Mode the path is recorded with in the index and in trees.
    pub fn entry_mode(&self) -> EntryMode {
        match self.kind {
            FileKind::Dir => EntryMode::Directory,
            FileKind::Symlink => EntryMode::Symlink,
            FileKind::File | FileKind::Other => EntryMode::from_unix_mode(self.mode),
        }
    }

    pub fn stat_info(&self) -> StatInfo {
        StatInfo {
            size: self.len,
            mtime: self.mtime,
            ctime: self.ctime,
            dev: self.dev,
            inode: self.inode,
            uid: self.uid,
            gid: self.gid,
        }
    }
}

/// One entry returned by [`Filesystem::read_dir`].
#[derive(Clone, Debug)]
pub struct DirEntry {
    pub name: String,
    pub metadata: Metadata,
}

/// Read-only view of a filesystem.
pub trait Filesystem: Send + Sync {
    /// List a directory. Order is unspecified.
    fn read_dir(&self, path: &Path) -> FsResult<Vec<DirEntry>>;

    /// Stat a path without following a final symlink.
    fn lstat(&self, path: &Path) -> FsResult<Metadata>;

    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>>;

    fn read_link(&self, path: &Path) -> FsResult<PathBuf>;

    /// The bytes a leaf is stored as: file content, or the link target for
    /// symlinks.
    fn leaf_content(&self, path: &Path, metadata: &Metadata) -> FsResult<Vec<u8>> {
        if metadata.kind == FileKind::Symlink {
            let target = self.read_link(path)?;
            Ok(target.to_string_lossy().into_owned().into_bytes())
        } else {
            self.read_file(path)
        }
    }
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFilesystem;

impl OsFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for OsFilesystem {
    fn read_dir(&self, path: &Path) -> FsResult<Vec<DirEntry>> {
        let iter = std::fs::read_dir(path).map_err(|e| FsError::from_io(path, e))?;
        let mut entries = Vec::new();
        for entry in iter {
            let entry = entry.map_err(|e| FsError::from_io(path, e))?;
            let child = entry.path();
            let name = entry
                .file_name()
                .into_string()
                .map_err(|_| FsError::NonUtf8Name(child.clone()))?;
            // DirEntry::metadata does not traverse symlinks.
            let metadata = entry.metadata().map_err(|e| FsError::from_io(&child, e))?;
            entries.push(DirEntry {
                name,
                metadata: convert(&metadata),
            });
        }
        Ok(entries)
    }

    fn lstat(&self, path: &Path) -> FsResult<Metadata> {
        std::fs::symlink_metadata(path)
            .map(|m| convert(&m))
            .map_err(|e| FsError::from_io(path, e))
    }

    fn read_file(&self, path: &Path) -> FsResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| FsError::from_io(path, e))
    }

    fn read_link(&self, path: &Path) -> FsResult<PathBuf> {
        std::fs::read_link(path).map_err(|e| FsError::from_io(path, e))
    }
}

fn kind_of(file_type: std::fs::FileType) -> FileKind {
    if file_type.is_symlink() {
        FileKind::Symlink
    } else if file_type.is_dir() {
        FileKind::Dir
    } else if file_type.is_file() {
        FileKind::File
    } else {
        FileKind::Other
    }
}

#[cfg(unix)]
fn convert(metadata: &std::fs::Metadata) -> Metadata {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let ctime = u64::try_from(metadata.ctime())
        .ok()
        .map(|secs| UNIX_EPOCH + Duration::new(secs, metadata.ctime_nsec() as u32));
    Metadata {
        kind: kind_of(metadata.file_type()),
        len: metadata.len(),
        mode: metadata.mode(),
        mtime: metadata.modified().unwrap_or(UNIX_EPOCH),
        ctime,
        dev: metadata.dev(),
        inode: metadata.ino(),
        uid: metadata.uid(),
        gid: metadata.gid(),
    }
}

#[cfg(not(unix))]
fn convert(metadata: &std::fs::Metadata) -> Metadata {
    let kind = kind_of(metadata.file_type());
    let mode = match kind {
        FileKind::Dir => 0o040755,
        FileKind::Symlink => 0o120000,
        _ => 0o100644,
    };
    Metadata {
        kind,
        len: metadata.len(),
        mode,
        mtime: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        ctime: metadata.created().ok(),
        dev: 0,
        inode: 0,
        uid: 0,
        gid: 0,
    }
}
