//! The repository context and its operations.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use shelf_diff::{diff_roots, diff_tree, IndexNode, TreeNode};
use shelf_index::{path, Index, IndexError, IndexTree, Status, StatusCode};
use shelf_refs::{FileRefStore, RefStore};
use shelf_store::{Commit, LooseObjectStore, ObjectKind, ObjectStore};
use shelf_types::ObjectId;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{WorktreeError, WorktreeResult};
use crate::fs::{FileKind, Filesystem, FsError, OsFilesystem};
use crate::fs_node::{absolute, FsNode};
use crate::status::{fold_staging, fold_worktree};

const CONFIG_FILE: &str = "config.toml";
const INDEX_FILE: &str = "index";
const OBJECTS_DIR: &str = "objects";

/// Result of [`Repository::add`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddOutcome {
    /// Canonical path that was added.
    pub path: String,
    /// Blob id for a file, tree id for a directory, null when nothing is
    /// staged at `path` any more.
    pub hash: ObjectId,
    /// Whether the index was rewritten.
    pub changed: bool,
}

/// A shelf repository bound to a canonical root.
///
/// Holds everything an operation needs: the canonical root every index
/// path is relative to, the tracked-root config, the object store, the
/// staging index, HEAD and the filesystem collaborator.
pub struct Repository {
    root: PathBuf,
    dir: PathBuf,
    config: Config,
    store: Arc<dyn ObjectStore>,
    refs: Box<dyn RefStore>,
    fs: Arc<dyn Filesystem>,
    index: Index,
    excluded: Vec<String>,
}

impl Repository {
    /// Create the repository directory layout if needed and open it.
    pub fn init(dir: &Path, root: &Path) -> WorktreeResult<Self> {
        fs::create_dir_all(dir.join(OBJECTS_DIR))?;
        let config_file = dir.join(CONFIG_FILE);
        if !config_file.exists() {
            Config::load(&config_file)?.save()?;
            info!(dir = %dir.display(), "initialized repository");
        }
        Self::open(dir, root)
    }

    /// Open an existing repository.
    pub fn open(dir: &Path, root: &Path) -> WorktreeResult<Self> {
        Self::open_with_filesystem(dir, root, Arc::new(OsFilesystem))
    }

    /// Open an existing repository reading the worktree through `fs`.
    pub fn open_with_filesystem(
        dir: &Path,
        root: &Path,
        fs: Arc<dyn Filesystem>,
    ) -> WorktreeResult<Self> {
        let dir = std::path::absolute(dir)?;
        let root = std::path::absolute(root)?;
        if !dir.join(CONFIG_FILE).is_file() {
            return Err(WorktreeError::NotARepository(dir));
        }

        let config = Config::load(&dir.join(CONFIG_FILE))?;
        let store = LooseObjectStore::open(&dir.join(OBJECTS_DIR))?;
        let index = Index::load(&dir.join(INDEX_FILE))?;
        let refs = FileRefStore::new(&dir);

        let mut excluded = Vec::new();
        if let Ok(inside) = dir.strip_prefix(&root) {
            let inside = inside
                .to_str()
                .ok_or_else(|| WorktreeError::NonUtf8Path(dir.clone()))?;
            excluded.push(path::normalize(inside)?);
        }

        debug!(
            dir = %dir.display(),
            root = %root.display(),
            roots = config.roots().len(),
            entries = index.len(),
            "repository opened"
        );
        Ok(Self {
            root,
            dir,
            config,
            store: Arc::new(store),
            refs: Box::new(refs),
            fs,
            index,
            excluded,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn head(&self) -> WorktreeResult<Option<ObjectId>> {
        Ok(self.refs.head()?)
    }

    /// Express a filesystem path as a canonical path under the root.
    pub fn canonical(&self, target: &Path) -> WorktreeResult<String> {
        let abs = std::path::absolute(target)?;
        let relative = abs
            .strip_prefix(&self.root)
            .map_err(|_| WorktreeError::OutsideRoot {
                path: abs.clone(),
                root: self.root.clone(),
            })?;
        let relative = relative
            .to_str()
            .ok_or_else(|| WorktreeError::NonUtf8Path(abs.clone()))?;
        Ok(path::normalize(&relative.replace('\\', "/"))?)
    }

    fn is_excluded(&self, canonical: &str) -> bool {
        self.excluded.iter().any(|ex| path::is_under(canonical, ex))
    }

    /// Start tracking `target` as a root, absorbing any roots beneath it.
    /// Returns `false` when a root already covers it.
    pub fn track(&mut self, target: &Path) -> WorktreeResult<bool> {
        let canonical = self.canonical(target)?;
        if self.is_excluded(&canonical) {
            return Err(WorktreeError::InsideRepository(canonical));
        }
        Ok(self.config.add_root(&canonical)?)
    }

    // ---- Status ----

    /// Compute the staging and worktree status of every path that differs
    /// anywhere.
    pub fn status(&self) -> WorktreeResult<Status> {
        let mut status = Status::new();

        if let Some(head) = self.refs.head()? {
            let commit = self.store.read_commit(&head)?;
            let committed = TreeNode::root(self.store.as_ref(), commit.tree, "");
            let staged = IndexTree::build(&self.index, "")?;
            let staged = staged.as_ref().map(IndexNode::new);
            let changes = diff_tree(Some(&committed), staged.as_ref())?;
            debug!(head = %head.short_hex(), changes = changes.len(), "committed vs index");
            fold_staging(&mut status, &changes);
        }

        let roots = self.config.roots();
        let mut staged = Vec::with_capacity(roots.len());
        for root in roots {
            staged.push(IndexTree::build(&self.index.scoped(root), root)?);
        }
        let mut pairs = Vec::with_capacity(roots.len());
        for (root, tree) in roots.iter().zip(&staged) {
            let on_disk = FsNode::open(self.fs.as_ref(), &self.root, &self.excluded, root)?;
            pairs.push((tree.as_ref().map(IndexNode::new), on_disk));
        }
        let changes = diff_roots(pairs)?;
        debug!(roots = roots.len(), changes = changes.len(), "index vs filesystem");
        fold_worktree(&mut status, &changes);

        Ok(status)
    }

    // ---- Add ----

    /// Stage `target`: a file, a symlink or a whole directory.
    ///
    /// Paths not under a tracked root become a new root first. Files whose
    /// worktree status is unmodified are skipped, so adding twice without
    /// filesystem changes leaves the index file untouched. Tracked files
    /// under `target` that no longer exist are unstaged.
    pub fn add(&mut self, target: &Path) -> WorktreeResult<AddOutcome> {
        let canonical = self.canonical(target)?;
        if self.is_excluded(&canonical) {
            return Err(WorktreeError::InsideRepository(canonical));
        }

        let abs = absolute(&self.root, &canonical);
        let metadata = match self.fs.lstat(&abs) {
            Ok(metadata) => Some(metadata),
            Err(FsError::NotExist(_)) => None,
            Err(e) => return Err(e.into()),
        };
        if metadata.is_none() && self.index.entries_under(&canonical).next().is_none() {
            return Err(FsError::NotExist(abs).into());
        }

        if self.config.root_of(&canonical).is_none() {
            self.config.add_root(&canonical)?;
        }

        let status = self.status()?;
        let changed = match metadata.map(|m| m.kind) {
            None => self.unstage_deleted(&status, &canonical)?,
            Some(FileKind::Dir) => {
                let added = self.add_dir(&status, &canonical)?;
                self.unstage_deleted(&status, &canonical)? || added
            }
            Some(FileKind::File | FileKind::Symlink) => self.add_file(&status, &canonical)?,
            Some(FileKind::Other) => return Err(WorktreeError::UnsupportedFileType(abs)),
        };

        if changed {
            self.index.save(&self.dir.join(INDEX_FILE))?;
        }

        let hash = IndexTree::build(&self.index, &canonical)?
            .map(|tree| tree.object_id())
            .unwrap_or_else(ObjectId::null);
        info!(path = %canonical, hash = %hash.short_hex(), changed, "add");
        Ok(AddOutcome {
            path: canonical,
            hash,
            changed,
        })
    }

    fn add_dir(&mut self, status: &Status, dir: &str) -> WorktreeResult<bool> {
        let mut entries = self.fs.read_dir(&absolute(&self.root, dir))?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut changed = false;
        for entry in entries {
            let child = path::join(dir, &entry.name);
            if self.is_excluded(&child) {
                continue;
            }
            let added = match entry.metadata.kind {
                FileKind::Dir => self.add_dir(status, &child)?,
                FileKind::File | FileKind::Symlink => self.add_file(status, &child)?,
                FileKind::Other => false,
            };
            changed |= added;
        }
        Ok(changed)
    }

    fn add_file(&mut self, status: &Status, file: &str) -> WorktreeResult<bool> {
        if status.file(file).worktree == StatusCode::Unmodified {
            return Ok(false);
        }

        let abs = absolute(&self.root, file);
        let metadata = match self.fs.lstat(&abs) {
            Ok(metadata) => metadata,
            Err(FsError::NotExist(_)) => return self.unstage(file),
            Err(e) => return Err(e.into()),
        };
        let content = self.fs.leaf_content(&abs, &metadata)?;
        let id = self.store.put(ObjectKind::Blob, &content)?;
        let changed = self
            .index
            .upsert(file, id, metadata.entry_mode(), metadata.stat_info())?;
        debug!(path = file, id = %id.short_hex(), mode = %metadata.entry_mode(), "staged");
        Ok(changed)
    }

    fn unstage(&mut self, file: &str) -> WorktreeResult<bool> {
        match self.index.remove(file) {
            Ok(id) => {
                debug!(path = file, id = %id.short_hex(), "unstaged deleted file");
                Ok(true)
            }
            Err(IndexError::EntryNotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn unstage_deleted(&mut self, status: &Status, prefix: &str) -> WorktreeResult<bool> {
        let deleted: Vec<String> = self
            .index
            .entries_under(prefix)
            .filter(|e| status.file(&e.path).worktree == StatusCode::Deleted)
            .map(|e| e.path.clone())
            .collect();
        let mut changed = false;
        for file in &deleted {
            changed |= self.unstage(file)?;
        }
        Ok(changed)
    }

    // ---- History ----

    /// Record the index as a new commit on top of HEAD and advance HEAD.
    pub fn commit(&mut self, message: &str, author: &str) -> WorktreeResult<ObjectId> {
        if self.index.is_empty() {
            return Err(WorktreeError::NothingToCommit);
        }

        let tree = self.index.write_tree(self.store.as_ref())?;
        let parent = self.refs.head()?;
        if let Some(parent) = parent {
            if self.store.read_commit(&parent)?.tree == tree {
                return Err(WorktreeError::NothingToCommit);
            }
        }

        let commit = Commit {
            tree,
            parents: parent.into_iter().collect(),
            author: author.to_string(),
            timestamp: Utc::now(),
            message: message.to_string(),
        };
        let id = self.store.write(&commit.to_stored_object()?)?;
        self.refs.set_head(id)?;

        info!(commit = %id.short_hex(), tree = %tree.short_hex(), "committed");
        Ok(id)
    }

    /// Commits reachable from HEAD through first parents, newest first.
    pub fn log(&self) -> WorktreeResult<Vec<(ObjectId, Commit)>> {
        let mut history = Vec::new();
        let mut next = self.refs.head()?;
        while let Some(id) = next {
            let commit = self.store.read_commit(&id)?;
            next = commit.first_parent();
            history.push((id, commit));
        }
        Ok(history)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("dir", &self.dir)
            .field("roots", &self.config.roots())
            .field("entries", &self.index.len())
            .finish()
    }
}
