//! Repository facade.
//!
//! Ties the pieces together: discovers the `.git` directory for a
//! working copy, normalizes user-supplied paths, and exposes the public
//! operations over an injected object store. There is no process-global
//! repository object; every `Repository` owns its collaborators.
//!
//! # Discovery
//! `<root>/.git` may be a directory (normal worktree) or a file holding
//! `gitdir: <path>` (linked worktree); both are handled. Bare
//! repositories have no working copy and are out of scope here.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::commit::{parse_commit, CommitRecord};
use crate::dirty;
use crate::errors::{HeadError, ObjectError, RepoError};
use crate::head::{resolve_head, HeadPointer};
use crate::history::{get_log, walk_log, LogOptions};
use crate::limits::ReadLimits;
use crate::loose::LooseStore;
use crate::object_id::{ObjectFormat, ObjectId};
use crate::object_store::{ObjectKind, ObjectStore};
use crate::tree_path::{resolve_path, PathLookup};

/// Upper bound on `.git` pointer file size; the file holds one line.
const MAX_GITDIR_FILE_BYTES: u64 = 4 * 1024;

/// A read-only view over one repository.
///
/// Holds the working-copy root, the resolved `.git` directory, and the
/// injected object store. No state is cached between operations.
#[derive(Debug)]
pub struct Repository<S: ObjectStore> {
    work_dir: PathBuf,
    git_dir: PathBuf,
    format: ObjectFormat,
    limits: ReadLimits,
    store: S,
}

impl Repository<LooseStore> {
    /// Opens the repository whose working copy is rooted at `work_dir`,
    /// backed by the loose-object store.
    ///
    /// # Errors
    /// Returns `RepoError` if `work_dir` holds no `.git` directory or
    /// pointer file, or the pointer file is malformed.
    pub fn open(work_dir: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let work_dir = work_dir.into();
        let limits = ReadLimits::default();
        let git_dir = discover_git_dir(&work_dir)?;
        let store = LooseStore::open(&git_dir, limits);
        Ok(Self {
            work_dir,
            git_dir,
            format: ObjectFormat::Sha1,
            limits,
            store,
        })
    }
}

impl<S: ObjectStore> Repository<S> {
    /// Builds a repository view over an injected store.
    ///
    /// `git_dir` is read directly only for the HEAD file; everything else
    /// goes through `store`.
    pub fn with_store(
        work_dir: impl Into<PathBuf>,
        git_dir: impl Into<PathBuf>,
        format: ObjectFormat,
        store: S,
    ) -> Self {
        Self {
            work_dir: work_dir.into(),
            git_dir: git_dir.into(),
            format,
            limits: ReadLimits::default(),
            store,
        }
    }

    /// Returns the working-copy root.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Returns the resolved `.git` directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Returns the repository object format.
    #[must_use]
    pub const fn format(&self) -> ObjectFormat {
        self.format
    }

    /// Resolves HEAD to the current commit, with the branch name when
    /// HEAD is a well-formed branch ref.
    pub fn resolve_head(&mut self) -> Result<HeadPointer, HeadError> {
        resolve_head(&self.git_dir, &mut self.store, &self.limits)
    }

    /// Loads and parses the commit at `id`.
    pub fn load_commit(&mut self, id: &ObjectId) -> Result<CommitRecord, ObjectError> {
        let payload = self.store.load_object(ObjectKind::Commit, id)?;
        parse_commit(*id, &payload, self.format)
    }

    /// Resolves a working-copy path against the tree at `tree_id`.
    ///
    /// The path may be absolute or relative to the working-copy root; a
    /// path outside the root (or the root itself) resolves to `NotFound`.
    pub fn resolve_path(&mut self, tree_id: &ObjectId, path: impl AsRef<Path>) -> PathLookup {
        let Some(segments) = self.relative(path) else {
            return PathLookup::NotFound;
        };
        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
        resolve_path(&mut self.store, self.format, tree_id, &refs)
    }

    /// Checks whether the working-copy file at `path` differs from its
    /// version at HEAD. `true` also covers "could not be verified".
    pub fn is_dirty(&mut self, path: impl AsRef<Path>) -> bool {
        let Some(segments) = self.relative(&path) else {
            return true;
        };
        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
        let file_path = self.resolve(path);
        dirty::is_dirty(
            &mut self.store,
            self.format,
            &self.git_dir,
            &file_path,
            &refs,
            &self.limits,
        )
    }

    /// Walks the commit log from `start`, calling `handler` for each
    /// commit matching `options`.
    ///
    /// A filter path goes through the same normalization as the other
    /// operations, so `./notes.txt` and an absolute path under the
    /// working copy filter like `notes.txt`. A path that escapes the
    /// root matches no commits.
    pub fn walk_log<F>(
        &mut self,
        start: &ObjectId,
        options: &LogOptions,
        handler: F,
    ) -> Result<(), ObjectError>
    where
        F: FnMut(CommitRecord),
    {
        let Some(options) = self.normalized_options(options) else {
            return Ok(());
        };
        walk_log(&mut self.store, self.format, start, &options, handler)
    }

    /// Collects the commits matching `options` into an ordered list,
    /// newest first. The filter path is normalized as in [`Self::walk_log`].
    pub fn get_log(
        &mut self,
        start: &ObjectId,
        options: &LogOptions,
    ) -> Result<Vec<CommitRecord>, ObjectError> {
        let Some(options) = self.normalized_options(options) else {
            return Ok(Vec::new());
        };
        get_log(&mut self.store, self.format, start, &options)
    }

    /// Rewrites a filter path to root-relative segments; `None` when the
    /// path cannot name anything inside the working copy.
    fn normalized_options(&self, options: &LogOptions) -> Option<LogOptions> {
        let path = match &options.path {
            None => None,
            Some(raw) => Some(self.relative(raw)?.join("/")),
        };
        Some(LogOptions {
            path,
            count: options.count,
        })
    }

    /// Returns the absolute path of a file inside the working copy.
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    /// Normalizes a path to root-relative segments.
    ///
    /// Accepts absolute paths under the working-copy root or relative
    /// paths; `.` components are dropped and `..` components unwind.
    /// Returns `None` for the root itself, for paths escaping the root,
    /// and for non-UTF-8 segments.
    #[must_use]
    pub fn relative(&self, path: impl AsRef<Path>) -> Option<Vec<String>> {
        let absolute = self.resolve(path);
        let rel = absolute.strip_prefix(&self.work_dir).ok()?;

        let mut segments: Vec<String> = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str()?.to_string()),
                Component::CurDir => {}
                Component::ParentDir => {
                    segments.pop()?;
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        if segments.is_empty() {
            return None;
        }
        Some(segments)
    }
}

/// Locates the `.git` directory for a working copy.
fn discover_git_dir(work_dir: &Path) -> Result<PathBuf, RepoError> {
    let dot_git = work_dir.join(".git");
    let meta = fs::metadata(&dot_git).map_err(|_| RepoError::NotARepository)?;

    if meta.is_dir() {
        return Ok(dot_git);
    }

    // Linked worktree: `.git` is a file holding "gitdir: <path>".
    if meta.len() > MAX_GITDIR_FILE_BYTES {
        return Err(RepoError::MalformedGitdirFile);
    }
    let content = fs::read_to_string(&dot_git).map_err(RepoError::Io)?;
    let target = content
        .strip_prefix("gitdir:")
        .ok_or(RepoError::MalformedGitdirFile)?
        .trim();
    if target.is_empty() {
        return Err(RepoError::MalformedGitdirFile);
    }

    let git_dir = if Path::new(target).is_absolute() {
        PathBuf::from(target)
    } else {
        work_dir.join(target)
    };
    if !git_dir.is_dir() {
        return Err(RepoError::GitdirTargetNotDir);
    }
    Ok(git_dir)
}
