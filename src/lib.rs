//! Read-only git repository inspection with bounded reads and explicit errors.
//!
//! ## Scope
//! This crate answers read-side questions about a git repository: where
//! HEAD points, what a path names inside a commit's tree, whether a
//! working-copy file has drifted from its committed version, and which
//! commits touched a path.
//!
//! ## Key invariants
//! - Every filesystem read is bounded: HEAD and ref files, loose-object
//!   inflation, and tree payloads all honor `ReadLimits`.
//! - Operations are fail-soft where the question is a predicate: path
//!   resolution degrades to "not found" and the dirtiness check to
//!   "dirty" instead of surfacing store errors.
//! - History traversal is newest-first by committer date, each commit
//!   visited once, and the walker is always released on exit.
//!
//! ## Flow (one query)
//! `Repository -> HEAD/ref -> ObjectStore -> parse (commit/tree) -> answer`
//!
//! ## Notable entry points
//! - `Repository`: per-worktree facade over an injected store.
//! - `ObjectStore` / `LogWalker`: the storage seam; `LooseStore` is the
//!   loose-object implementation.
//! - `resolve_head`, `resolve_path`, `is_dirty`, `walk_log`, `get_log`:
//!   the operations, usable directly against any store.
//!
//! ## Design trade-offs
//! Only loose objects are read; packfiles are a different access pattern
//! and live behind the same `ObjectStore` seam when needed. The walker
//! is pull-based so callers control pacing and can stop early.

pub mod commit;
pub mod digest;
pub mod dirty;
pub mod errors;
pub mod head;
pub mod history;
pub mod limits;
pub mod loose;
pub mod object_id;
pub mod object_store;
pub mod repo;
pub mod tree;
pub mod tree_path;

pub use commit::{CommitRecord, Signature};
pub use digest::HashAlgo;
pub use dirty::is_dirty;
pub use errors::{DigestError, HeadError, ObjectError, RepoError};
pub use head::{resolve_head, HeadPointer};
pub use history::{get_log, walk_log, LogOptions};
pub use limits::ReadLimits;
pub use loose::LooseStore;
pub use object_id::{ObjectFormat, ObjectId};
pub use object_store::{LogWalker, ObjectKind, ObjectStore};
pub use repo::Repository;
pub use tree::{EntryKind, TreeEntry, TreeIter};
pub use tree_path::{resolve_path, PathLookup};
