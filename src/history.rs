//! Filtered commit-history traversal.
//!
//! Drives a [`LogWalker`] obtained from the object store and produces a
//! filtered, optionally path-scoped, count-bounded sequence of commits in
//! walker order (reverse chronological, oldest reachable ancestors last).
//!
//! # Path filtering
//! The nontrivial case. The walk keeps one pending candidate: the most
//! recently read commit together with the path's resolved content ID at
//! that commit. The candidate is emitted only once an older commit
//! resolves the path to a *different* ID: the candidate is the commit
//! where the content last changed away from its ancestor's state, so the
//! change is attributed to it rather than to its parent. On exhaustion
//! the pending candidate is flushed. A path that no longer resolves stops
//! the walk early: the file did not exist before this point.
//!
//! # Resource discipline
//! Walker reads are strictly sequential; each commit's path resolution
//! completes before the next read is issued. The walker is released on
//! every exit path, whether the bound was reached, the path vanished,
//! the walker ran dry, or a read failed.

use crate::commit::CommitRecord;
use crate::errors::ObjectError;
use crate::object_id::{ObjectFormat, ObjectId};
use crate::object_store::ObjectStore;
use crate::tree_path::resolve_path;

/// Filtering options for history traversal.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Only report commits where the file at this root-relative path
    /// changed.
    pub path: Option<String>,
    /// Report at most this many commits. `None` means unbounded;
    /// `Some(0)` reports nothing.
    pub count: Option<u64>,
}

/// Walks the commit log from `start` towards the initial commit, calling
/// `handler` for each commit matching `options`.
///
/// # Errors
/// A store failure mid-walk aborts the traversal and is returned as-is;
/// commits already handed to `handler` stay handed out, but nothing else
/// is recovered.
pub fn walk_log<S, F>(
    store: &mut S,
    format: ObjectFormat,
    start: &ObjectId,
    options: &LogOptions,
    mut handler: F,
) -> Result<(), ObjectError>
where
    S: ObjectStore,
    F: FnMut(CommitRecord),
{
    let mut walker = store.log_walker(start)?;
    let mut remaining = options.count.unwrap_or(u64::MAX);
    if remaining == 0 {
        walker.abort();
        return Ok(());
    }

    let result = match &options.path {
        None => {
            // Unfiltered: pass commits through, counting down.
            loop {
                match walker.read() {
                    Err(err) => break Err(err),
                    Ok(None) => break Ok(()),
                    Ok(Some(entry)) => {
                        handler(entry);
                        remaining -= 1;
                        if remaining == 0 {
                            break Ok(());
                        }
                    }
                }
            }
        }
        Some(path) => {
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            let mut pending: Option<CommitRecord> = None;
            let mut pending_id: Option<ObjectId> = None;

            loop {
                let entry = match walker.read() {
                    Err(err) => break Err(err),
                    Ok(entry) => entry,
                };
                let Some(entry) = entry else {
                    // Exhausted: flush the last pending candidate.
                    if let Some(candidate) = pending.take() {
                        handler(candidate);
                    }
                    break Ok(());
                };

                let resolved = resolve_path(store, format, &entry.tree, &segments).id();

                // Lag-by-one: the previous candidate is reported once a
                // strictly older commit shows different content for the
                // path. Absent counts as a differing value.
                if resolved != pending_id {
                    if let Some(candidate) = pending.take() {
                        handler(candidate);
                        remaining -= 1;
                    }
                }
                pending = Some(entry);
                pending_id = resolved;

                // Stop once the path stops existing (nothing older can
                // touch it) or the bound is spent. Neither flushes the
                // pending candidate.
                if pending_id.is_none() || remaining == 0 {
                    break Ok(());
                }
            }
        }
    };

    walker.abort();
    result
}

/// Collects the commits `walk_log` would report into an ordered list.
///
/// Emission order is insertion order. A mid-walk failure discards the
/// partial list; callers that want partial output use [`walk_log`] with
/// their own sink.
pub fn get_log<S: ObjectStore>(
    store: &mut S,
    format: ObjectFormat,
    start: &ObjectId,
    options: &LogOptions,
) -> Result<Vec<CommitRecord>, ObjectError> {
    let mut result = Vec::new();
    walk_log(store, format, start, options, |entry| result.push(entry))?;
    Ok(result)
}
