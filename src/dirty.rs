//! Working-copy dirtiness verdict.
//!
//! Decides whether a working-copy file differs from the version recorded
//! at HEAD by comparing blob digests. The answer is a verdict, not a
//! diagnosis: `true` means "differs from HEAD or could not be verified",
//! `false` means "confirmed byte-identical". Every failure on the way
//! (missing file, unresolvable HEAD, untracked path, read error) lands on
//! `true`; an unverifiable file must never pass as clean.

use std::fs::{self, File};
use std::path::Path;

use crate::commit::parse_commit;
use crate::digest::{blob_header, hash_reader, HashAlgo};
use crate::head::resolve_head;
use crate::limits::ReadLimits;
use crate::object_id::{ObjectFormat, ObjectId};
use crate::object_store::{ObjectKind, ObjectStore};
use crate::tree_path::{resolve_path, PathLookup};

/// Checks whether the file at `file_path` (absolute) differs from the
/// entry `segments` names in the HEAD commit's tree.
///
/// `segments` must already be normalized root-relative (the repository
/// facade does this); `file_path` is the same file on disk.
pub fn is_dirty<S: ObjectStore>(
    store: &mut S,
    format: ObjectFormat,
    git_dir: &Path,
    file_path: &Path,
    segments: &[&str],
    limits: &ReadLimits,
) -> bool {
    // Any step failing means the verdict is dirty; `None` is the
    // collapse point for all of them.
    confirmed_clean(store, format, git_dir, file_path, segments, limits)
        .map_or(true, |clean| !clean)
}

/// Runs the comparison pipeline; `None` means "could not verify".
fn confirmed_clean<S: ObjectStore>(
    store: &mut S,
    format: ObjectFormat,
    git_dir: &Path,
    file_path: &Path,
    segments: &[&str],
    limits: &ReadLimits,
) -> Option<bool> {
    let meta = fs::metadata(file_path).ok()?;

    let head = resolve_head(git_dir, store, limits).ok()?;
    let payload = store.load_object(ObjectKind::Commit, &head.id).ok()?;
    let commit = parse_commit(head.id, &payload, format).ok()?;

    let entry = match resolve_path(store, format, &commit.tree, segments) {
        PathLookup::Found(entry) => entry,
        PathLookup::NotFound => return None,
    };

    let file = File::open(file_path).ok()?;
    let digest = hash_reader(
        HashAlgo::for_format(format),
        file,
        Some(&blob_header(meta.len())),
    )
    .ok()?;

    let working_id = ObjectId::from_hex(digest.as_bytes())?;
    Some(working_id == entry.id)
}
