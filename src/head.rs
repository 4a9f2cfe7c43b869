//! HEAD resolution.
//!
//! Reads `<git_dir>/HEAD` and resolves it to the current commit ID.
//! HEAD holds either a bare hex ID (detached) or a symbolic pointer of
//! the form `ref: refs/heads/<name>`, which is dereferenced through the
//! object store's ref reader. Resolution is a single read, a single
//! parse, and at most one collaborator lookup; there are no retries.

use std::fs;
use std::io;
use std::path::Path;

use crate::errors::HeadError;
use crate::limits::ReadLimits;
use crate::object_id::ObjectId;
use crate::object_store::ObjectStore;

/// The repository's current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadPointer {
    /// Branch name, present only when HEAD is a symbolic ref of the form
    /// `refs/heads/<name>` with a well-formed name. Other symbolic refs
    /// still resolve but leave this unset.
    pub branch: Option<String>,
    /// The commit ID HEAD points at.
    pub id: ObjectId,
}

/// Resolves HEAD for the repository at `git_dir`.
///
/// # Errors
/// - `HeadError::Io` / `FileTooLarge` if the HEAD file cannot be read
///   within limits
/// - `HeadError::Unrecognized` if its content is neither a hash nor a
///   symbolic ref
/// - `HeadError::RefLookup` if the symbolic ref cannot be dereferenced
pub fn resolve_head<S: ObjectStore>(
    git_dir: &Path,
    store: &mut S,
    limits: &ReadLimits,
) -> Result<HeadPointer, HeadError> {
    let head_path = git_dir.join("HEAD");

    let meta = fs::metadata(&head_path)?;
    if meta.len() > u64::from(limits.max_head_bytes) {
        return Err(HeadError::FileTooLarge {
            size: meta.len(),
            limit: limits.max_head_bytes,
        });
    }

    let raw = fs::read(&head_path)?;
    let content = String::from_utf8(raw)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "HEAD is not UTF-8"))?;
    let trimmed = content.trim();

    // Detached HEAD: the whole line is a hex object ID.
    if let Some(id) = ObjectId::from_hex(trimmed.as_bytes()) {
        return Ok(HeadPointer { branch: None, id });
    }

    // Symbolic HEAD: "ref: <ref-path>".
    if let Some(rest) = trimmed.strip_prefix("ref:") {
        let ref_path = rest.trim_start();
        if !ref_path.is_empty() && !ref_path.contains(char::is_whitespace) {
            let id = store.read_ref(ref_path).map_err(HeadError::RefLookup)?;
            return Ok(HeadPointer {
                branch: branch_name(ref_path).map(str::to_string),
                id,
            });
        }
    }

    Err(HeadError::Unrecognized {
        content: trimmed.to_string(),
    })
}

/// Extracts the branch name from a ref path.
///
/// Returns `Some` only for `refs/heads/<name>` where `<name>` is
/// alphanumeric segments separated by `-`, `.`, or `/` (no empty
/// segments, no leading or trailing separators).
#[must_use]
pub fn branch_name(ref_path: &str) -> Option<&str> {
    let name = ref_path.strip_prefix("refs/heads/")?;
    if name.is_empty() {
        return None;
    }

    let mut segment_len = 0usize;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            segment_len += 1;
        } else if matches!(c, '-' | '.' | '/') {
            if segment_len == 0 {
                return None;
            }
            segment_len = 0;
        } else {
            return None;
        }
    }
    if segment_len == 0 {
        return None;
    }
    Some(name)
}
