//! Loose-object store backend.
//!
//! Reads zlib-deflated objects from `objects/<2-hex>/<remaining-hex>`,
//! loose ref files, and provides a date-ordered commit walker. This is the
//! storage layout every git repository starts with; pack files and
//! `packed-refs` are not read, so objects that exist only in packs surface
//! as `ObjectError::NotFound`.
//!
//! # Walk order
//! The log walker yields commits in reverse chronological order: a
//! max-heap keyed by committer timestamp, ties broken by insertion order,
//! with parents enqueued as commits are read. One commit is loaded per
//! `read`, keeping the walk lazy and abortable.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::fs;
use std::io;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::ZlibDecoder;

use crate::commit::{parse_commit, CommitRecord};
use crate::errors::ObjectError;
use crate::limits::ReadLimits;
use crate::object_id::{ObjectFormat, ObjectId};
use crate::object_store::{LogWalker, ObjectKind, ObjectStore};

/// Safety allowance for loose object headers (`"commit <size>\0"`).
const LOOSE_HEADER_MAX_BYTES: u64 = 64;

/// Loose-object implementation of [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct LooseStore {
    git_dir: PathBuf,
    objects_dir: PathBuf,
    format: ObjectFormat,
    limits: ReadLimits,
}

impl LooseStore {
    /// Opens a loose store rooted at a `.git` directory, assuming the
    /// SHA-1 object format.
    #[must_use]
    pub fn open(git_dir: impl Into<PathBuf>, limits: ReadLimits) -> Self {
        Self::with_format(git_dir, ObjectFormat::Sha1, limits)
    }

    /// Opens a loose store with an explicit object format.
    #[must_use]
    pub fn with_format(
        git_dir: impl Into<PathBuf>,
        format: ObjectFormat,
        limits: ReadLimits,
    ) -> Self {
        let git_dir = git_dir.into();
        let objects_dir = git_dir.join("objects");
        Self {
            git_dir,
            objects_dir,
            format,
            limits,
        }
    }

    /// Returns the repository's object format.
    #[inline]
    #[must_use]
    pub const fn format(&self) -> ObjectFormat {
        self.format
    }
}

impl ObjectStore for LooseStore {
    fn load_object(&mut self, kind: ObjectKind, id: &ObjectId) -> Result<Vec<u8>, ObjectError> {
        load_loose(&self.objects_dir, &self.limits, kind, id)
    }

    fn read_ref(&mut self, ref_path: &str) -> Result<ObjectId, ObjectError> {
        // Refs are repository-relative; anything absolute or escaping the
        // git dir is treated as nonexistent rather than followed.
        if !ref_path_is_safe(ref_path) {
            return Err(ObjectError::NotFound);
        }

        let path = self.git_dir.join(ref_path);
        let meta = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ObjectError::NotFound)
            }
            Err(err) => return Err(ObjectError::Io(err)),
        };
        if meta.len() > u64::from(self.limits.max_ref_bytes) {
            return Err(ObjectError::TooLarge {
                size: meta.len(),
                limit: u64::from(self.limits.max_ref_bytes),
            });
        }

        let content = fs::read(&path)?;
        let trimmed = trim_ascii(&content);
        ObjectId::from_hex(trimmed).ok_or(ObjectError::MalformedRef)
    }

    fn log_walker(&mut self, start: &ObjectId) -> Result<Box<dyn LogWalker>, ObjectError> {
        let mut walker = DateWalker {
            objects_dir: self.objects_dir.clone(),
            format: self.format,
            limits: self.limits,
            frontier: BinaryHeap::new(),
            visited: HashSet::new(),
            seq: 0,
            aborted: false,
        };
        walker.enqueue(start)?;
        Ok(Box::new(walker))
    }
}

/// Frontier entry: max-heap on committer timestamp, earlier insertion
/// wins ties so sibling order stays deterministic.
struct QueuedCommit {
    seconds: i64,
    seq: u64,
    record: CommitRecord,
}

impl PartialEq for QueuedCommit {
    fn eq(&self, other: &Self) -> bool {
        self.seconds == other.seconds && self.seq == other.seq
    }
}

impl Eq for QueuedCommit {}

impl PartialOrd for QueuedCommit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedCommit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.seconds
            .cmp(&other.seconds)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Date-ordered commit walker over loose objects.
struct DateWalker {
    objects_dir: PathBuf,
    format: ObjectFormat,
    limits: ReadLimits,
    frontier: BinaryHeap<QueuedCommit>,
    visited: HashSet<ObjectId>,
    seq: u64,
    aborted: bool,
}

impl DateWalker {
    /// Loads and parses a commit, adding it to the frontier unless it has
    /// already been visited.
    fn enqueue(&mut self, id: &ObjectId) -> Result<(), ObjectError> {
        if !self.visited.insert(*id) {
            return Ok(());
        }
        let payload = load_loose(&self.objects_dir, &self.limits, ObjectKind::Commit, id)?;
        let record = parse_commit(*id, &payload, self.format)?;
        self.frontier.push(QueuedCommit {
            seconds: record.committer.seconds,
            seq: self.seq,
            record,
        });
        self.seq += 1;
        Ok(())
    }
}

impl LogWalker for DateWalker {
    fn read(&mut self) -> Result<Option<CommitRecord>, ObjectError> {
        if self.aborted {
            return Ok(None);
        }
        let Some(next) = self.frontier.pop() else {
            return Ok(None);
        };
        // Parents enter the frontier only as their child is emitted,
        // keeping exactly one load per read amortized across the walk.
        let parents = next.record.parents.clone();
        for parent in &parents {
            self.enqueue(parent)?;
        }
        Ok(Some(next.record))
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.frontier.clear();
        self.visited.clear();
    }
}

/// Loads a loose object's payload, validating the header against the
/// requested kind.
fn load_loose(
    objects_dir: &Path,
    limits: &ReadLimits,
    kind: ObjectKind,
    id: &ObjectId,
) -> Result<Vec<u8>, ObjectError> {
    let hex = id.to_hex();
    let (dir, file) = hex.split_at(2);
    let path = objects_dir.join(dir).join(file);

    let compressed = match fs::read(&path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(ObjectError::NotFound),
        Err(err) => return Err(ObjectError::Io(err)),
    };

    let max_out = limits.max_object_bytes.saturating_add(LOOSE_HEADER_MAX_BYTES);
    let raw = inflate_bounded(&compressed, max_out)?;
    let (found_kind, payload) = split_loose_header(&raw, limits.max_object_bytes)?;

    if found_kind != kind.as_str() {
        return Err(ObjectError::WrongKind {
            expected: kind.as_str(),
            found: found_kind,
        });
    }
    Ok(payload.to_vec())
}

/// Inflates zlib data with a strict output cap.
fn inflate_bounded(compressed: &[u8], max_out: u64) -> Result<Vec<u8>, ObjectError> {
    let mut decoder = ZlibDecoder::new(compressed).take(max_out.saturating_add(1));
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|_| ObjectError::corrupt("zlib inflate failed"))?;
    if out.len() as u64 > max_out {
        return Err(ObjectError::TooLarge {
            size: out.len() as u64,
            limit: max_out,
        });
    }
    Ok(out)
}

/// Splits `"<kind> <size>\0<payload>"`, validating size and kind token.
fn split_loose_header(raw: &[u8], max_payload: u64) -> Result<(&'static str, &[u8]), ObjectError> {
    let nul = raw
        .iter()
        .position(|&b| b == 0)
        .ok_or(ObjectError::corrupt("missing object header terminator"))?;

    let header = &raw[..nul];
    let space = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or(ObjectError::corrupt("missing object size"))?;

    let kind = match &header[..space] {
        b"commit" => "commit",
        b"tree" => "tree",
        b"blob" => "blob",
        b"tag" => "tag",
        _ => return Err(ObjectError::corrupt("unknown object kind")),
    };

    let size =
        parse_decimal(&header[space + 1..]).ok_or(ObjectError::corrupt("invalid object size"))?;
    if size > max_payload {
        return Err(ObjectError::TooLarge {
            size,
            limit: max_payload,
        });
    }

    let payload = &raw[nul + 1..];
    if payload.len() as u64 != size {
        return Err(ObjectError::corrupt("object size mismatch"));
    }
    Ok((kind, payload))
}

fn parse_decimal(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    let mut value: u64 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value.checked_mul(10)?.checked_add(u64::from(b - b'0'))?;
    }
    Some(value)
}

/// Rejects absolute ref paths and any path containing `..` components.
fn ref_path_is_safe(ref_path: &str) -> bool {
    let path = Path::new(ref_path);
    !ref_path.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}
