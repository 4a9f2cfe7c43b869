//! Parser for git tree objects.
//!
//! Parses decompressed tree payloads (no `"tree <size>\0"` header) into
//! entries, and looks up a single entry by name. Resolution only ever needs
//! one name per level, so entries are materialized as owned values rather
//! than borrowed slices.
//!
//! # Tree Object Format
//! Each entry is `<mode> SP <name> NUL <id>` where the mode is ASCII octal,
//! the name is non-empty with no slashes or NULs, and the ID is raw bytes
//! (20 for SHA-1, 32 for SHA-256).
//!
//! # Entry Modes
//! The high four mode bits encode the object type; the parser classifies
//! by type mask rather than exact mode so historical non-canonical blob
//! modes (100664, 100600, ...) still classify as files.
//!
//! # Iterator Behavior
//! The iterator is fused: after returning an error, subsequent calls yield
//! `None`, preventing garbage results from partially parsed state.

use memchr::memchr;

use crate::errors::ObjectError;
use crate::object_id::{ObjectFormat, ObjectId};

/// Classification of a tree entry's type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Subdirectory (mode 040000).
    Tree,
    /// Regular file (mode 100644 or similar without execute bit).
    RegularFile,
    /// Executable file (mode 100755 or similar with execute bit).
    ExecutableFile,
    /// Symbolic link (mode 120000).
    Symlink,
    /// Gitlink/submodule (mode 160000).
    Gitlink,
    /// Unknown mode (type bits match no known type).
    Unknown,
}

impl EntryKind {
    /// Returns true if this entry is a tree (directory).
    #[inline]
    #[must_use]
    pub const fn is_tree(self) -> bool {
        matches!(self, Self::Tree)
    }

    /// Returns true if this entry is a regular or executable file.
    #[inline]
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::RegularFile | Self::ExecutableFile)
    }
}

/// A single tree entry: the leaf (or subtree) content reference a path
/// segment resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Entry name (path segment, no slashes).
    pub name: String,
    /// Raw mode value as stored.
    pub mode: u32,
    /// Content reference: blob ID for files, tree ID for subdirectories.
    pub id: ObjectId,
    /// Classified entry kind.
    pub kind: EntryKind,
}

/// Iterator over entries in a raw tree payload.
///
/// Yields entries in stored order (git keeps them sorted). Fused after the
/// first error.
#[derive(Debug)]
pub struct TreeIter<'a> {
    data: &'a [u8],
    /// Current position; set to `data.len()` to fuse after an error.
    pos: usize,
    id_len: usize,
}

impl<'a> TreeIter<'a> {
    /// Creates an iterator over a tree payload for the given format.
    #[must_use]
    pub fn new(data: &'a [u8], format: ObjectFormat) -> Self {
        Self {
            data,
            pos: 0,
            id_len: format.id_len() as usize,
        }
    }

    /// Parses the next entry, advancing past it.
    ///
    /// Returns `Ok(None)` at end of data. After an error all subsequent
    /// calls return `Ok(None)`.
    pub fn next_entry(&mut self) -> Result<Option<TreeEntry>, ObjectError> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }

        let remaining = &self.data[self.pos..];
        match parse_entry(remaining, self.id_len) {
            Ok((entry, consumed)) => {
                self.pos += consumed;
                Ok(Some(entry))
            }
            Err(err) => {
                self.pos = self.data.len();
                Err(err)
            }
        }
    }
}

impl Iterator for TreeIter<'_> {
    type Item = Result<TreeEntry, ObjectError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Finds the entry named `name` in a tree payload.
///
/// Scans entries in order; returns `Ok(None)` when no entry carries the
/// name. Name uniqueness within one tree is assumed, not enforced; the
/// first match wins.
///
/// # Errors
/// Returns `ObjectError::Corrupt` if the payload is malformed before a
/// match is found.
pub fn lookup_entry(
    data: &[u8],
    format: ObjectFormat,
    name: &str,
) -> Result<Option<TreeEntry>, ObjectError> {
    let mut iter = TreeIter::new(data, format);
    while let Some(entry) = iter.next_entry()? {
        if entry.name == name {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// Parses one entry from the start of `data`, returning it and the number
/// of bytes consumed.
fn parse_entry(data: &[u8], id_len: usize) -> Result<(TreeEntry, usize), ObjectError> {
    let space = memchr(b' ', data).ok_or(ObjectError::corrupt("tree entry missing mode"))?;
    let mode =
        parse_octal_mode(&data[..space]).ok_or(ObjectError::corrupt("invalid mode digits"))?;

    let after_space = &data[space + 1..];
    let nul = memchr(0, after_space).ok_or(ObjectError::corrupt("tree entry missing name"))?;
    let name_bytes = &after_space[..nul];
    if name_bytes.is_empty() {
        return Err(ObjectError::corrupt("empty entry name"));
    }
    if memchr(b'/', name_bytes).is_some() {
        return Err(ObjectError::corrupt("entry name contains slash"));
    }

    let id_start = space + 1 + nul + 1;
    if data.len() < id_start + id_len {
        return Err(ObjectError::corrupt("truncated entry ID"));
    }
    let id = ObjectId::try_from_slice(&data[id_start..id_start + id_len])
        .ok_or(ObjectError::corrupt("invalid entry ID length"))?;

    let entry = TreeEntry {
        name: String::from_utf8_lossy(name_bytes).into_owned(),
        mode,
        id,
        kind: classify_mode(mode),
    };
    Ok((entry, id_start + id_len))
}

/// Parses ASCII octal mode bytes.
///
/// At most 7 digits: the largest valid git mode is 0o160000 (6 digits),
/// and 7 octal digits still fit a u32 without checked arithmetic.
#[inline]
fn parse_octal_mode(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 7 {
        return None;
    }
    let mut mode: u32 = 0;
    for &b in bytes {
        let digit = b.wrapping_sub(b'0');
        if digit > 7 {
            return None;
        }
        mode = (mode << 3) | u32::from(digit);
    }
    Some(mode)
}

/// Classifies a mode value via its type bits (mask 0o170000).
#[inline]
fn classify_mode(mode: u32) -> EntryKind {
    const S_IFMT: u32 = 0o170000;

    match mode & S_IFMT {
        0o040000 => EntryKind::Tree,
        0o120000 => EntryKind::Symlink,
        0o160000 => EntryKind::Gitlink,
        0o100000 => {
            if (mode & 0o100) != 0 {
                EntryKind::ExecutableFile
            } else {
                EntryKind::RegularFile
            }
        }
        _ => EntryKind::Unknown,
    }
}
