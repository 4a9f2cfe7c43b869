//! Error types for repository reading stages.
//!
//! Errors are stage-specific to keep diagnostics precise and avoid a
//! single monolithic error enum that grows unbounded. All enums are
//! `#[non_exhaustive]` to allow adding variants without breaking callers;
//! consumers should include a fallback match arm.
//!
//! # Design Notes
//! - Variants with `detail` carry human-readable context and are not stable
//!   for machine parsing.
//! - I/O errors preserve their source to keep diagnostics actionable.
//! - The composite checks (`tree_path`, `dirty`) intentionally collapse
//!   these errors into coarse verdicts; only the lower-level operations
//!   surface them.

use std::fmt;
use std::io;

/// Errors from repository discovery.
///
/// These occur before any object access begins and indicate a broken or
/// absent repository layout.
#[derive(Debug)]
#[non_exhaustive]
pub enum RepoError {
    /// I/O error during discovery.
    Io(io::Error),
    /// Not a git repository (no `.git` directory or pointer file).
    NotARepository,
    /// The `.git` file is malformed (bad `gitdir:` pointer).
    MalformedGitdirFile,
    /// The gitdir target doesn't exist or isn't a directory.
    GitdirTargetNotDir,
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::NotARepository => write!(f, "not a git repository"),
            Self::MalformedGitdirFile => {
                write!(f, "malformed .git file (expected 'gitdir: <path>')")
            }
            Self::GitdirTargetNotDir => write!(f, "gitdir target is not a directory"),
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RepoError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Errors from HEAD resolution.
///
/// Fatal to `resolve_head`; never downgraded.
#[derive(Debug)]
#[non_exhaustive]
pub enum HeadError {
    /// I/O error reading the HEAD file.
    Io(io::Error),
    /// HEAD file exceeds the configured size limit.
    FileTooLarge { size: u64, limit: u32 },
    /// HEAD content matches neither a hash nor a symbolic ref.
    Unrecognized { content: String },
    /// Dereferencing the symbolic ref through the object store failed.
    RefLookup(ObjectError),
}

impl fmt::Display for HeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error reading HEAD: {err}"),
            Self::FileTooLarge { size, limit } => {
                write!(f, "HEAD file too large: {size} bytes (limit: {limit})")
            }
            Self::Unrecognized { content } => {
                write!(f, "unrecognized HEAD content: {content:?}")
            }
            Self::RefLookup(err) => write!(f, "ref lookup failed: {err}"),
        }
    }
}

impl std::error::Error for HeadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::RefLookup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for HeadError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Errors from object-store loads, ref reads, and walker traversal.
#[derive(Debug)]
#[non_exhaustive]
pub enum ObjectError {
    /// Object not found under the requested ID.
    NotFound,
    /// Object exists but is not of the requested kind.
    WrongKind { expected: &'static str, found: &'static str },
    /// Object payload is corrupt or malformed.
    Corrupt { detail: &'static str },
    /// Object exceeds the configured size limit.
    TooLarge { size: u64, limit: u64 },
    /// Ref file content is not a valid object ID.
    MalformedRef,
    /// I/O error during store access.
    Io(io::Error),
}

impl ObjectError {
    /// Constructs a corruption error with a static detail string.
    #[inline]
    pub const fn corrupt(detail: &'static str) -> Self {
        Self::Corrupt { detail }
    }
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "object not found"),
            Self::WrongKind { expected, found } => {
                write!(f, "object kind mismatch: expected {expected}, found {found}")
            }
            Self::Corrupt { detail } => write!(f, "corrupt object: {detail}"),
            Self::TooLarge { size, limit } => {
                write!(f, "object too large: {size} bytes (limit: {limit})")
            }
            Self::MalformedRef => write!(f, "ref content is not a valid object ID"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ObjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ObjectError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Errors from streaming digest computation.
#[derive(Debug)]
#[non_exhaustive]
pub enum DigestError {
    /// The byte source errored before completion; any bytes already
    /// hashed are discarded and no partial digest is exposed.
    Stream(io::Error),
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(err) => write!(f, "byte source failed mid-stream: {err}"),
        }
    }
}

impl std::error::Error for DigestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stream(err) => Some(err),
        }
    }
}

impl From<io::Error> for DigestError {
    fn from(err: io::Error) -> Self {
        Self::Stream(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_error_display() {
        let err = HeadError::Unrecognized {
            content: "bogus".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("bogus"));
    }

    #[test]
    fn object_error_display() {
        let err = ObjectError::WrongKind {
            expected: "tree",
            found: "blob",
        };
        let msg = format!("{err}");
        assert!(msg.contains("tree"));
        assert!(msg.contains("blob"));
    }

    #[test]
    fn object_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: ObjectError = io_err.into();
        assert!(matches!(err, ObjectError::Io(_)));
    }

    #[test]
    fn digest_error_preserves_source() {
        use std::error::Error as _;
        let err = DigestError::Stream(io::Error::new(io::ErrorKind::BrokenPipe, "cut"));
        assert!(err.source().is_some());
    }
}
