//! Object store collaborator contracts.
//!
//! The traversal logic in this crate never touches storage directly; it
//! consumes these traits. [`crate::loose::LooseStore`] is the bundled
//! implementation; tests substitute in-memory mocks.
//!
//! # Contract
//! `load_object` returns the raw, decompressed object payload with the
//! `"<kind> <size>\0"` header already stripped and validated. Callers
//! assume tree payloads contain entries in git tree order and commit
//! payloads start at the `tree` header line.

use crate::commit::CommitRecord;
use crate::errors::ObjectError;
use crate::object_id::ObjectId;

/// Object kinds addressable through a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Commit object.
    Commit,
    /// Tree object.
    Tree,
    /// Blob object.
    Blob,
}

impl ObjectKind {
    /// Returns the kind's on-disk header token.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
        }
    }
}

/// Content-addressed object access plus ref reading and history walking.
///
/// Implementations may allocate per call; no caching is assumed. Receivers
/// are `&mut self` so implementations can keep internal scratch state
/// without interior mutability.
pub trait ObjectStore {
    /// Loads an object's payload by ID, verifying it has the requested kind.
    ///
    /// # Errors
    /// - `NotFound` if no object exists under the ID
    /// - `WrongKind` if the object exists with a different kind
    /// - `Corrupt` / `TooLarge` / `Io` for storage-level failures
    fn load_object(&mut self, kind: ObjectKind, id: &ObjectId) -> Result<Vec<u8>, ObjectError>;

    /// Dereferences a ref path (e.g. `refs/heads/main`) to an object ID.
    ///
    /// # Errors
    /// - `NotFound` if the ref does not exist
    /// - `MalformedRef` if its content is not a valid object ID
    fn read_ref(&mut self, ref_path: &str) -> Result<ObjectId, ObjectError>;

    /// Creates a lazy walker over the commit graph reachable from `start`,
    /// in reverse chronological order (newest first, oldest reachable
    /// ancestors last).
    ///
    /// The returned walker owns its resources independently of the store,
    /// so callers can keep loading objects while a walk is in flight.
    fn log_walker(&mut self, start: &ObjectId) -> Result<Box<dyn LogWalker>, ObjectError>;
}

/// Lazy, abortable iterator over commit records.
///
/// Walkers are pull-based: each `read` performs the work for exactly one
/// commit. A walker is owned by a single traversal; reads are never
/// overlapped.
pub trait LogWalker {
    /// Yields the next commit, or `None` once the graph is exhausted.
    ///
    /// After `abort` (or exhaustion) further reads return `Ok(None)`.
    fn read(&mut self) -> Result<Option<CommitRecord>, ObjectError>;

    /// Releases the walker's resources. Idempotent; also implied by drop.
    fn abort(&mut self);
}

/// Forwarding impl so `&mut S` satisfies store bounds without moves.
impl<S: ObjectStore + ?Sized> ObjectStore for &mut S {
    fn load_object(&mut self, kind: ObjectKind, id: &ObjectId) -> Result<Vec<u8>, ObjectError> {
        (**self).load_object(kind, id)
    }

    fn read_ref(&mut self, ref_path: &str) -> Result<ObjectId, ObjectError> {
        (**self).read_ref(ref_path)
    }

    fn log_walker(&mut self, start: &ObjectId) -> Result<Box<dyn LogWalker>, ObjectError> {
        (**self).log_walker(start)
    }
}
