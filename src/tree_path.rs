//! Path resolution through nested trees.
//!
//! Walks from a root tree down one path segment per level to the entry a
//! slash-separated path names. The result is a verdict, not a diagnosis:
//! every failure mode on the way down (missing object, wrong object
//! kind, corrupt tree bytes) degrades to [`PathLookup::NotFound`].
//! Callers that need the distinction must query the store directly; the
//! coarse-graining is deliberate and covered by tests.

use crate::object_id::{ObjectFormat, ObjectId};
use crate::object_store::{ObjectKind, ObjectStore};
use crate::tree::{lookup_entry, TreeEntry};

/// Outcome of resolving a path against a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathLookup {
    /// The path names this entry, a file or a subtree; the caller
    /// interprets by context.
    Found(TreeEntry),
    /// The path does not exist at this tree, or could not be verified to
    /// exist (store failures collapse here).
    NotFound,
}

impl PathLookup {
    /// Returns the entry's content ID, if found.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<ObjectId> {
        match self {
            Self::Found(entry) => Some(entry.id),
            Self::NotFound => None,
        }
    }
}

/// Resolves `segments` against the tree at `root`.
///
/// `segments` must be a normalized, root-relative path: non-empty
/// segments, no `.` or `..`. An empty slice is a caller error and
/// resolves to `NotFound`. Each step loads one tree and consults it for
/// the next segment; the final segment's entry is returned as found.
pub fn resolve_path<S: ObjectStore>(
    store: &mut S,
    format: ObjectFormat,
    root: &ObjectId,
    segments: &[&str],
) -> PathLookup {
    let Some((last, inner)) = segments.split_last() else {
        return PathLookup::NotFound;
    };

    let mut current = *root;
    for segment in inner {
        match entry_at(store, format, &current, segment) {
            Some(entry) => current = entry.id,
            None => return PathLookup::NotFound,
        }
    }

    match entry_at(store, format, &current, last) {
        Some(entry) => PathLookup::Found(entry),
        None => PathLookup::NotFound,
    }
}

/// Loads the tree at `tree_id` and looks up one name, collapsing every
/// failure to `None`.
fn entry_at<S: ObjectStore>(
    store: &mut S,
    format: ObjectFormat,
    tree_id: &ObjectId,
    name: &str,
) -> Option<TreeEntry> {
    let payload = store.load_object(ObjectKind::Tree, tree_id).ok()?;
    lookup_entry(&payload, format, name).ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ObjectError;
    use crate::object_store::LogWalker;
    use std::collections::HashMap;

    /// In-memory tree store counting loads, for asserting descent depth.
    struct TreeStore {
        trees: HashMap<ObjectId, Vec<u8>>,
        loads: usize,
    }

    impl TreeStore {
        fn new() -> Self {
            Self {
                trees: HashMap::new(),
                loads: 0,
            }
        }

        fn insert(&mut self, id: ObjectId, payload: Vec<u8>) {
            self.trees.insert(id, payload);
        }
    }

    impl ObjectStore for TreeStore {
        fn load_object(&mut self, kind: ObjectKind, id: &ObjectId) -> Result<Vec<u8>, ObjectError> {
            assert_eq!(kind, ObjectKind::Tree);
            self.loads += 1;
            self.trees.get(id).cloned().ok_or(ObjectError::NotFound)
        }

        fn read_ref(&mut self, _: &str) -> Result<ObjectId, ObjectError> {
            unreachable!("path resolution must not read refs")
        }

        fn log_walker(&mut self, _: &ObjectId) -> Result<Box<dyn LogWalker>, ObjectError> {
            unreachable!("path resolution must not walk")
        }
    }

    fn entry_bytes(mode: &str, name: &str, id: &ObjectId) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(mode.as_bytes());
        out.push(b' ');
        out.extend_from_slice(name.as_bytes());
        out.push(0);
        out.extend_from_slice(id.as_slice());
        out
    }

    const FMT: ObjectFormat = ObjectFormat::Sha1;

    #[test]
    fn resolves_top_level_file() {
        let root = ObjectId::sha1([0x01; 20]);
        let blob = ObjectId::sha1([0x02; 20]);
        let mut store = TreeStore::new();
        store.insert(root, entry_bytes("100644", "readme.md", &blob));

        let result = resolve_path(&mut store, FMT, &root, &["readme.md"]);
        match result {
            PathLookup::Found(entry) => {
                assert_eq!(entry.id, blob);
                assert_eq!(entry.mode, 0o100644);
            }
            PathLookup::NotFound => panic!("expected found"),
        }
    }

    #[test]
    fn resolves_nested_path_exactly() {
        // root -> "src" -> "core" -> "walk.rs", depth 3.
        let root = ObjectId::sha1([0x01; 20]);
        let src = ObjectId::sha1([0x02; 20]);
        let core = ObjectId::sha1([0x03; 20]);
        let blob = ObjectId::sha1([0x04; 20]);

        let mut store = TreeStore::new();
        store.insert(root, entry_bytes("40000", "src", &src));
        store.insert(src, entry_bytes("40000", "core", &core));
        store.insert(core, entry_bytes("100644", "walk.rs", &blob));

        let result = resolve_path(&mut store, FMT, &root, &["src", "core", "walk.rs"]);
        assert_eq!(result.id(), Some(blob));
        assert_eq!(store.loads, 3);
    }

    #[test]
    fn absent_first_segment_stops_immediately() {
        let root = ObjectId::sha1([0x01; 20]);
        let blob = ObjectId::sha1([0x02; 20]);
        let mut store = TreeStore::new();
        store.insert(root, entry_bytes("100644", "present", &blob));

        let result = resolve_path(&mut store, FMT, &root, &["absent", "deeper", "path"]);
        assert_eq!(result, PathLookup::NotFound);
        // Only the root tree was consulted.
        assert_eq!(store.loads, 1);
    }

    #[test]
    fn empty_segment_list_is_not_found() {
        let root = ObjectId::sha1([0x01; 20]);
        let mut store = TreeStore::new();
        let result = resolve_path(&mut store, FMT, &root, &[]);
        assert_eq!(result, PathLookup::NotFound);
        assert_eq!(store.loads, 0);
    }

    #[test]
    fn missing_subtree_object_degrades_to_not_found() {
        // "src" points at a tree the store cannot load.
        let root = ObjectId::sha1([0x01; 20]);
        let src = ObjectId::sha1([0x02; 20]);
        let mut store = TreeStore::new();
        store.insert(root, entry_bytes("40000", "src", &src));

        let result = resolve_path(&mut store, FMT, &root, &["src", "lib.rs"]);
        assert_eq!(result, PathLookup::NotFound);
    }

    #[test]
    fn corrupt_tree_degrades_to_not_found() {
        // The store-error-vs-absent ambiguity is intentionally preserved:
        // corrupt bytes mid-descent are indistinguishable from an absent
        // path in this contract.
        let root = ObjectId::sha1([0x01; 20]);
        let src = ObjectId::sha1([0x02; 20]);
        let mut store = TreeStore::new();
        store.insert(root, entry_bytes("40000", "src", &src));
        store.insert(src, b"not a tree payload".to_vec());

        let result = resolve_path(&mut store, FMT, &root, &["src", "lib.rs"]);
        assert_eq!(result, PathLookup::NotFound);
    }

    #[test]
    fn final_segment_may_be_a_subtree() {
        let root = ObjectId::sha1([0x01; 20]);
        let src = ObjectId::sha1([0x02; 20]);
        let mut store = TreeStore::new();
        store.insert(root, entry_bytes("40000", "src", &src));

        match resolve_path(&mut store, FMT, &root, &["src"]) {
            PathLookup::Found(entry) => assert!(entry.kind.is_tree()),
            PathLookup::NotFound => panic!("expected found"),
        }
    }
}
