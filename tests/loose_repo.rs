//! End-to-end tests over real on-disk repositories.
//!
//! Each test lays out a throwaway worktree with hand-built loose objects
//! (zlib-compressed `<kind> <size>\0<payload>` files under
//! `.git/objects/`) and exercises the public `Repository` operations
//! against it.

use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use sha1::{Digest, Sha1};
use tempfile::TempDir;

use gitview::{LogOptions, ObjectError, ObjectId, PathLookup, Repository};

/// Content-addresses a payload the way git does for loose objects.
fn hash_object(kind: &str, payload: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(format!("{kind} {}\0", payload.len()).as_bytes());
    hasher.update(payload);
    ObjectId::sha1(hasher.finalize().into())
}

/// Writes a loose object under `.git/objects/` and returns its ID.
fn write_loose(git_dir: &Path, kind: &str, payload: &[u8]) -> ObjectId {
    let id = hash_object(kind, payload);
    let hex = id.to_hex();
    let fanout = git_dir.join("objects").join(&hex[..2]);
    fs::create_dir_all(&fanout).unwrap();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(format!("{kind} {}\0", payload.len()).as_bytes())
        .unwrap();
    encoder.write_all(payload).unwrap();
    fs::write(fanout.join(&hex[2..]), encoder.finish().unwrap()).unwrap();
    id
}

/// Serializes tree entries (`<octal-mode> SP <name> NUL <raw-id>`).
fn tree_payload(entries: &[(&str, &str, &ObjectId)]) -> Vec<u8> {
    let mut payload = Vec::new();
    for (mode, name, id) in entries {
        payload.extend_from_slice(mode.as_bytes());
        payload.push(b' ');
        payload.extend_from_slice(name.as_bytes());
        payload.push(0);
        payload.extend_from_slice(id.as_slice());
    }
    payload
}

/// Serializes a commit with fixed identities and a `+0000` zone.
fn commit_payload(tree: &ObjectId, parents: &[&ObjectId], seconds: i64, message: &str) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(format!("tree {tree}\n").as_bytes());
    for parent in parents {
        payload.extend_from_slice(format!("parent {parent}\n").as_bytes());
    }
    payload.extend_from_slice(
        format!("author Ann Author <ann@example.com> {seconds} +0000\n").as_bytes(),
    );
    payload.extend_from_slice(
        format!("committer Cam Committer <cam@example.com> {seconds} +0000\n").as_bytes(),
    );
    payload.push(b'\n');
    payload.extend_from_slice(message.as_bytes());
    payload
}

/// A worktree with an initialized `.git` skeleton.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git").join("objects")).unwrap();
        Self { dir }
    }

    fn git_dir(&self) -> std::path::PathBuf {
        self.dir.path().join(".git")
    }

    fn set_head_ref(&self, ref_path: &str, id: &ObjectId) {
        let target = self.git_dir().join(ref_path);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, format!("{id}\n")).unwrap();
        fs::write(self.git_dir().join("HEAD"), format!("ref: {ref_path}\n")).unwrap();
    }

    fn set_head_detached(&self, id: &ObjectId) {
        fs::write(self.git_dir().join("HEAD"), format!("{id}\n")).unwrap();
    }

    fn repo(&self) -> Repository<gitview::LooseStore> {
        Repository::open(self.dir.path()).unwrap()
    }
}

/// One commit whose tree maps `name` to `content` at the root.
fn single_file_commit(fx: &Fixture, name: &str, content: &[u8], seconds: i64) -> ObjectId {
    let blob = write_loose(&fx.git_dir(), "blob", content);
    let tree = write_loose(&fx.git_dir(), "tree", &tree_payload(&[("100644", name, &blob)]));
    write_loose(
        &fx.git_dir(),
        "commit",
        &commit_payload(&tree, &[], seconds, "initial\n"),
    )
}

#[test]
fn head_resolves_through_a_branch_ref() {
    let fx = Fixture::new();
    let commit = single_file_commit(&fx, "a.txt", b"a\n", 1_700_000_000);
    fx.set_head_ref("refs/heads/main", &commit);

    let head = fx.repo().resolve_head().unwrap();
    assert_eq!(head.id, commit);
    assert_eq!(head.branch.as_deref(), Some("main"));
}

#[test]
fn detached_head_resolves_without_a_branch() {
    let fx = Fixture::new();
    let commit = single_file_commit(&fx, "a.txt", b"a\n", 1_700_000_000);
    fx.set_head_detached(&commit);

    let head = fx.repo().resolve_head().unwrap();
    assert_eq!(head.id, commit);
    assert_eq!(head.branch, None);
}

#[test]
fn load_commit_parses_the_stored_record() {
    let fx = Fixture::new();
    let blob = write_loose(&fx.git_dir(), "blob", b"hello\n");
    let tree = write_loose(
        &fx.git_dir(),
        "tree",
        &tree_payload(&[("100644", "hello.txt", &blob)]),
    );
    let parent = write_loose(
        &fx.git_dir(),
        "commit",
        &commit_payload(&tree, &[], 1_700_000_000, "first\n"),
    );
    let tip = write_loose(
        &fx.git_dir(),
        "commit",
        &commit_payload(&tree, &[&parent], 1_700_000_100, "second\n"),
    );

    let mut repo = fx.repo();
    let record = repo.load_commit(&tip).unwrap();
    assert_eq!(record.id, tip);
    assert_eq!(record.tree, tree);
    assert_eq!(record.parents, vec![parent]);
    assert_eq!(record.author.name, "Ann Author");
    assert_eq!(record.committer.email, "cam@example.com");
    assert_eq!(record.committer.seconds, 1_700_000_100);
    assert_eq!(record.message, "second\n");
}

#[test]
fn load_commit_rejects_a_tree_id() {
    let fx = Fixture::new();
    let blob = write_loose(&fx.git_dir(), "blob", b"x\n");
    let tree = write_loose(&fx.git_dir(), "tree", &tree_payload(&[("100644", "x", &blob)]));

    let mut repo = fx.repo();
    assert!(matches!(
        repo.load_commit(&tree),
        Err(ObjectError::WrongKind { .. })
    ));
}

#[test]
fn resolve_path_walks_nested_trees() {
    let fx = Fixture::new();
    let blob = write_loose(&fx.git_dir(), "blob", b"fn main() {}\n");
    let src = write_loose(
        &fx.git_dir(),
        "tree",
        &tree_payload(&[("100644", "main.rs", &blob)]),
    );
    let root = write_loose(&fx.git_dir(), "tree", &tree_payload(&[("40000", "src", &src)]));

    let mut repo = fx.repo();
    match repo.resolve_path(&root, "src/main.rs") {
        PathLookup::Found(entry) => {
            assert_eq!(entry.id, blob);
            assert_eq!(entry.name, "main.rs");
            assert!(entry.kind.is_file());
        }
        PathLookup::NotFound => panic!("path should resolve"),
    }

    assert!(matches!(
        repo.resolve_path(&root, "src/other.rs"),
        PathLookup::NotFound
    ));
    assert!(matches!(
        repo.resolve_path(&root, "../escape"),
        PathLookup::NotFound
    ));
}

#[test]
fn committed_file_is_clean_until_edited() {
    let fx = Fixture::new();
    let content = b"state: steady\n";
    let commit = single_file_commit(&fx, "notes.txt", content, 1_700_000_000);
    fx.set_head_ref("refs/heads/main", &commit);
    fs::write(fx.dir.path().join("notes.txt"), content).unwrap();

    let mut repo = fx.repo();
    assert!(!repo.is_dirty("notes.txt"));

    fs::write(fx.dir.path().join("notes.txt"), b"state: drifted\n").unwrap();
    assert!(repo.is_dirty("notes.txt"));
}

#[test]
fn missing_and_untracked_files_count_as_dirty() {
    let fx = Fixture::new();
    let commit = single_file_commit(&fx, "notes.txt", b"n\n", 1_700_000_000);
    fx.set_head_ref("refs/heads/main", &commit);

    let mut repo = fx.repo();
    // Tracked at HEAD but absent from the working copy.
    assert!(repo.is_dirty("notes.txt"));

    // Present in the working copy but not in HEAD's tree.
    fs::write(fx.dir.path().join("scratch.txt"), b"s\n").unwrap();
    assert!(repo.is_dirty("scratch.txt"));
}

#[test]
fn log_follows_the_parent_chain_newest_first() {
    let fx = Fixture::new();
    let git = fx.git_dir();
    let blob = write_loose(&git, "blob", b"v\n");
    let tree = write_loose(&git, "tree", &tree_payload(&[("100644", "v", &blob)]));

    let c1 = write_loose(&git, "commit", &commit_payload(&tree, &[], 1000, "one\n"));
    let c2 = write_loose(&git, "commit", &commit_payload(&tree, &[&c1], 2000, "two\n"));
    let c3 = write_loose(&git, "commit", &commit_payload(&tree, &[&c2], 3000, "three\n"));

    let mut repo = fx.repo();
    let log = repo.get_log(&c3, &LogOptions::default()).unwrap();
    let ids: Vec<ObjectId> = log.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![c3, c2, c1]);

    let bounded = repo
        .get_log(
            &c3,
            &LogOptions {
                path: None,
                count: Some(2),
            },
        )
        .unwrap();
    assert_eq!(bounded.len(), 2);
    assert_eq!(bounded[0].id, c3);
}

#[test]
fn log_orders_merged_branches_by_committer_date() {
    let fx = Fixture::new();
    let git = fx.git_dir();
    let blob = write_loose(&git, "blob", b"v\n");
    let tree = write_loose(&git, "tree", &tree_payload(&[("100644", "v", &blob)]));

    // root <- side (2000) and root <- main (3000), merged at 4000.
    let root = write_loose(&git, "commit", &commit_payload(&tree, &[], 1000, "root\n"));
    let side = write_loose(&git, "commit", &commit_payload(&tree, &[&root], 2000, "side\n"));
    let main = write_loose(&git, "commit", &commit_payload(&tree, &[&root], 3000, "main\n"));
    let merge = write_loose(
        &git,
        "commit",
        &commit_payload(&tree, &[&main, &side], 4000, "merge\n"),
    );

    let mut repo = fx.repo();
    let log = repo.get_log(&merge, &LogOptions::default()).unwrap();
    let ids: Vec<ObjectId> = log.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![merge, main, side, root]);
}

#[test]
fn path_filtered_log_reports_the_commits_that_changed_the_file() {
    let fx = Fixture::new();
    let git = fx.git_dir();

    let blob_a = write_loose(&git, "blob", b"first draft\n");
    let blob_b = write_loose(&git, "blob", b"second draft\n");
    let readme_v1 = write_loose(&git, "blob", b"readme\n");
    let readme_v2 = write_loose(&git, "blob", b"readme, expanded\n");

    // C1 introduces notes.txt, C2 rewrites it, C3 only touches README.
    let tree1 = write_loose(
        &git,
        "tree",
        &tree_payload(&[("100644", "README", &readme_v1), ("100644", "notes.txt", &blob_a)]),
    );
    let tree2 = write_loose(
        &git,
        "tree",
        &tree_payload(&[("100644", "README", &readme_v1), ("100644", "notes.txt", &blob_b)]),
    );
    let tree3 = write_loose(
        &git,
        "tree",
        &tree_payload(&[("100644", "README", &readme_v2), ("100644", "notes.txt", &blob_b)]),
    );

    let c1 = write_loose(&git, "commit", &commit_payload(&tree1, &[], 1000, "add notes\n"));
    let c2 = write_loose(
        &git,
        "commit",
        &commit_payload(&tree2, &[&c1], 2000, "rewrite notes\n"),
    );
    let c3 = write_loose(
        &git,
        "commit",
        &commit_payload(&tree3, &[&c2], 3000, "expand readme\n"),
    );

    let mut repo = fx.repo();
    let options = LogOptions {
        path: Some("notes.txt".to_string()),
        count: None,
    };
    let log = repo.get_log(&c3, &options).unwrap();
    let ids: Vec<ObjectId> = log.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![c2, c1]);
}

#[test]
fn path_filter_normalizes_like_the_other_operations() {
    let fx = Fixture::new();
    let git = fx.git_dir();

    let blob_a = write_loose(&git, "blob", b"first draft\n");
    let blob_b = write_loose(&git, "blob", b"second draft\n");
    let tree1 = write_loose(&git, "tree", &tree_payload(&[("100644", "notes.txt", &blob_a)]));
    let tree2 = write_loose(&git, "tree", &tree_payload(&[("100644", "notes.txt", &blob_b)]));
    let c1 = write_loose(&git, "commit", &commit_payload(&tree1, &[], 1000, "add notes\n"));
    let c2 = write_loose(
        &git,
        "commit",
        &commit_payload(&tree2, &[&c1], 2000, "rewrite notes\n"),
    );

    let mut repo = fx.repo();
    let log_for = |repo: &mut Repository<gitview::LooseStore>, path: &str| {
        let options = LogOptions {
            path: Some(path.to_string()),
            count: None,
        };
        repo.get_log(&c2, &options)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect::<Vec<ObjectId>>()
    };

    let plain = log_for(&mut repo, "notes.txt");
    assert_eq!(plain, vec![c2, c1]);

    // Dot-prefixed and absolute spellings of the same file filter alike.
    assert_eq!(log_for(&mut repo, "./notes.txt"), plain);
    let absolute = fx.dir.path().join("notes.txt");
    assert_eq!(log_for(&mut repo, absolute.to_str().unwrap()), plain);

    // A path escaping the working copy can match nothing.
    assert!(log_for(&mut repo, "../outside.txt").is_empty());
}

#[test]
fn missing_start_commit_surfaces_not_found() {
    let fx = Fixture::new();
    let absent = hash_object("commit", b"never written");

    let mut repo = fx.repo();
    assert!(matches!(
        repo.load_commit(&absent),
        Err(ObjectError::NotFound)
    ));
    assert!(matches!(
        repo.get_log(&absent, &LogOptions::default()),
        Err(ObjectError::NotFound)
    ));
}

#[test]
fn loose_store_verifies_the_header_kind() {
    let fx = Fixture::new();
    let blob = write_loose(&fx.git_dir(), "blob", b"payload\n");

    let mut repo = fx.repo();
    // The same ID loaded as a tree must be refused, not reinterpreted.
    assert!(matches!(
        repo.resolve_path(&blob, "anything"),
        PathLookup::NotFound
    ));
    let commit = repo.load_commit(&blob);
    assert!(matches!(commit, Err(ObjectError::WrongKind { .. })));
}
