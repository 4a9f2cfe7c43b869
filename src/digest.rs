//! Streaming digest computation for blob comparison.
//!
//! Hashes an arbitrary byte source, optionally prefixed with a header fed
//! to the hasher before any stream bytes, and produces a lowercase hex
//! digest. This mirrors git's object hashing convention: a blob stored
//! under ID `H` satisfies `H = sha1("blob <size>\0" ++ content)`, so
//! callers comparing a working-copy file against a stored blob pass
//! [`blob_header`] as the prefix.
//!
//! The source is consumed fully before a digest is produced. If the source
//! errors mid-stream the partial hasher state is discarded and
//! `DigestError::Stream` is returned; no partial digest is ever exposed.

use std::io::{self, Read};

use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::errors::DigestError;
use crate::object_id::ObjectFormat;

/// Read chunk size for streaming sources.
const CHUNK_BYTES: usize = 8 * 1024;

/// Digest algorithm selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgo {
    /// SHA-1, git's historical object hash.
    Sha1,
    /// SHA-256, used by repositories with the sha256 object format.
    Sha256,
}

impl HashAlgo {
    /// Returns the algorithm matching a repository object format.
    #[inline]
    #[must_use]
    pub const fn for_format(format: ObjectFormat) -> Self {
        match format {
            ObjectFormat::Sha1 => Self::Sha1,
            ObjectFormat::Sha256 => Self::Sha256,
        }
    }
}

/// Builds git's blob object header, `"blob <size>\0"`.
#[must_use]
pub fn blob_header(size: u64) -> Vec<u8> {
    let mut header = Vec::with_capacity(24);
    header.extend_from_slice(b"blob ");
    header.extend_from_slice(size.to_string().as_bytes());
    header.push(0);
    header
}

/// Hashes `prefix ++ reader bytes` and returns the lowercase hex digest.
///
/// The reader is drained to EOF in fixed-size chunks, preserving stream
/// order. Pass `None` for `prefix` to hash the stream bytes alone.
///
/// # Errors
/// Returns `DigestError::Stream` if the reader fails before EOF.
pub fn hash_reader<R: Read>(
    algo: HashAlgo,
    reader: R,
    prefix: Option<&[u8]>,
) -> Result<String, DigestError> {
    match algo {
        HashAlgo::Sha1 => hash_with(Sha1::new(), reader, prefix),
        HashAlgo::Sha256 => hash_with(Sha256::new(), reader, prefix),
    }
}

fn hash_with<D: Digest, R: Read>(
    mut hasher: D,
    mut reader: R,
    prefix: Option<&[u8]>,
) -> Result<String, DigestError> {
    if let Some(prefix) = prefix {
        hasher.update(prefix);
    }

    let mut buf = [0u8; CHUNK_BYTES];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => hasher.update(&buf[..read]),
            // Interrupted reads are retried, matching `read_to_end`.
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(DigestError::Stream(err)),
        }
    }

    Ok(hex::encode(hasher.finalize()))
}
