//! Object ID types.
//!
//! Fixed-size, zero-heap storage for SHA-1 and SHA-256 object identifiers
//! with hex parsing and lowercase-hex display. IDs are opaque lookup keys;
//! nothing in this crate derives meaning from their bytes.
//!
//! # Ordering Semantics
//! `ObjectId` compares lexicographically on the truncated slice
//! (`bytes[0..len]`); only byte content and length matter, never the
//! format.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Object ID format determines ID byte length.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObjectFormat {
    /// SHA-1 object IDs (20 bytes).
    #[default]
    Sha1 = 1,
    /// SHA-256 object IDs (32 bytes).
    Sha256 = 2,
}

impl ObjectFormat {
    /// Returns the byte length for IDs in this format.
    #[inline]
    #[must_use]
    pub const fn id_len(self) -> u8 {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    /// Returns the hex string length for IDs in this format.
    #[inline]
    #[must_use]
    pub const fn hex_len(self) -> u8 {
        self.id_len() * 2
    }
}

/// Fixed-size storage for a SHA-1 or SHA-256 object ID.
///
/// The length discriminator is stored alongside the bytes so callers can
/// handle both formats without knowing the repository format in advance.
///
/// # Invariants
/// - `len` is always 20 or 32
/// - Only `bytes[0..len]` contains valid data
/// - `bytes[len..32]` is always zero-padded
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ObjectId {
    len: u8,
    bytes: [u8; 32],
}

impl ObjectId {
    /// SHA-1 ID length in bytes.
    pub const SHA1_LEN: u8 = 20;
    /// SHA-256 ID length in bytes.
    pub const SHA256_LEN: u8 = 32;

    /// Creates an `ObjectId` from raw SHA-1 bytes.
    #[inline]
    #[must_use]
    pub fn sha1(bytes: [u8; 20]) -> Self {
        let mut storage = [0u8; 32];
        storage[..20].copy_from_slice(&bytes);
        Self {
            len: 20,
            bytes: storage,
        }
    }

    /// Creates an `ObjectId` from raw SHA-256 bytes.
    #[inline]
    #[must_use]
    pub fn sha256(bytes: [u8; 32]) -> Self {
        Self { len: 32, bytes }
    }

    /// Creates an `ObjectId` from a raw byte slice, returning `None` for
    /// invalid lengths. Use this for untrusted input.
    #[must_use]
    pub fn try_from_slice(bytes: &[u8]) -> Option<Self> {
        match bytes.len() {
            20 => {
                let mut storage = [0u8; 32];
                storage[..20].copy_from_slice(bytes);
                Some(Self {
                    len: 20,
                    bytes: storage,
                })
            }
            32 => {
                let mut storage = [0u8; 32];
                storage.copy_from_slice(bytes);
                Some(Self {
                    len: 32,
                    bytes: storage,
                })
            }
            _ => None,
        }
    }

    /// Parses a lowercase or uppercase hex string into an `ObjectId`.
    ///
    /// Accepts exactly 40 hex digits (SHA-1) or 64 (SHA-256). Returns
    /// `None` for any other length or any non-hex byte.
    #[must_use]
    pub fn from_hex(hex: &[u8]) -> Option<Self> {
        let id_len = match hex.len() {
            40 => 20,
            64 => 32,
            _ => return None,
        };

        let mut storage = [0u8; 32];
        for i in 0..id_len {
            let hi = hex_digit(hex[i * 2])?;
            let lo = hex_digit(hex[i * 2 + 1])?;
            storage[i] = (hi << 4) | lo;
        }

        Some(Self {
            len: id_len as u8,
            bytes: storage,
        })
    }

    /// Returns the ID bytes as a slice of length 20 or 32.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        debug_assert!(
            self.len == Self::SHA1_LEN || self.len == Self::SHA256_LEN,
            "invalid ObjectId len: {}",
            self.len
        );
        &self.bytes[..self.len as usize]
    }

    /// Returns the length of the ID (20 or 32).
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u8 {
        self.len
    }

    /// Always `false` for valid instances; provided for slice-type API
    /// symmetry.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the object format for this ID.
    #[inline]
    #[must_use]
    pub const fn format(&self) -> ObjectFormat {
        if self.len == 20 {
            ObjectFormat::Sha1
        } else {
            ObjectFormat::Sha256
        }
    }

    /// Renders the ID as a lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }
}

/// Converts a hex ASCII byte to its numeric value.
#[inline]
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Lowercase hex, matching git's canonical rendering.
        for byte in self.as_slice() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl PartialEq for ObjectId {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for ObjectId {}

impl Hash for ObjectId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl PartialOrd for ObjectId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}
