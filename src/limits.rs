//! Bounded-read limits for repository file access.
//!
//! Every file this crate reads is capped before the read happens, so a
//! corrupt or hostile repository cannot trigger unbounded allocation.

/// Size caps for repository reads.
///
/// The defaults are generous for real repositories; tighten them when
/// scanning untrusted input.
#[derive(Debug, Clone, Copy)]
pub struct ReadLimits {
    /// Maximum bytes to read from the HEAD file.
    pub max_head_bytes: u32,
    /// Maximum bytes to read from a loose ref file.
    pub max_ref_bytes: u32,
    /// Maximum decompressed object payload size in bytes.
    pub max_object_bytes: u64,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            // HEAD and ref files hold one line; 4 KiB absorbs trailing noise.
            max_head_bytes: 4 * 1024,
            max_ref_bytes: 4 * 1024,
            max_object_bytes: 64 * 1024 * 1024, // 64 MiB
        }
    }
}
