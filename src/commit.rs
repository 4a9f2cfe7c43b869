//! Parser for git commit objects.
//!
//! Parses a decompressed commit payload (no `"commit <size>\0"` header)
//! into a [`CommitRecord`]: tree ID, parent IDs, author and committer
//! signatures, and the message.
//!
//! # Commit Object Format
//! ```text
//! tree <hex-id>\n
//! parent <hex-id>\n          (zero or more)
//! author <name> <email> <timestamp> <tz>\n
//! committer <name> <email> <timestamp> <tz>\n
//! [other headers]\n          (gpgsig etc., continuation lines start with SP)
//! \n
//! <message>
//! ```
//!
//! # Parsing Assumptions
//! - Headers appear in the standard order: `tree`, zero or more `parent`,
//!   `author`, `committer`. Headers after `committer` (`gpgsig`,
//!   `encoding`, ...) are skipped, including their continuation lines.
//! - Signature lines end with `"<timestamp> <timezone>"`; the parser scans
//!   backwards for the last two fields to tolerate spaces in names.
//! - The message is everything after the first blank line, as UTF-8 with
//!   invalid sequences replaced.

use memchr::memchr;

use crate::errors::ObjectError;
use crate::object_id::{ObjectFormat, ObjectId};

/// Author or committer identity with timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Display name, trimmed.
    pub name: String,
    /// Email address without the angle brackets.
    pub email: String,
    /// Unix timestamp in seconds.
    pub seconds: i64,
    /// Timezone offset in minutes east of UTC.
    pub tz_offset_minutes: i32,
}

/// A parsed commit.
///
/// Immutable once parsed; parent order is preserved from the object bytes
/// and trusted for graph walks.
#[derive(Debug, Clone)]
pub struct CommitRecord {
    /// The commit's own object ID.
    pub id: ObjectId,
    /// Root tree of the snapshot this commit records.
    pub tree: ObjectId,
    /// Parent commit IDs (empty for root commits).
    pub parents: Vec<ObjectId>,
    /// Author signature.
    pub author: Signature,
    /// Committer signature.
    pub committer: Signature,
    /// Commit message (everything after the header block).
    pub message: String,
}

/// Parses a commit payload.
///
/// `id` is the commit's own object ID, carried through so callers get a
/// self-contained record.
///
/// # Errors
/// Returns `ObjectError::Corrupt` if the payload deviates from the header
/// layout above.
pub fn parse_commit(
    id: ObjectId,
    data: &[u8],
    format: ObjectFormat,
) -> Result<CommitRecord, ObjectError> {
    let hex_len = format.hex_len() as usize;
    let mut pos = 0;

    let tree = parse_id_line(data, &mut pos, b"tree ", hex_len)?;

    let mut parents = Vec::new();
    while data[pos..].starts_with(b"parent ") {
        parents.push(parse_id_line(data, &mut pos, b"parent ", hex_len)?);
    }

    let author = parse_signature_line(data, &mut pos, b"author ")?;
    let committer = parse_signature_line(data, &mut pos, b"committer ")?;

    let message = parse_message(data, pos)?;

    Ok(CommitRecord {
        id,
        tree,
        parents,
        author,
        committer,
        message,
    })
}

/// Parses a `"<prefix><hex-id>\n"` line and advances `pos` past it.
fn parse_id_line(
    data: &[u8],
    pos: &mut usize,
    prefix: &[u8],
    hex_len: usize,
) -> Result<ObjectId, ObjectError> {
    if !data[*pos..].starts_with(prefix) {
        return Err(ObjectError::corrupt("missing expected header line"));
    }
    *pos += prefix.len();

    // Need hex_len bytes + newline.
    if data.len() < *pos + hex_len + 1 {
        return Err(ObjectError::corrupt("header line too short"));
    }

    let hex = &data[*pos..*pos + hex_len];
    let id = ObjectId::from_hex(hex).ok_or(ObjectError::corrupt("invalid hex object ID"))?;
    *pos += hex_len;

    if data[*pos] != b'\n' {
        return Err(ObjectError::corrupt("header line missing newline"));
    }
    *pos += 1;

    Ok(id)
}

/// Parses an `"<prefix><name> <email> <timestamp> <tz>\n"` line.
fn parse_signature_line(
    data: &[u8],
    pos: &mut usize,
    prefix: &[u8],
) -> Result<Signature, ObjectError> {
    if !data[*pos..].starts_with(prefix) {
        return Err(ObjectError::corrupt("missing signature line"));
    }

    let remaining = &data[*pos..];
    let newline = memchr(b'\n', remaining)
        .ok_or(ObjectError::corrupt("signature line missing newline"))?;
    let line = &remaining[prefix.len()..newline];
    *pos += newline + 1;

    parse_signature(line)
}

/// Parses `"<name> <email> <timestamp> <tz>"`.
///
/// The timestamp and timezone are the last two space-separated fields;
/// scanning backwards tolerates spaces inside names and emails.
fn parse_signature(line: &[u8]) -> Result<Signature, ObjectError> {
    let last_space = line
        .iter()
        .rposition(|&b| b == b' ')
        .ok_or(ObjectError::corrupt("signature missing timezone"))?;
    let ts_start = line[..last_space]
        .iter()
        .rposition(|&b| b == b' ')
        .ok_or(ObjectError::corrupt("signature missing timestamp"))?
        + 1;

    let seconds = parse_seconds(&line[ts_start..last_space])?;
    let tz_offset_minutes = parse_tz_offset(&line[last_space + 1..])?;

    // Identity is "<name> <email-in-angle-brackets>" before the timestamp.
    let identity = &line[..ts_start.saturating_sub(1)];
    let (name, email) = split_identity(identity)?;

    Ok(Signature {
        name,
        email,
        seconds,
        tz_offset_minutes,
    })
}

/// Splits `"Name <email>"` into its parts.
fn split_identity(identity: &[u8]) -> Result<(String, String), ObjectError> {
    let open = memchr(b'<', identity).ok_or(ObjectError::corrupt("signature missing email"))?;
    let close = memchr(b'>', &identity[open..])
        .ok_or(ObjectError::corrupt("signature email unterminated"))?
        + open;

    let name = String::from_utf8_lossy(&identity[..open]).trim().to_string();
    let email = String::from_utf8_lossy(&identity[open + 1..close]).to_string();
    Ok((name, email))
}

/// Parses a decimal Unix timestamp, ASCII digits only.
fn parse_seconds(bytes: &[u8]) -> Result<i64, ObjectError> {
    if bytes.is_empty() {
        return Err(ObjectError::corrupt("empty timestamp"));
    }
    let mut value: i64 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return Err(ObjectError::corrupt("non-digit in timestamp"));
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(b - b'0')))
            .ok_or(ObjectError::corrupt("timestamp overflow"))?;
    }
    Ok(value)
}

/// Parses a `±HHMM` timezone token into minutes east of UTC.
fn parse_tz_offset(bytes: &[u8]) -> Result<i32, ObjectError> {
    if bytes.len() != 5 {
        return Err(ObjectError::corrupt("timezone token must be 5 bytes"));
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(ObjectError::corrupt("timezone missing sign")),
    };
    if !bytes[1..].iter().all(u8::is_ascii_digit) {
        return Err(ObjectError::corrupt("non-digit in timezone"));
    }
    let hours = i32::from(bytes[1] - b'0') * 10 + i32::from(bytes[2] - b'0');
    let minutes = i32::from(bytes[3] - b'0') * 10 + i32::from(bytes[4] - b'0');
    Ok(sign * (hours * 60 + minutes))
}

/// Skips any remaining headers (with their continuation lines) and returns
/// the message after the blank separator line.
fn parse_message(data: &[u8], mut pos: usize) -> Result<String, ObjectError> {
    while pos < data.len() {
        if data[pos] == b'\n' {
            // Blank line: message starts after it.
            return Ok(String::from_utf8_lossy(&data[pos + 1..]).into_owned());
        }
        // Skip this header line (gpgsig continuation lines included).
        match memchr(b'\n', &data[pos..]) {
            Some(nl) => pos += nl + 1,
            None => return Err(ObjectError::corrupt("unterminated header block")),
        }
    }
    // No blank line at all: empty message (tolerated, some tools emit it).
    Ok(String::new())
}
