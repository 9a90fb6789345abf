//! Remote manifest wire codec.
//!
//! The origin publishes the manifest as a packed little-endian payload,
//! XOR-masked byte-wise with the positional key
//! `k(i) = ((i % 0xFF) + 0x69) & 0xFF`. After demasking:
//!
//! ```text
//! padding:    16 bytes (reserved, zeroed on encode, ignored on decode)
//! num_files:  u32
//! repeated num_files times:
//!   path_len:   u32
//!   path:       path_len bytes (UTF-8)
//!   hash_len:   u32
//!   hash:       hash_len bytes (ASCII hex)
//!   last_mod:   i64
//! ```
//!
//! The mask is an involution and only discourages casual tampering; it is
//! not a security boundary.

use thiserror::Error;

use super::{FileEntry, Manifest};

/// Size of the reserved leading padding block.
const PADDING_LEN: usize = 16;

/// Errors produced while decoding the wire payload.
#[derive(Debug, Error)]
pub enum WireError {
    /// The payload ended before the layout was fully read.
    #[error("truncated payload: needed {needed} more bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// The declared entry count exceeds the configured sanity cap.
    #[error("declared file count {count} exceeds the cap of {cap}")]
    CountTooLarge { count: u32, cap: u32 },

    /// A path or hash field holds bytes that are not valid UTF-8.
    #[error("{field} at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str, offset: usize },
}

/// Apply (or strip) the positional XOR mask in place.
///
/// The same call masks and demasks.
pub fn mask(data: &mut [u8]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= ((i % 0xFF) as u8).wrapping_add(0x69);
    }
}

/// Decode a demasked wire payload.
///
/// `max_entries` bounds the declared count before any allocation happens;
/// entry storage is allocated exactly once from the declared count.
pub fn decode(data: &[u8], max_entries: u32) -> Result<Manifest, WireError> {
    let mut reader = Reader { data, pos: 0 };

    reader.take(PADDING_LEN)?; // reserved

    let count = reader.read_u32()?;
    if count > max_entries {
        return Err(WireError::CountTooLarge {
            count,
            cap: max_entries,
        });
    }

    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let path = reader.read_string("path")?;
        let hash = reader.read_string("hash")?;
        let last_modified = reader.read_i64()?;
        entries.push(FileEntry {
            path,
            hash,
            last_modified,
        });
    }

    Ok(Manifest { entries })
}

/// Encode a manifest into the demasked wire layout.
///
/// Callers publishing to an origin apply [`mask`] to the result.
pub fn encode(manifest: &Manifest) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&[0u8; PADDING_LEN]);
    out.extend_from_slice(&(manifest.entries.len() as u32).to_le_bytes());

    for entry in &manifest.entries {
        out.extend_from_slice(&(entry.path.len() as u32).to_le_bytes());
        out.extend_from_slice(entry.path.as_bytes());
        out.extend_from_slice(&(entry.hash.len() as u32).to_le_bytes());
        out.extend_from_slice(entry.hash.as_bytes());
        out.extend_from_slice(&entry.last_modified.to_le_bytes());
    }

    out
}

/// Positioned view over the payload.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let remaining = self.data.len() - self.pos;
        if remaining < n {
            return Err(WireError::Truncated {
                offset: self.pos,
                needed: n - remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, WireError> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_i64(&mut self) -> Result<i64, WireError> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(i64::from_le_bytes(bytes))
    }

    fn read_string(&mut self, field: &'static str) -> Result<String, WireError> {
        let len = self.read_u32()? as usize;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| WireError::InvalidUtf8 { field, offset })
    }
}
