//! Manifest model and codecs.
//!
//! A manifest is the authoritative catalog of files composing an
//! installation: relative path, BLAKE2b-256 content hash, and modification
//! timestamp. Two on-disk representations exist:
//!
//! - the remote wire format (`wire`): an XOR-masked packed binary payload
//!   published by the content origin, and
//! - the local persistent format (`local`): a self-describing CBOR encoding
//!   written to `version.bin` in the install root.
//!
//! Both codecs are pure and may run in parallel over independent buffers.
//! The mutable, persisted manifest is owned by [`store::ManifestStore`].

pub mod local;
pub mod store;
pub mod wire;

use serde::{Deserialize, Serialize};

/// One installable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the install root. May contain backslashes on the
    /// wire; URL and filesystem addressing normalize them to `/`.
    pub path: String,

    /// Lowercase hex BLAKE2b-256 digest of the plaintext file contents.
    pub hash: String,

    /// Seconds since the UNIX epoch, applied to the file after install.
    pub last_modified: i64,
}

impl FileEntry {
    /// Path with backslashes normalized to forward slashes, as used both in
    /// download URLs and for addressing the install tree.
    pub fn normalized_path(&self) -> String {
        self.path.replace('\\', "/")
    }

    /// Location of this entry within an install tree.
    pub fn fs_path(&self, root: &std::path::Path) -> std::path::PathBuf {
        root.join(self.normalized_path())
    }
}

/// An ordered sequence of file entries.
///
/// The 32-bit count and 16-byte reserved padding of the wire layout are a
/// codec concern; in memory the count is always `entries.len()`. Entry order
/// carries no meaning (the store swap-removes), but the codecs preserve it
/// for stability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<FileEntry>,
}

impl Manifest {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Linear scan for the first entry with the given path.
    pub fn find(&self, path: &str) -> Option<(usize, &FileEntry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, e)| e.path == path)
    }
}
