//! Persistent local manifest store.
//!
//! Owns the mutable in-memory manifest and writes it back to `version.bin`
//! after every meaningful mutation. Workers share the store behind a mutex;
//! one `append` + `save` pair forms a single critical section.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{local, FileEntry, Manifest};
use crate::error::{PatcherError, PatcherResult};

/// The local manifest and its backing file.
#[derive(Debug)]
pub struct ManifestStore {
    manifest: Manifest,
    path: PathBuf,
}

impl ManifestStore {
    /// Create an empty store backed by `<install_dir>/<manifest_name>`.
    ///
    /// Nothing is written until the first mutation.
    pub fn create(install_dir: &Path, manifest_name: &str) -> Self {
        Self {
            manifest: Manifest::default(),
            path: install_dir.join(manifest_name),
        }
    }

    /// Load the persisted manifest.
    ///
    /// Any failure to read or decode maps to
    /// [`PatcherError::LocalManifestMissing`]; the caller recovers by
    /// rebuilding through the verifier.
    pub fn load(install_dir: &Path, manifest_name: &str) -> PatcherResult<Self> {
        let path = install_dir.join(manifest_name);
        let data = fs::read(&path).map_err(|_| PatcherError::LocalManifestMissing {
            path: path.clone(),
        })?;
        let manifest = local::decode(&data).map_err(|e| {
            debug!(error = %e, path = %path.display(), "local manifest undecodable");
            PatcherError::LocalManifestMissing { path: path.clone() }
        })?;

        Ok(Self { manifest, path })
    }

    /// The entries currently held.
    pub fn entries(&self) -> &[FileEntry] {
        &self.manifest.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.manifest.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.manifest.is_empty()
    }

    /// Linear scan for the first entry with the given path.
    pub fn find(&self, path: &str) -> Option<(usize, &FileEntry)> {
        self.manifest.find(path)
    }

    /// Push an entry and persist.
    pub fn append(&mut self, entry: FileEntry) -> PatcherResult<()> {
        self.manifest.entries.push(entry);
        self.save()
    }

    /// Swap-remove the entry at `i`.
    ///
    /// Entry order is not preserved; the manifest is a set, and no consumer
    /// may rely on ordering.
    pub fn remove_at(&mut self, i: usize) -> FileEntry {
        self.manifest.entries.swap_remove(i)
    }

    /// Replace the whole manifest and persist.
    pub fn replace(&mut self, manifest: Manifest) -> PatcherResult<()> {
        self.manifest = manifest;
        self.save()
    }

    /// Atomically persist the manifest.
    ///
    /// Writes to a sibling temp file and renames over the target, so a crash
    /// mid-write leaves the previous snapshot intact and a shrink never
    /// leaves stale trailing bytes.
    pub fn save(&self) -> PatcherResult<()> {
        let encoded = local::encode(&self.manifest).map_err(|e| PatcherError::Persist {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let tmp = self.path.with_extension("bin.tmp");
        fs::write(&tmp, &encoded).map_err(|e| PatcherError::Persist {
            path: tmp.clone(),
            reason: e.to_string(),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| PatcherError::Persist {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}
