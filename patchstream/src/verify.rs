//! Verifier: rebuilds the local manifest from the filesystem.
//!
//! Runs when no trusted local manifest exists and again after every batch of
//! downloads to confirm quiescence. The filesystem is the source of truth
//! here: every remote entry is re-hashed, a fresh manifest is assembled, and
//! the store's contents are replaced wholesale so later runs can take the
//! cheap diff path.

use std::fs::File;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::PatcherResult;
use crate::fsutil;
use crate::hash;
use crate::manifest::store::ManifestStore;
use crate::manifest::{FileEntry, Manifest};

/// Hash the install tree against `remote`, replace the store's manifest
/// with the rebuilt one, and return the files still needing download.
pub fn run(
    remote: &Manifest,
    store: &mut ManifestStore,
    install_dir: &Path,
) -> PatcherResult<Vec<FileEntry>> {
    let mut rebuilt = Manifest::default();
    let mut to_download = Vec::new();

    for entry in &remote.entries {
        let full = entry.fs_path(install_dir);

        let file = match File::open(&full) {
            Ok(f) => f,
            Err(_) => {
                debug!(path = %entry.path, "missing, scheduling download");
                to_download.push(entry.clone());
                continue;
            }
        };

        let meta = file.metadata().ok();

        let mut reader = file;
        let computed = match hash::hash_reader(&mut reader) {
            Ok(h) => h,
            Err(e) => {
                warn!(path = %entry.path, error = %e, "unhashable, scheduling download");
                to_download.push(entry.clone());
                continue;
            }
        };

        rebuilt.entries.push(FileEntry {
            path: entry.path.clone(),
            hash: computed.clone(),
            last_modified: entry.last_modified,
        });

        if meta.as_ref().is_some_and(fsutil::is_custom) {
            debug!(path = %entry.path, "custom (read-only), leaving untouched");
            continue;
        }

        if computed != entry.hash {
            debug!(path = %entry.path, "hash mismatch, scheduling download");
            to_download.push(entry.clone());
            continue;
        }

        if let Err(e) = fsutil::set_entry_times(&full, entry.last_modified) {
            warn!(path = %entry.path, error = %e, "could not apply manifest times");
        }
    }

    store.replace(rebuilt)?;
    Ok(to_download)
}
