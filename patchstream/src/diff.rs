//! Diff engine: decides which files need downloading without re-hashing.
//!
//! The cheap path. For every remote entry the cached local entry, the live
//! file's mode, and its mtime are consulted; only the verifier ever touches
//! file contents. Any local modification invalidates the cached hash, so a
//! mtime mismatch evicts the entry and schedules a fresh download.

use std::fs::File;
use std::path::Path;

use tracing::debug;

use crate::fsutil;
use crate::manifest::store::ManifestStore;
use crate::manifest::{FileEntry, Manifest};

/// Compute the download set for `remote` against the store and the live
/// filesystem rooted at `install_dir`.
///
/// Entries superseded by a scheduled download are swap-removed from the
/// store in place; read-only ("custom") files are skipped entirely and keep
/// their entries.
pub fn compute(
    remote: &Manifest,
    store: &mut ManifestStore,
    install_dir: &Path,
) -> Vec<FileEntry> {
    let mut to_download = Vec::new();

    for entry in &remote.entries {
        let cached = store
            .find(&entry.path)
            .map(|(i, l)| (i, l.hash.clone(), l.last_modified));

        let (index, cached_hash, cached_mtime) = match cached {
            Some(c) => c,
            None => {
                debug!(path = %entry.path, "no local entry, scheduling download");
                to_download.push(entry.clone());
                continue;
            }
        };

        let meta = match File::open(entry.fs_path(install_dir)).and_then(|f| f.metadata()) {
            Ok(meta) => meta,
            Err(_) => {
                // Unopenable counts as absent; the cached entry stays until
                // the fresh download replaces it.
                debug!(path = %entry.path, "file unopenable, scheduling download");
                to_download.push(entry.clone());
                continue;
            }
        };

        if fsutil::is_custom(&meta) {
            debug!(path = %entry.path, "file is custom (read-only), skipping");
            continue;
        }

        if fsutil::mtime_seconds(&meta) != cached_mtime {
            debug!(
                path = %entry.path,
                cached = cached_mtime,
                on_disk = fsutil::mtime_seconds(&meta),
                "modification time differs, scheduling download"
            );
            store.remove_at(index);
            to_download.push(entry.clone());
        } else if cached_hash != entry.hash {
            debug!(path = %entry.path, "cached hash differs from remote, scheduling download");
            store.remove_at(index);
            to_download.push(entry.clone());
        }
    }

    to_download
}
