//! Single-attempt file transfer: resumable range GET, progress tap,
//! streaming decompression, and timestamp application.
//!
//! Payloads are served compressed in the Snappy frame format. Each attempt
//! downloads into `<path>.tmp`, then streams the tmp through the frame
//! decoder into the destination created fresh. Resume appends onto the tmp
//! without revalidating the prefix; the verifier's re-hash pass is the
//! authoritative integrity gate.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use snap::read::FrameDecoder;
use tracing::{info, warn};

use crate::error::{PatcherError, PatcherResult};
use crate::fsutil;
use crate::manifest::FileEntry;
use crate::progress::{ProgressHandle, ProgressSink};

/// Removes the bar on every exit path, success or abort.
struct BarGuard(Box<dyn ProgressHandle>);

impl Drop for BarGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Perform one download attempt for `entry`.
///
/// With `force` set, any partial `<path>.tmp` is discarded and the transfer
/// restarts from byte zero; otherwise an existing tmp is resumed with a
/// `Range` request.
pub(crate) fn fetch_one(
    client: &Client,
    progress: &dyn ProgressSink,
    entry: &FileEntry,
    url: &str,
    install_dir: &Path,
    force: bool,
) -> PatcherResult<()> {
    let dest = entry.fs_path(install_dir);
    let tmp = tmp_path(&dest);

    if !tmp.exists() {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| PatcherError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let resuming = !force && tmp.exists();
    let (file, start) = if resuming {
        let len = fs::metadata(&tmp)
            .map_err(|e| io_err(&tmp, e))?
            .len();
        let file = OpenOptions::new()
            .append(true)
            .open(&tmp)
            .map_err(|e| io_err(&tmp, e))?;
        (file, len)
    } else {
        let file = File::create(&tmp).map_err(|e| io_err(&tmp, e))?;
        (file, 0)
    };

    let mut request = client.get(url);
    if resuming {
        info!(path = %entry.path, resume_from = start, "resuming transfer");
        request = request.header(reqwest::header::RANGE, format!("bytes={}-", start));
    }

    let resp = request.send().map_err(|e| PatcherError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    // 200 for a full body, 206 when the Range was honored.
    if !resp.status().is_success() {
        return Err(PatcherError::Download {
            url: url.to_string(),
            reason: format!("HTTP {}", resp.status()),
        });
    }

    let total = start + resp.content_length().unwrap_or(0);
    let bar = BarGuard(progress.add_bar(&entry.path, total));
    if start > 0 {
        bar.0.inc(start);
    }

    let mut tap = bar.0.wrap_read(Box::new(resp));
    let mut writer = BufWriter::new(file);
    let received = io::copy(&mut tap, &mut writer).map_err(|e| PatcherError::Download {
        url: url.to_string(),
        reason: format!("read error: {}", e),
    })?;
    writer.flush().map_err(|e| io_err(&tmp, e))?;
    drop(writer);

    if received == 0 && start == 0 {
        return Err(PatcherError::Download {
            url: url.to_string(),
            reason: "empty response body".to_string(),
        });
    }

    decompress(&tmp, &dest, url)?;
    fs::remove_file(&tmp).ok();

    if let Err(e) = fsutil::set_entry_times(&dest, entry.last_modified) {
        warn!(path = %entry.path, error = %e, "could not apply manifest times");
    }

    Ok(())
}

/// Stream the completed tmp through the Snappy frame decoder into a freshly
/// created destination.
fn decompress(tmp: &Path, dest: &Path, url: &str) -> PatcherResult<()> {
    let compressed = File::open(tmp).map_err(|e| io_err(tmp, e))?;
    let plain = File::create(dest).map_err(|e| io_err(dest, e))?;

    let mut decoder = FrameDecoder::new(BufReader::new(compressed));
    let mut writer = BufWriter::new(plain);
    io::copy(&mut decoder, &mut writer).map_err(|e| PatcherError::Download {
        url: url.to_string(),
        reason: format!("decompression failed: {}", e),
    })?;
    writer.flush().map_err(|e| io_err(dest, e))
}

/// `<path>.tmp` alongside the destination.
fn tmp_path(dest: &Path) -> PathBuf {
    let mut os = dest.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

fn io_err(path: &Path, source: io::Error) -> PatcherError {
    PatcherError::Io {
        path: path.to_path_buf(),
        source,
    }
}
