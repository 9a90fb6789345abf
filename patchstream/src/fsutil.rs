//! Filesystem attribute helpers shared by the diff and verify passes.

use std::fs::Metadata;
use std::io;
use std::path::Path;

use filetime::FileTime;

/// Whether a file is user-protected ("custom").
///
/// A custom file carries no write bits at all; the patcher never hashes,
/// overwrites, or schedules it.
pub fn is_custom(meta: &Metadata) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o222 == 0
    }
    #[cfg(not(unix))]
    {
        meta.permissions().readonly()
    }
}

/// Modification time in whole seconds since the UNIX epoch.
pub fn mtime_seconds(meta: &Metadata) -> i64 {
    FileTime::from_last_modification_time(meta).unix_seconds()
}

/// Set both access and modification time to `secs` since the UNIX epoch.
pub fn set_entry_times(path: &Path, secs: i64) -> io::Result<()> {
    let t = FileTime::from_unix_time(secs, 0);
    filetime::set_file_times(path, t, t)
}
