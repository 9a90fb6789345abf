//! Error types for the patcher engine.

use std::io;
use std::path::PathBuf;

use crate::manifest::wire::WireError;

/// Result type for patcher operations.
pub type PatcherResult<T> = Result<T, PatcherError>;

/// Errors that can occur while synchronizing an installation.
#[derive(Debug)]
pub enum PatcherError {
    /// No configured origin answered the health probe.
    NoOriginsAvailable,

    /// The remote manifest could not be fetched.
    ManifestFetch { url: String, reason: String },

    /// The remote manifest payload does not conform to the wire layout.
    ManifestFormat(WireError),

    /// The local manifest is absent or unreadable.
    ///
    /// Recoverable: the caller falls back to a full verification pass that
    /// rebuilds the manifest from the filesystem.
    LocalManifestMissing { path: PathBuf },

    /// A single transfer attempt failed.
    Download { url: String, reason: String },

    /// One or more files exceeded the per-file attempt cap in a previous
    /// pool invocation.
    DownloadExhausted { paths: Vec<String> },

    /// The local manifest could not be persisted.
    Persist { path: PathBuf, reason: String },

    /// A filesystem operation on an install-tree file failed.
    Io { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for PatcherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoOriginsAvailable => {
                write!(f, "there are no download servers online")
            }
            Self::ManifestFetch { url, reason } => {
                write!(f, "failed to fetch remote manifest from {}: {}", url, reason)
            }
            Self::ManifestFormat(source) => {
                write!(f, "malformed remote manifest: {}", source)
            }
            Self::LocalManifestMissing { path } => {
                write!(
                    f,
                    "local manifest {} is missing or unreadable",
                    path.display()
                )
            }
            Self::Download { url, reason } => {
                write!(f, "failed to download {}: {}", url, reason)
            }
            Self::DownloadExhausted { paths } => {
                write!(
                    f,
                    "too many download attempts for {} file(s) ({}); restart the patcher and contact support if the error persists",
                    paths.len(),
                    paths.join(", ")
                )
            }
            Self::Persist { path, reason } => {
                write!(f, "failed to persist {}: {}", path.display(), reason)
            }
            Self::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for PatcherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ManifestFormat(source) => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<WireError> for PatcherError {
    fn from(e: WireError) -> Self {
        Self::ManifestFormat(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_origins_display() {
        let err = PatcherError::NoOriginsAvailable;
        assert_eq!(err.to_string(), "there are no download servers online");
    }

    #[test]
    fn test_exhausted_display_lists_paths() {
        let err = PatcherError::DownloadExhausted {
            paths: vec!["a.dat".to_string(), "b/c.dat".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 file(s)"));
        assert!(msg.contains("a.dat, b/c.dat"));
        assert!(msg.contains("contact support"));
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;

        let err = PatcherError::Io {
            path: PathBuf::from("x"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
    }
}
