//! Configuration for the patcher engine.

use std::path::PathBuf;
use std::time::Duration;

/// Default HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Default sanity cap on the declared remote manifest entry count.
const DEFAULT_MAX_MANIFEST_ENTRIES: u32 = 1_000_000;

/// Default per-file attempt cap; attempts beyond this mark the file as
/// exhausted and abort the following pool invocation.
const DEFAULT_ATTEMPT_CAP: u32 = 2;

/// Configuration for the patcher engine.
#[derive(Debug, Clone)]
pub struct PatcherConfig {
    /// Root of the installation tree.
    ///
    /// Typically the process working directory; every manifest path is
    /// resolved relative to it.
    pub install_dir: PathBuf,

    /// Base URLs of candidate content origins, probed in order.
    pub origin_bases: Vec<String>,

    /// Filename of the manifest, both remote and local (`version.bin`).
    pub manifest_name: String,

    /// Worker count override; defaults to the logical CPU count.
    pub workers: Option<usize>,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Upper bound accepted for the remote manifest's declared entry count.
    pub max_manifest_entries: u32,

    /// Failed attempts tolerated per file before it is flagged exhausted.
    pub attempt_cap: u32,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from("."),
            origin_bases: Vec::new(),
            manifest_name: "version.bin".to_string(),
            workers: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_manifest_entries: DEFAULT_MAX_MANIFEST_ENTRIES,
            attempt_cap: DEFAULT_ATTEMPT_CAP,
        }
    }
}

impl PatcherConfig {
    /// Create a configuration rooted at the given install directory.
    pub fn new(install_dir: PathBuf) -> Self {
        Self {
            install_dir,
            ..Default::default()
        }
    }

    /// Add an origin base URL to probe.
    pub fn with_origin(mut self, base: impl Into<String>) -> Self {
        self.origin_bases.push(base.into());
        self
    }

    /// Override the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the manifest entry sanity cap.
    pub fn with_max_manifest_entries(mut self, cap: u32) -> Self {
        self.max_manifest_entries = cap;
        self
    }

    /// Set the per-file attempt cap.
    pub fn with_attempt_cap(mut self, cap: u32) -> Self {
        self.attempt_cap = cap;
        self
    }

    /// Effective worker count: the override, or the logical CPU count.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }
}
