//! High-level synchronization orchestrator.
//!
//! `Patcher` owns every piece of run-scoped state (configuration, HTTP
//! client, manifest store, progress sink, download pool) and runs the
//! reconciliation loop to completion:
//!
//! ```text
//! probe origins → fetch remote manifest → diff (or verify when the local
//! manifest is missing) → download pool → verify → … until quiescent
//! ```

use std::sync::{Arc, Mutex};

use reqwest::blocking::Client;
use tracing::info;

use crate::config::PatcherConfig;
use crate::diff;
use crate::download::DownloadPool;
use crate::error::{PatcherError, PatcherResult};
use crate::manifest::store::ManifestStore;
use crate::origin::{self, OriginProbe};
use crate::progress::{NoopSink, ProgressSink};
use crate::verify;

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSummary {
    /// Transfers handed to the pool across all passes.
    pub transfers: usize,
    /// Download passes executed before the tree went quiescent.
    pub passes: usize,
}

/// The synchronization engine.
pub struct Patcher {
    config: PatcherConfig,
    client: Client,
    progress: Arc<dyn ProgressSink>,
}

impl Patcher {
    /// Create a patcher with a silent progress sink.
    pub fn new(config: PatcherConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            config,
            client,
            progress: Arc::new(NoopSink),
        }
    }

    /// Attach a progress sink (e.g. a terminal multi-bar renderer).
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Reconcile the install tree against the remote manifest.
    ///
    /// Runs to quiescence: after every batch of downloads the verifier
    /// re-hashes the tree, and the loop repeats until nothing is scheduled.
    ///
    /// # Errors
    ///
    /// Fatal conditions abort the run: no healthy origin, an unfetchable or
    /// malformed remote manifest, a manifest persist failure, or a file
    /// exceeding its attempt cap.
    pub fn run(&self) -> PatcherResult<PatchSummary> {
        let origins = OriginProbe::new(&self.client).probe(&self.config)?;
        let origin_base = origins[0].clone();

        let remote = origin::fetch_remote_manifest(&self.client, &origin_base, &self.config)?;

        let install_dir = self.config.install_dir.clone();
        let mut store;
        let mut to_download;
        match ManifestStore::load(&install_dir, &self.config.manifest_name) {
            Ok(loaded) => {
                info!("diffing local manifest against remote");
                store = loaded;
                to_download = diff::compute(&remote, &mut store, &install_dir);
            }
            Err(PatcherError::LocalManifestMissing { .. }) => {
                info!("no usable local manifest, verifying installation tree");
                store = ManifestStore::create(&install_dir, &self.config.manifest_name);
                to_download = verify::run(&remote, &mut store, &install_dir)?;
            }
            Err(e) => return Err(e),
        }

        info!(
            local = store.len(),
            remote = remote.len(),
            "fetched version information"
        );

        let store = Arc::new(Mutex::new(store));
        let pool = DownloadPool::new(
            &self.config,
            self.client.clone(),
            origin_base,
            Arc::clone(&store),
            Arc::clone(&self.progress),
        );

        let mut summary = PatchSummary {
            transfers: 0,
            passes: 0,
        };

        if to_download.is_empty() {
            info!("no files need updating");
        }
        while !to_download.is_empty() {
            info!(count = to_download.len(), "files need updating");
            summary.transfers += to_download.len();
            summary.passes += 1;

            pool.run(&to_download)?;

            // Re-hash to confirm quiescence; anything still off re-enters
            // the set and the pool runs again.
            let mut guard = store.lock().unwrap();
            to_download = verify::run(&remote, &mut guard, &install_dir)?;
        }

        Ok(summary)
    }
}
