//! Bounded worker pool executing the download set.
//!
//! Jobs go onto a bounded channel sized to the set; the sender is dropped
//! once everything is enqueued and workers drain until disconnect. Each
//! worker owns its retry loop: a failed attempt forces the next one to
//! restart from byte zero, and a file that fails more than the attempt cap
//! is recorded in a sticky exhausted set that aborts the *next* pool
//! invocation with a structured error.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::Receiver;
use reqwest::blocking::Client;
use tracing::{error, info, warn};

use super::transfer;
use crate::config::PatcherConfig;
use crate::error::{PatcherError, PatcherResult};
use crate::manifest::store::ManifestStore;
use crate::manifest::FileEntry;
use crate::progress::ProgressSink;

/// Fixed-size pool of download workers.
pub struct DownloadPool {
    workers: usize,
    ctx: WorkerContext,
}

/// Everything a worker thread needs, cloned per thread.
#[derive(Clone)]
struct WorkerContext {
    client: Client,
    origin: String,
    install_dir: PathBuf,
    attempt_cap: u32,
    store: Arc<Mutex<ManifestStore>>,
    progress: Arc<dyn ProgressSink>,
    exhausted: Arc<Mutex<Vec<String>>>,
    fatal: Arc<Mutex<Option<PatcherError>>>,
    aborted: Arc<AtomicBool>,
}

impl DownloadPool {
    /// Create a pool bound to one origin, a shared manifest store, and a
    /// progress sink.
    pub fn new(
        config: &PatcherConfig,
        client: Client,
        origin: String,
        store: Arc<Mutex<ManifestStore>>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            workers: config.effective_workers(),
            ctx: WorkerContext {
                client,
                origin,
                install_dir: config.install_dir.clone(),
                attempt_cap: config.attempt_cap,
                store,
                progress,
                exhausted: Arc::new(Mutex::new(Vec::new())),
                fatal: Arc::new(Mutex::new(None)),
                aborted: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Paths that exceeded the attempt cap in earlier invocations.
    pub fn exhausted_paths(&self) -> Vec<String> {
        self.ctx.exhausted.lock().unwrap().clone()
    }

    /// Execute one batch of download jobs.
    ///
    /// Aborts up front with [`PatcherError::DownloadExhausted`] when a
    /// previous invocation gave up on any file; otherwise all jobs are
    /// processed even if some of them exhaust their attempts during this
    /// batch. Persist failures inside workers are fatal and surface here.
    pub fn run(&self, jobs: &[FileEntry]) -> PatcherResult<()> {
        {
            let exhausted = self.ctx.exhausted.lock().unwrap();
            if !exhausted.is_empty() {
                return Err(PatcherError::DownloadExhausted {
                    paths: exhausted.clone(),
                });
            }
        }

        if jobs.is_empty() {
            return Ok(());
        }

        info!(files = jobs.len(), workers = self.workers, "starting download pool");

        let (tx, rx) = crossbeam_channel::bounded::<FileEntry>(jobs.len());

        let handles: Vec<_> = (0..self.workers)
            .map(|_| {
                let rx = rx.clone();
                let ctx = self.ctx.clone();
                thread::spawn(move || worker_loop(rx, ctx))
            })
            .collect();
        drop(rx);

        for job in jobs {
            if tx.send(job.clone()).is_err() {
                break;
            }
        }
        drop(tx); // closes the channel; workers exit once drained

        for handle in handles {
            handle.join().ok();
        }
        self.ctx.progress.wait();

        if let Some(e) = self.ctx.fatal.lock().unwrap().take() {
            return Err(e);
        }
        Ok(())
    }
}

fn worker_loop(rx: Receiver<FileEntry>, ctx: WorkerContext) {
    while let Ok(job) = rx.recv() {
        if ctx.aborted.load(Ordering::SeqCst) {
            continue; // drain the channel without doing further work
        }

        let url = format!(
            "{}/{}",
            ctx.origin.trim_end_matches('/'),
            job.normalized_path()
        );

        let mut force = false;
        let mut attempts = 0u32;
        loop {
            match transfer::fetch_one(
                &ctx.client,
                ctx.progress.as_ref(),
                &job,
                &url,
                &ctx.install_dir,
                force,
            ) {
                Ok(()) => {
                    let mut store = ctx.store.lock().unwrap();
                    if let Err(e) = store.append(job.clone()) {
                        error!(error = %e, "could not persist local manifest");
                        *ctx.fatal.lock().unwrap() = Some(e);
                        ctx.aborted.store(true, Ordering::SeqCst);
                    }
                    break;
                }
                Err(e) => {
                    attempts += 1;
                    if attempts > ctx.attempt_cap {
                        warn!(path = %job.path, attempts, "too many retries, giving up on file");
                        ctx.exhausted.lock().unwrap().push(job.path.clone());
                        break;
                    }
                    warn!(url = %url, error = %e, "download failed, retrying with a fresh transfer");
                    force = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoopSink;
    use tempfile::TempDir;

    fn pool_for(temp: &TempDir) -> DownloadPool {
        let config = PatcherConfig::new(temp.path().to_path_buf()).with_workers(2);
        let store = Arc::new(Mutex::new(ManifestStore::create(
            temp.path(),
            "version.bin",
        )));
        DownloadPool::new(
            &config,
            Client::new(),
            "http://127.0.0.1:1".to_string(),
            store,
            Arc::new(NoopSink),
        )
    }

    #[test]
    fn test_empty_job_set_is_a_noop() {
        let temp = TempDir::new().unwrap();
        let pool = pool_for(&temp);

        assert!(pool.run(&[]).is_ok());
        assert!(pool.exhausted_paths().is_empty());
    }

    #[test]
    fn test_sticky_exhaustion_aborts_next_invocation() {
        let temp = TempDir::new().unwrap();
        let pool = pool_for(&temp);
        pool.ctx
            .exhausted
            .lock()
            .unwrap()
            .push("a.dat".to_string());

        let err = pool.run(&[]).unwrap_err();
        match err {
            PatcherError::DownloadExhausted { paths } => {
                assert_eq!(paths, vec!["a.dat".to_string()]);
            }
            other => panic!("expected DownloadExhausted, got {}", other),
        }
    }
}
