//! patchstream - content-addressed file synchronization for game clients.
//!
//! The engine reconciles a local installation tree against a manifest
//! published by a content-delivery origin: it probes origins, fetches and
//! decodes the obfuscated remote manifest, computes the set of files that
//! differ, downloads them concurrently with resumable transfers and
//! streaming decompression, verifies them by BLAKE2b-256, and maintains a
//! persistent local manifest mirroring the remote.
//!
//! Entry point is [`Patcher`]:
//!
//! ```ignore
//! use patchstream::{Patcher, PatcherConfig};
//!
//! let config = PatcherConfig::new(std::env::current_dir()?)
//!     .with_origin("https://cdn0.example.net");
//! let summary = Patcher::new(config).run()?;
//! println!("{} transfers over {} passes", summary.transfers, summary.passes);
//! ```

pub mod config;
pub mod diff;
pub mod download;
pub mod error;
pub mod fsutil;
pub mod hash;
pub mod manifest;
pub mod origin;
pub mod patcher;
pub mod progress;
pub mod verify;

pub use config::PatcherConfig;
pub use error::{PatcherError, PatcherResult};
pub use patcher::{PatchSummary, Patcher};
pub use progress::{NoopSink, ProgressHandle, ProgressSink};
