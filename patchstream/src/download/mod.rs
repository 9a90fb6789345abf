//! Concurrent download execution.
//!
//! The pool consumes the download set computed by the diff engine or the
//! verifier:
//!
//! ```text
//! DownloadPool
//!     │  bounded job channel (capacity = set length)
//!     ├── worker 0 ──┐
//!     ├── worker 1 ──┼── transfer::fetch_one  (range GET → tmp → decode)
//!     └── worker N ──┘        │
//!                             └── ManifestStore::append + save (mutexed)
//! ```
//!
//! Workers retry failed transfers with `force` set so a corrupted partial
//! tmp can never wedge a file, and report irrecoverable paths through the
//! pool's sticky exhausted set.

mod pool;
mod transfer;

pub use pool::DownloadPool;
