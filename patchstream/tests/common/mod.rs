//! Shared fixtures: an in-process HTTP origin and manifest builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use patchstream::manifest::{wire, FileEntry, Manifest};

/// A loopback content origin serving canned bodies over HTTP/1.1.
///
/// Supports HEAD, GET, `Range: bytes=N-` resumption, and scripted failures
/// for flaky-network scenarios.
pub struct TestOrigin {
    base: String,
    state: Arc<OriginState>,
}

#[derive(Default)]
struct OriginState {
    files: Mutex<HashMap<String, Vec<u8>>>,
    /// Remaining scripted 500s per path.
    failures: Mutex<HashMap<String, usize>>,
    /// GET counts per path.
    gets: Mutex<HashMap<String, usize>>,
    /// Observed Range starts per path.
    ranges: Mutex<Vec<(String, u64)>>,
}

impl TestOrigin {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let base = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(OriginState::default());

        let accept_state = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let state = Arc::clone(&accept_state);
                thread::spawn(move || {
                    let _ = handle(stream, &state);
                });
            }
        });

        Self { base, state }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Publish a body under `path` (no leading slash).
    pub fn put(&self, path: &str, body: Vec<u8>) {
        self.state
            .files
            .lock()
            .unwrap()
            .insert(path.to_string(), body);
    }

    /// Answer the next `times` GETs for `path` with HTTP 500.
    pub fn fail_next(&self, path: &str, times: usize) {
        self.state
            .failures
            .lock()
            .unwrap()
            .insert(path.to_string(), times);
    }

    /// Number of GETs observed for `path`.
    pub fn get_count(&self, path: &str) -> usize {
        self.state
            .gets
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Range starts observed for `path`.
    pub fn range_starts(&self, path: &str) -> Vec<u64> {
        self.state
            .ranges
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, start)| *start)
            .collect()
    }
}

fn handle(mut stream: TcpStream, state: &OriginState) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts
        .next()
        .unwrap_or("")
        .trim_start_matches('/')
        .to_string();

    let mut range_start: Option<u64> = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end().to_ascii_lowercase();
        if line.is_empty() {
            break;
        }
        if let Some(spec) = line.strip_prefix("range: bytes=") {
            if let Some(start) = spec.strip_suffix('-') {
                range_start = start.parse().ok();
            }
        }
    }

    if method == "GET" {
        *state.gets.lock().unwrap().entry(path.clone()).or_insert(0) += 1;
        if let Some(start) = range_start {
            state.ranges.lock().unwrap().push((path.clone(), start));
        }

        let mut failures = state.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(&path) {
            if *remaining > 0 {
                *remaining -= 1;
                drop(failures);
                stream.write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )?;
                return stream.flush();
            }
        }
    }

    let files = state.files.lock().unwrap();
    let Some(body) = files.get(&path).cloned() else {
        drop(files);
        stream.write_all(
            b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )?;
        return stream.flush();
    };
    drop(files);

    if method == "HEAD" {
        write!(
            stream,
            "HTTP/1.1 200 OK\r\ncontent-length: {}\r\naccept-ranges: bytes\r\nconnection: close\r\n\r\n",
            body.len()
        )?;
        return stream.flush();
    }

    let offset = range_start.unwrap_or(0).min(body.len() as u64) as usize;
    let slice = &body[offset..];
    let status = if range_start.is_some() {
        "206 Partial Content"
    } else {
        "200 OK"
    };
    write!(
        stream,
        "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
        status,
        slice.len()
    )?;
    stream.write_all(slice)?;
    stream.flush()
}

/// Compress `data` the way origins publish per-file payloads.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = snap::write::FrameEncoder::new(Vec::new());
    encoder.write_all(data).expect("in-memory compression");
    encoder.into_inner().expect("flush frame encoder")
}

/// BLAKE2b-256 hex digest of `data`.
pub fn digest(data: &[u8]) -> String {
    let mut slice = data;
    patchstream::hash::hash_reader(&mut slice).expect("in-memory hashing")
}

/// Manifest entry for plaintext `data`.
pub fn entry(path: &str, data: &[u8], mtime: i64) -> FileEntry {
    FileEntry {
        path: path.to_string(),
        hash: digest(data),
        last_modified: mtime,
    }
}

/// Masked wire payload for the given entries, as served at `version.bin`.
pub fn wire_manifest(entries: Vec<FileEntry>) -> Vec<u8> {
    let mut payload = wire::encode(&Manifest { entries });
    wire::mask(&mut payload);
    payload
}

/// Create a file under `root`, then pin its mtime.
pub fn plant_file(root: &Path, path: &str, data: &[u8], mtime: i64) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&full, data).unwrap();
    patchstream::fsutil::set_entry_times(&full, mtime).unwrap();
}
