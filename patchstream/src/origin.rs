//! Origin probing and remote manifest acquisition.
//!
//! Before any transfer starts, each configured origin base is probed with a
//! HEAD request against its manifest; an origin is healthy iff it answers
//! 200. The rest of the engine assumes at least one reachable origin, so a
//! fully dark deployment fails here rather than once per file.

use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::config::PatcherConfig;
use crate::error::{PatcherError, PatcherResult};
use crate::manifest::{wire, Manifest};

/// Probes candidate origins for availability.
pub struct OriginProbe<'a> {
    client: &'a Client,
}

impl<'a> OriginProbe<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Probe every configured origin base, preserving order.
    ///
    /// # Errors
    ///
    /// [`PatcherError::NoOriginsAvailable`] when no origin answers 200.
    pub fn probe(&self, config: &PatcherConfig) -> PatcherResult<Vec<String>> {
        let mut healthy = Vec::new();

        for base in &config.origin_bases {
            let url = manifest_url(base, &config.manifest_name);
            match self.client.head(&url).send() {
                Ok(resp) if resp.status().as_u16() == 200 => {
                    debug!(origin = %base, "origin healthy");
                    healthy.push(base.clone());
                }
                Ok(resp) => {
                    warn!(origin = %base, status = %resp.status(), "origin unhealthy");
                }
                Err(e) => {
                    warn!(origin = %base, error = %e, "origin unreachable");
                }
            }
        }

        if healthy.is_empty() {
            return Err(PatcherError::NoOriginsAvailable);
        }

        info!(healthy = healthy.len(), "download servers online");
        Ok(healthy)
    }
}

/// Fetch and decode the remote manifest from `origin`.
pub fn fetch_remote_manifest(
    client: &Client,
    origin: &str,
    config: &PatcherConfig,
) -> PatcherResult<Manifest> {
    let url = manifest_url(origin, &config.manifest_name);
    info!(url = %url, "fetching remote manifest");

    let resp = client
        .get(&url)
        .send()
        .map_err(|e| PatcherError::ManifestFetch {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    if !resp.status().is_success() {
        return Err(PatcherError::ManifestFetch {
            url,
            reason: format!("HTTP {}", resp.status()),
        });
    }

    let mut payload = resp
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| PatcherError::ManifestFetch {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    wire::mask(&mut payload);
    Ok(wire::decode(&payload, config.max_manifest_entries)?)
}

/// `<base>/<manifest_name>`, tolerant of a trailing slash on the base.
fn manifest_url(base: &str, manifest_name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), manifest_name)
}
