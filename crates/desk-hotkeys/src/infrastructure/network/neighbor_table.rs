//! Reads the host's ARP cache.
//!
//! Linux exposes the cache as `/proc/net/arp`, which needs no external tool.
//! Everywhere else (and on Linux systems without procfs) `arp -a` is run and
//! its stdout returned verbatim; `desk_core::scan_neighbor_dump` copes with
//! the Linux, BSD/macOS and Windows layouts.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::application::resolve_address::{NeighborTable, NeighborTableError};

const PROC_NET_ARP: &str = "/proc/net/arp";

/// [`NeighborTable`] backed by the operating system.
#[derive(Debug, Clone)]
pub struct SystemNeighborTable {
    proc_path: Option<PathBuf>,
}

impl SystemNeighborTable {
    pub fn new() -> Self {
        let proc_path = cfg!(target_os = "linux").then(|| PathBuf::from(PROC_NET_ARP));
        Self { proc_path }
    }

    /// Uses `path` in place of `/proc/net/arp`, on any platform.
    pub fn with_proc_path(path: impl Into<PathBuf>) -> Self {
        Self {
            proc_path: Some(path.into()),
        }
    }

    async fn run_arp() -> Result<String, NeighborTableError> {
        let output = Command::new("arp")
            .arg("-a")
            .output()
            .await
            .map_err(|e| NeighborTableError(format!("could not run arp: {e}")))?;

        if !output.status.success() {
            return Err(NeighborTableError(format!(
                "arp -a exited with {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for SystemNeighborTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NeighborTable for SystemNeighborTable {
    async fn dump(&self) -> Result<String, NeighborTableError> {
        if let Some(path) = &self.proc_path {
            match tokio::fs::read_to_string(path).await {
                Ok(dump) => return Ok(dump),
                Err(e) => debug!(path = %path.display(), "falling back to arp -a: {e}"),
            }
        }
        Self::run_arp().await
    }
}
