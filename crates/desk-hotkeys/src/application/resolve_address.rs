//! AddressResolver: finds the desk on the local network.
//!
//! # Strategies
//!
//! Each *resolution pass* tries two strategies in strict order:
//!
//! 1. **Hostname probe** – `GET http://<hostname>` (default
//!    `standingdesk.local`, announced by the controller over mDNS).  On a 2xx
//!    answer the hostname is resolved once to a numeric address, so later
//!    commands skip the (slow) `.local` lookup.
//! 2. **Neighbor-table scan** – the host's address-resolution cache is
//!    searched for the desk's hardware address.  This works on networks where
//!    mDNS is blocked, as long as the host has talked to the desk recently.
//!
//! If both fail the resolver sleeps for the retry delay and starts a new
//! pass.  It never gives up on its own; only the shutdown flag stops it.
//!
//! # Address ownership
//!
//! The resolver is the only writer of [`CurrentAddress`].  A new address is
//! published in one step after a strategy succeeds, so readers see either
//! the old value, nothing, or the new value, never a partial one.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use desk_core::{scan_neighbor_dump, DeviceAddress, DeviceIdentity};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::send_command::{HttpTransport, TransportError};

/// Default hostname the desk controller announces.
pub const DEFAULT_HOSTNAME: &str = "standingdesk.local";
/// Delay between two resolution passes.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Name lookup failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not resolve {host}: {reason}")]
pub struct NameResolveError {
    pub host: String,
    pub reason: String,
}

/// Failure to read the address-resolution cache.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not read neighbor table: {0}")]
pub struct NeighborTableError(pub String);

/// Trait for hostname → numeric address lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn lookup(&self, host: &str) -> Result<IpAddr, NameResolveError>;
}

/// Trait for reading a textual dump of the address-resolution cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NeighborTable: Send + Sync {
    async fn dump(&self) -> Result<String, NeighborTableError>;
}

/// Why a single strategy did not produce an address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StrategyError {
    #[error("probe request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("probe answered with HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    NameLookup(#[from] NameResolveError),
    #[error(transparent)]
    NeighborTable(#[from] NeighborTableError),
    #[error("{identity} not in neighbor table ({malformed} malformed entries skipped)")]
    NotInTable {
        identity: DeviceIdentity,
        malformed: usize,
    },
    #[error("no hardware address configured")]
    NoIdentity,
}

/// A resolution pass in which every strategy failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("hostname probe: {probe}; neighbor scan: {scan}")]
pub struct ResolveError {
    pub probe: StrategyError,
    pub scan: StrategyError,
}

/// The desk's current address, shared between the resolver and all
/// dispatch tasks.
#[derive(Debug, Default)]
pub struct CurrentAddress {
    inner: RwLock<Option<DeviceAddress>>,
}

impl CurrentAddress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<DeviceAddress> {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(&self, address: DeviceAddress) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(address);
    }

    /// Clears the address and returns the previous value.
    pub fn invalidate(&self) -> Option<DeviceAddress> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Settings for [`AddressResolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub hostname: String,
    /// `None` disables the neighbor-table strategy.
    pub identity: Option<DeviceIdentity>,
    pub probe_timeout: Duration,
    pub retry_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            identity: None,
            probe_timeout: Duration::from_secs(5),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// The address-resolution use case.
pub struct AddressResolver {
    config: ResolverConfig,
    transport: Arc<dyn HttpTransport>,
    names: Arc<dyn NameResolver>,
    neighbors: Arc<dyn NeighborTable>,
    address: Arc<CurrentAddress>,
    resolutions: AtomicU64,
}

impl AddressResolver {
    pub fn new(
        config: ResolverConfig,
        transport: Arc<dyn HttpTransport>,
        names: Arc<dyn NameResolver>,
        neighbors: Arc<dyn NeighborTable>,
        address: Arc<CurrentAddress>,
    ) -> Self {
        Self {
            config,
            transport,
            names,
            neighbors,
            address,
            resolutions: AtomicU64::new(0),
        }
    }

    /// The shared address slot this resolver publishes into.
    pub fn current(&self) -> &Arc<CurrentAddress> {
        &self.address
    }

    /// Number of times [`resolve`](Self::resolve) has been entered.
    pub fn resolutions(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Marks the current address as stale.
    pub fn invalidate(&self) {
        if let Some(previous) = self.address.invalidate() {
            info!(%previous, "desk address invalidated");
        }
    }

    /// Runs resolution passes until one succeeds or `running` is cleared.
    ///
    /// On success the address is published to [`CurrentAddress`] and
    /// returned.  Returns `None` only when shutting down.
    pub async fn resolve(&self, running: &AtomicBool) -> Option<DeviceAddress> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        info!(hostname = %self.config.hostname, "searching for the desk");

        while running.load(Ordering::Relaxed) {
            match self.resolve_once().await {
                Ok(address) => {
                    self.address.publish(address);
                    info!(%address, "found the desk");
                    return Some(address);
                }
                Err(e) => {
                    warn!("desk not found ({e}); retrying in {:?}", self.config.retry_delay);
                }
            }
            tokio::time::sleep(self.config.retry_delay).await;
        }

        info!("address resolution cancelled");
        None
    }

    /// Runs a single pass over both strategies without publishing.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] carrying each strategy's failure.
    pub async fn resolve_once(&self) -> Result<DeviceAddress, ResolveError> {
        let probe = match self.probe_hostname().await {
            Ok(address) => return Ok(address),
            Err(e) => {
                debug!("hostname probe failed: {e}");
                e
            }
        };
        let scan = match self.scan_neighbor_table().await {
            Ok(address) => return Ok(address),
            Err(e) => {
                debug!("neighbor scan failed: {e}");
                e
            }
        };
        Err(ResolveError { probe, scan })
    }

    async fn probe_hostname(&self) -> Result<DeviceAddress, StrategyError> {
        let host = &self.config.hostname;
        let url = format!("http://{host}");
        debug!(%url, "probing hostname");

        let response = self.transport.get(&url, self.config.probe_timeout).await?;
        if !response.is_success() {
            return Err(StrategyError::Status(response.status));
        }
        let ip = self.names.lookup(host).await?;
        Ok(DeviceAddress::new(ip))
    }

    async fn scan_neighbor_table(&self) -> Result<DeviceAddress, StrategyError> {
        let identity = self.config.identity.ok_or(StrategyError::NoIdentity)?;
        debug!(%identity, "scanning neighbor table");

        let dump = self.neighbors.dump().await?;
        let scan = scan_neighbor_dump(&dump, &identity);
        scan.address
            .map(DeviceAddress::from)
            .ok_or(StrategyError::NotInTable {
                identity,
                malformed: scan.malformed,
            })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
