//! Hostname lookup through the operating system resolver.

use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;

use crate::application::resolve_address::{NameResolveError, NameResolver};

/// [`NameResolver`] using `tokio::net::lookup_host`.
///
/// When a name has both IPv4 and IPv6 records the first IPv4 address wins:
/// desk controllers commonly answer mDNS with a link-local IPv6 address that
/// is unusable without a scope id.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNameResolver;

#[async_trait]
impl NameResolver for SystemNameResolver {
    async fn lookup(&self, host: &str) -> Result<IpAddr, NameResolveError> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 80))
            .await
            .map_err(|e| NameResolveError {
                host: host.to_string(),
                reason: e.to_string(),
            })?
            .collect();

        pick_address(&addrs).ok_or_else(|| NameResolveError {
            host: host.to_string(),
            reason: "no addresses returned".to_string(),
        })
    }
}

/// First IPv4 address, falling back to the first address of any family.
fn pick_address(addrs: &[SocketAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .map(SocketAddr::ip)
}
