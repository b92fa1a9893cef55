//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use desk_hotkeys::application::resolve_address::{
    NameResolveError, NameResolver, NeighborTable, NeighborTableError,
};
use desk_hotkeys::application::send_command::{HttpResponse, HttpTransport, TransportError};

pub const PROBE_URL: &str = "http://standingdesk.local";
pub const DESK_MAC: &str = "a4:cf:12:0b:3e:01";

pub const ARP_DUMP: &str = "\
? (192.168.1.1) at 0:11:22:33:44:55 on en0 ifscope [ethernet]
? (192.168.1.77) at a4:cf:12:b:3e:1 on en0 ifscope [ethernet]
";

/// How the fake desk answers.
#[derive(Clone, Copy)]
pub enum Behavior {
    Ok,
    Refuse,
}

/// HTTP transport that records every URL.
///
/// The hostname probe and desk commands are scripted separately.  When a
/// gate is installed the probe waits on it before answering.
pub struct FakeDesk {
    urls: Mutex<Vec<String>>,
    probe: Behavior,
    commands: Behavior,
    gate: Option<Arc<Notify>>,
}

impl FakeDesk {
    pub fn new(probe: Behavior, commands: Behavior) -> Self {
        Self {
            urls: Mutex::new(Vec::new()),
            probe,
            commands,
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    /// URLs other than the hostname probe.
    pub fn command_urls(&self) -> Vec<String> {
        self.urls().into_iter().filter(|u| u != PROBE_URL).collect()
    }

    pub fn probe_count(&self) -> usize {
        self.urls().iter().filter(|u| *u == PROBE_URL).count()
    }
}

#[async_trait]
impl HttpTransport for FakeDesk {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.urls.lock().unwrap().push(url.to_string());
        let behavior = if url == PROBE_URL {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.probe
        } else {
            self.commands
        };
        match behavior {
            Behavior::Ok => Ok(HttpResponse {
                status: 200,
                body: "OK".to_string(),
            }),
            Behavior::Refuse => Err(TransportError::Connect {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Name resolver that always answers with the same IPv4 address.
pub struct FixedNames(pub Ipv4Addr);

#[async_trait]
impl NameResolver for FixedNames {
    async fn lookup(&self, _host: &str) -> Result<IpAddr, NameResolveError> {
        Ok(IpAddr::V4(self.0))
    }
}

/// Neighbor table that serves a fixed dump and counts reads.
pub struct CountingTable {
    dump: Option<&'static str>,
    reads: AtomicUsize,
}

impl CountingTable {
    pub fn with_dump(dump: &'static str) -> Self {
        Self {
            dump: Some(dump),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            dump: None,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NeighborTable for CountingTable {
    async fn dump(&self) -> Result<String, NeighborTableError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.dump
            .map(str::to_string)
            .ok_or_else(|| NeighborTableError("arp: command not found".to_string()))
    }
}
