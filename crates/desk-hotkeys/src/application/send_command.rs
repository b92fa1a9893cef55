//! CommandSender and Dispatcher: deliver desk commands and feed the outcome
//! into the reconnect policy.
//!
//! # Architecture
//!
//! [`CommandSender`] knows how to issue one command against the current
//! address.  [`Dispatcher`] is the glue the input loop talks to: every
//! gesture becomes its own Tokio task, so the input thread never waits for a
//! network round trip.
//!
//! ```text
//! input thread ── dispatch(cmd) ──► tokio::spawn ──► CommandSender::send
//!                                                        │
//!                                          CommandOutcome▼
//!                                                 ReconnectPolicy
//!                                                        │ Reresolve
//!                                                        ▼
//!                                   invalidate address, AddressResolver::resolve
//! ```
//!
//! No ordering is guaranteed between tasks: a `stop` may complete before the
//! `up` it follows.  Both are independent, idempotent desk operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use desk_core::{DeskCommand, FailureVerdict, ReconnectPolicy};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::resolve_address::{AddressResolver, CurrentAddress};

/// Per-request timeout for desk commands.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure: no response was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("request to {url} failed: {reason}")]
    Other { url: String, reason: String },
}

/// Trait for performing a GET request with a timeout.
///
/// The infrastructure implementation uses `reqwest`; tests use recording fakes.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

/// Why a dispatch failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// No address is known; nothing was sent.
    #[error("address unresolved")]
    Unresolved,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The desk answered.  Any status counts: the request reached the device.
    Success { status: u16, body: String },
    Failure(DispatchError),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success { .. })
    }
}

/// Issues single commands to the currently known desk address.
pub struct CommandSender {
    transport: Arc<dyn HttpTransport>,
    address: Arc<CurrentAddress>,
    timeout: Duration,
}

impl CommandSender {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        address: Arc<CurrentAddress>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            address,
            timeout,
        }
    }

    /// Sends `command` and classifies the result.
    ///
    /// Fails with [`DispatchError::Unresolved`] without touching the network
    /// when no address is known.
    pub async fn send(&self, command: DeskCommand) -> CommandOutcome {
        let Some(address) = self.address.get() else {
            return CommandOutcome::Failure(DispatchError::Unresolved);
        };
        let url = address.command_url(command);
        match self.transport.get(&url, self.timeout).await {
            Ok(response) => CommandOutcome::Success {
                status: response.status,
                body: response.body,
            },
            Err(e) => CommandOutcome::Failure(e.into()),
        }
    }
}

/// Fire-and-forget dispatcher used by the input loop.
pub struct Dispatcher {
    sender: CommandSender,
    policy: ReconnectPolicy,
    resolver: Arc<AddressResolver>,
    running: Arc<AtomicBool>,
    runtime: Handle,
}

impl Dispatcher {
    /// Creates a dispatcher that spawns its tasks on `runtime`.
    pub fn new(
        sender: CommandSender,
        policy: ReconnectPolicy,
        resolver: Arc<AddressResolver>,
        running: Arc<AtomicBool>,
        runtime: Handle,
    ) -> Arc<Self> {
        Arc::new(Self {
            sender,
            policy,
            resolver,
            running,
            runtime,
        })
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Spawns an independent task that sends `command` and applies the
    /// outcome.  Safe to call from a non-async thread.
    ///
    /// The returned handle may be dropped; the task keeps running.
    pub fn dispatch(self: &Arc<Self>, command: DeskCommand) -> JoinHandle<CommandOutcome> {
        let this = Arc::clone(self);
        self.runtime.spawn(async move {
            let outcome = this.sender.send(command).await;
            this.apply_outcome(command, &outcome).await;
            outcome
        })
    }

    /// Feeds one outcome into the reconnect policy, re-resolving the address
    /// on this task when the failure budget is exhausted.
    async fn apply_outcome(&self, command: DeskCommand, outcome: &CommandOutcome) {
        match outcome {
            CommandOutcome::Success { status, body } => {
                debug!(%command, status, body = %body.trim(), "command sent");
                self.policy.record_success();
            }
            CommandOutcome::Failure(e) => {
                warn!(%command, "failed to send command: {e}");
                match self.policy.record_failure() {
                    FailureVerdict::Tolerated { remaining } => {
                        debug!(remaining, "failure tolerated");
                    }
                    FailureVerdict::AlreadyResolving => {}
                    FailureVerdict::Reresolve => {
                        warn!(
                            max_errors = self.policy.max_errors(),
                            "too many failed commands; searching for the desk again"
                        );
                        self.resolver.invalidate();
                        let found = self.resolver.resolve(&self.running).await;
                        self.policy.resolution_completed();
                        if let Some(address) = found {
                            info!(%address, "desk re-resolved");
                        }
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use desk_core::DeviceAddress;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        urls: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, TransportError> {
            self.urls.lock().unwrap().push(url.to_string());
            if self.fail {
                return Err(TransportError::Connect {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                });
            }
            Ok(HttpResponse {
                status: 200,
                body: "OK".to_string(),
            })
        }
    }

    fn resolved_address() -> Arc<CurrentAddress> {
        let address = Arc::new(CurrentAddress::new());
        address.publish(DeviceAddress::from(Ipv4Addr::new(10, 0, 0, 7)));
        address
    }

    #[tokio::test]
    async fn test_send_builds_command_url_from_current_address() {
        // Arrange
        let transport = Arc::new(RecordingTransport::default());
        let sender = CommandSender::new(transport.clone(), resolved_address(), DEFAULT_REQUEST_TIMEOUT);

        // Act
        let outcome = sender.send(DeskCommand::Standing).await;

        // Assert
        assert_eq!(
            outcome,
            CommandOutcome::Success {
                status: 200,
                body: "OK".to_string()
            }
        );
        assert_eq!(*transport.urls.lock().unwrap(), vec!["http://10.0.0.7/standing"]);
    }

    #[tokio::test]
    async fn test_send_without_address_fails_without_network_call() {
        let transport = Arc::new(RecordingTransport::default());
        let sender = CommandSender::new(
            transport.clone(),
            Arc::new(CurrentAddress::new()),
            DEFAULT_REQUEST_TIMEOUT,
        );

        let outcome = sender.send(DeskCommand::Up).await;

        assert_eq!(outcome, CommandOutcome::Failure(DispatchError::Unresolved));
        assert!(transport.urls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_maps_transport_error_to_failure() {
        let transport = Arc::new(RecordingTransport {
            fail: true,
            ..Default::default()
        });
        let sender = CommandSender::new(transport, resolved_address(), DEFAULT_REQUEST_TIMEOUT);

        let outcome = sender.send(DeskCommand::Stop).await;

        assert!(matches!(
            outcome,
            CommandOutcome::Failure(DispatchError::Transport(TransportError::Connect { .. }))
        ));
    }

    #[test]
    fn test_http_response_is_success_only_for_2xx() {
        let ok = HttpResponse { status: 204, body: String::new() };
        let not_found = HttpResponse { status: 404, body: String::new() };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }

    #[test]
    fn test_dispatch_error_messages() {
        assert_eq!(DispatchError::Unresolved.to_string(), "address unresolved");
        let timeout = DispatchError::from(TransportError::Timeout {
            url: "http://10.0.0.7/up".to_string(),
        });
        assert_eq!(timeout.to_string(), "request to http://10.0.0.7/up timed out");
    }
}
