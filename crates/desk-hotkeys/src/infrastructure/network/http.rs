//! HTTP transport backed by an async `reqwest::Client`.
//!
//! The desk controller serves plain HTTP on the LAN, so the client is built
//! without TLS support.  The timeout is applied per request because the
//! probe and the commands may use different limits.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::application::send_command::{HttpResponse, HttpTransport, TransportError};

/// [`HttpTransport`] implementation using a shared connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the underlying client.
    ///
    /// # Errors
    ///
    /// Fails if the platform's HTTP stack cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("desk-hotkeys/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        trace!(url, "GET");
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(url, e))?;
        Ok(HttpResponse { status, body })
    }
}

/// Maps a `reqwest` error onto the transport error taxonomy.
fn classify(url: &str, error: reqwest::Error) -> TransportError {
    let url = url.to_string();
    if error.is_timeout() {
        TransportError::Timeout { url }
    } else if error.is_connect() {
        TransportError::Connect {
            url,
            reason: error.to_string(),
        }
    } else {
        TransportError::Other {
            url,
            reason: error.to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
