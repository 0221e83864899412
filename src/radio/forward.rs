//! # Remote Forwarding
//!
//! Forward-and-capture operations against the air unit's settings
//! endpoint.
//!
//! Instead of streaming a proxied response straight through to the
//! caller, a forward returns a structured [`ForwardOutcome`] so the
//! reconciler can inspect the status, decide on a fallback, and re-issue
//! the body itself.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::error::Result;

/// Captured result of a forwarded request
#[derive(Debug, Clone)]
pub struct ForwardOutcome {
    pub status: u16,
    pub body: Bytes,
}

impl ForwardOutcome {
    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 5xx; treated like an unreachable peer by the reconciler
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Forwarding seam between the reconciler and the remote peer
///
/// A transport-level failure (refused connection, timeout) is an `Err`;
/// any HTTP response, success or not, is an `Ok` outcome.
pub trait Forwarder: Send + Sync {
    /// Forward a settings read to the remote peer
    fn forward_get(&self) -> impl Future<Output = Result<ForwardOutcome>> + Send;

    /// Forward a settings write, capturing the peer's response
    fn forward_update(&self, body: Bytes) -> impl Future<Output = Result<ForwardOutcome>> + Send;
}

/// HTTP forwarder backed by a `reqwest` client with a bounded timeout
pub struct HttpForwarder {
    client: reqwest::Client,
    url: String,
}

impl HttpForwarder {
    /// Build a forwarder for the given settings endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Forwarder for HttpForwarder {
    async fn forward_get(&self) -> Result<ForwardOutcome> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!("forwarded GET {} -> {} ({} bytes)", self.url, status, body.len());
        Ok(ForwardOutcome { status, body })
    }

    async fn forward_update(&self, body: Bytes) -> Result<ForwardOutcome> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!("forwarded POST {} -> {} ({} bytes)", self.url, status, body.len());
        Ok(ForwardOutcome { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classification() {
        let ok = ForwardOutcome { status: 204, body: Bytes::new() };
        assert!(ok.is_success());
        assert!(!ok.is_server_error());

        let client_err = ForwardOutcome { status: 404, body: Bytes::new() };
        assert!(!client_err.is_success());
        assert!(!client_err.is_server_error());

        let server_err = ForwardOutcome { status: 502, body: Bytes::new() };
        assert!(!server_err.is_success());
        assert!(server_err.is_server_error());
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        // Port 9 on localhost is essentially never listening
        let forwarder =
            HttpForwarder::new("http://127.0.0.1:9/api/radio", Duration::from_millis(500))
                .unwrap();

        let result = forwarder.forward_get().await;
        assert!(result.is_err());
    }
}
