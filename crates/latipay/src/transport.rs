//! HTTP transport seam.
//!
//! The protocol layer only needs "send these bytes, give me the body back".
//! [`ReqwestTransport`] is the default implementation; tests and embedding
//! applications can supply their own [`HttpTransport`].

use std::future::Future;

use crate::error::TransportError;

/// Request headers as name/value pairs.
pub type Headers<'a> = &'a [(&'a str, &'a str)];

/// Minimal HTTP capability consumed by [`crate::GatewayClient`].
///
/// Implementations return the response body for any HTTP status; status
/// handling belongs to the protocol layer, which reads the gateway's `code`.
pub trait HttpTransport: Send + Sync {
    fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: Headers<'_>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    fn get(
        &self,
        url: &str,
        headers: Headers<'_>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

#[cfg(feature = "full")]
pub use reqwest_transport::{ReqwestTransport, DEFAULT_TIMEOUT};

#[cfg(feature = "full")]
mod reqwest_transport {
    use std::time::Duration;

    use super::{Headers, HttpTransport};
    use crate::error::TransportError;

    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// [`HttpTransport`] backed by `reqwest`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        http: reqwest::Client,
        timeout: Duration,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::with_client(reqwest::Client::new())
        }

        /// Reuse an existing client (and its connection pool).
        pub fn with_client(http: reqwest::Client) -> Self {
            Self {
                http,
                timeout: DEFAULT_TIMEOUT,
            }
        }

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        pub fn timeout(&self) -> Duration {
            self.timeout
        }

        async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, TransportError> {
            let resp = request
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|e| TransportError(format!("request failed: {e}")))?;

            let status = resp.status();
            let body = resp
                .bytes()
                .await
                .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;
            tracing::debug!(status = %status, bytes = body.len(), "gateway responded");
            Ok(body.to_vec())
        }
    }

    impl Default for ReqwestTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    fn with_headers(
        mut request: reqwest::RequestBuilder,
        headers: Headers<'_>,
    ) -> reqwest::RequestBuilder {
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request
    }

    impl HttpTransport for ReqwestTransport {
        async fn post(
            &self,
            url: &str,
            body: Vec<u8>,
            headers: Headers<'_>,
        ) -> Result<Vec<u8>, TransportError> {
            let request = with_headers(self.http.post(url), headers).body(body);
            self.send(request).await
        }

        async fn get(&self, url: &str, headers: Headers<'_>) -> Result<Vec<u8>, TransportError> {
            let request = with_headers(self.http.get(url), headers);
            self.send(request).await
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn default_timeout_is_thirty_seconds() {
            assert_eq!(ReqwestTransport::new().timeout(), Duration::from_secs(30));
        }

        #[test]
        fn timeout_is_configurable() {
            let transport = ReqwestTransport::default().with_timeout(Duration::from_secs(5));
            assert_eq!(transport.timeout(), Duration::from_secs(5));
        }

        #[tokio::test]
        async fn unreachable_host_is_a_transport_error() {
            let transport = ReqwestTransport::new().with_timeout(Duration::from_millis(500));
            let err = transport
                .get("http://127.0.0.1:1/v2/transaction/x", &[])
                .await
                .unwrap_err();
            assert!(err.0.contains("request failed"));
        }
    }
}
