//! Transport with proxy fallback
//!
//! Every fetch is a two-step pipeline: a direct request, then (only if that
//! fails) one request through a fixed proxy of the form `<proxy-base>?quest=<url>`.
//! Non-2xx statuses and request errors are treated the same. There is no
//! further retry and no caching.

use async_trait::async_trait;

use crate::config::TransportConfig;
use crate::error::{AttemptFailure, Result, TransportError};

/// Abstraction over page and image fetching, enabling testability.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and return the body as text
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, TransportError>;

    /// Fetch `url` and return the raw body
    async fn fetch_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, TransportError>;
}

/// Build the proxied form of `target`
///
/// The target is percent-encoded into the `quest` query parameter.
pub fn proxy_url(proxy_base: &str, target: &str) -> String {
    let separator = if proxy_base.contains('?') { '&' } else { '?' };
    format!(
        "{}{}quest={}",
        proxy_base,
        separator,
        urlencoding::encode(target)
    )
}

/// Production [`Transport`] backed by reqwest.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    proxy_base: String,
}

impl HttpTransport {
    /// Build a client from the transport configuration
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(Self {
            client: builder.build()?,
            proxy_base: config.proxy_base.clone(),
        })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client, proxy_base: impl Into<String>) -> Self {
        Self {
            client,
            proxy_base: proxy_base.into(),
        }
    }

    /// Fetch `url` directly, falling back to the proxy once if that fails.
    ///
    /// Returns [`TransportError::Exhausted`] only when both attempts failed.
    pub async fn fetch_with_fallback(
        &self,
        url: &str,
    ) -> std::result::Result<reqwest::Response, TransportError> {
        tracing::debug!(url = %url, "Requesting target directly");
        let direct = match self.attempt(url).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };

        tracing::warn!(url = %url, error = %direct, "Direct request failed, trying proxy");
        let proxied = proxy_url(&self.proxy_base, url);
        match self.attempt(&proxied).await {
            Ok(response) => {
                tracing::debug!(url = %url, "Proxy request succeeded");
                Ok(response)
            }
            Err(fallback) => Err(TransportError::Exhausted {
                url: url.to_string(),
                direct,
                fallback,
            }),
        }
    }

    /// One request; success means a response with a 2xx status.
    async fn attempt(&self, url: &str) -> std::result::Result<reqwest::Response, AttemptFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptFailure::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure::Status(status.as_u16()));
        }
        Ok(response)
    }
}

fn body_error(url: &str, e: reqwest::Error) -> TransportError {
    TransportError::Body {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, TransportError> {
        let response = self.fetch_with_fallback(url).await?;
        response.text().await.map_err(|e| body_error(url, e))
    }

    async fn fetch_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, TransportError> {
        let response = self.fetch_with_fallback(url).await?;
        let bytes = response.bytes().await.map_err(|e| body_error(url, e))?;
        Ok(bytes.to_vec())
    }
}
