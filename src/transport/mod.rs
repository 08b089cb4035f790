//! Single-shot HTTP transport
//!
//! Issues exactly one HTTP request per [`Transport::fetch`] call and returns
//! the body as text together with the measured latency. There is no retry
//! logic at this layer: upstream, the cached source absorbs failures under
//! its fail-soft contract, and callers that want retries own that decision.
//!
//! Connection lifecycle is owned by reqwest's pooled client, so the
//! connection is released on every exit path.

mod rate_limit;

pub use rate_limit::{RateLimiter, RateLimiterConfig};


use crate::error::{Error, Result};
use crate::request::RequestSpec;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for the transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Total request timeout (connect + read)
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Default headers applied before the spec's own headers
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
    /// Rate limiter configuration; `None` disables rate limiting
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_headers: HashMap::new(),
            user_agent: format!("restsource/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: Some(RateLimiterConfig::default()),
        }
    }
}

impl TransportConfig {
    /// Create a new config builder
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for [`TransportConfig`]
#[derive(Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Set the total request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connect timeout
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Add a default header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the rate limiter
    #[must_use]
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    #[must_use]
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Build the config
    pub fn build(self) -> TransportConfig {
        self.config
    }
}

/// The text body of one HTTP response plus the elapsed latency
///
/// Latency spans request issuance to last byte read, the boundary an
/// external latency logger is expected to record.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response body as text
    pub body: String,
    /// Duration from request issuance to body completion
    pub latency: Duration,
}

/// HTTP transport issuing one request per fetch
///
/// Cheap to clone: the underlying client and rate limiter are shared.
#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    config: TransportConfig,
    rate_limiter: Option<RateLimiter>,
}

impl Transport {
    /// Create a transport with default configuration
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: TransportConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Self {
            client,
            config,
            rate_limiter,
        }
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Issue the request described by `spec` and read the full body as text
    ///
    /// Returns a transport error on I/O failure or non-2xx status; never
    /// retries. Latency is measured from issuance to body completion.
    pub async fn fetch(&self, spec: &RequestSpec) -> Result<RawResponse> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let url = spec.url();
        let mut req = self.client.request(spec.method().into(), url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (name, value) in spec.headers() {
            req = req.header(name.as_str(), value.as_str());
        }

        if spec.method().has_body() {
            match spec.payload() {
                Some(payload) if !payload.is_empty() => {
                    req = req.body(payload.to_owned());
                }
                _ => {
                    warn!(method = %spec.method(), url, "no payload provided for body-carrying request");
                }
            }
        }

        let started = Instant::now();

        let response = req.send().await.map_err(|e| Error::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http_status(status.as_u16(), url));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(url, e))?;
        let latency = started.elapsed();

        debug!(
            url,
            status = status.as_u16(),
            bytes = body.len(),
            latency_ms = latency.as_millis() as u64,
            "fetch completed"
        );

        Ok(RawResponse { body, latency })
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
