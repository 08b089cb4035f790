//! Request specification
//!
//! [`RequestSpec`] is the immutable description of one HTTP fetch: URL,
//! method, ordered headers, and an optional body payload. Headers are
//! commonly supplied as a single `;`-delimited string
//! (`"Accept: json; Authorization: Bearer x"`); malformed entries in that
//! string are skipped with a warning, never fatal.
//!
//! Business policy (e.g. an allow-list for POST targets) is injected through
//! [`RequestValidator`], keeping the connector core policy-free.

mod validate;

pub use validate::{AllowAll, PostAllowList, RequestValidator};


use crate::error::Result;
use crate::types::Method;
use tracing::warn;

/// Immutable description of one HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    url: String,
    method: Method,
    headers: Vec<(String, String)>,
    payload: Option<String>,
}

impl RequestSpec {
    /// Start building a spec for the given URL
    pub fn builder(url: impl Into<String>) -> RequestSpecBuilder {
        RequestSpecBuilder {
            url: url.into(),
            method: Method::default(),
            headers: Vec::new(),
            payload: None,
        }
    }

    /// Request URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP method
    pub fn method(&self) -> Method {
        self.method
    }

    /// Headers in declaration order
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Optional request body
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Stable key for optimizer-side memoization of per-spec derived values
    /// (e.g. cardinality estimates within one planning job)
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// Builder for [`RequestSpec`]
#[derive(Debug, Clone)]
pub struct RequestSpecBuilder {
    url: String,
    method: Method,
    headers: Vec<(String, String)>,
    payload: Option<String>,
}

impl RequestSpecBuilder {
    /// Set the HTTP method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the HTTP method from a case-insensitive string
    pub fn method_str(mut self, method: &str) -> Result<Self> {
        self.method = method.parse()?;
        Ok(self)
    }

    /// Add a single header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add headers from a `;`-delimited, `:`-split header string
    ///
    /// Malformed entries are skipped with a warning.
    #[must_use]
    pub fn headers_str(mut self, raw: &str) -> Self {
        self.headers.extend(parse_header_str(raw));
        self
    }

    /// Set the request body
    #[must_use]
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Build the spec without policy checks
    pub fn build(self) -> RequestSpec {
        RequestSpec {
            url: self.url,
            method: self.method,
            headers: self.headers,
            payload: self.payload,
        }
    }

    /// Build the spec, checking the URL shape and the injected policy
    ///
    /// Policy violations are caller programming errors and raise here,
    /// synchronously, rather than surfacing as degraded fetch results.
    pub fn build_validated(self, validator: &dyn RequestValidator) -> Result<RequestSpec> {
        url::Url::parse(&self.url)?;
        let spec = self.build();
        validator.validate(&spec)?;
        Ok(spec)
    }
}

/// Parse a `;`-delimited, first-`:`-split header string into ordered pairs
///
/// `"Accept: json; X-Token : abc"` yields `[("Accept","json"),
/// ("X-Token","abc")]`. Entries without a colon or with an empty name are
/// skipped with a warning.
pub fn parse_header_str(raw: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for entry in raw.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        match entry.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                pairs.push((name.trim().to_string(), value.trim().to_string()));
            }
            _ => {
                warn!(header = entry, "invalid header format, skipping");
            }
        }
    }

    pairs
}
