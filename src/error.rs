//! Error types for the restsource connector
//!
//! This module defines the error hierarchy for the whole crate.
//! All public fallible APIs return `Result<T, Error>` where Error is defined
//! here. Most error classes never escape the connector boundary: transport
//! and parse failures are absorbed by the cached source, estimation failures
//! degrade to a fallback estimate. The errors that do reach callers are
//! construction-time policy violations and configured pagination ceilings.

use thiserror::Error;

/// The main error type for the restsource connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration / Credential Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing credential: {key}")]
    MissingCredential { key: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Request Construction Errors
    // ============================================================================
    #[error("Request policy violation: {message}")]
    PolicyViolation { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Transport failure for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to resolve response format: {message}")]
    Resolve { message: String },

    #[error("Record extraction failed for path '{path}': {message}")]
    RecordExtraction { path: String, message: String },

    // ============================================================================
    // Estimation Errors
    // ============================================================================
    #[error("Cardinality estimation failed: {message}")]
    Estimation { message: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Pagination anomaly: {message}")]
    PaginationAnomaly { message: String },

    #[error("Pagination exceeded the configured page ceiling of {max_pages}")]
    PageLimitExceeded { max_pages: u32 },

    #[error("Pagination exceeded the configured time ceiling of {max_elapsed_ms}ms")]
    TimeLimitExceeded { max_elapsed_ms: u64 },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing credential error
    pub fn missing_credential(key: impl Into<String>) -> Self {
        Self::MissingCredential { key: key.into() }
    }

    /// Create a policy violation error
    pub fn policy(message: impl Into<String>) -> Self {
        Self::PolicyViolation {
            message: message.into(),
        }
    }

    /// Create a transport error carrying the request URL and underlying cause
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    /// Create a format resolution error
    pub fn resolve(message: impl Into<String>) -> Self {
        Self::Resolve {
            message: message.into(),
        }
    }

    /// Create a record extraction error
    pub fn record_extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an estimation error
    pub fn estimation(message: impl Into<String>) -> Self {
        Self::Estimation {
            message: message.into(),
        }
    }

    /// Create a pagination anomaly error
    pub fn pagination(message: impl Into<String>) -> Self {
        Self::PaginationAnomaly {
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Check if this error belongs to the transport class that the cached
    /// source absorbs under the fail-soft contract
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::HttpStatus { .. } | Error::InvalidUrl(_)
        )
    }
}

/// Result type alias for the restsource connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
