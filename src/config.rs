//! Credentials and caller-supplied configuration
//!
//! The connector core holds no process-wide mutable state: API tokens and
//! account identifiers are carried in an explicit [`Credentials`] value that
//! the caller constructs in code or loads from a YAML/JSON file and passes
//! into request builders (usually through the template context).

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// An explicit key→value credential map supplied by the caller
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Credentials {
    entries: BTreeMap<String, String>,
}

impl Credentials {
    /// Create an empty credential map
    pub fn new() -> Self {
        Self::default()
    }

    /// Load credentials from a YAML or JSON file
    ///
    /// YAML is a superset of JSON, so a flat JSON object parses too.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let creds: Credentials = serde_yaml::from_str(&contents)?;
        Ok(creds)
    }

    /// Insert a credential, replacing any previous value for the key
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Get a credential by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get a credential by key, or fail with a `MissingCredential` error
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| Error::missing_credential(key))
    }

    /// Number of stored credentials
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the credential map as a JSON object for template contexts
    pub fn to_context(&self) -> JsonValue {
        let map = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
            .collect::<serde_json::Map<_, _>>();
        JsonValue::Object(map)
    }
}

// Secrets stay out of logs: Debug prints keys only.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Capability for supplying credentials to request builders
pub trait CredentialProvider: Send + Sync {
    /// Produce the credential map
    fn credentials(&self) -> Result<Credentials>;
}

impl CredentialProvider for Credentials {
    fn credentials(&self) -> Result<Credentials> {
        Ok(self.clone())
    }
}

/// Credential provider backed by a YAML/JSON file, read on each call
#[derive(Debug, Clone)]
pub struct FileCredentials {
    path: std::path::PathBuf,
}

impl FileCredentials {
    /// Create a provider reading from the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CredentialProvider for FileCredentials {
    fn credentials(&self) -> Result<Credentials> {
        Credentials::from_file(&self.path)
    }
}
