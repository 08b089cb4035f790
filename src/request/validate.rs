//! Injectable request policy
//!
//! Some deployments constrain where mutating requests may go (e.g. POST only
//! to one vetted search endpoint). That is domain policy, not a connector
//! rule, so it lives behind the [`RequestValidator`] capability and is
//! applied at validated construction time.

use super::RequestSpec;
use crate::error::{Error, Result};
use crate::types::Method;

/// Predicate over a [`RequestSpec`], applied at validated construction
pub trait RequestValidator: Send + Sync {
    /// Check the spec, returning a `PolicyViolation` error when it is
    /// disallowed
    fn validate(&self, spec: &RequestSpec) -> Result<()>;
}

/// Validator that accepts every request
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl RequestValidator for AllowAll {
    fn validate(&self, _spec: &RequestSpec) -> Result<()> {
        Ok(())
    }
}

/// Validator constraining POST requests to an allow-listed set of URL
/// prefixes
///
/// Non-POST requests pass unchecked.
#[derive(Debug, Clone)]
pub struct PostAllowList {
    prefixes: Vec<String>,
}

impl PostAllowList {
    /// Create an allow-list from URL prefixes
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl RequestValidator for PostAllowList {
    fn validate(&self, spec: &RequestSpec) -> Result<()> {
        if spec.method() != Method::POST {
            return Ok(());
        }

        if self.prefixes.iter().any(|p| spec.url().starts_with(p)) {
            Ok(())
        } else {
            Err(Error::policy(format!(
                "POST requests are not allowed to {}",
                spec.url()
            )))
        }
    }
}
