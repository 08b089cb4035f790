//! Adaptive response-format resolution
//!
//! REST endpoints in the wild return inconsistent shapes for the same
//! logical dataset: a bare JSON array, a wrapped JSON object, or an ad-hoc
//! comma-delimited export. The resolver sniffs the body content itself (no
//! content-type negotiation) through an ordered fallback chain and always
//! yields a record sequence, empty at worst: a batch pipeline needs *some*
//! stream rather than a crash.

mod parsers;


use crate::types::RecordSequence;
use tracing::{debug, warn};

/// Which parser in the fallback chain produced the records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFormat {
    /// Body was a JSON array; records are its elements
    JsonArray,
    /// Body was a single JSON object, wrapped as a one-element sequence
    JsonObject,
    /// Body was a delimited table with a header row
    Table,
}

/// Format-sniffing resolver over the ordered fallback chain
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatResolver;

impl FormatResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    /// Parse a response body into records
    ///
    /// Total function: a body matching none of the formats yields an empty
    /// sequence, logged as a resolution failure, never an error.
    pub fn parse(&self, raw: &str) -> RecordSequence {
        match self.parse_tagged(raw) {
            Some((_, records)) => records,
            None => Vec::new(),
        }
    }

    /// Parse a response body, also reporting which format matched
    ///
    /// Returns `None` when no parser in the chain succeeded.
    pub fn parse_tagged(&self, raw: &str) -> Option<(ResolvedFormat, RecordSequence)> {
        match parsers::parse_json_array(raw) {
            Ok(records) => return Some((ResolvedFormat::JsonArray, records)),
            Err(e) => debug!(error = %e, "response is not a JSON array, trying JSON object"),
        }

        match parsers::parse_json_object(raw) {
            Ok(records) => return Some((ResolvedFormat::JsonObject, records)),
            Err(e) => debug!(error = %e, "response is not a JSON object, trying delimited table"),
        }

        match parsers::parse_table(raw) {
            Ok(records) => Some((ResolvedFormat::Table, records)),
            Err(e) => {
                warn!(error = %e, "response matched no format in the fallback chain, yielding empty sequence");
                None
            }
        }
    }
}
