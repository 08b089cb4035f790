//! Fetch-once cached record source
//!
//! [`CachedSource`] wraps the transport and the format resolver behind a
//! single-fetch memoization: the first `get()` performs the fetch and parse
//! and stores the materialized sequence; every later call returns the same
//! `Arc` without touching the network. A transport failure is absorbed into
//! an empty cached sequence (fail-soft), so an unreachable source degrades
//! to zero records instead of aborting the caller's pipeline.


use crate::request::RequestSpec;
use crate::resolve::FormatResolver;
use crate::transport::Transport;
use crate::types::{RecordSequence, SharedRecords};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Outcome of the one-and-only fetch, held for the source's lifetime
#[derive(Debug, Clone)]
struct FetchOutcome {
    records: SharedRecords,
    latency: Option<Duration>,
    failed: bool,
}

/// A record source that fetches at most once and memoizes the result
///
/// Each instance owns its own cache slot, so independent sources can run on
/// separate tasks with no shared mutable state. The slot is a
/// `tokio::sync::OnceCell`: explicit unfetched/fetched state with a
/// single-writer guarantee even if `get()` races on a shared instance.
#[derive(Debug)]
pub struct CachedSource {
    transport: Transport,
    resolver: FormatResolver,
    spec: RequestSpec,
    cell: OnceCell<FetchOutcome>,
}

impl CachedSource {
    /// Create a source for the given request
    pub fn new(transport: Transport, spec: RequestSpec) -> Self {
        Self {
            transport,
            resolver: FormatResolver::new(),
            spec,
            cell: OnceCell::new(),
        }
    }

    /// The request this source fetches
    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    /// Return the materialized record sequence, fetching on first call
    ///
    /// Idempotent: repeated calls return the identical `Arc` (checkable with
    /// `Arc::ptr_eq`) and never re-hit the network, even after a failed
    /// fetch.
    pub async fn get(&self) -> SharedRecords {
        if let Some(outcome) = self.cell.get() {
            debug!(url = self.spec.url(), "returning cached response");
            return outcome.records.clone();
        }

        let outcome = self
            .cell
            .get_or_init(|| async { self.fetch_once().await })
            .await;
        outcome.records.clone()
    }

    /// Whether the fetch has happened (successfully or not)
    pub fn is_fetched(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Whether the one fetch failed and was degraded to an empty sequence
    ///
    /// `false` until the fetch has happened.
    pub fn fetch_failed(&self) -> bool {
        self.cell.get().is_some_and(|o| o.failed)
    }

    /// Latency of the successful fetch, for an external latency logger
    pub fn latency(&self) -> Option<Duration> {
        self.cell.get().and_then(|o| o.latency)
    }

    async fn fetch_once(&self) -> FetchOutcome {
        info!(url = self.spec.url(), "fetching new data from source");

        match self.transport.fetch(&self.spec).await {
            Ok(raw) => {
                let records = self.resolver.parse(&raw.body);
                debug!(
                    url = self.spec.url(),
                    records = records.len(),
                    latency_ms = raw.latency.as_millis() as u64,
                    "materialized record sequence"
                );
                FetchOutcome {
                    records: Arc::new(records),
                    latency: Some(raw.latency),
                    failed: false,
                }
            }
            Err(e) => {
                error!(
                    url = self.spec.url(),
                    error = %e,
                    "unable to fetch from source, degrading to empty record sequence"
                );
                FetchOutcome {
                    records: Arc::new(RecordSequence::new()),
                    latency: None,
                    failed: true,
                }
            }
        }
    }
}
