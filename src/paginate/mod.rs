//! Cursor-driven page collection
//!
//! Turns a chain of dependent HTTP calls into one logical record sequence.
//! Each page goes through a fresh [`CachedSource`] (every page is a distinct
//! request); qualifying sub-records accumulate in arrival order; the next
//! request is built from the cursor token found in the current page. The
//! first page without an extractable cursor terminates the loop.
//!
//! Pages are inherently serial: page N+1's request embeds page N's cursor.

mod extract;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use crate::request::RequestSpec;
use crate::source::CachedSource;
use crate::transport::Transport;
use crate::types::{OptionStringExt, RecordSequence};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for a pagination run
#[derive(Debug, Clone)]
pub struct PaginateConfig {
    /// Dot path to the cursor token inside a page's records
    /// (e.g. `paging.next.after`)
    pub cursor_path: String,
    /// Path selecting the qualifying sub-records of each page
    /// (e.g. `results[*].properties`); `None` accumulates whole page records
    pub record_path: Option<String>,
    /// Ceiling on the number of pages; `None` means unbounded
    pub max_pages: Option<u32>,
    /// Ceiling on total elapsed time; `None` means unbounded
    pub max_elapsed: Option<Duration>,
}

impl PaginateConfig {
    /// Create a config for the given cursor path, unbounded by default
    ///
    /// A misbehaving API that always returns a cursor will loop forever
    /// under the defaults; set `max_pages`/`max_elapsed` to bound the run.
    pub fn new(cursor_path: impl Into<String>) -> Self {
        Self {
            cursor_path: cursor_path.into(),
            record_path: None,
            max_pages: None,
            max_elapsed: None,
        }
    }

    /// Select qualifying sub-records from each page
    #[must_use]
    pub fn with_record_path(mut self, path: impl Into<String>) -> Self {
        self.record_path = Some(path.into());
        self
    }

    /// Bound the number of pages
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Bound the total elapsed time
    #[must_use]
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = Some(max_elapsed);
        self
    }
}

/// Drives repeated cached-source fetches along a cursor chain
#[derive(Debug, Clone)]
pub struct PageCollector {
    transport: Transport,
    config: PaginateConfig,
}

impl PageCollector {
    /// Create a collector over the given transport
    pub fn new(transport: Transport, config: PaginateConfig) -> Self {
        Self { transport, config }
    }

    /// Collect all pages starting from `initial`, building each subsequent
    /// request with `next_spec` applied to the extracted cursor token
    ///
    /// A fetch failure on any page degrades that page to an empty sequence
    /// (the cached source's fail-soft contract); an empty page without a
    /// cursor ends pagination naturally. The only errors raised are a
    /// failing `next_spec` builder and configured ceiling violations.
    pub async fn collect<F>(&self, initial: RequestSpec, mut next_spec: F) -> Result<RecordSequence>
    where
        F: FnMut(&str) -> Result<RequestSpec>,
    {
        let started = Instant::now();
        let mut spec = initial;
        let mut accumulated = RecordSequence::new();
        let mut pages: u32 = 0;

        loop {
            if let Some(max_pages) = self.config.max_pages {
                if pages >= max_pages {
                    warn!(max_pages, "pagination exceeded the configured page ceiling");
                    return Err(Error::PageLimitExceeded { max_pages });
                }
            }
            if let Some(max_elapsed) = self.config.max_elapsed {
                if started.elapsed() > max_elapsed {
                    warn!(
                        max_elapsed_ms = max_elapsed.as_millis() as u64,
                        "pagination exceeded the configured time ceiling"
                    );
                    return Err(Error::TimeLimitExceeded {
                        max_elapsed_ms: max_elapsed.as_millis() as u64,
                    });
                }
            }

            // Fresh source per page: each page is a distinct request
            let source = CachedSource::new(self.transport.clone(), spec.clone());
            let page = source.get().await;
            pages += 1;

            let matched = match &self.config.record_path {
                Some(path) => extract::sub_records(&page, path)?,
                None => page.as_ref().clone(),
            };
            debug!(
                page = pages,
                page_records = page.len(),
                matched = matched.len(),
                "collected page"
            );
            accumulated.extend(matched);

            // Absent or empty token is the terminal state
            match extract::cursor(&page, &self.config.cursor_path).none_if_empty() {
                Some(token) => spec = next_spec(&token)?,
                None => break,
            }
        }

        info!(
            pages,
            records = accumulated.len(),
            "pagination complete"
        );
        Ok(accumulated)
    }
}
