//! Aggregation Orchestrator
//!
//! Fans out one upstream call per source concurrently, waits for every
//! call to settle, and assembles the per-source card lists under a
//! partial-degradation policy: an optional source that fails terminally
//! renders as an empty section, a strict source that fails terminally
//! fails the whole aggregate. A failure in one source never cancels its
//! siblings.

use futures::future;
use thiserror::Error;
use tracing::warn;

use crate::models::{AggregateFeed, DramaCard};
use crate::services::upstream::{coerce_to_list, normalize_card, FetchFailure, UpstreamClient};

/// One upstream source of an aggregate
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub name: String,
    pub path: String,
    /// Optional sources degrade to empty on terminal failure instead of
    /// failing the aggregate
    pub optional: bool,
}

impl SourceSpec {
    pub fn strict(name: &str, path: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            optional: false,
        }
    }

    pub fn optional(name: &str, path: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            optional: true,
        }
    }
}

/// Terminal failure of a strict source, escalated to the caller
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("source '{source}' failed: {failure}")]
    Source {
        source: String,
        #[source]
        failure: FetchFailure,
    },
}

/// Orchestrates concurrent upstream fan-out for one page aggregate
pub struct Aggregator {
    client: UpstreamClient,
    feed_page_size: usize,
}

impl Aggregator {
    pub fn new(client: UpstreamClient, feed_page_size: usize) -> Self {
        Self {
            client,
            feed_page_size,
        }
    }

    /// Borrow the underlying client for single-call paths
    pub fn client(&self) -> &UpstreamClient {
        &self.client
    }

    /// Normalize a raw listing body into capped canonical cards
    fn to_cards(&self, raw: serde_json::Value) -> Vec<DramaCard> {
        coerce_to_list(raw)
            .iter()
            .filter_map(normalize_card)
            .take(self.feed_page_size)
            .collect()
    }

    /// Fetch every source concurrently and assemble the feed.
    ///
    /// All calls are joined to completion (settle semantics); each call
    /// owns its own timeout and retry pacing, so siblings neither block
    /// nor cancel each other.
    pub async fn aggregate(
        &self,
        sources: Vec<SourceSpec>,
    ) -> Result<AggregateFeed, AggregateError> {
        let calls = sources.iter().map(|source| self.client.fetch(&source.path));
        let outcomes = future::join_all(calls).await;

        let mut feed = AggregateFeed::default();
        for (source, outcome) in sources.into_iter().zip(outcomes) {
            match outcome {
                Ok(raw) => {
                    feed.sections.insert(source.name, self.to_cards(raw));
                }
                Err(failure) if source.optional => {
                    warn!(
                        "source" = %source.name,
                        "error" = %failure,
                        "optional source degraded to empty"
                    );
                    feed.sections.insert(source.name, Vec::new());
                }
                Err(failure) => {
                    return Err(AggregateError::Source {
                        source: source.name,
                        failure,
                    });
                }
            }
        }

        Ok(feed)
    }
}
