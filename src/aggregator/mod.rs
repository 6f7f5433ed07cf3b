//! Ordered fan-out fetch aggregation
//!
//! One aggregate dispatches a fetch per [`ResourceRequest`], polls them all
//! concurrently on the calling task, records each outcome into the slot named
//! by the request's position, and produces a single ordered result once the
//! last fetch settles. Completion order never affects output order.
//!
//! # Failure policy
//!
//! - A failed fetch still settles its slot, so one broken article cannot stall
//!   the aggregate.
//! - Some failures: the result keeps every slot, failures included, so callers
//!   can render placeholders at the failed positions.
//! - Every fetch failed: [`Error::AllFetchesFailed`].
//! - No requests: an empty result, without dispatching anything.

mod state;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;

use std::collections::HashSet;
use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{Event, FetchOutcome, ResourceRequest};

pub use state::{AggregationState, IgnoredSettlement, Settlement};

/// Dispatches ordered fan-out fetches
///
/// The aggregator itself is stateless; every call to
/// [`aggregate`](Self::aggregate) owns a fresh [`AggregationState`], so
/// concurrent aggregates never share slots.
#[derive(Clone, Debug, Default)]
pub struct FanOutAggregator {
    event_tx: Option<broadcast::Sender<Event>>,
}

impl FanOutAggregator {
    /// Aggregator without event reporting
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator that reports progress on `event_tx`
    pub fn with_events(event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            event_tx: Some(event_tx),
        }
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.event_tx {
            // No subscribers is fine
            tx.send(event).ok();
        }
    }

    /// Fetch every request concurrently and return the outcomes in request order
    ///
    /// `fetch` receives each request by value; the slot it settles is the
    /// position carried by that request, captured before the fetch starts.
    ///
    /// # Errors
    /// - [`Error::AllFetchesFailed`] if there was at least one request and all failed
    /// - [`Error::Other`] if request positions are not `0..len` without gaps or repeats
    pub async fn aggregate<T, F, Fut>(
        &self,
        requests: Vec<ResourceRequest>,
        fetch: F,
    ) -> Result<Vec<FetchOutcome<T>>>
    where
        F: Fn(ResourceRequest) -> Fut,
        Fut: Future<Output = FetchOutcome<T>>,
    {
        check_positions(&requests)?;

        let total = requests.len();
        let mut state = AggregationState::new(total);

        let mut pending: FuturesUnordered<_> = requests
            .into_iter()
            .map(|request| {
                self.emit(Event::FetchStarted {
                    id: request.id.clone(),
                    position: request.position,
                });
                let position = request.position;
                let id = request.id.clone();
                let fetching = fetch(request);
                async move { (position, id, fetching.await) }
            })
            .collect();

        debug!(total, "dispatched article fetches");

        while let Some((position, id, outcome)) = pending.next().await {
            let success = !outcome.is_failure();
            if let Some(e) = outcome.failure() {
                warn!(article = %id, position, error = %e, "article fetch failed");
            }
            match state.settle(position, outcome) {
                Settlement::Pending { remaining } => {
                    debug!(article = %id, position, remaining, "article settled");
                    self.emit(Event::FetchSettled {
                        id,
                        position,
                        success,
                        remaining,
                    });
                }
                Settlement::Complete => {
                    debug!(article = %id, position, "last article settled");
                    self.emit(Event::FetchSettled {
                        id,
                        position,
                        success,
                        remaining: 0,
                    });
                }
                Settlement::Ignored(reason) => {
                    warn!(article = %id, position, ?reason, "settlement ignored");
                }
            }
        }

        let result = state.finish().unwrap_or_else(|| {
            Err(Error::Other(format!(
                "aggregate ended with {} unsettled slots",
                state.remaining()
            )))
        });

        match &result {
            Ok(outcomes) => {
                let failed = outcomes.iter().filter(|o| o.is_failure()).count();
                info!(total, failed, "article aggregate complete");
                self.emit(Event::AggregateComplete { total, failed });
            }
            Err(e) => {
                warn!(total, error = %e, "article aggregate failed");
                self.emit(Event::AggregateFailed { total });
            }
        }

        result
    }

    /// Callback form of [`aggregate`](Self::aggregate)
    ///
    /// Exactly one of `on_complete` and `on_error` runs, exactly once.
    pub async fn run<T, F, Fut, C, E>(
        &self,
        requests: Vec<ResourceRequest>,
        fetch: F,
        on_complete: C,
        on_error: E,
    ) where
        F: Fn(ResourceRequest) -> Fut,
        Fut: Future<Output = FetchOutcome<T>>,
        C: FnOnce(Vec<FetchOutcome<T>>),
        E: FnOnce(Error),
    {
        match self.aggregate(requests, fetch).await {
            Ok(outcomes) => on_complete(outcomes),
            Err(e) => on_error(e),
        }
    }
}

fn check_positions(requests: &[ResourceRequest]) -> Result<()> {
    let mut seen = HashSet::with_capacity(requests.len());
    for request in requests {
        if request.position >= requests.len() || !seen.insert(request.position) {
            return Err(Error::Other(format!(
                "request for {} has position {} outside a dense 0..{} range",
                request.id,
                request.position,
                requests.len()
            )));
        }
    }
    Ok(())
}
