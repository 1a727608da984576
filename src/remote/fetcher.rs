//! Bounded-concurrency upstream version fetching
//!
//! Lookups run at most `parallelism` at a time. Failures are pushed into a
//! reporting channel that a dedicated task drains for the duration of the
//! fetch; `fetch` only returns once every lookup has finished and the drain
//! task has seen the channel close.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use serde::{Serialize, Serializer};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::FetchError;
use crate::package::RemoteRecord;
use crate::remote::lookup::RemoteLookup;

/// Default number of concurrent upstream lookups
pub const DEFAULT_PARALLELISM: usize = 16;

/// Default timeout for a single upstream lookup
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A lookup that failed, with the name it was for
#[derive(Debug)]
pub struct FetchFailure {
    pub name: String,
    pub error: FetchError,
}

impl FetchFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self.error, FetchError::Timeout(_))
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot fetch {} upstream: {}", self.name, self.error)
    }
}

impl Serialize for FetchFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("FetchFailure", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("error", &self.error.to_string())?;
        state.end()
    }
}

/// Result of one fetch phase
///
/// Every requested name appears exactly once: either in `records` (found or
/// not found upstream) or in `failures`.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: HashMap<String, RemoteRecord>,
    pub failures: Vec<FetchFailure>,
}

/// Resolves upstream versions for many names with bounded parallelism
pub struct RemoteFetcher {
    lookup: Arc<dyn RemoteLookup>,
    parallelism: usize,
    timeout: Duration,
}

impl RemoteFetcher {
    pub fn new(lookup: Arc<dyn RemoteLookup>, parallelism: usize, timeout: Duration) -> Self {
        Self {
            lookup,
            parallelism: parallelism.max(1),
            timeout,
        }
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Look up a single name, bounded by the per-request timeout
    async fn fetch_one(&self, name: &str) -> Result<RemoteRecord, FetchError> {
        let version = timeout(self.timeout, self.lookup.lookup(name))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        Ok(match version {
            Some(version) => RemoteRecord::found(name, version),
            None => RemoteRecord::not_found(name),
        })
    }

    /// Fetch records for every name
    ///
    /// Duplicate names are looked up once. A failing or slow lookup never
    /// cancels the others.
    pub async fn fetch<I, S>(&self, names: I) -> FetchOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        debug!(
            "Fetching {} names upstream (parallelism {})",
            names.len(),
            self.parallelism
        );

        let (failure_tx, failure_rx) = mpsc::unbounded_channel();
        let drain = tokio::spawn(drain_failures(failure_rx));

        let records: HashMap<String, RemoteRecord> = stream::iter(names)
            .map(|name| {
                let failure_tx = failure_tx.clone();
                async move {
                    match self.fetch_one(&name).await {
                        Ok(record) => {
                            trace!("Fetched {}: {:?}", name, record.version);
                            Some((name, record))
                        }
                        Err(error) => {
                            // Receiver lives until the sender side closes
                            let _ = failure_tx.send(FetchFailure { name, error });
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.parallelism)
            .filter_map(futures::future::ready)
            .collect()
            .await;

        // Every lookup has finished; closing the last sender lets the drain end
        drop(failure_tx);
        let failures = match drain.await {
            Ok(failures) => failures,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        };

        debug!(
            "Fetch complete: {} records, {} failures",
            records.len(),
            failures.len()
        );

        FetchOutcome { records, failures }
    }
}

/// Collect failures until every sender is dropped
async fn drain_failures(mut rx: mpsc::UnboundedReceiver<FetchFailure>) -> Vec<FetchFailure> {
    let mut failures = Vec::new();
    while let Some(failure) = rx.recv().await {
        debug!("{}", failure);
        failures.push(failure);
    }
    failures
}
