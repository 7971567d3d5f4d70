use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::models::Package;
use crate::remote::PackageSearch;
use crate::store::Store;
use crate::types::ClientError;

/// What the search page shows.
///
/// While a query is loading, `query` is blank (summary hidden) and `results`
/// still holds the previous result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub loading: bool,
    pub results: Vec<Package>,
}

/// Issues package searches and makes sure only the response to the most
/// recently submitted query ever reaches the [`SearchState`] store, whatever
/// order the responses arrive in.
#[derive(Clone)]
pub struct SearchCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    searcher: Arc<dyn PackageSearch>,
    store: Store<SearchState>,
    ledger: Mutex<Ledger>,
    runtime: Handle,
}

struct Ledger {
    /// Generation of the newest submission; responses carrying an older one
    /// are stale.
    latest: u64,
    /// Query that produced the results currently on display.
    resolved_query: String,
    closed: bool,
}

impl SearchCoordinator {
    /// Creates a coordinator that runs its searches on the Tokio runtime of
    /// the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime; use
    /// [`with_runtime`](Self::with_runtime) there.
    pub fn new(searcher: Arc<dyn PackageSearch>, store: Store<SearchState>) -> Self {
        Self::with_runtime(searcher, store, Handle::current())
    }

    pub fn with_runtime(
        searcher: Arc<dyn PackageSearch>,
        store: Store<SearchState>,
        runtime: Handle,
    ) -> Self {
        let resolved_query = store.get().query.clone();
        Self {
            inner: Arc::new(Inner {
                searcher,
                store,
                ledger: Mutex::new(Ledger {
                    latest: 0,
                    resolved_query,
                    closed: false,
                }),
                runtime,
            }),
        }
    }

    pub fn store(&self) -> &Store<SearchState> {
        &self.inner.store
    }

    pub fn current_state(&self) -> Arc<SearchState> {
        self.inner.store.get()
    }

    /// Starts a search for `query` in the background and returns `Ok(true)`.
    ///
    /// Blank queries are ignored and return `Ok(false)`; submissions after
    /// [`close`](Self::close) fail with [`ClientError::Closed`]. Callable from
    /// any thread, but not from a subscriber of the search-state store.
    pub fn submit(&self, query: &str) -> Result<bool, ClientError> {
        let query = query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search query");
            return Ok(false);
        }

        let generation = {
            let mut ledger = self.inner.ledger();
            if ledger.closed {
                debug!(query, "Search coordinator closed, rejecting query");
                return Err(ClientError::Closed);
            }
            ledger.latest += 1;
            let previous = self.inner.store.get();
            self.inner.store.set(SearchState {
                query: String::new(),
                loading: true,
                results: previous.results.clone(),
            });
            ledger.latest
        };

        debug!(query, generation, "Submitting search");
        let inner = Arc::clone(&self.inner);
        let query = query.to_string();
        self.inner
            .runtime
            .spawn(async move { inner.resolve(generation, query).await });
        Ok(true)
    }

    /// Stops accepting queries; responses still in flight are discarded.
    ///
    /// A search left loading settles back to the last resolved query and its
    /// results.
    pub fn close(&self) {
        let mut ledger = self.inner.ledger();
        if ledger.closed {
            return;
        }
        ledger.closed = true;
        ledger.latest += 1;

        let current = self.inner.store.get();
        if current.loading {
            self.inner.store.set(SearchState {
                query: ledger.resolved_query.clone(),
                loading: false,
                results: current.results.clone(),
            });
        }
    }
}

impl Inner {
    async fn resolve(&self, generation: u64, query: String) {
        let outcome = self.searcher.search_packages(&query).await;

        // Freshness check and commit happen under the same lock as submit().
        let mut ledger = self.ledger();
        if ledger.closed || ledger.latest != generation {
            debug!(
                query = %query,
                generation,
                latest = ledger.latest,
                "Discarding stale search response"
            );
            return;
        }

        match outcome {
            Ok(results) => {
                info!(query = %query, count = results.len(), "Search resolved");
                ledger.resolved_query = query.clone();
                self.store.set(SearchState {
                    query,
                    loading: false,
                    results,
                });
            }
            Err(err) => {
                warn!(query = %query, error = ?err, "Search failed, keeping previous results");
                let previous = self.store.get();
                self.store.set(SearchState {
                    query: ledger.resolved_query.clone(),
                    loading: false,
                    results: previous.results.clone(),
                });
            }
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
