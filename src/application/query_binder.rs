// Query binder - session-scoped cache with single-flight dispatch
use crate::application::gateway_port::{QueryExecutor, TokenProvider};
use crate::domain::layout::Row;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// Final state of one cache entry. An entry transitions exactly once,
/// from pending to one of these, and is never retried or invalidated
/// within the binder's lifetime.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Ready(Arc<Vec<Row>>),
    Failed(String),
}

impl QueryOutcome {
    /// The rows to render from. A failed query renders from the empty
    /// sequence, with the error surfaced separately.
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Ready(rows) => rows,
            Self::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Failed(message) => Some(message),
        }
    }
}

enum Slot {
    /// A request is in flight. Waiters subscribe to the channel and
    /// re-check the map once it fires.
    Pending(watch::Receiver<bool>),
    Done(QueryOutcome),
}

/// What a caller decided to do while it held the map lock.
enum Plan {
    /// This caller claimed the slot and owns the one outbound request.
    Lead(watch::Sender<bool>),
    /// Another request is in flight; wait for its completion signal.
    Wait(watch::Receiver<bool>),
}

/// Memoization cache keyed by the literal query string, scoped to one
/// dashboard render session. Identical query strings across blocks share
/// one entry and one outbound request.
///
/// The single-flight guard is the load-bearing contract here: a caller
/// observing a pending slot clones its receiver while still holding the
/// map lock, so the completing writer (which takes the lock before
/// sending) cannot signal before the waiter is subscribed.
pub struct QueryBinder {
    executor: Arc<dyn QueryExecutor>,
    tokens: Arc<dyn TokenProvider>,
    cache: Mutex<HashMap<String, Slot>>,
}

impl QueryBinder {
    pub fn new(executor: Arc<dyn QueryExecutor>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            executor,
            tokens,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve one query string, reusing the cache entry if it exists.
    /// At most one outbound request is issued per distinct query string
    /// for the lifetime of this binder.
    pub async fn fetch(&self, query: &str) -> QueryOutcome {
        loop {
            let plan = {
                let mut cache = self.cache.lock().await;
                match cache.get(query) {
                    Some(Slot::Done(outcome)) => return outcome.clone(),
                    // A closed channel means the leader future was dropped
                    // mid-flight; that slot is dead and gets reclaimed.
                    Some(Slot::Pending(rx)) if rx.has_changed().is_ok() => {
                        Plan::Wait(rx.clone())
                    }
                    _ => {
                        let (tx, rx) = watch::channel(false);
                        cache.insert(query.to_string(), Slot::Pending(rx));
                        Plan::Lead(tx)
                    }
                }
            };

            match plan {
                Plan::Lead(tx) => {
                    let outcome = self.execute(query).await;
                    let mut cache = self.cache.lock().await;
                    cache.insert(query.to_string(), Slot::Done(outcome.clone()));
                    let _ = tx.send(true);
                    return outcome;
                }
                // Wait for the in-flight request, then re-read the cache.
                Plan::Wait(mut rx) => {
                    let _ = rx.changed().await;
                }
            }
        }
    }

    /// Non-blocking view of the cache. Queries with a request still in
    /// flight are absent, which the renderer maps to a loading state.
    pub async fn snapshot(&self) -> HashMap<String, QueryOutcome> {
        let cache = self.cache.lock().await;
        cache
            .iter()
            .filter_map(|(query, slot)| match slot {
                Slot::Done(outcome) => Some((query.clone(), outcome.clone())),
                Slot::Pending(_) => None,
            })
            .collect()
    }

    /// Obtain a fresh token and run the query. Every failure path lands
    /// in `QueryOutcome::Failed`; nothing escapes as an error.
    async fn execute(&self, query: &str) -> QueryOutcome {
        let token = match self.tokens.get_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!("query dropped: no session token available");
                return QueryOutcome::Failed(
                    "authentication required: no session token available".to_string(),
                );
            }
            Err(e) => {
                tracing::warn!("query dropped: token retrieval failed: {e:#}");
                return QueryOutcome::Failed(format!("authentication failed: {e:#}"));
            }
        };

        match self.executor.run_query(query, &token).await {
            Ok(rows) => QueryOutcome::Ready(Arc::new(rows)),
            Err(e) => {
                tracing::warn!("query failed: {e:#}");
                QueryOutcome::Failed(format!("query failed: {e:#}"))
            }
        }
    }
}
