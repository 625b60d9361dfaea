//! Fetch orchestration for the user list.
//!
//! `UserQuery` coordinates one logical fetch at a time, keyed by the
//! committed search term: Loading, then fetch with a bounded retry budget,
//! then snapshot write, then Success - or Error once the budget is
//! exhausted. A newer committed term supersedes any in-flight fetch for an
//! older one; the superseded result is dropped when it eventually arrives,
//! so the surfaced state always belongs to the current term.
//!
//! The fetch itself runs in a spawned task and reports back over an mpsc
//! channel; `poll()` drains that channel from the event loop tick.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cache::SnapshotCache;
use crate::models::User;

/// Total attempts per committed term. Retries are immediate with no
/// backoff; the request is an idempotent GET so repeating it is safe.
const FETCH_ATTEMPTS: u32 = 3;

/// Result of the fetch operation for the current committed term.
#[derive(Debug, Clone)]
pub enum FetchState {
    /// No term has been committed yet
    Idle,
    /// A fetch for the committed term is in flight
    Loading,
    /// The committed term's fetch succeeded
    Success(Vec<User>),
    /// The committed term's fetch failed after the retry budget
    Error(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&[User]> {
        match self {
            FetchState::Success(users) => Some(users),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// A boxed future resolving to the fetched user list
type BoxFuture = Pin<Box<dyn Future<Output = Result<Vec<User>, String>> + Send>>;

/// Factory producing one fetch attempt for a given term
type FetcherFn = Arc<dyn Fn(String) -> BoxFuture + Send + Sync>;

/// Outcome sent back from the fetch task, tagged with the term that
/// produced it so stale completions can be told apart from current ones.
struct FetchOutcome {
    term: String,
    result: Result<Vec<User>, String>,
}

pub struct UserQuery {
    state: FetchState,
    /// The committed term that triggered the in-flight or most recently
    /// completed fetch.
    term: String,
    receiver: Option<mpsc::UnboundedReceiver<FetchOutcome>>,
    fetcher: FetcherFn,
    cache: SnapshotCache,
    cache_error: Option<String>,
}

impl UserQuery {
    /// Create a query around a fetcher closure.
    ///
    /// The closure is invoked once per attempt; production wires it to
    /// `ApiClient::fetch_users`.
    pub fn new<F, Fut>(cache: SnapshotCache, fetcher: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<User>, String>> + Send + 'static,
    {
        Self {
            state: FetchState::Idle,
            term: String::new(),
            receiver: None,
            fetcher: Arc::new(move |term| Box::pin(fetcher(term))),
            cache,
            cache_error: None,
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// The committed term the current state belongs to.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Error from the most recent snapshot write, if it failed. A write
    /// failure never demotes a Success state; it is only surfaced here.
    pub fn last_cache_error(&self) -> Option<&str> {
        self.cache_error.as_deref()
    }

    /// Commit a term and start fetching for it.
    ///
    /// Re-committing the term the query already holds is a no-op, so rapid
    /// identical commits never duplicate network calls. A different term
    /// drops the pending receiver (soft cancellation) and starts over.
    pub fn set_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.term && !matches!(self.state, FetchState::Idle) {
            return;
        }
        self.term = term.clone();
        self.start_fetch(term);
    }

    /// Re-run the current committed term unconditionally (startup, manual
    /// refresh).
    pub fn refetch(&mut self) {
        self.start_fetch(self.term.clone());
    }

    fn start_fetch(&mut self, term: String) {
        let (tx, rx) = mpsc::unbounded_channel();
        // Replacing the receiver drops the old one; a superseded task's send
        // then fails silently and its result never surfaces.
        self.receiver = Some(rx);
        self.state = FetchState::Loading;

        let fetcher = Arc::clone(&self.fetcher);
        tokio::spawn(async move {
            let mut last_error = String::new();
            for attempt in 1..=FETCH_ATTEMPTS {
                match fetcher(term.clone()).await {
                    Ok(users) => {
                        let _ = tx.send(FetchOutcome {
                            term,
                            result: Ok(users),
                        });
                        return;
                    }
                    Err(e) => {
                        debug!(attempt, error = %e, "Fetch attempt failed");
                        last_error = e;
                    }
                }
            }
            let _ = tx.send(FetchOutcome {
                term,
                result: Err(last_error),
            });
        });
    }

    /// Drain the pending fetch result, if any. Returns `true` when the
    /// state changed. Call this from the event loop tick.
    pub fn poll(&mut self) -> bool {
        let outcome = {
            let receiver = match &mut self.receiver {
                Some(rx) => rx,
                None => return false,
            };
            match receiver.try_recv() {
                Ok(outcome) => outcome,
                Err(mpsc::error::TryRecvError::Empty) => return false,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    // Task ended without sending - only happens on panic
                    self.receiver = None;
                    self.state = FetchState::Error("fetch task stopped unexpectedly".to_string());
                    return true;
                }
            }
        };
        self.receiver = None;

        // A result tagged with a superseded term is never applied, no
        // matter when it arrives.
        if outcome.term != self.term {
            debug!(stale = %outcome.term, current = %self.term, "Discarding superseded fetch result");
            return false;
        }

        match outcome.result {
            Ok(users) => {
                // The snapshot tracks the last successful fetch only; the
                // term-match check above also suppresses writes from
                // superseded fetches.
                match self.cache.save(&users) {
                    Ok(()) => self.cache_error = None,
                    Err(e) => {
                        warn!(error = %e, "Failed to write snapshot");
                        self.cache_error = Some(e.to_string());
                    }
                }
                self.state = FetchState::Success(users);
            }
            Err(e) => {
                self.state = FetchState::Error(e);
            }
        }
        true
    }
}

impl std::fmt::Debug for UserQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserQuery")
            .field("state", &self.state)
            .field("term", &self.term)
            .field("in_flight", &self.receiver.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
