//! Mock implementations of auth traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{RefreshClient, RefreshFailure, RefreshOutcome, TokenPair};

/// Mock refresh client that answers from a script without network calls
///
/// Queued outcomes are returned first, in order; once the queue is empty the
/// fallback outcome is repeated.
///
/// # Examples
///
/// ```
/// use tradeport_common::auth::TokenPair;
/// use tradeport_common::testing::MockRefreshClient;
///
/// let client = MockRefreshClient::succeeding(TokenPair::new("A2", "R2"));
/// assert_eq!(client.call_count(), 0);
/// ```
#[derive(Debug)]
pub struct MockRefreshClient {
    queued: Mutex<VecDeque<RefreshOutcome>>,
    fallback: RefreshOutcome,
    calls: AtomicUsize,
    seen_tokens: Mutex<Vec<String>>,
    latency: Option<Duration>,
}

impl MockRefreshClient {
    /// Always succeed with `pair`
    #[must_use]
    pub fn succeeding(pair: TokenPair) -> Self {
        Self::with_fallback(RefreshOutcome::Success(pair))
    }

    /// Always fail with `failure`
    #[must_use]
    pub fn failing(failure: RefreshFailure) -> Self {
        Self::with_fallback(RefreshOutcome::Failure(failure))
    }

    fn with_fallback(fallback: RefreshOutcome) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
            seen_tokens: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// Return `outcome` on the next unanswered call
    #[must_use]
    pub fn then(self, outcome: RefreshOutcome) -> Self {
        self.queued.lock().push_back(outcome);
        self
    }

    /// Delay every answer, to widen race windows in concurrency tests
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of refresh calls received
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens presented, in call order
    #[must_use]
    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().clone()
    }
}

#[async_trait]
impl RefreshClient for MockRefreshClient {
    async fn refresh(&self, refresh_token: &str) -> RefreshOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens.lock().push(refresh_token.to_string());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let queued = self.queued.lock().pop_front();
        queued.unwrap_or_else(|| self.fallback.clone())
    }
}
