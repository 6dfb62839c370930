//! Per-request cancellation and deadline.
//!
//! Every engine operation takes a [`RequestContext`]. Store calls are raced
//! against the context: when the token fires or the deadline passes, the
//! in-flight store futures are dropped, which aborts them, and the operation
//! returns [`RankError::Cancelled`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{CancelReason, RankError};
use crate::store::StoreError;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that never cancels on its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline(Instant::now() + timeout)
    }

    /// A context driven by an existing token (e.g. a server shutdown token).
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set or replace the deadline.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel every operation running under this context (and its clones).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The reason this context is already done, if it is.
    pub fn done(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            Some(CancelReason::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(CancelReason::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Drive a store future to completion unless the context fires first.
    pub(crate) async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T, RankError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        if let Some(reason) = self.done() {
            return Err(RankError::Cancelled { operation, reason });
        }

        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(RankError::Cancelled {
                operation,
                reason: CancelReason::Cancelled,
            }),
            _ = expiry => Err(RankError::Cancelled {
                operation,
                reason: CancelReason::DeadlineExceeded,
            }),
            result = fut => result.map_err(|source| {
                tracing::warn!(operation, error = %source, "score store request failed");
                RankError::store(operation, source)
            }),
        }
    }
}
