//! The retry engine.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::cancel::{CancelError, CancelToken};
use crate::delay::{Delayer, ExpDelayer};
use crate::retry::error::Failure;
use crate::retry::outcome::{Attempt, RetryResult};
use crate::wait;

/// Drives one fallible operation to completion under a delay policy, an
/// attempt ceiling, and a cancellation token.
///
/// A `Retryer` is immutable configuration; it can be cloned and shared
/// across any number of concurrent [`retry`](Self::retry) calls. The
/// default configuration retries forever with the default exponential
/// delayer.
///
/// # Examples
///
/// ```rust
/// use eddy::{CancelToken, ConstantDelayer, Failure, Retryer};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let retryer = Retryer::new()
///     .with_delayer(ConstantDelayer::new(Duration::from_millis(1)))
///     .with_max_attempts(5);
///
/// let result = retryer
///     .retry(&CancelToken::new(), |_| async { Ok::<_, Failure<&str>>(()) })
///     .await;
///
/// assert!(result.is_success());
/// assert_eq!(result.attempts().len(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Retryer<D = ExpDelayer> {
    delayer: D,
    max_attempts: u32,
}

impl Retryer {
    /// Create a retryer with the default delayer and no attempt ceiling.
    pub fn new() -> Self {
        Self {
            delayer: ExpDelayer::default(),
            max_attempts: 0,
        }
    }
}

impl Default for Retryer {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Retryer<D> {
    /// Replace the delay policy.
    pub fn with_delayer<D2: Delayer>(self, delayer: D2) -> Retryer<D2> {
        Retryer {
            delayer,
            max_attempts: self.max_attempts,
        }
    }

    /// Set the maximum number of operation invocations.
    ///
    /// Zero means unbounded: the loop only ends through success, a
    /// [`Failure::Break`], or cancellation.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The configured delay policy.
    pub fn delayer(&self) -> &D {
        &self.delayer
    }

    /// The configured attempt ceiling. Zero means unbounded.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl<D: Delayer> Retryer<D> {
    /// Invoke `op` until it succeeds, breaks, exhausts the attempt ceiling,
    /// or the token fires.
    ///
    /// The operation always runs at least once, even on a token that has
    /// already fired; cancellation is only observed between attempts, at
    /// the waiting boundary. Every invocation and every interrupted wait is
    /// recorded in the returned [`RetryResult`] - `retry` itself never
    /// fails.
    ///
    /// A wait that could not finish before the token's deadline is not
    /// started; the loop ends immediately with a
    /// [`CancelError::DeadlineExceeded`] attempt instead of sleeping into
    /// the deadline.
    pub async fn retry<F, Fut, E>(&self, token: &CancelToken, mut op: F) -> RetryResult<E>
    where
        F: FnMut(CancelToken) -> Fut,
        Fut: Future<Output = Result<(), Failure<E>>>,
    {
        let mut result = RetryResult::new(self.max_attempts);
        let mut delay = Duration::ZERO;

        loop {
            match op(token.clone()).await {
                Ok(()) => {
                    result.push(Attempt::completed(delay, None));
                    return result;
                }
                Err(failure) if failure.is_break() => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        attempts = result.attempts().len() + 1,
                        "operation broke out of the retry loop"
                    );
                    result.push(Attempt::completed(delay, Some(failure.into_cause())));
                    return result;
                }
                Err(failure) => {
                    result.push(Attempt::completed(delay, Some(failure.into_cause())));
                }
            }

            let attempts = result.attempts().len() as u32;
            if self.max_attempts > 0 && attempts >= self.max_attempts {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempts, "attempt ceiling reached");
                return result;
            }

            delay = self.delayer.delay(attempts);
            #[cfg(feature = "tracing")]
            tracing::trace!(attempts, ?delay, "operation failed, waiting before retry");

            if let Err(reason) = pause(token, delay).await {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempts, %reason, "wait interrupted");
                result.push(Attempt::cancelled(delay, reason));
                return result;
            }
        }
    }
}

/// Wait out a retry delay, refusing to start a wait that cannot finish
/// before the token's deadline.
async fn pause(token: &CancelToken, delay: Duration) -> Result<(), CancelError> {
    if let Some(reason) = token.error() {
        return Err(reason);
    }
    if let Some(deadline) = token.deadline() {
        if deadline.saturating_duration_since(Instant::now()) < delay {
            return Err(CancelError::DeadlineExceeded);
        }
    }
    wait::sleep(token, delay).await
}
