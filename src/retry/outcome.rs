//! Attempt records and the accumulated retry result.

use std::time::Duration;

use crate::cancel::CancelError;

/// One invocation of the operation, or a wait that cancellation cut short.
///
/// Records are append-only: the engine creates each one after the fact and
/// never mutates it again. At most one of the two errors is the effective
/// cause for the attempt; cancellation takes priority because a cancelled
/// wait means the operation never ran in that attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Attempt<E> {
    delay: Duration,
    cancel_error: Option<CancelError>,
    operation_error: Option<E>,
}

impl<E> Attempt<E> {
    pub(crate) fn completed(delay: Duration, operation_error: Option<E>) -> Self {
        Self {
            delay,
            cancel_error: None,
            operation_error,
        }
    }

    pub(crate) fn cancelled(delay: Duration, cancel_error: CancelError) -> Self {
        Self {
            delay,
            cancel_error: Some(cancel_error),
            operation_error: None,
        }
    }

    /// The delay waited before this attempt. Zero for the first attempt.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The cancellation that interrupted the wait before this attempt,
    /// if any.
    pub fn cancel_error(&self) -> Option<CancelError> {
        self.cancel_error
    }

    /// The error the operation returned, if it ran and failed.
    pub fn operation_error(&self) -> Option<&E> {
        self.operation_error.as_ref()
    }

    /// The effective error of this attempt: the cancellation if the wait
    /// was interrupted, otherwise the operation's error.
    pub fn error(&self) -> Option<AttemptError<'_, E>> {
        if let Some(cancel) = &self.cancel_error {
            return Some(AttemptError::Cancel(cancel));
        }
        self.operation_error.as_ref().map(AttemptError::Operation)
    }
}

/// The effective error of a single [`Attempt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptError<'a, E> {
    /// The wait before the attempt was interrupted; the operation never ran.
    Cancel(&'a CancelError),
    /// The operation ran and failed.
    Operation(&'a E),
}

/// The complete, chronological record of one retry loop.
///
/// Grows monotonically while the engine runs and is returned to the caller
/// when the loop ends; attempts are never reordered. The engine itself
/// never fails - inspect [`final_operation_error`](Self::final_operation_error)
/// and [`final_attempt_error`](Self::final_attempt_error) to decide what
/// the outcome means.
///
/// # Examples
///
/// ```rust
/// use eddy::{CancelToken, Failure, NopDelayer, Retryer};
///
/// # tokio_test::block_on(async {
/// let retryer = Retryer::new().with_delayer(NopDelayer).with_max_attempts(3);
/// let result = retryer
///     .retry(&CancelToken::new(), |_| async {
///         Err::<(), _>(Failure::Retryable("no route to host"))
///     })
///     .await;
///
/// assert_eq!(result.attempts().len(), 3);
/// assert_eq!(result.final_operation_error(), Some(&"no route to host"));
/// assert!(!result.is_success());
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RetryResult<E> {
    max_attempts: u32,
    attempts: Vec<Attempt<E>>,
}

impl<E> RetryResult<E> {
    pub(crate) fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempts: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, attempt: Attempt<E>) {
        self.attempts.push(attempt);
    }

    /// The attempt ceiling the loop ran under. Zero means unbounded.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Every attempt, in chronological order.
    pub fn attempts(&self) -> &[Attempt<E>] {
        &self.attempts
    }

    /// The most recent operation error, scanning newest-first.
    ///
    /// `None` means no recorded attempt carries an operation error: either
    /// the last invocation succeeded, or the operation never got to fail.
    pub fn final_operation_error(&self) -> Option<&E> {
        self.attempts
            .iter()
            .rev()
            .find_map(|attempt| attempt.operation_error())
    }

    /// The effective error of the last attempt only.
    pub fn final_attempt_error(&self) -> Option<AttemptError<'_, E>> {
        self.attempts.last().and_then(Attempt::error)
    }

    /// Whether the loop ended with a successful invocation.
    pub fn is_success(&self) -> bool {
        matches!(self.attempts.last(), Some(last) if last.error().is_none())
    }
}
