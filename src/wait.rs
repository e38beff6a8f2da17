//! Cancellation-aware waiting.
//!
//! [`sleep`] is the single suspension point of the retry engine: it blocks
//! for a duration or until a [`CancelToken`] fires, whichever comes first,
//! without ever busy-polling.

use std::time::Duration;

use crate::cancel::{CancelError, CancelToken};

/// Sleep for `duration`, or return early if `token` fires first.
///
/// Returns `Ok(())` when the timer elapses and `Err` with the token's
/// reason when cancellation wins the race or the token had already fired
/// on entry. The timer is a one-shot [`tokio::time::sleep`]; it is released
/// on every exit path, including when cancellation preempts it.
///
/// # Examples
///
/// ```rust
/// use eddy::{wait, CancelError, CancelToken};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let token = CancelToken::new();
/// assert_eq!(wait::sleep(&token, Duration::from_millis(1)).await, Ok(()));
///
/// token.cancel();
/// assert_eq!(
///     wait::sleep(&token, Duration::from_secs(3600)).await,
///     Err(CancelError::Cancelled),
/// );
/// # });
/// ```
pub async fn sleep(token: &CancelToken, duration: Duration) -> Result<(), CancelError> {
    if let Some(reason) = token.error() {
        return Err(reason);
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(token.error().unwrap_or(CancelError::Cancelled)),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(test)]
mod wait_tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_timer_elapses_first() {
        let token = CancelToken::new();
        assert_eq!(sleep(&token, Duration::from_millis(1)).await, Ok(()));
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_without_waiting() {
        let token = CancelToken::new();
        token.cancel();

        let start = Instant::now();
        let result = sleep(&token, Duration::from_secs(60)).await;
        assert_eq!(result, Err(CancelError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cancellation_preempts_timer() {
        let token = CancelToken::new();
        {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                token.cancel();
            });
        }

        let start = Instant::now();
        let result = sleep(&token, Duration::from_secs(60)).await;
        assert_eq!(result, Err(CancelError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_deadline_preempts_timer() {
        let token = CancelToken::with_timeout(Duration::from_millis(5));
        let result = sleep(&token, Duration::from_secs(60)).await;
        assert_eq!(result, Err(CancelError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_zero_duration_on_live_token() {
        let token = CancelToken::new();
        assert_eq!(sleep(&token, Duration::ZERO).await, Ok(()));
    }
}
