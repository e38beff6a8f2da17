//! # Eddy
//!
//! > *"The current moves on; the eddy circles back."*
//!
//! A Rust library for cancellation-aware retry with pluggable backoff.
//!
//! ## Philosophy
//!
//! **Eddy** keeps the retry loop honest by splitting it into three small,
//! separately testable pieces:
//!
//! - **Delayers are pure data** - a [`Delayer`] maps an attempt count to a
//!   [`Duration`](std::time::Duration) and nothing else, so backoff schedules
//!   can be tested without ever sleeping.
//! - **Waiting is a race** - [`wait::sleep`] races a one-shot timer against a
//!   [`CancelToken`], releasing the timer on every exit path.
//! - **The engine never fails** - [`Retryer::retry`] records every attempt
//!   into a [`RetryResult`] instead of throwing; callers decide what the
//!   final outcome means.
//!
//! ## Quick Example
//!
//! ```rust
//! use eddy::{CancelToken, Failure, NopDelayer, Retryer};
//!
//! # tokio_test::block_on(async {
//! let retryer = Retryer::new()
//!     .with_delayer(NopDelayer)
//!     .with_max_attempts(3);
//!
//! let mut calls = 0;
//! let result = retryer
//!     .retry(&CancelToken::new(), |_token| {
//!         calls += 1;
//!         let attempt = calls;
//!         async move {
//!             if attempt < 2 {
//!                 Err(Failure::Retryable("connection refused"))
//!             } else {
//!                 Ok(())
//!             }
//!         }
//!     })
//!     .await;
//!
//! assert!(result.is_success());
//! assert_eq!(result.attempts().len(), 2);
//! assert_eq!(result.final_operation_error(), None);
//! # });
//! ```
//!
//! ## Backoff Strategies
//!
//! - [`NopDelayer`]: no delay between attempts
//! - [`ConstantDelayer`]: fixed delay between attempts
//! - [`ExpDelayer`]: exponential growth with an optional jitter percentage;
//!   its [`Default`] is the crate-wide default policy (500ms initial, 1.5x
//!   growth, ±50% jitter)
//!
//! ## Cancellation
//!
//! A [`CancelToken`] carries an explicit cancel signal, an optional
//! deadline, and the reason it fired ([`CancelError::Cancelled`] vs
//! [`CancelError::DeadlineExceeded`]). The engine observes it between
//! attempts; an operation that is already running always completes.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cancel;
pub mod delay;
pub mod retry;
pub mod wait;

// Re-exports
pub use cancel::{CancelError, CancelToken};
pub use delay::{ConstantDelayer, Delayer, ExpDelayer, NopDelayer};
pub use retry::{Attempt, AttemptError, Failure, RetryResult, Retryer};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancel::{CancelError, CancelToken};
    pub use crate::delay::{ConstantDelayer, Delayer, ExpDelayer, NopDelayer};
    pub use crate::retry::{Attempt, AttemptError, Failure, RetryResult, Retryer};
    pub use crate::wait;
}
