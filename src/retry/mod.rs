//! The retry engine and its result model.
//!
//! [`Retryer`] orchestrates the loop: invoke the operation, classify its
//! failure, consult the delay policy, and wait - cancellably - before the
//! next attempt. Everything that happens is recorded into a
//! [`RetryResult`], one [`Attempt`] per invocation or interrupted wait.
//!
//! # Quick Start
//!
//! ```rust
//! use eddy::{CancelToken, ConstantDelayer, Failure, Retryer};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let retryer = Retryer::new()
//!     .with_delayer(ConstantDelayer::new(Duration::from_millis(1)))
//!     .with_max_attempts(3);
//!
//! let result = retryer
//!     .retry(&CancelToken::new(), |_token| async {
//!         Err::<(), _>(Failure::Retryable("dns timeout"))
//!     })
//!     .await;
//!
//! assert_eq!(result.attempts().len(), 3);
//! assert_eq!(result.final_operation_error(), Some(&"dns timeout"));
//! # });
//! ```
//!
//! # Stopping Early
//!
//! An operation returns [`Failure::Break`] to end the loop regardless of
//! the remaining budget - the recorded error is the unwrapped cause.
//! Cancellation (explicit or deadline) ends the loop at the next waiting
//! boundary and is recorded as its own attempt.

mod engine;
mod error;
mod outcome;

pub use engine::Retryer;
pub use error::Failure;
pub use outcome::{Attempt, AttemptError, RetryResult};
