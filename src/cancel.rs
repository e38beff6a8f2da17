//! Cancellation tokens.
//!
//! A [`CancelToken`] is a cheaply clonable handle that can fire at most
//! once, either explicitly via [`CancelToken::cancel`] or automatically
//! when a deadline passes. Firing is idempotent and safe from any task or
//! thread; every waiter observes it through [`CancelToken::cancelled`]
//! without polling.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Why a [`CancelToken`] fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CancelError {
    /// The token was cancelled explicitly.
    Cancelled,
    /// The token's deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for CancelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

impl std::error::Error for CancelError {}

#[derive(Debug)]
struct Shared {
    fired: watch::Sender<bool>,
    reason: OnceLock<CancelError>,
    deadline: Option<Instant>,
}

/// A shared cancellation signal with an optional deadline.
///
/// Clones observe the same signal. The token fires at most once; the first
/// cause (explicit cancel or deadline) wins and is reported by
/// [`error`](CancelToken::error) from then on.
///
/// # Examples
///
/// ```rust
/// use eddy::{CancelError, CancelToken};
///
/// let token = CancelToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// assert_eq!(token.error(), Some(CancelError::Cancelled));
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    shared: Arc<Shared>,
}

impl CancelToken {
    fn with_optional_deadline(deadline: Option<Instant>) -> Self {
        let (fired, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                fired,
                reason: OnceLock::new(),
                deadline,
            }),
        }
    }

    /// Create a token that only fires when [`cancel`](Self::cancel) is
    /// called.
    pub fn new() -> Self {
        Self::with_optional_deadline(None)
    }

    /// Create a token that fires automatically at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::with_optional_deadline(Some(deadline))
    }

    /// Create a token that fires automatically after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        // A timeout too large to represent is the same as no deadline.
        Self::with_optional_deadline(Instant::now().checked_add(timeout))
    }

    /// Cancel the token.
    ///
    /// Idempotent; the first firing wins. Cancelling after the deadline has
    /// already passed records [`CancelError::DeadlineExceeded`].
    pub fn cancel(&self) {
        let reason = if self.deadline_passed() {
            CancelError::DeadlineExceeded
        } else {
            CancelError::Cancelled
        };
        if self.shared.reason.set(reason).is_ok() {
            self.shared.fired.send_replace(true);
        }
    }

    /// The configured deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.shared.deadline
    }

    fn deadline_passed(&self) -> bool {
        matches!(self.shared.deadline, Some(d) if Instant::now() >= d)
    }

    /// Whether the token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.error().is_some()
    }

    /// Why the token fired, or `None` while it is still live.
    pub fn error(&self) -> Option<CancelError> {
        if let Some(reason) = self.shared.reason.get() {
            return Some(*reason);
        }
        if self.deadline_passed() {
            return Some(CancelError::DeadlineExceeded);
        }
        None
    }

    /// Resolves when the token fires.
    ///
    /// Returns immediately if it already has. Usable inside `select!` to
    /// race cancellation against other work.
    pub async fn cancelled(&self) {
        let mut rx = self.shared.fired.subscribe();
        let explicit = async move {
            // wait_for checks the current value first, so a fire between
            // subscribe and await here is not lost.
            let _ = rx.wait_for(|fired| *fired).await;
        };
        match self.shared.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = explicit => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => explicit.await,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
