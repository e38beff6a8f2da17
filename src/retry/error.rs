//! Failure classification for retried operations.

use std::fmt;

/// An error returned by a retried operation, classified by whether the
/// operation may be tried again.
///
/// `Failure::Break` is the only way an operation can force the retry loop
/// to stop regardless of the remaining attempt budget. The engine records
/// the *cause*, not the wrapper, so callers can still match on the
/// underlying error's identity.
///
/// `From<E>` produces the retryable variant, so `?` inside an operation
/// marks errors retryable by default:
///
/// ```rust
/// use eddy::Failure;
///
/// fn parse(input: &str) -> Result<u32, std::num::ParseIntError> {
///     input.parse()
/// }
///
/// fn op(input: &str) -> Result<(), Failure<std::num::ParseIntError>> {
///     let _port = parse(input)?;
///     Ok(())
/// }
///
/// assert!(op("8080").is_ok());
/// assert!(!op("nope").unwrap_err().is_break());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure<E> {
    /// An ordinary failure; the operation may succeed if retried.
    Retryable(E),
    /// A terminal failure; retrying can never help.
    Break(E),
}

impl<E> Failure<E> {
    /// Whether this failure terminates the retry loop.
    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break(_))
    }

    /// The underlying cause.
    pub fn cause(&self) -> &E {
        match self {
            Self::Retryable(e) | Self::Break(e) => e,
        }
    }

    /// Unwrap the underlying cause, discarding the classification.
    pub fn into_cause(self) -> E {
        match self {
            Self::Retryable(e) | Self::Break(e) => e,
        }
    }

    /// Map the cause, keeping the classification.
    pub fn map_cause<F, T>(self, f: F) -> Failure<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            Self::Retryable(e) => Failure::Retryable(f(e)),
            Self::Break(e) => Failure::Break(f(e)),
        }
    }
}

impl<E> From<E> for Failure<E> {
    fn from(error: E) -> Self {
        Self::Retryable(error)
    }
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause())
    }
}

impl<E: std::error::Error + 'static> std::error::Error for Failure<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause())
    }
}
