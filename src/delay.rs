//! Backoff delay policies.
//!
//! A [`Delayer`] is pure data plus a pure function: it maps the number of
//! attempts made so far to the delay that should precede the next attempt.
//! Policies never sleep, never mutate, and can be shared freely across
//! concurrent retry loops.

use std::time::Duration;

/// Computes the delay before the next attempt.
///
/// `attempt` is the number of attempts made so far. The delay before the
/// first attempt is always zero, so every implementation returns
/// [`Duration::ZERO`] for `attempt == 0`.
pub trait Delayer {
    /// Delay to wait after `attempt` attempts have been made.
    fn delay(&self, attempt: u32) -> Duration;
}

impl<D: Delayer + ?Sized> Delayer for &D {
    fn delay(&self, attempt: u32) -> Duration {
        (**self).delay(attempt)
    }
}

/// A delayer that never waits.
///
/// # Examples
///
/// ```rust
/// use eddy::{Delayer, NopDelayer};
/// use std::time::Duration;
///
/// assert_eq!(NopDelayer.delay(1), Duration::ZERO);
/// assert_eq!(NopDelayer.delay(100), Duration::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NopDelayer;

impl Delayer for NopDelayer {
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

/// A delayer with a fixed delay between attempts.
///
/// # Examples
///
/// ```rust
/// use eddy::{ConstantDelayer, Delayer};
/// use std::time::Duration;
///
/// let delayer = ConstantDelayer::new(Duration::from_secs(1));
/// assert_eq!(delayer.delay(0), Duration::ZERO);
/// assert_eq!(delayer.delay(1), Duration::from_secs(1));
/// assert_eq!(delayer.delay(7), Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstantDelayer {
    duration: Duration,
}

impl ConstantDelayer {
    /// Create a delayer that always waits `duration` between attempts.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// The configured delay.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Delayer for ConstantDelayer {
    fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.duration
    }
}

/// Default initial delay for [`ExpDelayer`].
pub const EXP_INITIAL: Duration = Duration::from_millis(500);

/// Default growth multiplier for [`ExpDelayer`].
pub const EXP_MULTIPLIER: f64 = 1.5;

/// A delayer with exponential growth and optional random jitter.
///
/// The base delay after attempt `n` is `initial * multiplier^(n - 1)`,
/// capped at `max`. Jitter is applied after the cap: with a jitter of `p`
/// percent the final delay is drawn uniformly from `base ± p%`, so a
/// jittered delay near the ceiling may exceed `max` by up to `p` percent.
/// Spreading delays past the cap is deliberate; a hard ceiling would
/// re-synchronize every client that has reached it.
///
/// Unset parameters fall back to defaults at evaluation time: a zero
/// `initial` becomes [`EXP_INITIAL`], a multiplier below 1 (or NaN or
/// infinite) becomes [`EXP_MULTIPLIER`], and a zero `max` becomes
/// [`Duration::MAX`].
///
/// # Examples
///
/// ```rust
/// use eddy::{Delayer, ExpDelayer};
/// use std::time::Duration;
///
/// let delayer = ExpDelayer::new()
///     .with_initial(Duration::from_secs(1))
///     .with_multiplier(2.0)
///     .with_max(Duration::from_secs(20));
///
/// assert_eq!(delayer.delay(1), Duration::from_secs(1));
/// assert_eq!(delayer.delay(2), Duration::from_secs(2));
/// assert_eq!(delayer.delay(5), Duration::from_secs(16));
/// assert_eq!(delayer.delay(6), Duration::from_secs(20)); // capped
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpDelayer {
    initial: Duration,
    multiplier: f64,
    max: Duration,
    jitter_percent: u8,
}

impl ExpDelayer {
    /// Create an exponential delayer with every parameter at its default
    /// and no jitter.
    pub fn new() -> Self {
        Self {
            initial: Duration::ZERO,
            multiplier: 0.0,
            max: Duration::ZERO,
            jitter_percent: 0,
        }
    }

    /// Set the delay after the first attempt.
    ///
    /// Zero means "use [`EXP_INITIAL`]".
    pub fn with_initial(mut self, initial: Duration) -> Self {
        self.initial = initial;
        self
    }

    /// Set the growth multiplier applied between attempts.
    ///
    /// Values below 1, NaN, and infinities mean "use [`EXP_MULTIPLIER`]".
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the cap applied to the base delay, before jitter.
    ///
    /// Zero means "use [`Duration::MAX`]".
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    /// Set the jitter percentage in `0..=100`.
    ///
    /// Values above 100 are clamped to 100. With jitter `p`, each delay is
    /// drawn uniformly from `base ± p%` inclusive.
    pub fn with_jitter(mut self, percent: u8) -> Self {
        self.jitter_percent = percent;
        self
    }

    fn initial(&self) -> Duration {
        if self.initial.is_zero() {
            return EXP_INITIAL;
        }
        self.initial
    }

    fn multiplier(&self) -> f64 {
        if self.multiplier < 1.0 || self.multiplier.is_nan() || self.multiplier.is_infinite() {
            return EXP_MULTIPLIER;
        }
        self.multiplier
    }

    fn max(&self) -> Duration {
        if self.max.is_zero() {
            return Duration::MAX;
        }
        self.max
    }

    fn percent(&self) -> u8 {
        self.jitter_percent.min(100)
    }

    fn base(&self, attempt: u32) -> Duration {
        let max = self.max();
        let nanos =
            self.initial().as_nanos() as f64 * self.multiplier().powf(f64::from(attempt - 1));
        // The cap comparison happens before jitter, so jitter can push the
        // final delay past `max`.
        if nanos > max.as_nanos() as f64 {
            return max;
        }
        Duration::from_nanos(nanos as u64)
    }

    fn jitter(&self, base: Duration) -> Duration {
        use rand::Rng;

        let percent = self.percent();
        if percent == 0 {
            return base;
        }

        let base = base.as_nanos() as f64;
        let delta = f64::from(percent) / 100.0 * base;
        let nanos = rand::rng().random_range(base - delta..=base + delta);
        if nanos < 0.0 {
            // A negative draw means the arithmetic overflowed; treat it as
            // the largest possible delay, never as zero.
            return Duration::MAX;
        }
        Duration::from_nanos(nanos as u64)
    }
}

impl Delayer for ExpDelayer {
    fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.jitter(self.base(attempt))
    }
}

/// The default policy: exponential backoff with ±50% jitter and every other
/// parameter at its default.
impl Default for ExpDelayer {
    fn default() -> Self {
        Self::new().with_jitter(50)
    }
}

#[cfg(test)]
mod delay_tests {
    use super::*;

    #[test]
    fn test_zero_attempt_is_zero_delay() {
        let delayers: Vec<Box<dyn Delayer>> = vec![
            Box::new(NopDelayer),
            Box::new(ConstantDelayer::new(Duration::from_secs(1))),
            Box::new(ExpDelayer::default()),
        ];
        for delayer in &delayers {
            assert_eq!(delayer.delay(0), Duration::ZERO);
        }
    }

    #[test]
    fn test_nop_delayer() {
        assert_eq!(NopDelayer.delay(1), Duration::ZERO);
        assert_eq!(NopDelayer.delay(u32::MAX), Duration::ZERO);
    }

    #[test]
    fn test_constant_delayer() {
        let delayer = ConstantDelayer::new(Duration::from_millis(250));
        assert_eq!(delayer.delay(1), Duration::from_millis(250));
        assert_eq!(delayer.delay(2), Duration::from_millis(250));
        assert_eq!(delayer.delay(1000), Duration::from_millis(250));
    }

    #[test]
    fn test_exp_zero_value_uses_defaults() {
        let delayer = ExpDelayer::new();
        assert_eq!(delayer.delay(1), EXP_INITIAL);
        assert_eq!(
            delayer.delay(2),
            Duration::from_nanos((EXP_INITIAL.as_nanos() as f64 * EXP_MULTIPLIER) as u64)
        );
    }

    #[test]
    fn test_exp_growth_and_cap() {
        let delayer = ExpDelayer::new()
            .with_initial(Duration::from_secs(1))
            .with_multiplier(2.0)
            .with_max(Duration::from_secs(20));

        let expected = [1, 2, 4, 8, 16, 20, 20, 20, 20, 20];
        for (i, secs) in expected.iter().enumerate() {
            let attempt = i as u32 + 1;
            assert_eq!(
                delayer.delay(attempt),
                Duration::from_secs(*secs),
                "attempt {attempt}"
            );
        }
    }

    #[test]
    fn test_exp_invalid_multiplier_uses_default() {
        for bad in [0.5, 0.0, -3.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let delayer = ExpDelayer::new()
                .with_initial(Duration::from_secs(1))
                .with_multiplier(bad);
            assert_eq!(delayer.delay(2), Duration::from_millis(1500), "mul {bad}");
        }
    }

    #[test]
    fn test_exp_jitter_stays_in_window() {
        let delayer = ExpDelayer::new()
            .with_initial(Duration::from_secs(1))
            .with_multiplier(2.0)
            .with_max(Duration::from_secs(20))
            .with_jitter(50);

        let windows = [
            (1, Duration::from_millis(500), Duration::from_millis(1500)),
            (2, Duration::from_secs(1), Duration::from_secs(3)),
            (3, Duration::from_secs(2), Duration::from_secs(6)),
            (6, Duration::from_secs(10), Duration::from_secs(30)),
            (10, Duration::from_secs(10), Duration::from_secs(30)),
        ];
        for _ in 0..32 {
            for (attempt, lo, hi) in windows {
                let d = delayer.delay(attempt);
                assert!(
                    d >= lo && d <= hi,
                    "attempt {attempt}: {d:?} outside [{lo:?}, {hi:?}]"
                );
            }
        }
    }

    #[test]
    fn test_exp_jitter_percent_clamped_to_100() {
        let delayer = ExpDelayer::new()
            .with_initial(Duration::from_secs(1))
            .with_multiplier(2.0)
            .with_jitter(250);

        for _ in 0..32 {
            let d = delayer.delay(1);
            assert!(d <= Duration::from_secs(2), "{d:?} above base + 100%");
        }
    }

    #[test]
    fn test_exp_overflow_is_positive() {
        let delayer = ExpDelayer::new()
            .with_initial(Duration::MAX)
            .with_multiplier(2.0)
            .with_jitter(1);
        assert!(delayer.delay(i32::MAX as u32) > Duration::ZERO);
    }

    #[test]
    fn test_default_delayer_has_jitter() {
        let delayer = ExpDelayer::default();
        let lo = Duration::from_millis(250);
        let hi = Duration::from_millis(750);
        for _ in 0..32 {
            let d = delayer.delay(1);
            assert!(d >= lo && d <= hi, "{d:?} outside ±50% of 500ms");
        }
    }

    #[test]
    fn test_delayer_impl_for_references() {
        fn second_delay<D: Delayer>(delayer: D) -> Duration {
            delayer.delay(2)
        }
        let delayer = ConstantDelayer::new(Duration::from_secs(1));
        assert_eq!(second_delay(&delayer), Duration::from_secs(1));
        assert_eq!(second_delay(delayer), Duration::from_secs(1));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_exp_delayer_serde_round_trip() {
        let delayer = ExpDelayer::new()
            .with_initial(Duration::from_secs(1))
            .with_multiplier(2.0)
            .with_max(Duration::from_secs(20))
            .with_jitter(25);
        let json = serde_json::to_string(&delayer).unwrap();
        let back: ExpDelayer = serde_json::from_str(&json).unwrap();
        assert_eq!(delayer, back);
    }
}
