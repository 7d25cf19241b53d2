//! # Engine configuration.
//!
//! Provides [`RetryOptions`] (what the caller asks for, every field optional)
//! and [`RetryConfig`] (the validated, effective settings owned by a
//! [`Retry`](crate::Retry) engine).
//!
//! ## Defaults
//! - `retries = 3` → up to 4 attempts in total
//! - `factor = 2.0`
//! - `min_timeout = 500ms`
//! - `max_timeout = 30s`
//! - `bus_capacity = 1024`
//!
//! ## Validation
//! Every provided value must be positive (`>= 1`, durations `>= 1ms`) and
//! `min_timeout` must not exceed the effective `max_timeout`.

use std::time::Duration;

use crate::error::RetryError;
use crate::policies::BackoffPolicy;

const MIN_TIMEOUT_FLOOR: Duration = Duration::from_millis(1);

/// Construction options for a [`Retry`](crate::Retry) engine.
///
/// `None` fields fall back to the defaults listed in the module docs.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use retryvisor::{Retry, RetryOptions};
///
/// let retry = Retry::new(RetryOptions {
///     retries: Some(5),
///     min_timeout: Some(Duration::from_millis(100)),
///     ..Default::default()
/// })
/// .unwrap();
///
/// assert_eq!(retry.config().retries, 5);
/// assert_eq!(retry.config().max_timeout, Duration::from_secs(30));
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryOptions {
    /// Delay ceiling between two attempts.
    pub max_timeout: Option<Duration>,
    /// Delay before the first retry.
    pub min_timeout: Option<Duration>,
    /// Exponential growth factor.
    pub factor: Option<f64>,
    /// Retry budget (attempts after the first one).
    pub retries: Option<u32>,
    /// Capacity of the event bus ring buffer.
    pub bus_capacity: Option<usize>,
}

/// Effective configuration of a [`Retry`](crate::Retry) engine.
///
/// Obtained through [`Retry::config`](crate::Retry::config), which always
/// returns an independent copy.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Delay ceiling between two attempts.
    pub max_timeout: Duration,
    /// Delay before the first retry.
    pub min_timeout: Duration,
    /// Exponential growth factor.
    pub factor: f64,
    /// Retry budget (attempts after the first one).
    pub retries: u32,
    /// Capacity of the event bus ring buffer (min 1).
    pub bus_capacity: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_timeout: Duration::from_secs(30),
            min_timeout: Duration::from_millis(500),
            factor: 2.0,
            retries: 3,
            bus_capacity: 1024,
        }
    }
}

impl RetryConfig {
    /// Validates `opts` and fills missing fields with defaults.
    ///
    /// Fails with [`RetryError::InvalidArgument`] naming the first offending field.
    pub fn from_options(opts: RetryOptions) -> Result<Self, RetryError> {
        let defaults = Self::default();

        if let Some(max) = opts.max_timeout {
            if max < MIN_TIMEOUT_FLOOR {
                return Err(RetryError::invalid_argument(
                    "max_timeout",
                    "must be a positive duration (>= 1ms)",
                ));
            }
        }
        let max_timeout = opts.max_timeout.unwrap_or(defaults.max_timeout);

        if let Some(min) = opts.min_timeout {
            if min < MIN_TIMEOUT_FLOOR || min > max_timeout {
                return Err(RetryError::invalid_argument(
                    "min_timeout",
                    format!("must be a positive duration not above max_timeout ({max_timeout:?})"),
                ));
            }
        }
        let min_timeout = opts.min_timeout.unwrap_or(defaults.min_timeout);
        if min_timeout > max_timeout {
            return Err(RetryError::invalid_argument(
                "max_timeout",
                format!("must not be below min_timeout ({min_timeout:?})"),
            ));
        }

        if let Some(factor) = opts.factor {
            if !factor.is_finite() || factor < 1.0 {
                return Err(RetryError::invalid_argument(
                    "factor",
                    "must be a finite number >= 1",
                ));
            }
        }

        if let Some(0) = opts.retries {
            return Err(RetryError::invalid_argument(
                "retries",
                "must be a positive integer",
            ));
        }

        if let Some(0) = opts.bus_capacity {
            return Err(RetryError::invalid_argument(
                "bus_capacity",
                "must be a positive integer",
            ));
        }

        Ok(Self {
            max_timeout,
            min_timeout,
            factor: opts.factor.unwrap_or(defaults.factor),
            retries: opts.retries.unwrap_or(defaults.retries),
            bus_capacity: opts.bus_capacity.unwrap_or(defaults.bus_capacity),
        })
    }

    /// Returns the backoff policy derived from the timing fields.
    #[inline]
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            first: self.min_timeout,
            max: self.max_timeout,
            factor: self.factor,
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: RetryError) -> &'static str {
        match err {
            RetryError::InvalidArgument { field, .. } => field,
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = RetryConfig::from_options(RetryOptions::default()).unwrap();
        assert_eq!(cfg, RetryConfig::default());
        assert_eq!(cfg.retries, 3);
        assert_eq!(cfg.factor, 2.0);
        assert_eq!(cfg.min_timeout, Duration::from_millis(500));
        assert_eq!(cfg.max_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let cases = [
            (
                RetryOptions {
                    max_timeout: Some(Duration::ZERO),
                    ..Default::default()
                },
                "max_timeout",
            ),
            (
                RetryOptions {
                    min_timeout: Some(Duration::from_micros(10)),
                    ..Default::default()
                },
                "min_timeout",
            ),
            (
                RetryOptions {
                    min_timeout: Some(Duration::from_secs(10)),
                    max_timeout: Some(Duration::from_secs(5)),
                    ..Default::default()
                },
                "min_timeout",
            ),
            (
                RetryOptions {
                    factor: Some(0.5),
                    ..Default::default()
                },
                "factor",
            ),
            (
                RetryOptions {
                    factor: Some(f64::NAN),
                    ..Default::default()
                },
                "factor",
            ),
            (
                RetryOptions {
                    retries: Some(0),
                    ..Default::default()
                },
                "retries",
            ),
        ];

        for (opts, expected) in cases {
            let err = RetryConfig::from_options(opts).unwrap_err();
            assert_eq!(field_of(err), expected);
        }
    }

    #[test]
    fn test_max_below_default_min_is_rejected() {
        let err = RetryConfig::from_options(RetryOptions {
            max_timeout: Some(Duration::from_millis(100)),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(field_of(err), "max_timeout");
    }

    #[test]
    fn test_backoff_mirrors_timing_fields() {
        let cfg = RetryConfig::from_options(RetryOptions {
            min_timeout: Some(Duration::from_millis(10)),
            max_timeout: Some(Duration::from_millis(50)),
            factor: Some(3.0),
            ..Default::default()
        })
        .unwrap();

        let backoff = cfg.backoff();
        assert_eq!(backoff.first, Duration::from_millis(10));
        assert_eq!(backoff.max, Duration::from_millis(50));
        assert_eq!(backoff.next(1), Duration::from_millis(30));
        assert_eq!(backoff.next(2), Duration::from_millis(50));
    }
}
