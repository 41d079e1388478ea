//! Retry policy: budget and linear backoff.

use std::time::Duration;

use super::decision::{Decision, GiveUpReason};
use crate::domain::{OptionValues, TaskError};

pub const RETRIES: &str = "retries";
pub const RETRY_INTERVAL: &str = "retry_interval";
pub const RETRY_INTERVAL_ADD: &str = "retry_interval_add";

/// Retry state of one executing call.
///
/// Read from the task's options once, then owned and mutated by the retry
/// loop; the option values themselves are left untouched.
///
/// A zero `interval` means "retry without sleeping"; a zero `interval_add`
/// keeps the interval constant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Remaining retries (not counting the first attempt).
    pub retries: u32,

    /// Sleep before the next retry.
    pub interval: Duration,

    /// Added to `interval` after every sleep (linear backoff).
    pub interval_add: Duration,
}

impl RetryPolicy {
    /// No retries: the first failure is terminal.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(retries: u32, interval: Duration, interval_add: Duration) -> Self {
        Self {
            retries,
            interval,
            interval_add,
        }
    }

    /// Build from `retries`, `retry_interval` and `retry_interval_add`.
    ///
    /// Absent or null entries count as zero. Intervals are seconds and may be
    /// integers, floats, or numeric strings.
    pub fn from_options(options: &OptionValues) -> Result<Self, TaskError> {
        Ok(Self {
            retries: read_count(options, RETRIES)?,
            interval: read_seconds(options, RETRY_INTERVAL)?,
            interval_add: read_seconds(options, RETRY_INTERVAL_ADD)?,
        })
    }

    /// Decide what follows a failed attempt. Pure: does not touch `self`.
    pub fn decide(&self, retryable: bool) -> Decision {
        if self.retries == 0 {
            return Decision::GiveUp {
                reason: GiveUpReason::BudgetExhausted,
            };
        }
        if !retryable {
            return Decision::GiveUp {
                reason: GiveUpReason::NotRetryable,
            };
        }
        Decision::Retry {
            delay: (!self.interval.is_zero()).then_some(self.interval),
        }
    }

    /// Consume one retry. The interval grows only when it was non-zero.
    pub fn advance(&mut self) {
        if !self.interval.is_zero() && !self.interval_add.is_zero() {
            self.interval = self.interval.saturating_add(self.interval_add);
        }
        self.retries = self.retries.saturating_sub(1);
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> TaskError {
    TaskError::InvalidOption {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn read_count(options: &OptionValues, name: &str) -> Result<u32, TaskError> {
    let value = match options.get(name) {
        None | Some(serde_json::Value::Null) => return Ok(0),
        Some(v) => v,
    };
    let n = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| invalid(name, format!("expected a non-negative integer, got {n}")))?,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(name, format!("'{s}': {e}")))?,
        other => return Err(invalid(name, format!("expected an integer, got {other}"))),
    };
    u32::try_from(n).map_err(|_| invalid(name, format!("{n} is too large")))
}

fn read_seconds(options: &OptionValues, name: &str) -> Result<Duration, TaskError> {
    let value = match options.get(name) {
        None | Some(serde_json::Value::Null) => return Ok(Duration::ZERO),
        Some(v) => v,
    };
    let secs = match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(name, format!("{n} is not a number of seconds")))?,
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(name, format!("'{s}': {e}")))?,
        other => return Err(invalid(name, format!("expected seconds, got {other}"))),
    };
    Duration::try_from_secs_f64(secs).map_err(|e| invalid(name, format!("{secs}: {e}")))
}
