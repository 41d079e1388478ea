//! Decision model: what the retry loop does after a failed attempt.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Try again, sleeping first when `delay` is set.
    Retry { delay: Option<Duration> },

    /// Propagate the failure to the invoker.
    GiveUp { reason: GiveUpReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveUpReason {
    /// The retry budget is zero.
    BudgetExhausted,

    /// The variant's classifier rejected the failure.
    NotRetryable,
}

impl std::fmt::Display for GiveUpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GiveUpReason::BudgetExhausted => f.write_str("retry budget exhausted"),
            GiveUpReason::NotRetryable => f.write_str("failure is not retryable"),
        }
    }
}
