//! Retry: policy (budget + linear backoff), decisions, and the retry loop.

mod decision;
mod policy;
mod runner;

pub use decision::{Decision, GiveUpReason};
pub use policy::{RETRIES, RETRY_INTERVAL, RETRY_INTERVAL_ADD, RetryPolicy};
pub use runner::{Attempt, AttemptExt, RetryIf, run};
