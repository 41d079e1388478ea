//! The retry loop.

use tracing::{debug, warn};

use super::decision::Decision;
use super::policy::RetryPolicy;
use crate::app::TaskContext;
use crate::domain::Failure;

/// An operation the retry loop may run more than once.
///
/// Both methods have defaults, so a variant opts into only what it needs:
/// `attempt` fails with `FailureKind::NotImplemented`, and `is_retry_valid`
/// accepts every failure.
pub trait Attempt {
    type Output;

    fn attempt(&mut self, ctx: &mut TaskContext) -> Result<Self::Output, Failure> {
        Err(Failure::not_implemented(ctx.task_name()))
    }

    /// Classify a failure. Must be pure: it only looks at `failure`.
    fn is_retry_valid(&self, _failure: &Failure) -> bool {
        true
    }
}

impl<F, T> Attempt for F
where
    F: FnMut(&mut TaskContext) -> Result<T, Failure>,
{
    type Output = T;

    fn attempt(&mut self, ctx: &mut TaskContext) -> Result<T, Failure> {
        self(ctx)
    }
}

/// Restricts which failures an inner attempt retries.
pub struct RetryIf<A, P> {
    inner: A,
    predicate: P,
}

impl<A, P> Attempt for RetryIf<A, P>
where
    A: Attempt,
    P: Fn(&Failure) -> bool,
{
    type Output = A::Output;

    fn attempt(&mut self, ctx: &mut TaskContext) -> Result<A::Output, Failure> {
        self.inner.attempt(ctx)
    }

    fn is_retry_valid(&self, failure: &Failure) -> bool {
        self.inner.is_retry_valid(failure) && (self.predicate)(failure)
    }
}

pub trait AttemptExt: Attempt + Sized {
    /// Retry only failures accepted by both the existing classifier and `predicate`.
    fn retry_if<P>(self, predicate: P) -> RetryIf<Self, P>
    where
        P: Fn(&Failure) -> bool,
    {
        RetryIf {
            inner: self,
            predicate,
        }
    }
}

impl<A: Attempt> AttemptExt for A {}

/// Run `attempt` until it succeeds or the policy gives up.
///
/// The terminal failure is returned exactly as the attempt produced it.
/// `policy` is updated in place, so the caller sees the remaining budget and
/// the grown interval afterwards.
pub fn run<A>(
    attempt: &mut A,
    ctx: &mut TaskContext,
    policy: &mut RetryPolicy,
) -> Result<A::Output, Failure>
where
    A: Attempt + ?Sized,
{
    let sleeper = ctx.sleeper();
    loop {
        let failure = match attempt.attempt(ctx) {
            Ok(output) => return Ok(output),
            Err(failure) => failure,
        };

        let retryable = policy.retries > 0 && attempt.is_retry_valid(&failure);
        match policy.decide(retryable) {
            Decision::GiveUp { reason } => {
                debug!(kind = %failure.kind(), %reason, "giving up");
                return Err(failure);
            }
            Decision::Retry { delay } => {
                debug!(kind = %failure.kind(), error = %failure, "attempt failed");
                if let Some(delay) = delay {
                    warn!("Sleeping for {} seconds before retry...", delay.as_secs_f64());
                    sleeper.sleep(delay);
                }
                policy.advance();
                warn!("Retrying ({} attempts remaining)", policy.retries);
            }
        }
    }
}
