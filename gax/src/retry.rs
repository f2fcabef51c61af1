use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::select;

use crate::cancel::CancellationToken;
use crate::status::{OperationStatus, YdbError};

/// How a [`RetryPredicate`] classifies a failure for a given call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RetryDecision {
    /// Retry unconditionally.
    Retry,
    /// Retry only because the caller told us the operation is idempotent.
    RetryIfIdempotent,
    /// Never retry; surface the error as-is.
    Terminal,
}

/// Classifies errors into the three buckets from section 7: always
/// retryable, retryable only for idempotent callers, and terminal.
pub trait RetryPredicate: Send + Sync {
    fn classify(&self, error: &YdbError) -> RetryDecision;
}

/// The section 7 classification, grounded on `OperationStatus`.
#[derive(Clone, Copy, Default)]
pub struct DefaultRetryPredicate;

impl RetryPredicate for DefaultRetryPredicate {
    fn classify(&self, error: &YdbError) -> RetryDecision {
        use OperationStatus::*;
        match error.operation_status() {
            Aborted | Overloaded | Unavailable | BadSession | SessionBusy => RetryDecision::Retry,
            SessionExpired | Undetermined | Timeout => RetryDecision::RetryIfIdempotent,
            Success
            | Cancelled
            | SchemaError
            | NotFound
            | PreconditionFailed
            | Unauthorized
            | Unauthenticated
            | InternalError
            | GenericError => RetryDecision::Terminal,
        }
    }
}

/// A backoff schedule: given the 0-indexed attempt number, how long to
/// sleep before the next try.
pub trait BackoffStrategy: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct Fixed(pub Duration);

impl BackoffStrategy for Fixed {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Linear {
    pub base: Duration,
    pub increment: Duration,
}

impl BackoffStrategy for Linear {
    fn delay(&self, attempt: u32) -> Duration {
        self.base + self.increment * attempt
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Exponential {
    pub base: Duration,
    pub factor: f64,
}

impl BackoffStrategy for Exponential {
    fn delay(&self, attempt: u32) -> Duration {
        let millis = self.base.as_millis() as f64 * self.factor.powi(attempt as i32);
        Duration::from_millis(millis.min(u64::MAX as f64) as u64)
    }
}

/// Wraps another strategy and returns a uniformly random duration between
/// zero and the wrapped strategy's delay, the jitter recipe section 4.1
/// calls for.
pub struct Jittered<S>(pub S);

impl<S: BackoffStrategy> BackoffStrategy for Jittered<S> {
    fn delay(&self, attempt: u32) -> Duration {
        let envelope = self.0.delay(attempt);
        if envelope.is_zero() {
            return envelope;
        }
        let mut rng = rand::thread_rng();
        Duration::from_nanos(rng.gen_range(0..=envelope.as_nanos() as u64))
    }
}

/// Caps a wrapped strategy's delay at `max`.
pub struct Capped<S> {
    pub inner: S,
    pub max: Duration,
}

impl<S: BackoffStrategy> BackoffStrategy for Capped<S> {
    fn delay(&self, attempt: u32) -> Duration {
        self.inner.delay(attempt).min(self.max)
    }
}

/// Composes strategies by summing their delays.
pub struct Sum(pub Vec<Box<dyn BackoffStrategy>>);

impl BackoffStrategy for Sum {
    fn delay(&self, attempt: u32) -> Duration {
        self.0.iter().map(|s| s.delay(attempt)).sum()
    }
}

/// Composes strategies by taking the longest delay.
pub struct Max(pub Vec<Box<dyn BackoffStrategy>>);

impl BackoffStrategy for Max {
    fn delay(&self, attempt: u32) -> Duration {
        self.0.iter().map(|s| s.delay(attempt)).max().unwrap_or_default()
    }
}

/// A capped exponential backoff with full jitter, the default shape used
/// throughout the driver and topic runtime unless a caller overrides it.
pub fn default_backoff() -> Jittered<Capped<Exponential>> {
    Jittered(Capped {
        inner: Exponential {
            base: Duration::from_millis(50),
            factor: 2.0,
        },
        max: Duration::from_secs(10),
    })
}

/// Errors the retry engine itself can produce, as opposed to the wrapped
/// operation's own error type.
#[derive(thiserror::Error, Debug)]
pub enum RetryError<E> {
    #[error("retry budget exhausted after {attempts} attempt(s)")]
    BudgetExhausted { attempts: u32, last: E },
    #[error("operation was cancelled")]
    Cancelled,
    #[error(transparent)]
    Terminal(#[from] E),
}

/// Retry budget and backoff configuration for [`retry`].
pub struct RetrySetting<P = DefaultRetryPredicate, S = Jittered<Capped<Exponential>>> {
    pub predicate: P,
    pub strategy: S,
    /// Maximum number of retries after the first attempt; the operation is
    /// invoked at most `budget + 1` times.
    pub budget: u32,
    pub idempotent: bool,
}

impl Default for RetrySetting {
    fn default() -> Self {
        Self {
            predicate: DefaultRetryPredicate,
            strategy: default_backoff(),
            budget: 10,
            idempotent: false,
        }
    }
}

/// Drives `op` through the scheduler described in section 4.1: invoke,
/// classify failures via `setting.predicate`, sleep per `setting.strategy`,
/// and repeat until success, a terminal error, budget exhaustion, or
/// cancellation. Cancellation is never swallowed — it always wins the
/// `select!` race against an in-flight attempt's retry sleep.
pub async fn retry<P, S, F, Fut, T>(
    setting: &RetrySetting<P, S>,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError<YdbError>>
where
    P: RetryPredicate,
    S: BackoffStrategy,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, YdbError>>,
{
    let fn_loop = async {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let decision = setting.predicate.classify(&err);
                    let should_retry = match decision {
                        RetryDecision::Retry => true,
                        RetryDecision::RetryIfIdempotent => setting.idempotent,
                        RetryDecision::Terminal => false,
                    };
                    if !should_retry {
                        return Err(RetryError::Terminal(err));
                    }
                    if attempt >= setting.budget {
                        return Err(RetryError::BudgetExhausted {
                            attempts: attempt + 1,
                            last: err,
                        });
                    }
                    let delay = setting.strategy.delay(attempt);
                    tracing::debug!(attempt, ?delay, "retrying after failure");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    };

    select! {
        _ = cancel.cancelled() => Err(RetryError::Cancelled),
        result = fn_loop => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> YdbError {
        YdbError::new(Status::from(tonic::Status::unavailable("down")), vec![])
    }

    fn not_found() -> YdbError {
        YdbError::new(Status::from(tonic::Status::not_found("nope")), vec![])
    }

    #[tokio::test]
    async fn retries_at_most_budget_plus_one_times() {
        let calls = AtomicU32::new(0);
        let setting = RetrySetting {
            strategy: Fixed(Duration::from_millis(0)),
            budget: 3,
            ..RetrySetting::default()
        };
        let result: Result<(), _> = retry(&setting, &CancellationToken::new(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(unavailable()) }
        })
        .await;
        assert!(matches!(result, Err(RetryError::BudgetExhausted { attempts: 4, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn terminal_error_returns_immediately() {
        let calls = AtomicU32::new(0);
        let setting = RetrySetting {
            strategy: Fixed(Duration::from_millis(0)),
            ..RetrySetting::default()
        };
        let result: Result<(), _> = retry(&setting, &CancellationToken::new(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(not_found()) }
        })
        .await;
        assert!(matches!(result, Err(RetryError::Terminal(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_returns_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let setting = RetrySetting {
            strategy: Fixed(Duration::from_secs(60)),
            ..RetrySetting::default()
        };
        let result: Result<(), _> = retry(&setting, &cancel, || async { Err(unavailable()) }).await;
        assert!(matches!(result, Err(RetryError::Cancelled)));
    }

    #[tokio::test]
    async fn succeeds_without_retry_on_first_try() {
        let setting = RetrySetting::default();
        let result = retry(&setting, &CancellationToken::new(), || async { Ok::<_, YdbError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn jittered_never_exceeds_envelope() {
        let backoff = Jittered(Fixed(Duration::from_millis(100)));
        for attempt in 0..5 {
            let d = backoff.delay(attempt);
            assert!(d <= Duration::from_millis(100));
        }
    }

    #[test]
    fn capped_limits_exponential_growth() {
        let backoff = Capped {
            inner: Exponential {
                base: Duration::from_millis(10),
                factor: 2.0,
            },
            max: Duration::from_millis(50),
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(10));
        assert_eq!(backoff.delay(10), Duration::from_millis(50));
    }
}
