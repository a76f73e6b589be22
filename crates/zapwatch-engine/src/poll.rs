//! Bounded polling of long-running engine phases

use std::future::Future;
use std::time::Duration;

use tracing::debug;
use zapwatch_core::{Error, Result};

/// How often, and how many times, a phase is checked for completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn from_millis(interval_ms: u64, max_attempts: u32) -> Self {
        Self::new(Duration::from_millis(interval_ms), max_attempts)
    }

    /// Upper bound on the time spent waiting between checks
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Run `check` until it reports completion, sleeping `interval` between
/// attempts. Errors from `check` abort immediately; running out of attempts
/// yields [`Error::PollTimeout`].
pub async fn poll_until<F, Fut>(phase: &str, policy: &PollPolicy, mut check: F) -> Result<u32>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let attempts = policy.max_attempts.max(1);
    debug!(phase, attempts, budget_secs = policy.budget().as_secs(), "Polling");

    for attempt in 1..=attempts {
        if check(attempt).await? {
            debug!(phase, attempt, "Phase complete");
            return Ok(attempt);
        }
        if attempt < attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(Error::PollTimeout {
        phase: phase.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_completes_after_n_checks() {
        let calls = AtomicU32::new(0);
        let policy = PollPolicy::from_millis(1, 10);

        let attempts = poll_until("Spider", &policy, |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(n >= 3) }
        })
        .await
        .unwrap();

        assert_eq!(attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_never_converging_phase_times_out() {
        let policy = PollPolicy::from_millis(1, 4);

        let err = poll_until("Active scan", &policy, |_| async { Ok(false) })
            .await
            .unwrap_err();

        match err {
            Error::PollTimeout { phase, attempts } => {
                assert_eq!(phase, "Active scan");
                assert_eq!(attempts, 4);
            }
            other => panic!("Expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_error_aborts() {
        let policy = PollPolicy::from_millis(1, 10);
        let err = poll_until("Spider", &policy, |attempt| async move {
            if attempt == 2 {
                Err(Error::Engine(String::from("connection reset")))
            } else {
                Ok(false)
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Engine(_)));
    }

    #[test]
    fn test_budget() {
        let policy = PollPolicy::from_millis(2_000, 900);
        assert_eq!(policy.budget(), Duration::from_secs(1_798));
        assert_eq!(PollPolicy::from_millis(10, 0).budget(), Duration::ZERO);
    }
}
