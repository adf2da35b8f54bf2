//! Bounded retry around a resolution, restarting the session between attempts

use crate::constants::{RETRY_ATTEMPTS, RETRY_BACKOFF_STEP};
use crate::error::{Result, SpotifyError};
use crate::session::SessionManager;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub attempts: u32,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: RETRY_ATTEMPTS,
            step: RETRY_BACKOFF_STEP,
        }
    }
}

impl RetryPolicy {
    /// Linear backoff: `attempt * step`, zero for the first attempt
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.step * attempt
    }
}

/// Runs `resolve` until it yields a value or the attempts are spent
///
/// Before every attempt but the first, sleeps the backoff delay then forces a
/// session restart; the attempt is skipped when the restart fails. Empty
/// answers and transient errors are retried, any other error ends the loop.
/// Fails with `ResolutionExhausted` carrying the attempts actually made.
pub(crate) async fn resolve_with_restart<T, F, Fut>(
    policy: RetryPolicy,
    session: &SessionManager,
    label: &'static str,
    uri: &str,
    mut resolve: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let mut attempts = 0;

    while attempts < policy.attempts {
        let attempt = attempts;
        attempts += 1;

        if attempt > 0 {
            let delay = policy.delay_before(attempt);
            debug!(label, %uri, attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
            tokio::time::sleep(delay).await;

            if !session.restart().await {
                warn!(label, %uri, attempt, "Session restart failed, attempt skipped");
                continue;
            }
        }

        match resolve().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => warn!(label, %uri, attempt, "Resolution returned nothing"),
            Err(err) if err.is_transient() => {
                warn!(label, %uri, attempt, error = %err, "Resolution failed")
            }
            Err(err) => {
                warn!(label, %uri, attempt, error = %err, "Resolution failed, not retrying");
                break;
            }
        }
    }

    warn!(label, %uri, attempts, "Resolution attempts exhausted");
    Err(SpotifyError::ResolutionExhausted {
        uri: uri.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        let delays: Vec<_> = (0..policy.attempts).map(|a| policy.delay_before(a)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_millis(500),
                Duration::from_millis(1000)
            ]
        );
    }
}
