//! Periodic proactive restart
//!
//! Long-lived sessions degrade silently, so the session is refreshed on a
//! fixed period measured from the last successful restart, whatever path
//! triggered it.

use crate::session::SessionManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleDecision {
    pub restart: bool,
    /// Wait before the next tick
    pub delay: Duration,
}

impl ScheduleDecision {
    /// `elapsed` is the time since the last restart, `None` if there was none
    pub fn compute(interval: Duration, elapsed: Option<Duration>) -> Self {
        match elapsed {
            Some(elapsed) if elapsed < interval => Self {
                restart: false,
                delay: interval - elapsed,
            },
            _ => Self {
                restart: true,
                delay: interval,
            },
        }
    }
}

pub struct RestartScheduler {
    session: Arc<SessionManager>,
    interval: Duration,
    cancel: CancellationToken,
}

impl RestartScheduler {
    pub fn new(session: Arc<SessionManager>, interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            session,
            interval: interval.max(Duration::from_secs(1)),
            cancel,
        }
    }

    /// Runs one tick: restarts the session if it is due and returns the
    /// delay until the next tick
    pub async fn fire(&self) -> ScheduleDecision {
        let elapsed = self.session.since_last_restart();
        let decision = ScheduleDecision::compute(self.interval, elapsed);

        if decision.restart {
            info!(
                elapsed_secs = elapsed.map(|e| e.as_secs()),
                "Scheduled Spotify session restart"
            );
            let ok = if elapsed.is_some() {
                self.session.restart().await
            } else {
                self.session.ensure_started().await
            };
            if !ok {
                warn!("Scheduled session restart failed");
            }
        } else {
            debug!(
                next_in_secs = decision.delay.as_secs(),
                "Session restarted recently, scheduled restart skipped"
            );
        }

        decision
    }

    /// Runs the scheduler until cancelled
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Starting restart scheduler");
            loop {
                let decision = self.fire().await;
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    _ = tokio::time::sleep(decision.delay) => {}
                }
            }
            info!("Restart scheduler stopped");
        })
    }
}
