//! Preventive restart after a number of successful plays
//!
//! Stream URL issuance degrades after a few plays on the same session. Once
//! the threshold is reached, a single delayed restart is armed; further plays
//! do not stack more timers until it has fired.

use crate::session::SessionManager;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayCountState {
    /// Successful plays since the last reset
    pub count: u32,
    /// A preventive restart timer is outstanding
    pub restart_scheduled: bool,
}

pub struct PlayCountGovernor {
    session: Arc<SessionManager>,
    state: Arc<Mutex<PlayCountState>>,
    threshold: u32,
    delay: Duration,
    cancel: CancellationToken,
}

impl PlayCountGovernor {
    pub fn new(
        session: Arc<SessionManager>,
        threshold: u32,
        delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let state = session.play_state();
        Self {
            session,
            state,
            threshold: threshold.max(1),
            delay,
            cancel,
        }
    }

    /// Records a successful play
    ///
    /// Returns `true` when this play armed the preventive restart.
    pub fn on_play_success(&self) -> bool {
        let armed = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.count += 1;
            debug!(count = state.count, threshold = self.threshold, "Play recorded");
            if state.count >= self.threshold && !state.restart_scheduled {
                state.restart_scheduled = true;
                true
            } else {
                false
            }
        };

        if armed {
            self.arm();
        }
        armed
    }

    fn arm(&self) {
        let session = self.session.clone();
        let state = self.state.clone();
        let delay = self.delay;
        let cancel = self.cancel.clone();

        info!(delay_secs = delay.as_secs_f64(), "Preventive session restart armed");

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Preventive restart cancelled");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            if !session.restart().await {
                warn!("Preventive session restart failed");
            }

            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            *state = PlayCountState::default();
        });
    }

    pub fn snapshot(&self) -> PlayCountState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
