//! Ownership of the single backend session
//!
//! [`SessionManager`] holds the only client handle of the process and is the
//! only place where it is created, restarted or dropped. Every (re)start goes
//! through a single-flight gate: the caller that takes the gate does the
//! network work, callers that find it held wait for the release and read the
//! outcome instead of starting again.

use crate::backend::{BackendConnector, BackendSession};
use crate::error::{Result, SpotifyError};
use crate::governor::PlayCountState;
use crate::models::Credentials;
use crate::track_cache::TrackCache;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
struct RestartStamp {
    instant: Instant,
    at: DateTime<Utc>,
}

pub struct SessionManager {
    connector: Arc<dyn BackendConnector>,
    credentials: RwLock<Credentials>,
    /// Single-flight permit for login/restart
    gate: tokio::sync::Mutex<()>,
    client: RwLock<Option<Arc<dyn BackendSession>>>,
    last_restart: Mutex<Option<RestartStamp>>,
    ready: watch::Sender<bool>,
    track_cache: Arc<TrackCache>,
    play_state: Arc<Mutex<PlayCountState>>,
}

impl SessionManager {
    pub fn new(connector: Arc<dyn BackendConnector>, credentials: Credentials) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            connector,
            credentials: RwLock::new(credentials),
            gate: tokio::sync::Mutex::new(()),
            client: RwLock::new(None),
            last_restart: Mutex::new(None),
            ready,
            track_cache: Arc::new(TrackCache::new()),
            play_state: Arc::new(Mutex::new(PlayCountState::default())),
        }
    }

    /// Makes sure a usable session exists, starting one if needed
    ///
    /// Returns `false` without touching the backend when the credentials are
    /// incomplete.
    pub async fn ensure_started(&self) -> bool {
        if !self.credentials().is_complete() {
            debug!("Spotify credentials incomplete, session not started");
            return false;
        }
        if self.is_usable() {
            return true;
        }
        self.start(false).await
    }

    /// Forces a fresh login or restart of the session
    pub async fn restart(&self) -> bool {
        if !self.credentials().is_complete() {
            debug!("Spotify credentials incomplete, restart skipped");
            return false;
        }
        self.start(true).await
    }

    async fn start(&self, force: bool) -> bool {
        match self.gate.try_lock() {
            Ok(_guard) => {
                // Un autre appelant a pu finir le démarrage entre-temps
                if !force && self.is_usable() {
                    return true;
                }
                self.run_start().await
            }
            Err(_) => {
                debug!("Session start already in flight, waiting for it");
                let _guard = self.gate.lock().await;
                self.is_usable()
            }
        }
    }

    /// Gate holder only
    async fn run_start(&self) -> bool {
        self.ready.send_replace(false);

        let credentials = self.credentials();
        let existing = self.client_handle();

        let outcome = match existing {
            Some(client) => {
                info!(username = %credentials.username, "Restarting Spotify session");
                client.restart(&credentials).await.map(|_| client)
            }
            None => {
                info!(username = %credentials.username, "Logging in to Spotify");
                self.connector.login(&credentials).await
            }
        };

        match outcome {
            Ok(client) => {
                *self.client.write().unwrap_or_else(PoisonError::into_inner) = Some(client);

                self.track_cache.clear();
                self.play_state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .count = 0;
                *self
                    .last_restart
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(RestartStamp {
                    instant: Instant::now(),
                    at: Utc::now(),
                });

                self.ready.send_replace(true);
                info!("Spotify session ready");
                true
            }
            Err(err) => {
                warn!(error = %err, "Spotify session start failed");
                let stale = self
                    .client
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                if let Some(stale) = stale {
                    stale.shutdown().await;
                }
                // Les URLs émises par l'ancienne session ne sont plus valables
                self.track_cache.clear();
                false
            }
        }
    }

    /// A (re)start completed and the client reports being logged in
    pub fn is_usable(&self) -> bool {
        *self.ready.borrow()
            && self
                .client_handle()
                .is_some_and(|client| client.is_logged_in())
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Notified each time the ready flag changes
    pub fn subscribe_ready(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }

    /// Current client, `SessionUnavailable` when there is none
    pub fn client(&self) -> Result<Arc<dyn BackendSession>> {
        self.client_handle().ok_or(SpotifyError::SessionUnavailable)
    }

    fn client_handle(&self) -> Option<Arc<dyn BackendSession>> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_uri_valid(&self, uri: &str) -> bool {
        !uri.trim().is_empty() && self.connector.is_uri_valid(uri)
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the credentials used by the next (re)start
    pub fn update_credentials(&self, credentials: Credentials) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credentials;
    }

    /// Time since the last successful (re)start, `None` if never started
    pub fn since_last_restart(&self) -> Option<Duration> {
        self.last_restart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|stamp| stamp.instant.elapsed())
    }

    pub fn last_restart_at(&self) -> Option<DateTime<Utc>> {
        self.last_restart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|stamp| stamp.at)
    }

    pub fn track_cache(&self) -> Arc<TrackCache> {
        self.track_cache.clone()
    }

    pub(crate) fn play_state(&self) -> Arc<Mutex<PlayCountState>> {
        self.play_state.clone()
    }

    /// Closes the backend session, waiting for any in-flight start
    pub async fn shutdown(&self) {
        let _guard = self.gate.lock().await;
        self.ready.send_replace(false);

        let client = self
            .client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(client) = client {
            info!("Shutting down Spotify session");
            client.shutdown().await;
        }
        self.track_cache.clear();
    }
}
