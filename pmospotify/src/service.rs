//! Entry point wiring the session, the pipelines and the maintenance tasks

use crate::backend::BackendConnector;
use crate::catalog::Catalog;
use crate::config::SpotifyConfig;
use crate::config_ext::SpotifyConfigExt;
use crate::error::Result;
use crate::governor::PlayCountGovernor;
use crate::metadata::MetadataResolver;
use crate::models::{Credentials, TrackMetadata};
use crate::playback::PlaybackResolver;
use crate::scheduler::RestartScheduler;
use crate::session::SessionManager;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Diagnostic snapshot of the coordinator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub ready: bool,
    pub logged_in: bool,
    pub play_count: u32,
    pub restart_scheduled: bool,
    pub last_restart: Option<DateTime<Utc>>,
    pub cached_track: Option<String>,
}

pub struct SpotifyService {
    config: SpotifyConfig,
    session: Arc<SessionManager>,
    governor: Arc<PlayCountGovernor>,
    playback: PlaybackResolver,
    metadata: MetadataResolver,
    catalog: Catalog,
    cancel: CancellationToken,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl SpotifyService {
    pub fn new(
        connector: Arc<dyn BackendConnector>,
        credentials: Credentials,
        config: SpotifyConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let session = Arc::new(SessionManager::new(connector, credentials));
        let governor = Arc::new(PlayCountGovernor::new(
            session.clone(),
            config.restart.play_threshold(),
            config.restart.play_restart_delay(),
            cancel.child_token(),
        ));
        let playback = PlaybackResolver::new(
            session.clone(),
            governor.clone(),
            config.backend.stream_url_retries,
        );
        let metadata = MetadataResolver::new(session.clone());
        let catalog = Catalog::new(session.clone(), config.catalog.clone());

        Self {
            config,
            session,
            governor,
            playback,
            metadata,
            catalog,
            cancel,
            scheduler: Mutex::new(None),
        }
    }

    /// Builds the service from the credentials and `sources.spotify` block
    /// of a pmoconfig tree
    pub fn from_config(
        connector: Arc<dyn BackendConnector>,
        config: &pmoconfig::Config,
    ) -> Result<Self> {
        let credentials = config.get_spotify_credentials();
        let spotify = config.get_spotify_config()?;
        Ok(Self::new(connector, credentials, spotify))
    }

    /// Starts the session and the restart scheduler
    ///
    /// The scheduler runs even when the first start fails, so a later tick
    /// can bring the session up. Returns whether the session is usable.
    pub async fn start(&self) -> bool {
        let started = self.session.ensure_started().await;

        let mut scheduler = self.scheduler.lock().unwrap_or_else(PoisonError::into_inner);
        if scheduler.is_none() {
            let task = RestartScheduler::new(
                self.session.clone(),
                self.config.restart.schedule_interval(),
                self.cancel.child_token(),
            );
            *scheduler = Some(task.spawn());
        }

        info!(started, "Spotify service started");
        started
    }

    /// Stream URL for `uri`, see [`PlaybackResolver::resolve_and_play`]
    pub async fn play(&self, uri: &str) -> Result<Option<String>> {
        self.playback.resolve_and_play(uri).await
    }

    /// Metadata for `uri`, `None` when it cannot be resolved
    pub async fn metadata(&self, uri: &str) -> Option<TrackMetadata> {
        self.metadata.resolve_metadata(uri).await
    }

    /// New account settings: replaces the credentials and restarts
    pub async fn preferences_updated(&self, credentials: Credentials) -> bool {
        info!(username = %credentials.username, "Spotify preferences updated");
        self.session.update_credentials(credentials);
        self.session.restart().await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    pub fn status(&self) -> ServiceStatus {
        let play = self.governor.snapshot();
        ServiceStatus {
            ready: self.session.is_ready(),
            logged_in: self.session.is_usable(),
            play_count: play.count,
            restart_scheduled: play.restart_scheduled,
            last_restart: self.session.last_restart_at(),
            cached_track: self.session.track_cache().current().map(|cached| cached.uri),
        }
    }

    /// Stops the background tasks and closes the backend session
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let task = self
            .scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            let _ = task.await;
        }

        self.session.shutdown().await;
        info!("Spotify service stopped");
    }
}
