//! Play request pipeline
//!
//! Play requests are fully serialized on their own lock, independent of
//! metadata requests. A resolution reuses the last stream URL when the same
//! track is asked again, otherwise looks the track up and asks the backend
//! for a fresh URL.

use crate::error::{Result, SpotifyError};
use crate::governor::PlayCountGovernor;
use crate::retry::{resolve_with_restart, RetryPolicy};
use crate::session::SessionManager;
use crate::track_cache::TrackCache;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub struct PlaybackResolver {
    session: Arc<SessionManager>,
    governor: Arc<PlayCountGovernor>,
    cache: Arc<TrackCache>,
    lock: Mutex<()>,
    policy: RetryPolicy,
    stream_url_retries: u32,
}

impl PlaybackResolver {
    pub fn new(
        session: Arc<SessionManager>,
        governor: Arc<PlayCountGovernor>,
        stream_url_retries: u32,
    ) -> Self {
        let cache = session.track_cache();
        Self {
            session,
            governor,
            cache,
            lock: Mutex::new(()),
            policy: RetryPolicy::default(),
            stream_url_retries,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves `uri` to a stream URL to redirect the player to
    ///
    /// Returns `Ok(None)` for an empty or invalid URI (nothing is done),
    /// `ConfigurationIncomplete` without credentials and
    /// `ResolutionExhausted` once every attempt failed.
    pub async fn resolve_and_play(&self, uri: &str) -> Result<Option<String>> {
        if !self.session.is_uri_valid(uri) {
            info!(%uri, "Ignoring play request for invalid URI");
            return Ok(None);
        }
        if !self.session.credentials().is_complete() {
            return Err(SpotifyError::ConfigurationIncomplete);
        }

        let _guard = self.lock.lock().await;
        if !self.session.ensure_started().await {
            debug!(%uri, "No usable session, first play attempt will fail");
        }

        let url = resolve_with_restart(self.policy, &self.session, "play", uri, || {
            self.resolve_once(uri)
        })
        .await?;

        self.governor.on_play_success();
        info!(%uri, "Play request resolved");
        Ok(Some(url))
    }

    async fn resolve_once(&self, uri: &str) -> Result<Option<String>> {
        if let Some(url) = self.cache.get(uri) {
            debug!(%uri, "Stream URL served from cache");
            return Ok(Some(url));
        }
        self.cache.clear();

        let client = self.session.client()?;
        let object = client
            .lookup(uri)
            .await?
            .ok_or_else(|| SpotifyError::NotFound(uri.to_string()))?;
        debug!(%uri, kind = object.kind(), "Looked up play target");
        let track = object
            .into_track()
            .ok_or_else(|| SpotifyError::UnexpectedObject {
                uri: uri.to_string(),
                expected: "track",
            })?;

        let url = client
            .fetch_stream_url(&track, self.stream_url_retries)
            .await?;
        if let Some(url) = &url {
            self.cache.store(uri, url.clone());
        }
        Ok(url)
    }
}
