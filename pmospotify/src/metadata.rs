//! Metadata request pipeline
//!
//! Same guard and retry policy as playback, on a separate lock. Exhaustion
//! yields `None`: a missing record is rendered as "no metadata".

use crate::error::{Result, SpotifyError};
use crate::models::TrackMetadata;
use crate::retry::{resolve_with_restart, RetryPolicy};
use crate::session::SessionManager;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub struct MetadataResolver {
    session: Arc<SessionManager>,
    lock: Mutex<()>,
    policy: RetryPolicy,
}

impl MetadataResolver {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            lock: Mutex::new(()),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn resolve_metadata(&self, uri: &str) -> Option<TrackMetadata> {
        if !self.session.is_uri_valid(uri) {
            info!(%uri, "Ignoring metadata request for invalid URI");
            return None;
        }
        if !self.session.credentials().is_complete() {
            debug!(%uri, "No credentials, metadata unavailable");
            return None;
        }

        let _guard = self.lock.lock().await;
        if !self.session.ensure_started().await {
            debug!(%uri, "No usable session, first metadata attempt will fail");
        }

        resolve_with_restart(self.policy, &self.session, "metadata", uri, || {
            self.resolve_once(uri)
        })
        .await
        .ok()
    }

    async fn resolve_once(&self, uri: &str) -> Result<Option<TrackMetadata>> {
        let client = self.session.client()?;
        let Some(object) = client.lookup(uri).await? else {
            return Ok(None);
        };
        let track = object
            .into_track()
            .ok_or_else(|| SpotifyError::UnexpectedObject {
                uri: uri.to_string(),
                expected: "track",
            })?;
        Ok(Some(TrackMetadata::from_track(&track)))
    }
}
