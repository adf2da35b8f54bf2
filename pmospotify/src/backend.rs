//! Contract of the Spotify backend client
//!
//! The wire protocol (authentication handshake, framing, audio keys) lives
//! outside this crate. The coordinator only drives a client through the two
//! traits below: a [`BackendConnector`] creates sessions, a
//! [`BackendSession`] answers lookups and stream requests.

use crate::error::Result;
use crate::models::{
    Album, Artist, Credentials, MediaObject, Playlist, SearchKind, SearchResult, Track,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Factory for backend sessions
#[async_trait]
pub trait BackendConnector: Send + Sync {
    /// Performs a full login and returns the new session
    async fn login(&self, credentials: &Credentials) -> Result<Arc<dyn BackendSession>>;

    /// Checks that `uri` is something the backend can resolve
    fn is_uri_valid(&self, uri: &str) -> bool;
}

/// An authenticated backend session
///
/// A session is shared by every request; implementations must be safe to
/// call concurrently.
#[async_trait]
pub trait BackendSession: Send + Sync {
    /// Re-authenticates the existing session in place
    async fn restart(&self, credentials: &Credentials) -> Result<()>;

    /// Closes the session
    async fn shutdown(&self);

    fn is_logged_in(&self) -> bool;

    /// Resolves a URI to a catalog object, `None` when it does not exist
    async fn lookup(&self, uri: &str) -> Result<Option<MediaObject>>;

    /// Requests a single-use, time-limited stream URL for `track`
    async fn fetch_stream_url(&self, track: &Track, retries: u32) -> Result<Option<String>>;

    async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchResult>;

    async fn featured_playlists(&self) -> Result<Vec<Playlist>>;

    async fn top_playlists(&self) -> Result<Vec<Playlist>>;

    async fn new_releases(&self) -> Result<Vec<Album>>;

    /// Playlists of the logged-in user
    async fn playlists(&self) -> Result<Vec<Playlist>>;

    /// Albums saved by the logged-in user
    async fn my_albums(&self) -> Result<Vec<Album>>;

    /// Artists followed by the logged-in user
    async fn my_artists(&self) -> Result<Vec<Artist>>;

    fn is_track_playable(&self, _track: &Track) -> bool {
        true
    }

    fn is_album_playable(&self, _album: &Album) -> bool {
        true
    }
}
