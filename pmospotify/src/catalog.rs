//! Catalog browsing through the shared session
//!
//! Every operation first makes sure the session is started, then forwards to
//! the backend and turns the objects into listing entries. Tracks and albums
//! the backend marks as unplayable are dropped from the listings.

use crate::backend::BackendSession;
use crate::config::CatalogConfig;
use crate::error::{Result, SpotifyError};
use crate::models::{
    artwork_for, Album, AlbumEntry, Artist, ArtistEntry, Artwork, MediaObject, Placeholder,
    Playlist, PlaylistEntry, SearchKind, Track, TrackMetadata,
};
use crate::session::SessionManager;
use std::sync::Arc;
use tracing::{debug, warn};

/// Search results ready for display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchListing {
    pub tracks: Vec<TrackMetadata>,
    pub albums: Vec<AlbumEntry>,
    pub artists: Vec<ArtistEntry>,
    pub playlists: Vec<PlaylistEntry>,
}

pub struct Catalog {
    session: Arc<SessionManager>,
    config: CatalogConfig,
}

impl Catalog {
    pub fn new(session: Arc<SessionManager>, config: CatalogConfig) -> Self {
        Self { session, config }
    }

    async fn client(&self) -> Result<Arc<dyn BackendSession>> {
        if !self.session.ensure_started().await {
            return Err(if self.session.credentials().is_complete() {
                SpotifyError::SessionUnavailable
            } else {
                SpotifyError::ConfigurationIncomplete
            });
        }
        self.session.client()
    }

    pub async fn search(&self, query: &str, kind: SearchKind) -> Result<SearchListing> {
        let client = self.client().await?;
        debug!(%query, kind = kind.as_str(), "Searching catalog");
        let result = client.search(query, kind).await?;

        Ok(SearchListing {
            tracks: self.track_listing(client.as_ref(), &result.tracks),
            albums: self.album_listing(client.as_ref(), &result.albums),
            artists: result.artists.iter().map(ArtistEntry::from_artist).collect(),
            playlists: result
                .playlists
                .iter()
                .map(PlaylistEntry::from_playlist)
                .collect(),
        })
    }

    pub async fn featured_playlists(&self) -> Result<Vec<PlaylistEntry>> {
        let client = self.client().await?;
        Ok(playlist_listing(&client.featured_playlists().await?))
    }

    pub async fn top_playlists(&self) -> Result<Vec<PlaylistEntry>> {
        let client = self.client().await?;
        Ok(playlist_listing(&client.top_playlists().await?))
    }

    pub async fn new_releases(&self) -> Result<Vec<AlbumEntry>> {
        let client = self.client().await?;
        let albums = client.new_releases().await?;
        Ok(self.album_listing(client.as_ref(), &albums))
    }

    /// Playlists of the logged-in user
    pub async fn playlists(&self) -> Result<Vec<PlaylistEntry>> {
        let client = self.client().await?;
        Ok(playlist_listing(&client.playlists().await?))
    }

    /// Starred tracks of the logged-in user
    pub async fn starred(&self) -> Result<Vec<TrackMetadata>> {
        let uri = format!("spotify:user:{}:starred", self.session.credentials().username);
        self.playlist_tracks(&uri).await
    }

    pub async fn my_albums(&self) -> Result<Vec<AlbumEntry>> {
        let client = self.client().await?;
        let albums = client.my_albums().await?;
        Ok(self.album_listing(client.as_ref(), &albums))
    }

    pub async fn my_artists(&self) -> Result<Vec<ArtistEntry>> {
        let client = self.client().await?;
        Ok(client
            .my_artists()
            .await?
            .iter()
            .map(ArtistEntry::from_artist)
            .collect())
    }

    pub async fn artist_albums(&self, uri: &str) -> Result<Vec<AlbumEntry>> {
        let client = self.client().await?;
        let artist = lookup_artist(client.as_ref(), uri).await?;
        Ok(self.album_listing(client.as_ref(), &artist.albums))
    }

    pub async fn artist_top_tracks(&self, uri: &str) -> Result<Vec<TrackMetadata>> {
        let client = self.client().await?;
        let artist = lookup_artist(client.as_ref(), uri).await?;
        Ok(self.track_listing(client.as_ref(), &artist.top_tracks))
    }

    pub async fn album_tracks(&self, uri: &str) -> Result<Vec<TrackMetadata>> {
        let client = self.client().await?;
        let album = lookup_album(client.as_ref(), uri).await?;
        Ok(self.track_listing(client.as_ref(), &album.tracks))
    }

    pub async fn playlist_tracks(&self, uri: &str) -> Result<Vec<TrackMetadata>> {
        let client = self.client().await?;
        let playlist = lookup_playlist(client.as_ref(), uri).await?;
        if playlist.truncated {
            debug!(%uri, tracks = playlist.tracks.len(), "Playlist listing is truncated");
        }
        Ok(self.track_listing(client.as_ref(), &playlist.tracks))
    }

    /// Artwork for a URI or a pre-selected image URL
    ///
    /// Never fails: anything that cannot be resolved falls back to the
    /// placeholder.
    pub async fn image_for(&self, uri: &str) -> Artwork {
        if uri.is_empty() {
            return Artwork::Placeholder(Placeholder::Artist);
        }
        if !uri.starts_with("spotify:") {
            return Artwork::Url(uri.to_string());
        }

        let object = match self.client().await {
            Ok(client) => match client.lookup(uri).await {
                Ok(object) => object,
                Err(err) => {
                    warn!(%uri, error = %err, "Artwork lookup failed");
                    None
                }
            },
            Err(err) => {
                warn!(%uri, error = %err, "No session for artwork lookup");
                None
            }
        };
        artwork_for(object.as_ref())
    }

    fn track_listing(&self, client: &dyn BackendSession, tracks: &[Track]) -> Vec<TrackMetadata> {
        tracks
            .iter()
            .filter(|track| client.is_track_playable(track))
            .map(TrackMetadata::for_listing)
            .collect()
    }

    fn album_listing(&self, client: &dyn BackendSession, albums: &[Album]) -> Vec<AlbumEntry> {
        albums
            .iter()
            .filter(|album| client.is_album_playable(album))
            .map(|album| AlbumEntry::from_album(album, self.config.display_album_year))
            .collect()
    }
}

fn playlist_listing(playlists: &[Playlist]) -> Vec<PlaylistEntry> {
    playlists.iter().map(PlaylistEntry::from_playlist).collect()
}

async fn lookup(client: &dyn BackendSession, uri: &str) -> Result<MediaObject> {
    client
        .lookup(uri)
        .await?
        .ok_or_else(|| SpotifyError::NotFound(uri.to_string()))
}

async fn lookup_artist(client: &dyn BackendSession, uri: &str) -> Result<Artist> {
    match lookup(client, uri).await? {
        MediaObject::Artist(artist) => Ok(artist),
        _ => Err(SpotifyError::UnexpectedObject {
            uri: uri.to_string(),
            expected: "artist",
        }),
    }
}

async fn lookup_album(client: &dyn BackendSession, uri: &str) -> Result<Album> {
    match lookup(client, uri).await? {
        MediaObject::Album(album) => Ok(album),
        _ => Err(SpotifyError::UnexpectedObject {
            uri: uri.to_string(),
            expected: "album",
        }),
    }
}

async fn lookup_playlist(client: &dyn BackendSession, uri: &str) -> Result<Playlist> {
    match lookup(client, uri).await? {
        MediaObject::Playlist(playlist) => Ok(playlist),
        _ => Err(SpotifyError::UnexpectedObject {
            uri: uri.to_string(),
            expected: "playlist",
        }),
    }
}
