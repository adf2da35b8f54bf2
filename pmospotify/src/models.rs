//! Data structures exchanged with the Spotify backend and returned to callers

use crate::constants::{LISTING_DURATION_TRIM_MS, PREFERRED_IMAGE_SIZES};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Artwork URLs keyed by size label (`"640"`, `"300"`, ...), in backend order
pub type ImageSet = IndexMap<String, String>;

/// Picks the artwork to display from a set of sizes
///
/// `640` wins over `300`; otherwise the first non-empty size the backend
/// listed is used. Returns `None` when no size carries a URL.
pub fn select_image(images: Option<&ImageSet>) -> Option<String> {
    let images = images?;

    for size in PREFERRED_IMAGE_SIZES {
        if let Some(url) = images.get(size).filter(|url| !url.is_empty()) {
            return Some(url.clone());
        }
    }

    match images.values().find(|url| !url.is_empty()) {
        Some(url) => Some(url.clone()),
        None => {
            tracing::info!("Unable to select image, no size available");
            None
        }
    }
}

/// Account used to open the backend session
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub region: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        self.region = if region.trim().is_empty() {
            None
        } else {
            Some(region)
        };
        self
    }

    /// Both username and password are set
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

// Le mot de passe ne doit jamais apparaître dans les logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("region", &self.region)
            .finish()
    }
}

/// Lightweight artist reference carried by tracks and albums
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub uri: String,
    pub name: String,
}

/// Lightweight album reference carried by tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub covers: ImageSet,
}

/// A playable track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    /// Position on the album, 1-based
    pub number: u32,
    pub duration_ms: u64,
}

impl Track {
    /// Artist names joined for display
    pub fn artist_names(&self) -> String {
        join_names(&self.artists)
    }

    pub fn album_name(&self) -> String {
        self.album
            .as_ref()
            .map(|album| album.name.clone())
            .unwrap_or_default()
    }

    pub fn album_covers(&self) -> Option<&ImageSet> {
        self.album.as_ref().map(|album| &album.covers)
    }
}

/// An album with its track list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    /// Release year, 0 when unknown
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub track_count: u32,
    #[serde(default)]
    pub covers: ImageSet,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Album {
    pub fn artist_names(&self) -> String {
        join_names(&self.artists)
    }
}

/// An artist with its discography and top tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub portraits: ImageSet,
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub top_tracks: Vec<Track>,
}

/// A user or editorial playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: ImageSet,
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// The backend returned only part of the track list
    #[serde(default)]
    pub truncated: bool,
}

impl Playlist {
    /// Owner name for `spotify:user:<owner>:...` URIs
    pub fn owner(&self) -> Option<&str> {
        playlist_owner(&self.uri)
    }
}

/// Object returned by a backend lookup
#[derive(Debug, Clone, PartialEq)]
pub enum MediaObject {
    Track(Track),
    Album(Album),
    Artist(Artist),
    Playlist(Playlist),
}

impl MediaObject {
    pub fn uri(&self) -> &str {
        match self {
            MediaObject::Track(track) => &track.uri,
            MediaObject::Album(album) => &album.uri,
            MediaObject::Artist(artist) => &artist.uri,
            MediaObject::Playlist(playlist) => &playlist.uri,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MediaObject::Track(_) => "track",
            MediaObject::Album(_) => "album",
            MediaObject::Artist(_) => "artist",
            MediaObject::Playlist(_) => "playlist",
        }
    }

    /// Artwork attached to the object: portraits for artists, covers for
    /// albums, the album covers for tracks, images for playlists
    pub fn images(&self) -> Option<&ImageSet> {
        match self {
            MediaObject::Track(track) => track.album_covers(),
            MediaObject::Album(album) => Some(&album.covers),
            MediaObject::Artist(artist) => Some(&artist.portraits),
            MediaObject::Playlist(playlist) => Some(&playlist.images),
        }
    }

    pub fn into_track(self) -> Option<Track> {
        match self {
            MediaObject::Track(track) => Some(track),
            _ => None,
        }
    }
}

/// Restricts a search to one kind of object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchKind {
    #[default]
    All,
    Tracks,
    Albums,
    Artists,
    Playlists,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::All => "all",
            SearchKind::Tracks => "tracks",
            SearchKind::Albums => "albums",
            SearchKind::Artists => "artists",
            SearchKind::Playlists => "playlists",
        }
    }
}

/// Results of a catalog search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
    pub playlists: Vec<Playlist>,
}

/// Display metadata for one track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub uri: String,
    pub title: String,
    pub album: String,
    pub artists: String,
    pub number: u32,
    pub duration_ms: u64,
    pub image_url: Option<String>,
}

impl TrackMetadata {
    /// Full metadata record, as answered to a metadata request
    pub fn from_track(track: &Track) -> Self {
        Self {
            uri: track.uri.clone(),
            title: track.name.clone(),
            album: track.album_name(),
            artists: track.artist_names(),
            number: track.number,
            duration_ms: track.duration_ms,
            image_url: select_image(track.album_covers()),
        }
    }

    /// Record used in track listings, whose duration is slightly trimmed
    pub fn for_listing(track: &Track) -> Self {
        let mut metadata = Self::from_track(track);
        metadata.duration_ms = metadata.duration_ms.saturating_sub(LISTING_DURATION_TRIM_MS);
        metadata
    }
}

/// Placeholder artwork shipped with the plugin resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Artist,
    Playlist,
}

impl Placeholder {
    pub fn resource_name(&self) -> &'static str {
        match self {
            Placeholder::Artist => "placeholder-artist.png",
            Placeholder::Playlist => "placeholder-playlist.png",
        }
    }
}

/// Artwork to show for an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artwork {
    Url(String),
    Placeholder(Placeholder),
}

impl Artwork {
    fn or_placeholder(url: Option<String>, placeholder: Placeholder) -> Self {
        match url {
            Some(url) => Artwork::Url(url),
            None => Artwork::Placeholder(placeholder),
        }
    }
}

/// Album as listed in a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumEntry {
    pub uri: String,
    pub title: String,
    pub artists: String,
    pub track_count: u32,
    pub image_url: Option<String>,
}

impl AlbumEntry {
    /// `display_year` appends ` (year)` to the title when the year is known
    pub fn from_album(album: &Album, display_year: bool) -> Self {
        let title = if display_year && album.year != 0 {
            format!("{} ({})", album.name, album.year)
        } else {
            album.name.clone()
        };

        Self {
            uri: album.uri.clone(),
            title,
            artists: album.artist_names(),
            track_count: album.track_count,
            image_url: select_image(Some(&album.covers)),
        }
    }
}

/// Artist as listed in a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistEntry {
    pub uri: String,
    pub name: String,
    pub image_url: Option<String>,
}

impl ArtistEntry {
    pub fn from_artist(artist: &Artist) -> Self {
        Self {
            uri: artist.uri.clone(),
            name: artist.name.clone(),
            image_url: select_image(Some(&artist.portraits)),
        }
    }
}

/// Playlist as listed in a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// URI escaped for use in a route, colons kept
    pub key: String,
    pub uri: String,
    /// `"<name>: <description>"`
    pub title: String,
    pub owner: Option<String>,
    pub artwork: Artwork,
}

impl PlaylistEntry {
    pub fn from_playlist(playlist: &Playlist) -> Self {
        Self {
            key: quote_uri(&playlist.uri),
            uri: playlist.uri.clone(),
            title: format!("{}: {}", playlist.name, playlist.description),
            owner: playlist.owner().map(str::to_string),
            artwork: Artwork::or_placeholder(
                select_image(Some(&playlist.images)),
                Placeholder::Playlist,
            ),
        }
    }
}

/// Resolves artwork for an arbitrary object, falling back to the artist placeholder
pub(crate) fn artwork_for(object: Option<&MediaObject>) -> Artwork {
    Artwork::or_placeholder(
        object.and_then(|object| select_image(object.images())),
        Placeholder::Artist,
    )
}

/// Extracts `<owner>` from `spotify:user:<owner>:...`
pub fn playlist_owner(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("spotify:user:")?;
    let (owner, _) = rest.split_once(':')?;
    if owner.is_empty() { None } else { Some(owner) }
}

/// Form-encodes a URI while keeping `:` separators readable
pub fn quote_uri(uri: &str) -> String {
    url::form_urlencoded::byte_serialize(uri.as_bytes())
        .collect::<String>()
        .replace("%3A", ":")
}

fn join_names(artists: &[ArtistRef]) -> String {
    artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
