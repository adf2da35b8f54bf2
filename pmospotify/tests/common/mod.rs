//! In-memory backend used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use pmospotify::{
    Album, AlbumRef, Artist, ArtistRef, BackendConnector, BackendSession, Credentials, ImageSet,
    MediaObject, Playlist, Result, SearchKind, SearchResult, SpotifyConfig, SpotifyError,
    SpotifyService, Track,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// One backend lookup, with the virtual time it started and ended
#[derive(Debug, Clone)]
pub struct LookupRecord {
    pub uri: String,
    pub started: Instant,
    pub ended: Instant,
}

#[derive(Default)]
pub struct FakeBackend {
    pub logins: AtomicU32,
    pub restarts: AtomicU32,
    pub lookups: AtomicU32,
    pub stream_requests: AtomicU32,
    pub shutdowns: AtomicU32,

    pub login_delay: Mutex<Duration>,
    pub lookup_delay: Mutex<Duration>,
    pub fail_login: AtomicBool,
    pub fail_all_lookups: AtomicBool,
    /// Number of upcoming lookups that fail
    pub failing_lookups: AtomicU32,

    pub objects: Mutex<HashMap<String, MediaObject>>,
    pub unplayable: Mutex<HashSet<String>>,
    pub lookup_log: Mutex<Vec<LookupRecord>>,
    pub last_username: Mutex<Option<String>>,

    pub featured: Mutex<Vec<Playlist>>,
    pub releases: Mutex<Vec<Album>>,
    pub user_playlists: Mutex<Vec<Playlist>>,
    pub saved_albums: Mutex<Vec<Album>>,
    pub followed_artists: Mutex<Vec<Artist>>,
    pub search_result: Mutex<SearchResult>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connector(self: &Arc<Self>) -> Arc<dyn BackendConnector> {
        Arc::new(FakeConnector {
            backend: self.clone(),
        })
    }

    pub fn with_login_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        *self.login_delay.lock().unwrap() = delay;
        self
    }

    pub fn with_lookup_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        *self.lookup_delay.lock().unwrap() = delay;
        self
    }

    pub fn insert(&self, object: MediaObject) {
        self.objects
            .lock()
            .unwrap()
            .insert(object.uri().to_string(), object);
    }

    pub fn insert_tracks(&self, ids: &[&str]) {
        for id in ids {
            self.insert(MediaObject::Track(track(id)));
        }
    }

    pub fn mark_unplayable(&self, uri: &str) {
        self.unplayable.lock().unwrap().insert(uri.to_string());
    }

    pub fn logins(&self) -> u32 {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn restarts(&self) -> u32 {
        self.restarts.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> u32 {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub fn lookup_log(&self) -> Vec<LookupRecord> {
        self.lookup_log.lock().unwrap().clone()
    }

    /// Every call the coordinator made, whatever its kind
    pub fn total_calls(&self) -> u32 {
        self.logins() + self.restarts() + self.lookups() + self.stream_requests.load(Ordering::SeqCst)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        let delay = *self.login_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        *self.last_username.lock().unwrap() = Some(credentials.username.clone());
        if self.fail_login.load(Ordering::SeqCst) {
            return Err(SpotifyError::Unauthorized("bad credentials".to_string()));
        }
        Ok(())
    }
}

struct FakeConnector {
    backend: Arc<FakeBackend>,
}

#[async_trait]
impl BackendConnector for FakeConnector {
    async fn login(&self, credentials: &Credentials) -> Result<Arc<dyn BackendSession>> {
        self.backend.logins.fetch_add(1, Ordering::SeqCst);
        self.backend.authenticate(credentials).await?;
        Ok(Arc::new(FakeSession {
            backend: self.backend.clone(),
            logged_in: AtomicBool::new(true),
        }))
    }

    fn is_uri_valid(&self, uri: &str) -> bool {
        uri.starts_with("spotify:")
    }
}

struct FakeSession {
    backend: Arc<FakeBackend>,
    logged_in: AtomicBool,
}

#[async_trait]
impl BackendSession for FakeSession {
    async fn restart(&self, credentials: &Credentials) -> Result<()> {
        self.backend.restarts.fetch_add(1, Ordering::SeqCst);
        let result = self.backend.authenticate(credentials).await;
        self.logged_in.store(result.is_ok(), Ordering::SeqCst);
        result
    }

    async fn shutdown(&self) {
        self.backend.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.logged_in.store(false, Ordering::SeqCst);
    }

    fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    async fn lookup(&self, uri: &str) -> Result<Option<MediaObject>> {
        self.backend.lookups.fetch_add(1, Ordering::SeqCst);
        let started = Instant::now();
        let delay = *self.backend.lookup_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.backend.lookup_log.lock().unwrap().push(LookupRecord {
            uri: uri.to_string(),
            started,
            ended: Instant::now(),
        });

        if self.backend.fail_all_lookups.load(Ordering::SeqCst) {
            return Err(SpotifyError::backend("connection reset"));
        }
        let failing = self
            .backend
            .failing_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(SpotifyError::backend("connection reset"));
        }

        Ok(self.backend.objects.lock().unwrap().get(uri).cloned())
    }

    async fn fetch_stream_url(&self, track: &Track, _retries: u32) -> Result<Option<String>> {
        let n = self.backend.stream_requests.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(format!("https://audio.example/{}?token={}", track.uri, n)))
    }

    async fn search(&self, _query: &str, _kind: SearchKind) -> Result<SearchResult> {
        Ok(self.backend.search_result.lock().unwrap().clone())
    }

    async fn featured_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.backend.featured.lock().unwrap().clone())
    }

    async fn top_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.backend.featured.lock().unwrap().clone())
    }

    async fn new_releases(&self) -> Result<Vec<Album>> {
        Ok(self.backend.releases.lock().unwrap().clone())
    }

    async fn playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.backend.user_playlists.lock().unwrap().clone())
    }

    async fn my_albums(&self) -> Result<Vec<Album>> {
        Ok(self.backend.saved_albums.lock().unwrap().clone())
    }

    async fn my_artists(&self) -> Result<Vec<Artist>> {
        Ok(self.backend.followed_artists.lock().unwrap().clone())
    }

    fn is_track_playable(&self, track: &Track) -> bool {
        !self.backend.unplayable.lock().unwrap().contains(&track.uri)
    }

    fn is_album_playable(&self, album: &Album) -> bool {
        !self.backend.unplayable.lock().unwrap().contains(&album.uri)
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("alice", "secret")
}

/// Configuration whose play threshold never arms a preventive restart
pub fn quiet_config() -> SpotifyConfig {
    let mut config = SpotifyConfig::default();
    config.restart.play_threshold = 1_000;
    config
}

pub fn service(backend: &Arc<FakeBackend>, config: SpotifyConfig) -> SpotifyService {
    SpotifyService::new(backend.connector(), credentials(), config)
}

pub fn images(entries: &[(&str, &str)]) -> ImageSet {
    entries
        .iter()
        .map(|(size, url)| (size.to_string(), url.to_string()))
        .collect()
}

pub fn track(id: &str) -> Track {
    Track {
        uri: format!("spotify:track:{id}"),
        name: format!("Track {id}"),
        artists: vec![ArtistRef {
            uri: "spotify:artist:miles".to_string(),
            name: "Miles Davis".to_string(),
        }],
        album: Some(AlbumRef {
            uri: "spotify:album:kob".to_string(),
            name: "Kind of Blue".to_string(),
            covers: images(&[("300", "https://img.example/kob-300.jpg")]),
        }),
        number: 1,
        duration_ms: 300_000,
    }
}

pub fn album(id: &str, year: u32, tracks: Vec<Track>) -> Album {
    Album {
        uri: format!("spotify:album:{id}"),
        name: format!("Album {id}"),
        artists: vec![ArtistRef {
            uri: "spotify:artist:miles".to_string(),
            name: "Miles Davis".to_string(),
        }],
        year,
        track_count: tracks.len() as u32,
        covers: images(&[("640", format!("https://img.example/{id}-640.jpg").as_str())]),
        tracks,
    }
}

pub fn playlist(uri: &str, name: &str, tracks: Vec<Track>) -> Playlist {
    Playlist {
        uri: uri.to_string(),
        name: name.to_string(),
        description: "curated".to_string(),
        images: ImageSet::new(),
        tracks,
        truncated: false,
    }
}
