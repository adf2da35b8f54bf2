//! Drives the coordinator against an in-memory backend
//!
//! ```bash
//! PMOSPOTIFY_CONFIG__ACCOUNTS__SPOTIFY__USERNAME=demo \
//! PMOSPOTIFY_CONFIG__ACCOUNTS__SPOTIFY__PASSWORD=demo \
//! cargo run -p pmospotify --example offline_session
//! ```

use async_trait::async_trait;
use pmospotify::{
    Album, AlbumRef, Artist, ArtistRef, BackendConnector, BackendSession, Credentials,
    MediaObject, Playlist, Result, SearchKind, SearchResult, SpotifyConfigExt, SpotifyService,
    Track,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct MemoryConnector {
    tracks: HashMap<String, Track>,
}

#[async_trait]
impl BackendConnector for MemoryConnector {
    async fn login(&self, credentials: &Credentials) -> Result<Arc<dyn BackendSession>> {
        tracing::info!(username = %credentials.username, "Memory backend login");
        Ok(Arc::new(MemorySession {
            tracks: self.tracks.clone(),
            logged_in: AtomicBool::new(true),
        }))
    }

    fn is_uri_valid(&self, uri: &str) -> bool {
        uri.starts_with("spotify:")
    }
}

struct MemorySession {
    tracks: HashMap<String, Track>,
    logged_in: AtomicBool,
}

#[async_trait]
impl BackendSession for MemorySession {
    async fn restart(&self, _credentials: &Credentials) -> Result<()> {
        self.logged_in.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) {
        self.logged_in.store(false, Ordering::SeqCst);
    }

    fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::SeqCst)
    }

    async fn lookup(&self, uri: &str) -> Result<Option<MediaObject>> {
        Ok(self.tracks.get(uri).cloned().map(MediaObject::Track))
    }

    async fn fetch_stream_url(&self, track: &Track, _retries: u32) -> Result<Option<String>> {
        Ok(Some(format!("http://localhost:8080/stream/{}", track.uri)))
    }

    async fn search(&self, query: &str, _kind: SearchKind) -> Result<SearchResult> {
        let query = query.to_lowercase();
        Ok(SearchResult {
            tracks: self
                .tracks
                .values()
                .filter(|track| track.name.to_lowercase().contains(&query))
                .cloned()
                .collect(),
            ..SearchResult::default()
        })
    }

    async fn featured_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(Vec::new())
    }

    async fn top_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(Vec::new())
    }

    async fn new_releases(&self) -> Result<Vec<Album>> {
        Ok(Vec::new())
    }

    async fn playlists(&self) -> Result<Vec<Playlist>> {
        Ok(Vec::new())
    }

    async fn my_albums(&self) -> Result<Vec<Album>> {
        Ok(Vec::new())
    }

    async fn my_artists(&self) -> Result<Vec<Artist>> {
        Ok(Vec::new())
    }
}

fn demo_tracks() -> HashMap<String, Track> {
    [("so-what", "So What", 1), ("freddie", "Freddie Freeloader", 2)]
        .into_iter()
        .map(|(id, name, number)| {
            let track = Track {
                uri: format!("spotify:track:{id}"),
                name: name.to_string(),
                artists: vec![ArtistRef {
                    uri: "spotify:artist:miles".to_string(),
                    name: "Miles Davis".to_string(),
                }],
                album: Some(AlbumRef {
                    uri: "spotify:album:kob".to_string(),
                    name: "Kind of Blue".to_string(),
                    covers: Default::default(),
                }),
                number,
                duration_ms: 540_000,
            };
            (track.uri.clone(), track)
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = pmoconfig::get_config();
    let level = config.get_log_min_level()?.to_lowercase();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    if !config.get_spotify_credentials().is_complete() {
        config.set_spotify_credentials(&Credentials::new("demo", "demo"))?;
    }

    let connector = Arc::new(MemoryConnector {
        tracks: demo_tracks(),
    });
    let service = SpotifyService::from_config(connector, &config)?;

    service.start().await;

    for uri in ["spotify:track:so-what", "spotify:track:so-what", "spotify:track:freddie"] {
        match service.play(uri).await? {
            Some(url) => println!("play {uri} -> {url}"),
            None => println!("play {uri} -> ignored"),
        }
    }

    if let Some(metadata) = service.metadata("spotify:track:freddie").await {
        println!(
            "{} / {} / {} ({} ms)",
            metadata.title, metadata.album, metadata.artists, metadata.duration_ms
        );
    }

    let listing = service.catalog().search("so", SearchKind::Tracks).await?;
    println!("search: {} track(s)", listing.tracks.len());

    println!("{}", serde_json::to_string_pretty(&service.status())?);

    service.shutdown().await;
    Ok(())
}
