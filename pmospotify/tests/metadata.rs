//! Metadata pipeline

mod common;

use common::{credentials, quiet_config, service, track, FakeBackend};
use futures::future::join_all;
use pmospotify::{
    ArtistRef, Credentials, MediaObject, MetadataResolver, RetryPolicy, SessionManager,
    SpotifyService,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_metadata_record() {
    let backend = FakeBackend::new();
    let mut so_what = track("so-what");
    so_what.name = "So What".to_string();
    so_what.number = 1;
    so_what.duration_ms = 545_000;
    so_what.artists.push(ArtistRef {
        uri: "spotify:artist:trane".to_string(),
        name: "John Coltrane".to_string(),
    });
    backend.insert(MediaObject::Track(so_what));
    let service = service(&backend, quiet_config());

    let metadata = service
        .metadata("spotify:track:so-what")
        .await
        .expect("metadata should resolve");

    assert_eq!(metadata.title, "So What");
    assert_eq!(metadata.album, "Kind of Blue");
    assert_eq!(metadata.artists, "Miles Davis, John Coltrane");
    assert_eq!(metadata.number, 1);
    assert_eq!(metadata.duration_ms, 545_000);
    assert_eq!(
        metadata.image_url.as_deref(),
        Some("https://img.example/kob-300.jpg")
    );
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_yields_empty_result() {
    let backend = FakeBackend::new();
    backend.insert_tracks(&["a"]);
    backend.fail_all_lookups.store(true, Ordering::SeqCst);
    let service = service(&backend, quiet_config());

    assert_eq!(service.metadata("spotify:track:a").await, None);
    assert_eq!(backend.lookups(), 3);
    assert_eq!(backend.restarts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_policy_never_restarts() {
    let backend = FakeBackend::new();
    backend.insert_tracks(&["a"]);
    backend.fail_all_lookups.store(true, Ordering::SeqCst);
    let session = Arc::new(SessionManager::new(backend.connector(), credentials()));
    let resolver = MetadataResolver::new(session).with_policy(RetryPolicy {
        attempts: 1,
        step: Duration::from_millis(500),
    });

    assert_eq!(resolver.resolve_metadata("spotify:track:a").await, None);
    assert_eq!(backend.lookups(), 1);
    assert_eq!(backend.restarts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_uri_yields_empty_result() {
    let backend = FakeBackend::new();
    let service = service(&backend, quiet_config());

    assert_eq!(service.metadata("spotify:track:missing").await, None);
    assert_eq!(backend.lookups(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_guards_make_no_backend_call() {
    let backend = FakeBackend::new();
    let service = SpotifyService::new(
        backend.connector(),
        Credentials::new("", "secret"),
        quiet_config(),
    );

    assert_eq!(service.metadata("spotify:track:a").await, None);
    assert_eq!(service.metadata("").await, None);
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_metadata_does_not_touch_play_state() {
    let backend = FakeBackend::new();
    backend.insert_tracks(&["a"]);
    let service = service(&backend, quiet_config());

    assert!(service.metadata("spotify:track:a").await.is_some());
    let status = service.status();
    assert_eq!(status.play_count, 0);
    assert_eq!(status.cached_track, None);
    assert_eq!(backend.stream_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_metadata_requests_are_serialized() {
    let backend = FakeBackend::new().with_lookup_delay(Duration::from_millis(50));
    let ids = ["a", "b", "c"];
    backend.insert_tracks(&ids);
    let service = Arc::new(service(&backend, quiet_config()));

    let results = join_all(ids.iter().map(|id| {
        let service = service.clone();
        let uri = format!("spotify:track:{id}");
        async move { service.metadata(&uri).await }
    }))
    .await;
    assert!(results.iter().all(Option::is_some));

    let log = backend.lookup_log();
    assert_eq!(log.len(), 3);
    for pair in log.windows(2) {
        assert!(pair[0].ended <= pair[1].started);
    }
    assert_eq!(backend.logins(), 1);
}
