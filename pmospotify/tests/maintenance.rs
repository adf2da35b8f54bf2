//! Background maintenance: preventive restart after N plays and the
//! periodic restart scheduler

mod common;

use common::{credentials, quiet_config, service, FakeBackend};
use pmospotify::{
    PlayCountGovernor, RestartScheduler, SessionManager, SpotifyConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn governed_config() -> SpotifyConfig {
    let mut config = SpotifyConfig::default();
    config.restart.play_threshold = 2;
    config.restart.play_restart_delay_seconds = 2;
    config
}

#[tokio::test(start_paused = true)]
async fn test_one_preventive_restart_per_cycle() -> anyhow::Result<()> {
    let backend = FakeBackend::new();
    backend.insert_tracks(&["a", "b", "c", "d", "e"]);
    let service = service(&backend, governed_config());

    service.play("spotify:track:a").await?;
    assert!(!service.status().restart_scheduled);

    service.play("spotify:track:b").await?;
    service.play("spotify:track:c").await?;
    let status = service.status();
    assert!(status.restart_scheduled);
    assert_eq!(status.play_count, 3);
    assert_eq!(backend.restarts(), 0);

    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(backend.restarts(), 1);
    let status = service.status();
    assert!(!status.restart_scheduled);
    assert_eq!(status.play_count, 0);

    // A new cycle arms again
    service.play("spotify:track:d").await?;
    service.play("spotify:track:e").await?;
    assert!(service.status().restart_scheduled);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(backend.restarts(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_preventive_restart_waits_for_its_delay() {
    let backend = FakeBackend::new();
    let session = Arc::new(SessionManager::new(backend.connector(), credentials()));
    assert!(session.ensure_started().await);

    let governor = PlayCountGovernor::new(
        session.clone(),
        1,
        Duration::from_secs(2),
        CancellationToken::new(),
    );
    assert!(governor.on_play_success());
    assert!(!governor.on_play_success());

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(backend.restarts(), 0);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(backend.restarts(), 1);
    assert_eq!(governor.snapshot().count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_threshold_arms_on_first_play() {
    let backend = FakeBackend::new();
    let session = Arc::new(SessionManager::new(backend.connector(), credentials()));
    assert!(session.ensure_started().await);

    let governor = PlayCountGovernor::new(
        session.clone(),
        0,
        Duration::from_secs(2),
        CancellationToken::new(),
    );
    assert_eq!(governor.threshold(), 1);
    assert!(governor.on_play_success());
    assert!(governor.snapshot().restart_scheduled);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_preventive_restart_never_fires() {
    let backend = FakeBackend::new();
    let session = Arc::new(SessionManager::new(backend.connector(), credentials()));
    assert!(session.ensure_started().await);

    let cancel = CancellationToken::new();
    let governor =
        PlayCountGovernor::new(session.clone(), 1, Duration::from_secs(2), cancel.clone());
    assert!(governor.on_play_success());

    cancel.cancel();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(backend.restarts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_skips_recent_restart_and_rearms_for_remainder() {
    let backend = FakeBackend::new();
    let session = Arc::new(SessionManager::new(backend.connector(), credentials()));
    assert!(session.ensure_started().await);

    let scheduler = RestartScheduler::new(
        session.clone(),
        Duration::from_secs(300),
        CancellationToken::new(),
    );

    tokio::time::advance(Duration::from_secs(50)).await;
    let decision = scheduler.fire().await;
    assert!(!decision.restart);
    assert_eq!(decision.delay, Duration::from_secs(250));
    assert_eq!(backend.restarts(), 0);

    tokio::time::advance(Duration::from_secs(250)).await;
    let decision = scheduler.fire().await;
    assert!(decision.restart);
    assert_eq!(decision.delay, Duration::from_secs(300));
    assert_eq!(backend.restarts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_counts_from_restart_by_another_path() {
    let backend = FakeBackend::new();
    let session = Arc::new(SessionManager::new(backend.connector(), credentials()));
    assert!(session.ensure_started().await);
    let scheduler = RestartScheduler::new(
        session.clone(),
        Duration::from_secs(300),
        CancellationToken::new(),
    );

    tokio::time::advance(Duration::from_secs(200)).await;
    assert!(session.restart().await);
    tokio::time::advance(Duration::from_secs(150)).await;

    let decision = scheduler.fire().await;
    assert!(!decision.restart);
    assert_eq!(decision.delay, Duration::from_secs(150));
    assert_eq!(backend.restarts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_starts_a_never_started_session() {
    let backend = FakeBackend::new();
    let session = Arc::new(SessionManager::new(backend.connector(), credentials()));
    let scheduler = RestartScheduler::new(
        session.clone(),
        Duration::from_secs(300),
        CancellationToken::new(),
    );

    let decision = scheduler.fire().await;
    assert!(decision.restart);
    assert_eq!(backend.logins(), 1);
    assert_eq!(backend.restarts(), 0);
    assert!(session.is_usable());
}

#[tokio::test(start_paused = true)]
async fn test_service_runs_scheduler_until_shutdown() {
    let backend = FakeBackend::new();
    let service = service(&backend, quiet_config());

    assert!(service.start().await);
    assert_eq!(backend.logins(), 1);

    tokio::time::sleep(Duration::from_secs(301)).await;
    assert_eq!(backend.restarts(), 1);

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(backend.restarts(), 2);

    service.shutdown().await;
    assert_eq!(backend.shutdowns(), 1);
    assert!(!service.status().ready);

    tokio::time::sleep(Duration::from_secs(900)).await;
    assert_eq!(backend.restarts(), 2);
}
