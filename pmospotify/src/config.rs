//! Configuration structures for the Spotify coordinator.
//!
//! The block lives under `sources.spotify` in the pmoconfig tree. Every field
//! has a default so a partial (or missing) block is always usable.

use crate::constants::{
    PLAY_RESTART_AFTER_SECONDS, PLAY_RESTART_EACH, SCHEDULE_RESTART_EACH_SECONDS,
    STREAM_URL_RETRIES,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub restart: RestartConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl SpotifyConfig {
    pub fn from_pmoconfig(cfg: &pmoconfig::Config) -> anyhow::Result<Self> {
        Ok(cfg
            .get_section::<Self>(&["sources", "spotify"])?
            .unwrap_or_default())
    }
}

/// Session restart policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestartConfig {
    #[serde(default = "RestartConfig::default_schedule_interval")]
    pub schedule_interval_seconds: u64,
    #[serde(default = "RestartConfig::default_play_threshold")]
    pub play_threshold: u32,
    #[serde(default = "RestartConfig::default_play_restart_delay")]
    pub play_restart_delay_seconds: u64,
}

impl RestartConfig {
    const fn default_schedule_interval() -> u64 {
        SCHEDULE_RESTART_EACH_SECONDS
    }

    const fn default_play_threshold() -> u32 {
        PLAY_RESTART_EACH
    }

    const fn default_play_restart_delay() -> u64 {
        PLAY_RESTART_AFTER_SECONDS
    }

    /// Proactive restart period, never shorter than one second
    pub fn schedule_interval(&self) -> Duration {
        Duration::from_secs(self.schedule_interval_seconds.max(1))
    }

    pub fn play_restart_delay(&self) -> Duration {
        Duration::from_secs(self.play_restart_delay_seconds)
    }

    /// Play count that arms a preventive restart, at least one
    pub fn play_threshold(&self) -> u32 {
        self.play_threshold.max(1)
    }
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            schedule_interval_seconds: Self::default_schedule_interval(),
            play_threshold: Self::default_play_threshold(),
            play_restart_delay_seconds: Self::default_play_restart_delay(),
        }
    }
}

/// Catalog presentation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub display_album_year: bool,
}

/// Backend client tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "BackendConfig::default_stream_url_retries")]
    pub stream_url_retries: u32,
}

impl BackendConfig {
    const fn default_stream_url_retries() -> u32 {
        STREAM_URL_RETRIES
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            stream_url_retries: Self::default_stream_url_retries(),
        }
    }
}
