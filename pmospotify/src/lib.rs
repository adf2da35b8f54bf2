//! # pmospotify - Coordinateur de session Spotify pour PMOMusic
//!
//! Cette crate garde en vie une session unique vers le backend Spotify et
//! sert, au-dessus de cette session, les requêtes de lecture, de métadonnées
//! et de navigation qui arrivent en parallèle.
//!
//! ## Vue d'ensemble
//!
//! - Une seule session par processus, (re)démarrée par un seul appelant à la
//!   fois ; les autres attendent le résultat au lieu de relancer une
//!   authentification
//! - Lecture et métadonnées sérialisées chacune sur leur propre verrou
//! - Nouvelle tentative avec redémarrage de session entre les essais
//!   (3 essais, attente linéaire de 0,5 s)
//! - Cache d'une entrée pour la dernière URL de stream résolue
//! - Redémarrage périodique et redémarrage préventif après N lectures
//!
//! Le protocole du backend lui-même n'est pas implémenté ici : il est fourni
//! par une implémentation des traits [`BackendConnector`] et
//! [`BackendSession`].
//!
//! ## Structure des modules
//!
//! ```text
//! pmospotify/
//! ├── src/
//! │   ├── lib.rs              # Module principal (ce fichier)
//! │   ├── service.rs          # Assemblage et cycle de vie
//! │   ├── session.rs          # Propriétaire de la session backend
//! │   ├── playback.rs         # Résolution des lectures
//! │   ├── metadata.rs         # Résolution des métadonnées
//! │   ├── retry.rs            # Politique de nouvelle tentative
//! │   ├── governor.rs         # Redémarrage préventif après N lectures
//! │   ├── scheduler.rs        # Redémarrage périodique
//! │   ├── catalog.rs          # Navigation dans le catalogue
//! │   ├── track_cache.rs      # Dernière URL de stream
//! │   ├── backend.rs          # Contrat du client backend
//! │   ├── models.rs           # Structures de données
//! │   ├── config.rs           # Bloc `sources.spotify`
//! │   ├── config_ext.rs       # Extension pmoconfig
//! │   ├── constants.rs        # Paramètres fixes
//! │   └── error.rs            # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,ignore
//! use pmospotify::SpotifyService;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let connector = Arc::new(MyConnector::new());
//!     let service = SpotifyService::from_config(connector, &pmoconfig::get_config())?;
//!     service.start().await;
//!
//!     if let Some(url) = service.play("spotify:track:4uLU6hMCjMI75M1A2tKUQC").await? {
//!         println!("Redirect to {}", url);
//!     }
//!
//!     service.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```yaml
//! accounts:
//!   spotify:
//!     username: "alice"
//!     password: "secret"
//!     region: "FR"
//! sources:
//!   spotify:
//!     restart:
//!       schedule_interval_seconds: 300
//!       play_threshold: 2
//!       play_restart_delay_seconds: 2
//!     catalog:
//!       display_album_year: false
//!     backend:
//!       stream_url_retries: 1
//! ```

pub mod backend;
pub mod catalog;
pub mod config;
pub mod config_ext;
pub mod constants;
pub mod error;
pub mod governor;
pub mod metadata;
pub mod models;
pub mod playback;
pub mod retry;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod track_cache;

pub use backend::{BackendConnector, BackendSession};
pub use catalog::{Catalog, SearchListing};
pub use config::SpotifyConfig;
pub use config_ext::SpotifyConfigExt;
pub use error::{Result, SpotifyError};
pub use governor::{PlayCountGovernor, PlayCountState};
pub use metadata::MetadataResolver;
pub use models::{
    Album, AlbumEntry, AlbumRef, Artist, ArtistEntry, ArtistRef, Artwork, Credentials, ImageSet,
    MediaObject, Placeholder, Playlist, PlaylistEntry, SearchKind, SearchResult, Track,
    TrackMetadata,
};
pub use playback::PlaybackResolver;
pub use retry::RetryPolicy;
pub use scheduler::{RestartScheduler, ScheduleDecision};
pub use service::{ServiceStatus, SpotifyService};
pub use session::SessionManager;
pub use track_cache::TrackCache;
