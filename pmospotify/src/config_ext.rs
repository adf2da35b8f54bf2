//! Extension pour intégrer la configuration Spotify dans pmoconfig
//!
//! Le trait `SpotifyConfigExt` ajoute à `pmoconfig::Config` l'accès aux
//! credentials du compte (`accounts.spotify`) et au bloc `sources.spotify`.

use crate::config::SpotifyConfig;
use crate::models::Credentials;
use anyhow::{anyhow, Result};
use pmoconfig::Config;
use serde_yaml::Value;

/// Trait d'extension pour gérer la configuration Spotify dans pmoconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoconfig::get_config;
/// use pmospotify::SpotifyConfigExt;
///
/// let config = get_config();
/// let credentials = config.get_spotify_credentials();
/// println!("Spotify user: {}", credentials.username);
/// ```
pub trait SpotifyConfigExt {
    /// Nom d'utilisateur configuré
    ///
    /// # Errors
    ///
    /// Retourne une erreur si le nom d'utilisateur n'est pas configuré
    fn get_spotify_username(&self) -> Result<String>;

    fn set_spotify_username(&self, username: &str) -> Result<()>;

    /// Mot de passe configuré
    ///
    /// # Errors
    ///
    /// Retourne une erreur si le mot de passe n'est pas configuré
    fn get_spotify_password(&self) -> Result<String>;

    fn set_spotify_password(&self, password: &str) -> Result<()>;

    /// Région du compte, `None` si non configurée
    fn get_spotify_region(&self) -> Option<String>;

    fn set_spotify_region(&self, region: &str) -> Result<()>;

    /// Credentials tels que configurés
    ///
    /// Les champs absents restent vides : c'est [`Credentials::is_complete`]
    /// qui décide si une connexion peut être tentée.
    fn get_spotify_credentials(&self) -> Credentials;

    /// Remplace les credentials en mémoire
    fn set_spotify_credentials(&self, credentials: &Credentials) -> Result<()>;

    /// Bloc `sources.spotify`, valeurs par défaut pour les champs absents
    fn get_spotify_config(&self) -> Result<SpotifyConfig>;
}

impl SpotifyConfigExt for Config {
    fn get_spotify_username(&self) -> Result<String> {
        self.get_string(&["accounts", "spotify", "username"])
            .ok_or_else(|| anyhow!("Spotify username not configured"))
    }

    fn set_spotify_username(&self, username: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "username"],
            Value::String(username.to_string()),
        )
    }

    fn get_spotify_password(&self) -> Result<String> {
        self.get_string(&["accounts", "spotify", "password"])
            .ok_or_else(|| anyhow!("Spotify password not configured"))
    }

    fn set_spotify_password(&self, password: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "password"],
            Value::String(password.to_string()),
        )
    }

    fn get_spotify_region(&self) -> Option<String> {
        self.get_string(&["accounts", "spotify", "region"])
    }

    fn set_spotify_region(&self, region: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "region"],
            Value::String(region.to_string()),
        )
    }

    fn get_spotify_credentials(&self) -> Credentials {
        let credentials = Credentials::new(
            self.get_spotify_username().unwrap_or_default(),
            self.get_spotify_password().unwrap_or_default(),
        );
        match self.get_spotify_region() {
            Some(region) => credentials.with_region(region),
            None => credentials,
        }
    }

    fn set_spotify_credentials(&self, credentials: &Credentials) -> Result<()> {
        self.set_spotify_username(&credentials.username)?;
        self.set_spotify_password(&credentials.password)?;
        self.set_spotify_region(credentials.region.as_deref().unwrap_or(""))
    }

    fn get_spotify_config(&self) -> Result<SpotifyConfig> {
        SpotifyConfig::from_pmoconfig(self)
    }
}
