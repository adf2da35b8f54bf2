//! Error types for the Spotify session coordinator

use thiserror::Error;

/// Result type alias for pmospotify operations
pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Errors that can occur while driving the Spotify session
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Username or password missing: no connection is attempted
    #[error("Spotify credentials are incomplete")]
    ConfigurationIncomplete,

    /// Login or restart refused by the backend
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// No usable session (never started or last start failed)
    #[error("Spotify session is not available")]
    SessionUnavailable,

    /// Generic failure reported by the backend client
    #[error("Backend error: {0}")]
    Backend(String),

    /// The URI did not resolve to any object
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The URI resolved to an object of an unexpected kind
    #[error("Unexpected object for {uri}: expected {expected}")]
    UnexpectedObject { uri: String, expected: &'static str },

    /// Every resolution attempt failed
    #[error("Resolution unavailable for {uri} after {attempts} attempts")]
    ResolutionExhausted { uri: String, attempts: u32 },

    /// Configuration error (from pmoconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Configuration section could not be deserialized
    #[error("Configuration format error: {0}")]
    ConfigFormat(#[from] serde_yaml::Error),
}

impl SpotifyError {
    /// Builds a backend error from any displayable message
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Errors worth a session restart followed by another attempt
    ///
    /// A missing object counts: a degraded session answers lookups with
    /// nothing. A wrong object kind or a configuration problem does not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SpotifyError::Backend(_)
                | SpotifyError::SessionUnavailable
                | SpotifyError::Unauthorized(_)
                | SpotifyError::NotFound(_)
        )
    }
}
