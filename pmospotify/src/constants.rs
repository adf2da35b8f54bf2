//! Fixed parameters of the session coordinator.
//!
//! Unlike the restart policies in [`crate::config`], these values are not
//! exposed to the configuration file.

use std::time::Duration;

// ============================================================================
// Resolution retries
// ============================================================================

/// Total number of resolution attempts for one play/metadata request
pub const RETRY_ATTEMPTS: u32 = 3;

/// Linear backoff step: attempt `n` waits `n * step` before running
pub const RETRY_BACKOFF_STEP: Duration = Duration::from_millis(500);

// ============================================================================
// Restart policies (defaults)
// ============================================================================

/// Proactive restart period (seconds)
pub const SCHEDULE_RESTART_EACH_SECONDS: u64 = 5 * 60;

/// Successful plays before a preventive restart is armed
pub const PLAY_RESTART_EACH: u32 = 2;

/// Delay between reaching the play threshold and the preventive restart (seconds)
pub const PLAY_RESTART_AFTER_SECONDS: u64 = 2;

/// Retries the backend may spend on a single stream URL request
pub const STREAM_URL_RETRIES: u32 = 1;

// ============================================================================
// Catalog
// ============================================================================

/// Preferred artwork sizes, largest first
pub const PREFERRED_IMAGE_SIZES: [&str; 2] = ["640", "300"];

/// Listing entries report a slightly shorter duration than the track itself
pub const LISTING_DURATION_TRIM_MS: u64 = 500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_sanity() {
        assert!(RETRY_ATTEMPTS >= 1);
        assert_eq!(RETRY_BACKOFF_STEP, Duration::from_millis(500));
        assert!(PLAY_RESTART_AFTER_SECONDS < SCHEDULE_RESTART_EACH_SECONDS);
        assert!(PLAY_RESTART_EACH > 0);
    }
}
