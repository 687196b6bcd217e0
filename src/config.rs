//! Resolver configuration

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::rate_limiter::RetryConfig;

/// Policy knobs for the resolution waterfall.
///
/// Hosts construct this directly or through `from_env`; nothing is read from
/// global state afterwards.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Fuzzy score a candidate must reach to be accepted
    pub match_threshold: f64,
    /// Maximum candidates considered per catalog tier
    pub max_candidates: usize,
    /// Maximum resolutions in flight during `resolve_batch`
    pub fan_out: usize,
    /// Minimum spacing between MusicBrainz requests (their etiquette: 1s)
    pub musicbrainz_delay: Duration,
    /// Minimum spacing between iTunes requests
    pub itunes_delay: Duration,
    /// Per-request timeout for catalog calls
    pub request_timeout: Duration,
    /// Retry policy for transient upstream failures
    pub retry: RetryConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.6,
            max_candidates: 5,
            fan_out: 4,
            musicbrainz_delay: Duration::from_secs(1),
            itunes_delay: Duration::from_millis(250),
            request_timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Load overrides from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = env::var("TAGSMITH_MATCH_THRESHOLD") {
            config.match_threshold = value.parse().context("Invalid TAGSMITH_MATCH_THRESHOLD")?;
        }
        if let Ok(value) = env::var("TAGSMITH_MAX_CANDIDATES") {
            config.max_candidates = value.parse().context("Invalid TAGSMITH_MAX_CANDIDATES")?;
        }
        if let Ok(value) = env::var("TAGSMITH_FAN_OUT") {
            config.fan_out = value.parse().context("Invalid TAGSMITH_FAN_OUT")?;
        }
        if let Ok(value) = env::var("TAGSMITH_MUSICBRAINZ_DELAY_MS") {
            let ms: u64 = value
                .parse()
                .context("Invalid TAGSMITH_MUSICBRAINZ_DELAY_MS")?;
            config.musicbrainz_delay = Duration::from_millis(ms);
        }
        if let Ok(value) = env::var("TAGSMITH_ITUNES_DELAY_MS") {
            let ms: u64 = value.parse().context("Invalid TAGSMITH_ITUNES_DELAY_MS")?;
            config.itunes_delay = Duration::from_millis(ms);
        }
        if let Ok(value) = env::var("TAGSMITH_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = value
                .parse()
                .context("Invalid TAGSMITH_REQUEST_TIMEOUT_SECS")?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(value) = env::var("TAGSMITH_MAX_RETRIES") {
            config.retry.max_retries = value.parse().context("Invalid TAGSMITH_MAX_RETRIES")?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.match_threshold, 0.6);
        assert_eq!(config.max_candidates, 5);
        assert_eq!(config.fan_out, 4);
        assert_eq!(config.musicbrainz_delay, Duration::from_secs(1));
        assert_eq!(config.retry.max_retries, 3);
    }
}
