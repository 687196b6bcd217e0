//! MusicBrainz recording search client
//!
//! MusicBrainz is a free, open music encyclopedia.
//! Base URL: https://musicbrainz.org/ws/2
//!
//! Rate limiting: MusicBrainz requires at least 1 second between requests.
//! User-Agent header is required with app name, version, and contact.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::SourceClient;
use crate::config::ResolverConfig;
use crate::error::SourceError;
use crate::rate_limiter::{
    RateLimitConfig, RateLimitedClient, ResponseExt, RetryConfig, retry_async,
};
use crate::types::{MetadataCandidate, RawQuery, SourceTier};

/// MusicBrainz API client with rate limiting
pub struct MusicBrainzClient {
    client: Arc<RateLimitedClient>,
    base_url: String,
    user_agent: String,
    retry_config: RetryConfig,
    max_candidates: usize,
}

/// Recording search response
#[derive(Debug, Clone, Deserialize)]
struct MusicBrainzRecordingSearch {
    #[serde(default)]
    recordings: Vec<MusicBrainzRecording>,
}

/// Recording (track) from MusicBrainz
#[derive(Debug, Clone, Deserialize)]
struct MusicBrainzRecording {
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MusicBrainzArtistCredit>,
    releases: Option<Vec<MusicBrainzRelease>>,
}

#[derive(Debug, Clone, Deserialize)]
struct MusicBrainzArtistCredit {
    name: String,
}

/// Release (specific pressing/edition of an album)
#[derive(Debug, Clone, Deserialize)]
struct MusicBrainzRelease {
    title: String,
    date: Option<String>,
}

impl MusicBrainzClient {
    /// Create a new MusicBrainz client
    pub fn new(app_name: &str, app_version: &str, contact: &str, config: &ResolverConfig) -> Self {
        Self {
            client: Arc::new(RateLimitedClient::new(
                "musicbrainz",
                RateLimitConfig {
                    min_delay: config.musicbrainz_delay,
                },
                config.request_timeout,
            )),
            base_url: "https://musicbrainz.org/ws/2".to_string(),
            user_agent: format!("{}/{} ( {} )", app_name, app_version, contact),
            retry_config: config.retry.clone(),
            max_candidates: config.max_candidates,
        }
    }

    /// Create with default identification
    pub fn new_default(config: &ResolverConfig) -> Self {
        Self::new(
            "tagsmith",
            env!("CARGO_PKG_VERSION"),
            "https://github.com/tagsmith/tagsmith",
            config,
        )
    }

    /// Escape Lucene special characters in a search term
    fn escape_lucene(input: &str) -> String {
        let mut escaped = String::with_capacity(input.len());
        for c in input.chars() {
            match c {
                '+' | '-' | '!' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '"' | '~' | '*'
                | '?' | ':' | '\\' | '/' => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                _ => escaped.push(c),
            }
        }
        escaped
    }

    fn build_query(artist: Option<&str>, title: &str) -> String {
        match artist {
            Some(artist) => format!(
                "artist:\"{}\" AND recording:\"{}\"",
                Self::escape_lucene(artist),
                Self::escape_lucene(title)
            ),
            None => format!("recording:\"{}\"", Self::escape_lucene(title)),
        }
    }

    fn candidate_from_recording(recording: MusicBrainzRecording) -> Option<MetadataCandidate> {
        let artist = recording.artist_credit.first()?.name.clone();
        let first_release = recording.releases.as_ref().and_then(|r| r.first());
        let album = first_release.map(|r| r.title.clone());
        let year = first_release
            .and_then(|r| r.date.as_deref())
            .and_then(|date| date.split('-').next())
            .and_then(|y| y.parse().ok());

        Some(MetadataCandidate {
            artist,
            title: recording.title,
            album,
            year: MetadataCandidate::validate_year(year),
            genre: None,
            artwork_url: None,
            // Scoring happens in the matcher.
            confidence: 0.0,
            tier: SourceTier::MusicBrainz,
        })
    }
}

#[async_trait]
impl SourceClient for MusicBrainzClient {
    fn tier(&self) -> SourceTier {
        SourceTier::MusicBrainz
    }

    async fn search(&self, query: &RawQuery) -> Result<Vec<MetadataCandidate>, SourceError> {
        let (artist, title) = query.search_terms();
        if title.is_empty() {
            return Ok(Vec::new());
        }

        let lucene_query = Self::build_query(artist.as_deref(), &title);
        debug!(query = %lucene_query, "Searching MusicBrainz recordings");

        let url = format!("{}/recording", self.base_url);
        let limit = self.max_candidates.to_string();

        let response: MusicBrainzRecordingSearch = retry_async(
            || {
                let url = url.clone();
                let client = self.client.clone();
                let q = lucene_query.clone();
                let ua = self.user_agent.clone();
                let limit = limit.clone();
                async move {
                    let query_params = [
                        ("query", q),
                        ("fmt", "json".to_string()),
                        ("limit", limit),
                    ];

                    let response = client
                        .get_with_headers_and_query(&url, &[("User-Agent", &ua)], &query_params)
                        .await?;

                    if let Some(err) = response.classify_status() {
                        return Err(err);
                    }

                    response
                        .json::<MusicBrainzRecordingSearch>()
                        .await
                        .map_err(SourceError::from_request)
                }
            },
            &self.retry_config,
            "musicbrainz_search_recordings",
        )
        .await?;

        let candidates: Vec<MetadataCandidate> = response
            .recordings
            .into_iter()
            .take(self.max_candidates)
            .filter_map(Self::candidate_from_recording)
            .collect();

        debug!(count = candidates.len(), "MusicBrainz search returned candidates");
        Ok(candidates)
    }
}
