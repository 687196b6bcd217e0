//! iTunes Search API client
//!
//! Free search endpoint, no authentication required.
//! Base URL: https://itunes.apple.com/search
//!
//! Serves two roles: the tertiary resolution tier, and the artwork-only
//! enrichment lookup for matches accepted elsewhere. Artwork comes back as a
//! 100x100 thumbnail URL; the 600x600 rendition lives at the same path.

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

/// iTunes Search API client with rate limiting
pub struct ItunesClient {
    client: Arc<RateLimitedClient>,
    base_url: String,
    retry_config: RetryConfig,
    max_candidates: usize,
}

/// Song search response
#[derive(Debug, Clone, Deserialize)]
struct ItunesSearchResponse {
    #[serde(default)]
    results: Vec<ItunesTrack>,
}

/// Track from the iTunes song entity
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItunesTrack {
    track_name: Option<String>,
    artist_name: Option<String>,
    collection_name: Option<String>,
    release_date: Option<String>,
    primary_genre_name: Option<String>,
    artwork_url100: Option<String>,
}

impl ItunesClient {
    /// Create a new iTunes client
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            client: Arc::new(RateLimitedClient::new(
                "itunes",
                RateLimitConfig {
                    min_delay: config.itunes_delay,
                },
                config.request_timeout,
            )),
            base_url: "https://itunes.apple.com/search".to_string(),
            retry_config: config.retry.clone(),
            max_candidates: config.max_candidates,
        }
    }

    /// Swap the 100x100 thumbnail path segment for the 600x600 rendition.
    fn upscale_artwork(url: &str) -> String {
        url.replace("100x100", "600x600")
    }

    fn build_term(artist: Option<&str>, title: &str) -> String {
        match artist {
            Some(artist) => format!("{artist} {title}"),
            None => title.to_string(),
        }
    }

    fn candidate_from_track(track: ItunesTrack) -> Option<MetadataCandidate> {
        let title = track.track_name?;
        let artist = track.artist_name?;
        let year = track
            .release_date
            .as_deref()
            .and_then(|date| date.split('-').next())
            .and_then(|y| y.parse().ok());

        Some(MetadataCandidate {
            artist,
            title,
            album: track.collection_name,
            year: MetadataCandidate::validate_year(year),
            genre: track.primary_genre_name,
            artwork_url: track.artwork_url100.as_deref().map(Self::upscale_artwork),
            // Scoring happens in the matcher.
            confidence: 0.0,
            tier: SourceTier::Itunes,
        })
    }

    async fn search_songs(&self, term: &str) -> Result<Vec<ItunesTrack>, SourceError> {
        debug!(term = %term, "Searching iTunes songs");

        let response: ItunesSearchResponse = retry_async(
            || {
                let url = self.base_url.clone();
                let client = self.client.clone();
                let term = term.to_string();
                let limit = self.max_candidates.to_string();
                async move {
                    let query_params = [
                        ("term", term),
                        ("media", "music".to_string()),
                        ("entity", "song".to_string()),
                        ("limit", limit),
                    ];

                    let response = client.get_with_query(&url, &query_params).await?;

                    if let Some(err) = response.classify_status() {
                        return Err(err);
                    }

                    response
                        .json::<ItunesSearchResponse>()
                        .await
                        .map_err(SourceError::from_request)
                }
            },
            &self.retry_config,
            "itunes_search_songs",
        )
        .await?;

        Ok(response.results)
    }
}

#[async_trait]
impl SourceClient for ItunesClient {
    fn tier(&self) -> SourceTier {
        SourceTier::Itunes
    }

    async fn search(&self, query: &RawQuery) -> Result<Vec<MetadataCandidate>, SourceError> {
        let (artist, title) = query.search_terms();
        if title.is_empty() {
            return Ok(Vec::new());
        }

        let term = Self::build_term(artist.as_deref(), &title);
        let tracks = self.search_songs(&term).await?;
        let candidates: Vec<MetadataCandidate> = tracks
            .into_iter()
            .take(self.max_candidates)
            .filter_map(Self::candidate_from_track)
            .collect();

        debug!(count = candidates.len(), "iTunes search returned candidates");
        Ok(candidates)
    }

    /// Artwork-only lookup. Prefers an album search term when the album is
    /// known, falling back to artist + title; returns the first result that
    /// carries artwork.
    async fn artwork(
        &self,
        artist: &str,
        title: &str,
        album: Option<&str>,
    ) -> Result<Option<String>, SourceError> {
        let term = match album {
            Some(album) => format!("{artist} {album}"),
            None => format!("{artist} {title}"),
        };

        let tracks = self.search_songs(&term).await?;
        Ok(tracks
            .into_iter()
            .find_map(|track| track.artwork_url100.as_deref().map(Self::upscale_artwork)))
    }
}
