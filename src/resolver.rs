//! Waterfall resolution orchestrator
//!
//! Drives the tier sequence for each query: cached result, then the
//! structured claim, then MusicBrainz, then iTunes, then the unresolved
//! terminal. Upstream variability never reaches the caller; the only error
//! out of `resolve` is a query that violates the input contract.

use std::sync::Arc;

use futures::Stream;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::cache::ResolutionCache;
use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::matcher;
use crate::sources::{ItunesClient, MusicBrainzClient, SourceClient, StructuredSource};
use crate::types::{CacheKey, MetadataCandidate, RawQuery};

/// Metadata resolution engine.
///
/// One instance is shared across all resolutions; the cache and per-source
/// rate limiters live inside and serialize their own state, so callers need
/// no external locking.
pub struct Resolver {
    config: ResolverConfig,
    cache: Arc<ResolutionCache>,
    musicbrainz: Arc<dyn SourceClient>,
    itunes: Arc<dyn SourceClient>,
}

impl Resolver {
    /// Build a resolver backed by the real MusicBrainz and iTunes clients.
    pub fn new(config: ResolverConfig) -> Self {
        let musicbrainz = Arc::new(MusicBrainzClient::new_default(&config));
        let itunes = Arc::new(ItunesClient::new(&config));
        Self::with_sources(config, musicbrainz, itunes)
    }

    /// Build a resolver with injected catalog sources. Tests and hosts that
    /// bring their own clients use this.
    pub fn with_sources(
        config: ResolverConfig,
        musicbrainz: Arc<dyn SourceClient>,
        itunes: Arc<dyn SourceClient>,
    ) -> Self {
        Self {
            config,
            cache: Arc::new(ResolutionCache::new()),
            musicbrainz,
            itunes,
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve one query to a canonical candidate.
    ///
    /// Always completes with a candidate, degrading to the unresolved tier
    /// rather than surfacing upstream failures. Queries sharing a cache key
    /// collapse onto one upstream fan-out and share the cached result,
    /// including unresolved terminals.
    pub async fn resolve(&self, query: RawQuery) -> Result<MetadataCandidate, ResolveError> {
        if query.raw_title.trim().is_empty() {
            return Err(ResolveError::InvalidQuery("raw title is empty".to_string()));
        }

        let key = CacheKey::from_query(&query);
        self.cache
            .get_or_compute(&key, move || self.resolve_uncached(query))
            .await
    }

    /// Resolve many queries with bounded concurrency.
    ///
    /// Yields one result per input, in input order; at most `fan_out`
    /// resolutions run at once. Per-source rate limits apply regardless of
    /// fan-out.
    pub fn resolve_batch(
        &self,
        queries: Vec<RawQuery>,
    ) -> impl Stream<Item = Result<MetadataCandidate, ResolveError>> + '_ {
        stream::iter(queries)
            .map(move |query| self.resolve(query))
            .buffered(self.config.fan_out.max(1))
    }

    async fn resolve_uncached(&self, query: RawQuery) -> Result<MetadataCandidate, ResolveError> {
        // Tier 1: the platform's own claim, authoritative when complete.
        if let Some(candidate) = StructuredSource::extract(&query) {
            info!(
                artist = %candidate.artist,
                title = %candidate.title,
                "Resolved from structured claim"
            );
            return Ok(candidate);
        }

        // Tier 2: MusicBrainz.
        if let Some(mut candidate) = self.query_tier(self.musicbrainz.as_ref(), &query).await {
            if candidate.artwork_url.is_none() {
                self.enrich_artwork(&mut candidate).await;
            }
            return Ok(candidate);
        }

        // Tier 3: iTunes.
        if let Some(candidate) = self.query_tier(self.itunes.as_ref(), &query).await {
            return Ok(candidate);
        }

        info!(
            raw_title = %query.raw_title,
            "All tiers exhausted, emitting unresolved candidate"
        );
        Ok(MetadataCandidate::unresolved(&query.raw_title))
    }

    /// Query one catalog tier and pick the best candidate over the
    /// acceptance threshold. An upstream failure downgrades to "no
    /// candidates" so the waterfall falls through.
    async fn query_tier(
        &self,
        source: &dyn SourceClient,
        query: &RawQuery,
    ) -> Option<MetadataCandidate> {
        let candidates = match source.search(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    tier = ?source.tier(),
                    error = %e,
                    "Catalog query failed, falling through to next tier"
                );
                return None;
            }
        };

        let accepted = matcher::select_best(query, candidates, self.config.match_threshold);
        match &accepted {
            Some(candidate) => info!(
                tier = ?candidate.tier,
                confidence = candidate.confidence,
                artist = %candidate.artist,
                title = %candidate.title,
                "Accepted candidate"
            ),
            None => debug!(tier = ?source.tier(), "No candidate cleared the threshold"),
        }
        accepted
    }

    /// Artwork-only enrichment for an accepted match without cover art.
    /// Failure never reverts the accepted candidate.
    async fn enrich_artwork(&self, candidate: &mut MetadataCandidate) {
        match self
            .itunes
            .artwork(
                &candidate.artist,
                &candidate.title,
                candidate.album.as_deref(),
            )
            .await
        {
            Ok(Some(url)) => {
                debug!(
                    artist = %candidate.artist,
                    title = %candidate.title,
                    "Artwork enrichment succeeded"
                );
                candidate.artwork_url = Some(url);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Artwork enrichment failed, keeping accepted match");
            }
        }
    }
}
