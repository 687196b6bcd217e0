//! Tier 1: metadata claimed by the platform itself
//!
//! Pure extraction from the claim the media extractor attached to the query;
//! no network traffic. A complete claim is authoritative: confidence 1.0,
//! no fuzzy scoring, and its artwork (the uploader's own cover) is passed
//! through untouched.

use async_trait::async_trait;

use super::SourceClient;
use crate::error::SourceError;
use crate::types::{MetadataCandidate, RawQuery, SourceTier, StructuredClaim};

pub struct StructuredSource;

impl StructuredSource {
    /// At most one candidate: the claim itself, when artist and title are
    /// both present. Partial claims yield nothing and the waterfall moves
    /// on.
    pub fn extract(query: &RawQuery) -> Option<MetadataCandidate> {
        let claim = query.claim.as_ref()?;
        if !claim.is_complete() {
            return None;
        }
        Some(Self::candidate_from_claim(claim))
    }

    fn candidate_from_claim(claim: &StructuredClaim) -> MetadataCandidate {
        MetadataCandidate {
            artist: claim.artist.as_deref().unwrap_or_default().trim().to_string(),
            title: claim.title.as_deref().unwrap_or_default().trim().to_string(),
            album: trimmed(&claim.album),
            year: MetadataCandidate::validate_year(claim.year),
            genre: trimmed(&claim.genre),
            artwork_url: claim.artwork_url.clone(),
            confidence: 1.0,
            tier: SourceTier::Structured,
        }
    }
}

#[async_trait]
impl SourceClient for StructuredSource {
    fn tier(&self) -> SourceTier {
        SourceTier::Structured
    }

    async fn search(&self, query: &RawQuery) -> Result<Vec<MetadataCandidate>, SourceError> {
        Ok(Self::extract(query).into_iter().collect())
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
