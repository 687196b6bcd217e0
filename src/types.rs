//! Core data model for metadata resolution

use serde::{Deserialize, Serialize};

use crate::normalizer;

/// Which waterfall tier produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    Structured,
    MusicBrainz,
    Itunes,
    Unresolved,
}

impl SourceTier {
    /// Waterfall position. Lower is queried first and wins score ties.
    pub fn rank(self) -> u8 {
        match self {
            SourceTier::Structured => 0,
            SourceTier::MusicBrainz => 1,
            SourceTier::Itunes => 2,
            SourceTier::Unresolved => 3,
        }
    }
}

/// Metadata the platform itself attached to the media item.
///
/// The extraction layer passes these through untouched; a complete claim
/// (artist and title both present) is treated as authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredClaim {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    /// Uploader-supplied cover image, trusted as-is when present.
    pub artwork_url: Option<String>,
}

impl StructuredClaim {
    /// A claim is complete when artist and title both carry real text.
    pub fn is_complete(&self) -> bool {
        fn filled(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|s| !s.trim().is_empty())
        }
        filled(&self.artist) && filled(&self.title)
    }
}

/// Input to one resolution: the raw display title plus whatever the
/// extractor already knew about the item.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuery {
    pub raw_title: String,
    pub uploader: Option<String>,
    pub claim: Option<StructuredClaim>,
    pub duration_secs: Option<u32>,
}

impl RawQuery {
    pub fn new(raw_title: impl Into<String>) -> Self {
        Self {
            raw_title: raw_title.into(),
            uploader: None,
            claim: None,
            duration_secs: None,
        }
    }

    pub fn with_uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploader = Some(uploader.into());
        self
    }

    pub fn with_claim(mut self, claim: StructuredClaim) -> Self {
        self.claim = Some(claim);
        self
    }

    pub fn with_duration(mut self, duration_secs: u32) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }

    /// Best-effort (artist, title) terms for building catalog queries:
    /// claim fields when present, otherwise the split raw title with noise
    /// brackets and feat credits stripped.
    pub fn search_terms(&self) -> (Option<String>, String) {
        if let Some(claim) = &self.claim {
            if let Some(title) = claim.title.as_deref().filter(|t| !t.trim().is_empty()) {
                let artist = claim
                    .artist
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from);
                return (artist, title.trim().to_string());
            }
        }

        match normalizer::split_artist_title(&self.raw_title) {
            Some((artist, title)) => {
                let artist = normalizer::strip_noise(&artist);
                (
                    (!artist.is_empty()).then_some(artist),
                    normalizer::strip_noise(&title),
                )
            }
            None => (None, normalizer::strip_noise(&self.raw_title)),
        }
    }
}

/// A canonical metadata record, either accepted from a catalog tier or the
/// unresolved terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataCandidate {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub artwork_url: Option<String>,
    /// Match confidence in [0, 1]. 1.0 for structured claims, the fuzzy
    /// score for catalog matches, 0.0 for the unresolved terminal.
    pub confidence: f64,
    pub tier: SourceTier,
}

impl MetadataCandidate {
    /// Degraded terminal result: the raw title passed through untouched.
    pub fn unresolved(raw_title: &str) -> Self {
        Self {
            artist: "Unknown Artist".to_string(),
            title: raw_title.to_string(),
            album: None,
            year: None,
            genre: None,
            artwork_url: None,
            confidence: 0.0,
            tier: SourceTier::Unresolved,
        }
    }

    /// Number of populated optional fields, used as a tie-breaker between
    /// equally-scored candidates.
    pub fn populated_fields(&self) -> usize {
        [
            self.album.is_some(),
            self.year.is_some(),
            self.genre.is_some(),
            self.artwork_url.is_some(),
        ]
        .iter()
        .filter(|populated| **populated)
        .count()
    }

    /// Release years outside 1900..=2100 are junk data and dropped.
    pub fn validate_year(year: Option<i32>) -> Option<i32> {
        year.filter(|y| (1900..=2100).contains(y))
    }
}

/// Cache key derived from the normalized title and uploader, so raw strings
/// that differ only in case, accents, or noise share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_query(query: &RawQuery) -> Self {
        let title = normalizer::normalize(&query.raw_title);
        let uploader = query
            .uploader
            .as_deref()
            .map(normalizer::normalize)
            .unwrap_or_default();
        CacheKey(format!("{title}|{uploader}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_rank_follows_waterfall_order() {
        assert!(SourceTier::Structured.rank() < SourceTier::MusicBrainz.rank());
        assert!(SourceTier::MusicBrainz.rank() < SourceTier::Itunes.rank());
        assert!(SourceTier::Itunes.rank() < SourceTier::Unresolved.rank());
    }

    #[test]
    fn test_claim_completeness() {
        let complete = StructuredClaim {
            artist: Some("Daft Punk".to_string()),
            title: Some("One More Time".to_string()),
            ..Default::default()
        };
        assert!(complete.is_complete());

        let blank_artist = StructuredClaim {
            artist: Some("   ".to_string()),
            title: Some("One More Time".to_string()),
            ..Default::default()
        };
        assert!(!blank_artist.is_complete());

        assert!(!StructuredClaim::default().is_complete());
    }

    #[test]
    fn test_search_terms_prefer_claim_over_raw_title() {
        let query = RawQuery::new("random upload name").with_claim(StructuredClaim {
            artist: Some("Queen".to_string()),
            title: Some("Bohemian Rhapsody".to_string()),
            ..Default::default()
        });

        let (artist, title) = query.search_terms();
        assert_eq!(artist.as_deref(), Some("Queen"));
        assert_eq!(title, "Bohemian Rhapsody");
    }

    #[test]
    fn test_search_terms_split_raw_title() {
        let (artist, title) = RawQuery::new("Queen - Bohemian Rhapsody").search_terms();
        assert_eq!(artist.as_deref(), Some("Queen"));
        assert_eq!(title, "Bohemian Rhapsody");

        let (artist, title) = RawQuery::new("Bohemian Rhapsody").search_terms();
        assert_eq!(artist, None);
        assert_eq!(title, "Bohemian Rhapsody");
    }

    #[test]
    fn test_search_terms_strip_presentation_noise() {
        let (artist, title) =
            RawQuery::new("Daft Punk - One More Time (Official Video)").search_terms();
        assert_eq!(artist.as_deref(), Some("Daft Punk"));
        assert_eq!(title, "One More Time");

        let (artist, title) = RawQuery::new("One More Time [Official Audio]").search_terms();
        assert_eq!(artist, None);
        assert_eq!(title, "One More Time");
    }

    #[test]
    fn test_cache_key_ignores_case_accents_and_noise() {
        let a = CacheKey::from_query(
            &RawQuery::new("Beyoncé - Halo (Official Video)").with_uploader("BeyoncéVEVO"),
        );
        let b = CacheKey::from_query(
            &RawQuery::new("beyonce - halo").with_uploader("beyoncevevo"),
        );
        assert_eq!(a, b);

        let c = CacheKey::from_query(&RawQuery::new("beyonce - halo"));
        assert_ne!(a, c);
    }

    #[test]
    fn test_year_validation_window() {
        assert_eq!(MetadataCandidate::validate_year(Some(1985)), Some(1985));
        assert_eq!(MetadataCandidate::validate_year(Some(1899)), None);
        assert_eq!(MetadataCandidate::validate_year(Some(2101)), None);
        assert_eq!(MetadataCandidate::validate_year(None), None);
    }

    #[test]
    fn test_populated_field_count() {
        let mut candidate = MetadataCandidate::unresolved("x");
        assert_eq!(candidate.populated_fields(), 0);
        candidate.album = Some("Album".to_string());
        candidate.genre = Some("Pop".to_string());
        assert_eq!(candidate.populated_fields(), 2);
    }
}
