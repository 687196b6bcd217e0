//! Fuzzy candidate scoring and selection
//!
//! Similarity combines token-set overlap with normalized edit distance.
//! Token overlap carries more weight because word order and small spelling
//! differences vary wildly across upload titles for the same song.

use std::cmp::Ordering;
use std::collections::HashSet;

use rapidfuzz::distance::levenshtein;
use tracing::debug;

use crate::normalizer;
use crate::types::{MetadataCandidate, RawQuery};

/// Weight of the token-overlap leg; the remainder goes to edit distance.
const TOKEN_OVERLAP_WEIGHT: f64 = 0.6;

/// Combined similarity of two already-normalized strings, in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();
    let union = tokens_a.union(&tokens_b).count();
    let overlap = if union == 0 {
        0.0
    } else {
        tokens_a.intersection(&tokens_b).count() as f64 / union as f64
    };

    let edit = levenshtein::normalized_similarity(a.chars(), b.chars());

    TOKEN_OVERLAP_WEIGHT * overlap + (1.0 - TOKEN_OVERLAP_WEIGHT) * edit
}

/// Score a candidate against the query it is meant to answer.
///
/// The query side is the claim's artist/title when present, otherwise the
/// split (or whole) raw title; the candidate side is its "artist title".
pub fn score_candidate(query: &RawQuery, candidate: &MetadataCandidate) -> f64 {
    let (artist, title) = query.search_terms();
    let target = match artist {
        Some(artist) => normalizer::normalize(&format!("{artist} {title}")),
        None => normalizer::normalize(&title),
    };
    let candidate_text =
        normalizer::normalize(&format!("{} {}", candidate.artist, candidate.title));
    similarity(&target, &candidate_text)
}

/// Pick the best candidate at or above the acceptance threshold.
///
/// Below-threshold candidates are discarded entirely, never surfaced with a
/// low confidence. Ties break deterministically: higher score, then earlier
/// tier, then more populated optional fields, then artist/title order. The
/// winner carries its score as confidence.
pub fn select_best(
    query: &RawQuery,
    candidates: Vec<MetadataCandidate>,
    threshold: f64,
) -> Option<MetadataCandidate> {
    let mut scored: Vec<(f64, MetadataCandidate)> = candidates
        .into_iter()
        .map(|candidate| (score_candidate(query, &candidate), candidate))
        .filter(|(score, _)| *score >= threshold)
        .collect();

    debug!(
        surviving = scored.len(),
        threshold = threshold,
        "Scored candidates against acceptance threshold"
    );

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.tier.rank().cmp(&b.tier.rank()))
            .then_with(|| b.populated_fields().cmp(&a.populated_fields()))
            .then_with(|| (a.artist.as_str(), a.title.as_str()).cmp(&(b.artist.as_str(), b.title.as_str())))
    });

    scored.into_iter().next().map(|(score, mut candidate)| {
        candidate.confidence = score;
        candidate
    })
}
