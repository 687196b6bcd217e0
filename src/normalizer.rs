//! Free-text title canonicalization
//!
//! Upload titles arrive as things like "Artist - Song (Official Video) [HD]".
//! Normalization folds them into lowercase, accent-free, punctuation-collapsed
//! strings used for comparison and cache keying. Normalized forms are never
//! shown to users.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

/// Bracketed segments whose content is presentation noise, not metadata.
/// "(Acoustic)" or "(Unplugged)" carry meaning and are kept.
static NOISE_BRACKETS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[(\[{][^)\]}]*\b(official|video|lyric|lyrics|audio|visuali[sz]er|hd|4k|hq|mv|remaster|remastered|explicit|clean|full album|out now|free download)\b[^)\]}]*[)\]}]",
    )
    .expect("noise bracket pattern is valid")
});

/// Trailing featured-artist credits ("feat. X", "ft X").
static FEAT_CREDIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(feat|ft|featuring)\.?\s.*$").expect("feat credit pattern is valid")
});

/// Canonicalize a name for comparison.
///
/// Pure and total: accent folding, noise-bracket and feat-credit removal,
/// lowercasing, punctuation collapsed to single spaces. Degenerate input
/// yields an empty string.
pub fn normalize(text: &str) -> String {
    let folded = deunicode(text);
    let without_noise = NOISE_BRACKETS.replace_all(&folded, " ");
    let without_credits = FEAT_CREDIT.replace_all(&without_noise, " ");

    without_credits
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove noise brackets and feat credits while keeping case and
/// punctuation intact.
///
/// This is the form sent to upstream catalogs: "One More Time (Official
/// Video)" searches poorly, "One More Time" does not. Full `normalize`
/// stays reserved for comparison and cache keying.
pub fn strip_noise(text: &str) -> String {
    let without_noise = NOISE_BRACKETS.replace_all(text, " ");
    let without_credits = FEAT_CREDIT.replace_all(&without_noise, " ");
    without_credits
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Separators commonly used between artist and title in upload names.
const TITLE_SEPARATORS: &[&str] = &[" - ", " – ", " — ", " | ", ": "];

/// Split a raw title into (artist, title).
///
/// Tries the separators in order; when one hits, the side with at most three
/// words is taken as the artist (uploads occasionally flip the order, and
/// artist names are almost always the shorter side).
pub fn split_artist_title(raw: &str) -> Option<(String, String)> {
    for separator in TITLE_SEPARATORS {
        let Some(index) = raw.find(separator) else {
            continue;
        };

        let left = raw[..index].trim();
        let right = raw[index + separator.len()..].trim();
        if left.is_empty() || right.is_empty() {
            continue;
        }

        if left.split_whitespace().count() <= 3 {
            return Some((left.to_string(), right.to_string()));
        }
        return Some((right.to_string(), left.to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_strips_noise_brackets() {
        assert_eq!(
            normalize("Daft Punk - One More Time (Official Video) [HD]"),
            "daft punk one more time"
        );
        assert_eq!(
            normalize("Song Title [Official Lyric Video]"),
            "song title"
        );
    }

    #[test]
    fn test_normalize_keeps_meaningful_brackets() {
        assert_eq!(normalize("Layla (Acoustic)"), "layla acoustic");
        assert_eq!(normalize("Hurt (Unplugged)"), "hurt unplugged");
    }

    #[test]
    fn test_normalize_folds_accents_and_case() {
        assert_eq!(normalize("Beyoncé"), "beyonce");
        assert_eq!(normalize("SIGUR RÓS"), "sigur ros");
    }

    #[test]
    fn test_normalize_strips_feat_credits() {
        assert_eq!(
            normalize("Umbrella feat. Jay-Z"),
            "umbrella"
        );
        assert_eq!(
            normalize("Airplanes ft B.o.B"),
            "airplanes"
        );
    }

    #[test]
    fn test_normalize_collapses_punctuation() {
        assert_eq!(normalize("AC/DC -- Back In Black!!"), "ac dc back in black");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_strip_noise_keeps_case_and_punctuation() {
        assert_eq!(
            strip_noise("One More Time (Official Video) [HD]"),
            "One More Time"
        );
        assert_eq!(strip_noise("Umbrella feat. Jay-Z"), "Umbrella");
        assert_eq!(strip_noise("Don't Stop Me Now"), "Don't Stop Me Now");
        assert_eq!(strip_noise("Layla (Acoustic)"), "Layla (Acoustic)");
    }

    #[test]
    fn test_split_on_common_separators() {
        assert_eq!(
            split_artist_title("Queen - Bohemian Rhapsody"),
            Some(("Queen".to_string(), "Bohemian Rhapsody".to_string()))
        );
        assert_eq!(
            split_artist_title("Queen – Bohemian Rhapsody"),
            Some(("Queen".to_string(), "Bohemian Rhapsody".to_string()))
        );
        assert_eq!(
            split_artist_title("Queen | Bohemian Rhapsody"),
            Some(("Queen".to_string(), "Bohemian Rhapsody".to_string()))
        );
        assert_eq!(
            split_artist_title("Queen: Bohemian Rhapsody"),
            Some(("Queen".to_string(), "Bohemian Rhapsody".to_string()))
        );
    }

    #[test]
    fn test_split_shorter_side_is_artist() {
        // A long left side means the order was flipped in the upload title.
        assert_eq!(
            split_artist_title("Somebody That I Used to Know - Gotye"),
            Some(("Gotye".to_string(), "Somebody That I Used to Know".to_string()))
        );
    }

    #[test]
    fn test_split_rejects_degenerate_input() {
        assert_eq!(split_artist_title("No Separator Here"), None);
        assert_eq!(split_artist_title(" - only right"), None);
        assert_eq!(split_artist_title("only left - "), None);
    }
}
