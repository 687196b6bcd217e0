//! Catalog source clients
//!
//! One client per resolution tier, all behind a common query contract so the
//! orchestrator and tests treat tiers uniformly.

mod itunes;
mod musicbrainz;
mod structured;

pub use itunes::ItunesClient;
pub use musicbrainz::MusicBrainzClient;
pub use structured::StructuredSource;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::{MetadataCandidate, RawQuery, SourceTier};

/// Common contract for one resolution tier.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Which waterfall tier this client serves.
    fn tier(&self) -> SourceTier;

    /// Query the catalog for candidates. An empty vec means "no match
    /// found", which is not an error; `Err` is reserved for upstream
    /// failures.
    async fn search(&self, query: &RawQuery) -> Result<Vec<MetadataCandidate>, SourceError>;

    /// Artwork-only lookup for an already-accepted artist/title. Sources
    /// without an artwork endpoint return `Ok(None)`.
    async fn artwork(
        &self,
        _artist: &str,
        _title: &str,
        _album: Option<&str>,
    ) -> Result<Option<String>, SourceError> {
        Ok(None)
    }
}
