//! Metadata resolution engine
//!
//! Turns loosely-structured media titles ("Artist - Song (Official Video)")
//! into canonical (artist, title, album, year, genre, artwork) records via a
//! tiered waterfall: the platform's own structured claim, then MusicBrainz,
//! then iTunes. Candidates are accepted by fuzzy score, requests are
//! rate-limited per source, and completed resolutions are cached with
//! single-flight semantics.
//!
//! ```no_run
//! use tagsmith::{RawQuery, Resolver, ResolverConfig};
//!
//! # async fn demo() -> Result<(), tagsmith::ResolveError> {
//! let resolver = Resolver::new(ResolverConfig::default());
//! let candidate = resolver
//!     .resolve(RawQuery::new("Daft Punk - One More Time (Official Video)"))
//!     .await?;
//! println!("{} - {}", candidate.artist, candidate.title);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod matcher;
pub mod normalizer;
pub mod rate_limiter;
pub mod resolver;
pub mod sources;
pub mod types;

pub use cache::{CacheEntry, ResolutionCache};
pub use config::ResolverConfig;
pub use error::{ResolveError, SourceError};
pub use rate_limiter::{RateLimitConfig, RateLimitedClient, RetryConfig};
pub use resolver::Resolver;
pub use sources::{ItunesClient, MusicBrainzClient, SourceClient, StructuredSource};
pub use types::{CacheKey, MetadataCandidate, RawQuery, SourceTier, StructuredClaim};
