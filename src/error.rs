//! Failure taxonomy for catalog lookups and resolution

use thiserror::Error;

/// Failure reported by a catalog source.
///
/// Transient failures (timeouts, connection problems, 408/429/5xx) are
/// retried with backoff inside the client; permanent ones (other 4xx,
/// unparseable payloads) are not. Once retries are exhausted the waterfall
/// treats both the same way: the tier produced no candidates.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transient upstream failure: {0}")]
    Transient(String),

    #[error("permanent upstream failure: {0}")]
    Permanent(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }

    /// Classify a request-level error. Timeouts and connection problems are
    /// transient; a body that fails to decode is a contract break on the
    /// upstream side and retrying will not fix it.
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Permanent(format!("unexpected response shape: {err}"))
        } else {
            SourceError::Transient(err.to_string())
        }
    }
}

/// Error returned to the caller of `Resolver::resolve`.
///
/// Upstream variability never surfaces here; a resolution that exhausts all
/// tiers still succeeds with an unresolved candidate. The only failure mode
/// is a query that violates the input contract.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
