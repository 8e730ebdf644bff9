//! Typed errors for the knowledge pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! The taxonomy mirrors the pipeline's recovery policy: transport and
//! generation failures are caught at their own layer and converted into
//! fallthrough or skip; only storage failures terminate a run.

use thiserror::Error;

/// Errors from a single transport tier.
///
/// These never escape the fetch orchestrator. Every variant is logged
/// with its reason and converted into "try the next tier".
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed at the client level
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a status the tier treats as unusable
    #[error("unusable status {status} from {url}")]
    Status { status: u16, url: String },

    /// TLS negotiation failed on the raw socket tier
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Socket-level I/O failure on the raw tier
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// Tier did not answer within its configured timeout
    #[error("timeout after {seconds}s fetching {url}")]
    Timeout { url: String, seconds: u64 },

    /// External fetch utility failed or produced nothing
    #[error("subprocess fetch failed: {reason}")]
    Subprocess { reason: String },

    /// Response arrived but carried no usable body
    #[error("empty body from {url}")]
    EmptyBody { url: String },

    /// URL could not be parsed or addressed by this tier
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Redirect chain exceeded the tier's limit
    #[error("too many redirects fetching {url}")]
    TooManyRedirects { url: String },
}

/// A single-category document generation failure.
///
/// Logged and skipped by the enrichment loop; never aborts the cycle.
#[derive(Debug, Error)]
#[error("generation failed for category '{category}': {reason}")]
pub struct GenerationError {
    pub category: String,
    pub reason: String,
}

/// Errors that can terminate a pipeline operation.
///
/// Per the propagation policy, the only conditions surfaced to callers
/// are storage failures (nothing downstream can proceed without the
/// knowledge store) and report serialization/write failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Knowledge store operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Report or cache artifact could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization of a persisted artifact failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Wrap an arbitrary storage backend error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for transport tier attempts.
pub type TransportResult<T> = std::result::Result<T, TransportError>;
