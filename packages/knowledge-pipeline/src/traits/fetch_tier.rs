//! Fetch tier trait - one transport strategy in the fallback table.
//!
//! The orchestrator iterates an ordered list of tiers generically, so
//! adding or removing a transport is a configuration change rather than
//! another nested try/catch block.

use async_trait::async_trait;
use url::Url;

use crate::error::TransportResult;

/// One transport strategy the orchestrator can attempt.
#[async_trait]
pub trait FetchTier: Send + Sync {
    /// Tier name for logging and cache source labels.
    fn name(&self) -> &'static str;

    /// Whether this tier is allowed to run in offline/HTTP-only mode.
    ///
    /// Heavier tiers return false and are skipped so the orchestrator
    /// falls through to cache and synthetic content faster.
    fn offline_capable(&self) -> bool {
        false
    }

    /// Attempt to fetch the page body.
    ///
    /// Any error is non-fatal: the orchestrator logs it and moves to
    /// the next tier. Implementations bound their own runtime with a
    /// timeout and must not hang past it.
    async fn attempt(&self, url: &Url) -> TransportResult<String>;
}
