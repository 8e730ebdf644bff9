//! Fixture provider trait - pluggable synthetic content.
//!
//! Synthetic placeholder content is a data source, not string literals
//! buried in the fetch path. Tests substitute their own provider
//! without touching any network code.

/// Supplies hand-authored placeholder content for resource classes the
/// pipeline knows the expected shape of.
pub trait FixtureProvider: Send + Sync {
    /// Canned content for this resource key, if the provider recognizes
    /// its class. `None` means no synthetic fallback exists and the
    /// orchestrator may ultimately return nothing.
    fn synthetic_for(&self, url: &str) -> Option<String>;
}

/// A provider that never supplies content. Useful for exercising the
/// "literally nothing could be produced" path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFixtures;

impl FixtureProvider for NoFixtures {
    fn synthetic_for(&self, _url: &str) -> Option<String> {
        None
    }
}
