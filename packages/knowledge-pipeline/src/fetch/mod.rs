//! Fetch orchestrator - tiered fallback resolution of a URL to content.
//!
//! The orchestrator walks an ordered table of transport tiers, then the
//! cache, then the synthetic fixture provider. Nothing thrown by a tier
//! escapes: every failure is logged with its reason and converted into
//! "try the next fallback". The caller gets content or `None`, never an
//! error.

pub mod tiers;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::CacheStore;
use crate::config::FetchConfig;
use crate::traits::{FetchTier, FixtureProvider};

pub use tiers::{
    default_tiers, CurlSubprocessTier, PermissiveHttpTier, PrimaryHttpTier, RawSocketTier,
};

/// Where a fetched document ultimately came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// A live transport tier, by name
    Live(&'static str),
    /// The disk cache
    Cache,
    /// The synthetic fixture provider
    Synthetic,
}

impl ContentSource {
    /// Label used for cache metadata and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Live(name) => name,
            Self::Cache => "cache",
            Self::Synthetic => "synthetic",
        }
    }
}

/// Page content resolved by the orchestrator.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub url: String,
    pub body: String,
    pub source: ContentSource,
    pub fetched_at: DateTime<Utc>,
}

/// Resolves URLs to page content through the tier table, the cache,
/// and the fixture provider, in that order.
pub struct FetchOrchestrator<F: FixtureProvider> {
    tiers: Vec<Box<dyn FetchTier>>,
    cache: CacheStore,
    fixtures: F,
    config: FetchConfig,
}

impl<F: FixtureProvider> FetchOrchestrator<F> {
    /// Create an orchestrator with the standard four-tier table.
    pub fn new(config: FetchConfig, fixtures: F) -> Self {
        let tiers = default_tiers(&config);
        Self::with_tiers(config, fixtures, tiers)
    }

    /// Create an orchestrator with a custom tier table (tests inject
    /// failing or canned tiers here).
    pub fn with_tiers(config: FetchConfig, fixtures: F, tiers: Vec<Box<dyn FetchTier>>) -> Self {
        let cache = CacheStore::new(config.cache_dir.clone());
        Self {
            tiers,
            cache,
            fixtures,
            config,
        }
    }

    /// The cache this orchestrator populates.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Resolve a URL to page content.
    ///
    /// Returns `None` only when every tier failed, the cache is cold,
    /// and no synthetic fixture exists for this resource class.
    pub async fn fetch_resource(&self, url: &str) -> Option<FetchedContent> {
        let parsed = match Url::parse(url) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(url = %url, error = %e, "Unparseable URL, skipping live tiers");
                None
            }
        };

        if let Some(parsed) = &parsed {
            for tier in &self.tiers {
                if self.config.offline_mode && !tier.offline_capable() {
                    debug!(tier = tier.name(), "Skipping tier in offline mode");
                    continue;
                }

                match tier.attempt(parsed).await {
                    Ok(body) if !body.trim().is_empty() => {
                        info!(url = %url, tier = tier.name(), bytes = body.len(), "Live fetch succeeded");
                        self.store_in_cache(url, &body, tier.name()).await;
                        return Some(FetchedContent {
                            url: url.to_string(),
                            body,
                            source: ContentSource::Live(tier.name()),
                            fetched_at: Utc::now(),
                        });
                    }
                    Ok(_) => {
                        warn!(url = %url, tier = tier.name(), "Tier returned empty body, falling through");
                    }
                    Err(e) => {
                        warn!(url = %url, tier = tier.name(), error = %e, "Tier failed, falling through");
                    }
                }
            }
        }

        if let Some(body) = self.cache.get(url).await {
            info!(url = %url, "Serving from cache after live tiers failed");
            return Some(FetchedContent {
                url: url.to_string(),
                body,
                source: ContentSource::Cache,
                fetched_at: Utc::now(),
            });
        }

        if let Some(body) = self.fixtures.synthetic_for(url) {
            info!(url = %url, "Falling back to synthetic content");
            // Cached so the next call short-circuits at the cache step
            self.store_in_cache(url, &body, ContentSource::Synthetic.label())
                .await;
            return Some(FetchedContent {
                url: url.to_string(),
                body,
                source: ContentSource::Synthetic,
                fetched_at: Utc::now(),
            });
        }

        warn!(url = %url, "No tier, cache entry, or fixture produced content");
        None
    }

    /// Cache writes are best-effort; a full disk must not fail a fetch
    /// that already succeeded.
    async fn store_in_cache(&self, url: &str, body: &str, source: &str) {
        if let Err(e) = self.cache.put(url, body, source).await {
            warn!(url = %url, error = %e, "Failed to cache fetched content");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingTier, StaticTier};
    use crate::traits::NoFixtures;

    struct OneFixture;

    impl FixtureProvider for OneFixture {
        fn synthetic_for(&self, url: &str) -> Option<String> {
            url.contains("free-zone").then(|| "<html>synthetic</html>".to_string())
        }
    }

    fn config_with_tempdir(dir: &tempfile::TempDir) -> FetchConfig {
        FetchConfig::new().with_cache_dir(dir.path())
    }

    #[tokio::test]
    async fn test_first_working_tier_wins() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = FetchOrchestrator::with_tiers(
            config_with_tempdir(&dir),
            NoFixtures,
            vec![
                Box::new(FailingTier::named("tier_a")),
                Box::new(StaticTier::new("tier_b", "<html>live</html>")),
                Box::new(FailingTier::named("tier_c")),
            ],
        );

        let content = orchestrator
            .fetch_resource("https://example.com/zones")
            .await
            .unwrap();
        assert_eq!(content.source, ContentSource::Live("tier_b"));
        assert_eq!(content.body, "<html>live</html>");
    }

    #[tokio::test]
    async fn test_all_tiers_fail_falls_to_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = FetchOrchestrator::with_tiers(
            config_with_tempdir(&dir),
            OneFixture,
            vec![
                Box::new(FailingTier::named("a")),
                Box::new(FailingTier::named("b")),
                Box::new(FailingTier::named("c")),
                Box::new(FailingTier::named("d")),
            ],
        );

        let content = orchestrator
            .fetch_resource("https://example.com/free-zone-list")
            .await
            .unwrap();
        assert_eq!(content.source, ContentSource::Synthetic);
    }

    #[tokio::test]
    async fn test_synthetic_populates_cache_for_next_call() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = FetchOrchestrator::with_tiers(
            config_with_tempdir(&dir),
            OneFixture,
            vec![Box::new(FailingTier::named("a"))],
        );

        let first = orchestrator
            .fetch_resource("https://example.com/free-zone-list")
            .await
            .unwrap();
        assert_eq!(first.source, ContentSource::Synthetic);

        let second = orchestrator
            .fetch_resource("https://example.com/free-zone-list")
            .await
            .unwrap();
        assert_eq!(second.source, ContentSource::Cache);
        assert_eq!(second.body, first.body);
    }

    #[tokio::test]
    async fn test_nothing_available_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = FetchOrchestrator::with_tiers(
            config_with_tempdir(&dir),
            NoFixtures,
            vec![Box::new(FailingTier::named("a"))],
        );

        assert!(orchestrator
            .fetch_resource("https://example.com/unknown")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_offline_mode_skips_heavy_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let heavy = StaticTier::new("heavy", "<html>heavy</html>");
        let calls = heavy.calls_handle();

        let orchestrator = FetchOrchestrator::with_tiers(
            config_with_tempdir(&dir).offline(),
            OneFixture,
            vec![Box::new(heavy)],
        );

        let content = orchestrator
            .fetch_resource("https://example.com/free-zone-list")
            .await
            .unwrap();
        // Heavy tier never ran; synthetic filled in
        assert_eq!(content.source, ContentSource::Synthetic);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
