//! Pipeline configuration.
//!
//! Builder-pattern configs in the usual style. The process environment
//! is read once through `from_env`; the library never consults env vars
//! elsewhere.

use std::path::PathBuf;
use std::time::Duration;

/// Env var that forces offline/HTTP-only mode: network-heavy transport
/// tiers are skipped and the orchestrator falls through to cache and
/// synthetic content faster.
pub const OFFLINE_MODE_ENV: &str = "KNOWLEDGE_OFFLINE_MODE";

/// Env var overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "KNOWLEDGE_CACHE_DIR";

/// Configuration for the fetch orchestrator and its transport tiers.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Primary tier timeout (compatibility-tuned HTTP client)
    pub primary_timeout: Duration,

    /// Secondary tier timeout (extra-permissive client, slower sites)
    pub secondary_timeout: Duration,

    /// Raw socket tier timeout
    pub raw_timeout: Duration,

    /// Subprocess tier timeout
    pub subprocess_timeout: Duration,

    /// Generic user agent for the primary tier
    pub user_agent: String,

    /// Legacy-style user agent for the secondary tier
    pub legacy_user_agent: String,

    /// Skip tiers that need full network capability
    pub offline_mode: bool,

    /// Directory holding the content/metadata cache pairs
    pub cache_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchConfig {
    /// Create a config with the standard tier timeouts.
    pub fn new() -> Self {
        Self {
            primary_timeout: Duration::from_secs(45),
            secondary_timeout: Duration::from_secs(120),
            raw_timeout: Duration::from_secs(30),
            subprocess_timeout: Duration::from_secs(60),
            user_agent: "Mozilla/5.0 (compatible; KnowledgeBot/1.0)".to_string(),
            legacy_user_agent: "Mozilla/4.0 (compatible; MSIE 7.0; Windows NT 5.1)".to_string(),
            offline_mode: false,
            cache_dir: PathBuf::from("knowledge_cache"),
        }
    }

    /// Create a config, reading mode flags from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(flag) = std::env::var(OFFLINE_MODE_ENV) {
            config.offline_mode = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.cache_dir = PathBuf::from(dir);
            }
        }

        config
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Force offline mode.
    pub fn offline(mut self) -> Self {
        self.offline_mode = true;
        self
    }

    /// Set the primary tier timeout.
    pub fn with_primary_timeout(mut self, timeout: Duration) -> Self {
        self.primary_timeout = timeout;
        self
    }

    /// Set the secondary tier timeout.
    pub fn with_secondary_timeout(mut self, timeout: Duration) -> Self {
        self.secondary_timeout = timeout;
        self
    }
}

/// Configuration for enrichment runs.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Hard iteration ceiling for one run
    pub max_iterations: usize,

    /// How many top-priority categories one cycle works on
    pub categories_per_cycle: usize,

    /// Hard cap on generated documents per category
    pub per_category_cap: usize,

    /// Where to write the run report, if anywhere
    pub reports_dir: Option<PathBuf>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrichmentConfig {
    pub fn new() -> Self {
        Self {
            max_iterations: 15,
            categories_per_cycle: 3,
            per_category_cap: 25,
            reports_dir: None,
        }
    }

    /// Set the iteration ceiling.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the per-category document cap.
    pub fn with_per_category_cap(mut self, cap: usize) -> Self {
        self.per_category_cap = cap;
        self
    }

    /// Write run reports into this directory.
    pub fn with_reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let config = FetchConfig::new();
        assert_eq!(config.primary_timeout, Duration::from_secs(45));
        assert_eq!(config.secondary_timeout, Duration::from_secs(120));
        assert!(!config.offline_mode);
    }

    #[test]
    fn test_enrichment_defaults() {
        let config = EnrichmentConfig::new();
        assert_eq!(config.max_iterations, 15);
        assert_eq!(config.categories_per_cycle, 3);
    }
}
