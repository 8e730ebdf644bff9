//! Test doubles for the transport layer.
//!
//! Scripted tiers with call tracking so orchestrator tests can assert
//! on fallback order without touching the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::{TransportError, TransportResult};
use crate::traits::FetchTier;

/// Tier that always fails with a timeout.
pub struct FailingTier {
    name: &'static str,
    calls: Arc<AtomicUsize>,
}

impl FailingTier {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle to the attempt counter, shared with the tier.
    pub fn calls_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl FetchTier for FailingTier {
    fn name(&self) -> &'static str {
        self.name
    }

    fn offline_capable(&self) -> bool {
        true
    }

    async fn attempt(&self, url: &Url) -> TransportResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Timeout {
            url: url.to_string(),
            seconds: 0,
        })
    }
}

/// Tier that always succeeds with a fixed body. Reports itself as
/// connectivity-bound, so offline mode skips it.
pub struct StaticTier {
    name: &'static str,
    body: String,
    calls: Arc<AtomicUsize>,
}

impl StaticTier {
    pub fn new(name: &'static str, body: &str) -> Self {
        Self {
            name,
            body: body.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl FetchTier for StaticTier {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attempt(&self, _url: &Url) -> TransportResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}
