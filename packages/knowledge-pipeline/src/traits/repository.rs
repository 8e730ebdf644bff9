//! Knowledge repository trait - the narrow persistence interface.
//!
//! The core never depends on a storage engine's query language; it sees
//! only natural-key upserts, lookups, and per-category counts. Upserts
//! are create-or-update and must be atomic per natural key: two
//! concurrent pipelines targeting the same key resolve to last write
//! wins on the update path, never a duplicate row.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::types::{FreeZone, Guide, KnowledgeRecord};

/// Whether an upsert created a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Narrow repository interface over the knowledge store.
#[async_trait]
pub trait KnowledgeRepository: Send + Sync {
    /// Create or update a free zone by name. Idempotent: repeating the
    /// same record changes nothing but the timestamp.
    async fn upsert_zone(&self, zone: FreeZone) -> Result<UpsertOutcome>;

    /// Create or update a guide by (category, title). Same idempotency
    /// contract as `upsert_zone`.
    async fn upsert_guide(&self, guide: Guide) -> Result<UpsertOutcome>;

    /// Look up a zone by its natural key.
    async fn get_zone(&self, name: &str) -> Result<Option<FreeZone>>;

    /// Look up a guide by its natural key.
    async fn get_guide(&self, category: &str, title: &str) -> Result<Option<Guide>>;

    /// All known zones.
    async fn list_zones(&self) -> Result<Vec<FreeZone>>;

    /// All guides in a category.
    async fn list_guides(&self, category: &str) -> Result<Vec<Guide>>;

    /// Record counts per category. Zones count under
    /// [`crate::types::FREE_ZONES_CATEGORY`]; guides under their own
    /// category label.
    async fn category_counts(&self) -> Result<HashMap<String, usize>>;

    /// Count for a single category.
    async fn count_in_category(&self, category: &str) -> Result<usize> {
        let counts = self.category_counts().await?;
        Ok(counts.get(category).copied().unwrap_or(0))
    }

    /// Dispatching upsert for either record kind.
    async fn upsert_record(&self, record: KnowledgeRecord) -> Result<UpsertOutcome> {
        match record {
            KnowledgeRecord::Zone(zone) => self.upsert_zone(zone).await,
            KnowledgeRecord::Guide(guide) => self.upsert_guide(guide).await,
        }
    }
}
