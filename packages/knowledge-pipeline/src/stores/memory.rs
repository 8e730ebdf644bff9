//! In-memory repository implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::traits::{KnowledgeRepository, UpsertOutcome};
use crate::types::{FreeZone, Guide, FREE_ZONES_CATEGORY};

/// In-memory knowledge store.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart. Each upsert holds a single write lock
/// for its whole create-or-update, so concurrent upserts for one
/// natural key serialize to last write wins, never a duplicate.
pub struct MemoryRepository {
    zones: RwLock<HashMap<String, FreeZone>>,
    guides: RwLock<HashMap<(String, String), Guide>>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            zones: RwLock::new(HashMap::new()),
            guides: RwLock::new(HashMap::new()),
        }
    }

    /// Total number of stored records of both kinds.
    pub fn record_count(&self) -> usize {
        self.zones.read().unwrap().len() + self.guides.read().unwrap().len()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.zones.write().unwrap().clear();
        self.guides.write().unwrap().clear();
    }
}

#[async_trait]
impl KnowledgeRepository for MemoryRepository {
    async fn upsert_zone(&self, zone: FreeZone) -> Result<UpsertOutcome> {
        let mut zones = self.zones.write().unwrap();
        match zones.get_mut(&zone.name) {
            Some(existing) => {
                existing.merge_from(zone);
                Ok(UpsertOutcome::Updated)
            }
            None => {
                zones.insert(zone.name.clone(), zone);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn upsert_guide(&self, guide: Guide) -> Result<UpsertOutcome> {
        let mut guides = self.guides.write().unwrap();
        let key = (guide.category.clone(), guide.title.clone());
        match guides.get_mut(&key) {
            Some(existing) => {
                existing.merge_from(guide);
                Ok(UpsertOutcome::Updated)
            }
            None => {
                guides.insert(key, guide);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn get_zone(&self, name: &str) -> Result<Option<FreeZone>> {
        Ok(self.zones.read().unwrap().get(name).cloned())
    }

    async fn get_guide(&self, category: &str, title: &str) -> Result<Option<Guide>> {
        Ok(self
            .guides
            .read()
            .unwrap()
            .get(&(category.to_string(), title.to_string()))
            .cloned())
    }

    async fn list_zones(&self) -> Result<Vec<FreeZone>> {
        let mut zones: Vec<_> = self.zones.read().unwrap().values().cloned().collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(zones)
    }

    async fn list_guides(&self, category: &str) -> Result<Vec<Guide>> {
        let mut guides: Vec<_> = self
            .guides
            .read()
            .unwrap()
            .values()
            .filter(|g| g.category == category)
            .cloned()
            .collect();
        guides.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(guides)
    }

    async fn category_counts(&self) -> Result<HashMap<String, usize>> {
        let mut counts: HashMap<String, usize> = HashMap::new();

        let zone_count = self.zones.read().unwrap().len();
        if zone_count > 0 {
            counts.insert(FREE_ZONES_CATEGORY.to_string(), zone_count);
        }

        for guide in self.guides.read().unwrap().values() {
            *counts.entry(guide.category.clone()).or_insert(0) += 1;
        }

        Ok(counts)
    }
}
