//! Audit and enrichment report types.
//!
//! [`AuditResult`] is derived on every audit call and never mutated in
//! place; [`EnrichmentReport`] summarizes one enrichment run for the
//! operational report file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-category record count versus its target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStatus {
    pub category: String,
    pub count: usize,
    pub target: usize,
}

impl CategoryStatus {
    pub fn is_deficient(&self) -> bool {
        self.count < self.target
    }
}

/// Completeness audit of a knowledge domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    /// Knowledge domain the audit covers
    pub domain: String,

    /// Completeness score, 0 to 100
    pub score: u8,

    /// Every tracked category with its count and target
    pub categories: Vec<CategoryStatus>,

    /// Deficient categories, most deficient (lowest count) first
    pub priority_categories: Vec<String>,

    /// True exactly when score == 100
    pub is_complete: bool,

    pub audited_at: DateTime<Utc>,
}

/// Terminal state of an enrichment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrichmentStatus {
    /// The store reached 100% completeness
    Complete,
    /// The iteration ceiling was hit first
    Exhausted,
}

/// Summary report written at the end of an enrichment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub initial_score: u8,
    pub final_score: u8,
    pub iterations: usize,
    pub status: EnrichmentStatus,

    /// Categories deficient at the start and satisfied at the end
    pub resolved_categories: Vec<String>,

    /// Categories still deficient when the run ended
    pub remaining_categories: Vec<String>,

    /// Running log of generation actions taken, for operational visibility
    pub actions: Vec<String>,
}

impl EnrichmentReport {
    /// Start a new report at the given initial score.
    pub fn begin(initial_score: u8) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            initial_score,
            final_score: initial_score,
            iterations: 0,
            status: EnrichmentStatus::Complete,
            resolved_categories: Vec::new(),
            remaining_categories: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Whether the run improved or held the score. Enrichment only adds
    /// records, so this should always be true.
    pub fn is_monotonic(&self) -> bool {
        self.final_score >= self.initial_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_deficiency() {
        let full = CategoryStatus {
            category: "free_zones".into(),
            count: 10,
            target: 10,
        };
        assert!(!full.is_deficient());

        let short = CategoryStatus {
            category: "licensing".into(),
            count: 1,
            target: 4,
        };
        assert!(short.is_deficient());
    }
}
