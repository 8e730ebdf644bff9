//! Completeness auditor.
//!
//! Scores the knowledge store against a fixed rubric of per-category
//! target counts and ranks the deficient categories. An audit is pure
//! derivation from the store; it is recomputed on every call and never
//! mutated in place.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::traits::KnowledgeRepository;
use crate::types::{AuditResult, CategoryStatus, FREE_ZONES_CATEGORY};

/// Default target-count rubric for one knowledge domain.
pub const DEFAULT_TARGETS: &[(&str, usize)] = &[
    (FREE_ZONES_CATEGORY, 3),
    ("business_setup", 5),
    ("visa_information", 4),
    ("banking_finance", 3),
    ("legal_compliance", 3),
    ("licensing", 3),
];

/// Computes completeness scores for a knowledge domain.
#[derive(Debug, Clone)]
pub struct Auditor {
    domain: String,
    targets: Vec<(String, usize)>,
}

impl Auditor {
    /// Create an auditor for a domain with the default rubric.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            targets: DEFAULT_TARGETS
                .iter()
                .map(|(category, target)| (category.to_string(), *target))
                .collect(),
        }
    }

    /// Replace the rubric entirely (tests use small rubrics).
    pub fn with_targets(mut self, targets: Vec<(String, usize)>) -> Self {
        self.targets = targets;
        self
    }

    /// Add or override one category target.
    pub fn with_target(mut self, category: impl Into<String>, target: usize) -> Self {
        let category = category.into();
        if let Some(entry) = self.targets.iter_mut().find(|(c, _)| *c == category) {
            entry.1 = target;
        } else {
            self.targets.push((category, target));
        }
        self
    }

    /// Every category the rubric tracks.
    pub fn categories(&self) -> Vec<String> {
        self.targets.iter().map(|(c, _)| c.clone()).collect()
    }

    /// Target count for one category, zero if untracked.
    pub fn target_for(&self, category: &str) -> usize {
        self.targets
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, t)| *t)
            .unwrap_or(0)
    }

    /// Run one audit against the repository.
    ///
    /// `score = round(100 * Σ min(count, target) / Σ target)`; deficient
    /// categories come back most deficient first (ascending count, then
    /// name for determinism).
    pub async fn audit<R: KnowledgeRepository + ?Sized>(&self, repo: &R) -> Result<AuditResult> {
        let counts = repo.category_counts().await?;

        let mut achieved = 0usize;
        let mut total = 0usize;
        let mut categories = Vec::with_capacity(self.targets.len());

        for (category, target) in &self.targets {
            let count = counts.get(category).copied().unwrap_or(0);
            achieved += count.min(*target);
            total += target;
            categories.push(CategoryStatus {
                category: category.clone(),
                count,
                target: *target,
            });
        }

        let score = if total == 0 {
            100
        } else {
            ((100.0 * achieved as f64 / total as f64).round()) as u8
        };

        let mut deficient: Vec<&CategoryStatus> =
            categories.iter().filter(|c| c.is_deficient()).collect();
        deficient.sort_by(|a, b| a.count.cmp(&b.count).then(a.category.cmp(&b.category)));
        let priority_categories: Vec<String> =
            deficient.into_iter().map(|c| c.category.clone()).collect();

        debug!(
            domain = %self.domain,
            score = score,
            deficient = priority_categories.len(),
            "Audit computed"
        );

        Ok(AuditResult {
            domain: self.domain.clone(),
            score,
            categories,
            priority_categories,
            is_complete: score == 100,
            audited_at: Utc::now(),
        })
    }
}

/// Write the latest audit result for a domain as a JSON artifact.
///
/// One file per domain; each audit overwrites the previous one.
pub async fn write_audit_report(result: &AuditResult, dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("audit_{}.json", result.domain));
    let json = serde_json::to_vec_pretty(result)?;
    tokio::fs::write(&path, json).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryRepository;
    use crate::types::{FreeZone, Guide};

    fn small_auditor() -> Auditor {
        Auditor::new("test").with_targets(vec![
            (FREE_ZONES_CATEGORY.to_string(), 2),
            ("business_setup".to_string(), 2),
        ])
    }

    #[tokio::test]
    async fn test_empty_store_scores_zero() {
        let repo = MemoryRepository::new();
        let result = small_auditor().audit(&repo).await.unwrap();

        assert_eq!(result.score, 0);
        assert!(!result.is_complete);
        assert_eq!(result.priority_categories.len(), 2);
    }

    #[tokio::test]
    async fn test_score_rounds_partial_progress() {
        let repo = MemoryRepository::new();
        repo.upsert_zone(FreeZone::new("Zone A")).await.unwrap();

        // 1 of 4 targets met: round(25) = 25
        let result = small_auditor().audit(&repo).await.unwrap();
        assert_eq!(result.score, 25);
    }

    #[tokio::test]
    async fn test_overshoot_capped_at_target() {
        let repo = MemoryRepository::new();
        for name in ["A", "B", "C", "D"] {
            repo.upsert_zone(FreeZone::new(name)).await.unwrap();
        }

        // 4 zones against a target of 2 still contributes only 2
        let result = small_auditor().audit(&repo).await.unwrap();
        assert_eq!(result.score, 50);
        assert_eq!(result.priority_categories, vec!["business_setup"]);
    }

    #[tokio::test]
    async fn test_priority_order_most_deficient_first() {
        let repo = MemoryRepository::new();
        repo.upsert_guide(Guide::new("G1", "business_setup")).await.unwrap();

        let auditor = Auditor::new("test").with_targets(vec![
            ("business_setup".to_string(), 3),
            ("visa_information".to_string(), 2),
        ]);
        let result = auditor.audit(&repo).await.unwrap();

        // visa_information has count 0, business_setup has 1
        assert_eq!(
            result.priority_categories,
            vec!["visa_information", "business_setup"]
        );
    }

    #[tokio::test]
    async fn test_complete_store() {
        let repo = MemoryRepository::new();
        repo.upsert_zone(FreeZone::new("A")).await.unwrap();
        repo.upsert_zone(FreeZone::new("B")).await.unwrap();
        repo.upsert_guide(Guide::new("G1", "business_setup")).await.unwrap();
        repo.upsert_guide(Guide::new("G2", "business_setup")).await.unwrap();

        let result = small_auditor().audit(&repo).await.unwrap();
        assert_eq!(result.score, 100);
        assert!(result.is_complete);
        assert!(result.priority_categories.is_empty());
    }

    #[tokio::test]
    async fn test_audit_report_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MemoryRepository::new();
        let result = small_auditor().audit(&repo).await.unwrap();

        let path = write_audit_report(&result, dir.path()).await.unwrap();
        assert!(path.ends_with("audit_test.json"));

        let bytes = tokio::fs::read(&path).await.unwrap();
        let parsed: AuditResult = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.score, result.score);
    }
}
