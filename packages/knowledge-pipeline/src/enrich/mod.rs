//! Enrichment loop - audit-guided convergence toward completeness.
//!
//! Modeled as an explicit state machine rather than a bare while-loop:
//! every transition is computed by matching on the current state, and
//! the only transitions out of `Auditing` are another cycle, `Complete`,
//! or `Exhausted`, so the termination guarantee (iteration ceiling) sits
//! in one place.

pub mod templates;

use chrono::Utc;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::audit::Auditor;
use crate::config::EnrichmentConfig;
use crate::error::Result;
use crate::traits::KnowledgeRepository;
use crate::types::{AuditResult, EnrichmentReport, EnrichmentStatus, Guide};

pub use templates::{DocumentGenerator, TemplateGenerator};

/// States of one enrichment run. `Persisting` carries the document the
/// `Generating` state produced for it.
enum EnrichmentState {
    Auditing,
    Selecting,
    Generating,
    Persisting(Guide),
    Complete,
    Exhausted,
}

/// Pick the categories one cycle works on: the top `per_cycle` of the
/// audit's priority list.
///
/// An audit below 100% with an empty priority list is inconsistent.
/// Rather than trusting the priority output and spinning without
/// progress, the selection falls back to walking every known category.
pub fn select_categories(last: &AuditResult, auditor: &Auditor, per_cycle: usize) -> Vec<String> {
    let selected: Vec<String> = last
        .priority_categories
        .iter()
        .take(per_cycle)
        .cloned()
        .collect();

    if selected.is_empty() && !last.is_complete {
        warn!(
            score = last.score,
            "Audit reported no priority categories below 100%, iterating all categories"
        );
        return auditor.categories();
    }
    selected
}

/// Drive the knowledge store toward 100% completeness.
///
/// Each cycle works on at most `categories_per_cycle` of the most
/// deficient categories, generating one templated document per
/// category, then re-audits. A generation failure for one category is
/// logged and skipped; only storage failures abort the run. Returns a
/// report whether the run converged or hit the ceiling.
pub async fn run_enrichment<R, G>(
    repo: &R,
    auditor: &Auditor,
    generator: &G,
    config: &EnrichmentConfig,
) -> Result<EnrichmentReport>
where
    R: KnowledgeRepository + ?Sized,
    G: DocumentGenerator,
{
    let initial = auditor.audit(repo).await?;
    let mut report = EnrichmentReport::begin(initial.score);
    let initially_deficient = initial.priority_categories.clone();

    info!(
        score = initial.score,
        deficient = initially_deficient.len(),
        "Enrichment starting"
    );

    let mut last = initial;
    let mut iterations = 0usize;
    let mut queue: VecDeque<String> = VecDeque::new();
    let mut state = EnrichmentState::Auditing;

    let status = loop {
        state = match state {
            EnrichmentState::Auditing => {
                if last.is_complete {
                    EnrichmentState::Complete
                } else if iterations >= config.max_iterations {
                    EnrichmentState::Exhausted
                } else {
                    iterations += 1;
                    EnrichmentState::Selecting
                }
            }

            EnrichmentState::Selecting => {
                queue = select_categories(&last, auditor, config.categories_per_cycle).into();
                EnrichmentState::Generating
            }

            EnrichmentState::Generating => match queue.pop_front() {
                // Cycle's queue is drained: re-audit and decide
                None => {
                    last = auditor.audit(repo).await?;
                    info!(iteration = iterations, score = last.score, "Cycle re-audit");
                    EnrichmentState::Auditing
                }
                Some(category) => {
                    let count = repo.count_in_category(&category).await?;
                    let target = auditor.target_for(&category);

                    if count >= target || count >= config.per_category_cap {
                        debug!(category = %category, count = count, "Category already satisfied or capped");
                        EnrichmentState::Generating
                    } else {
                        match generator.generate(&category, count + 1) {
                            Ok(guide) => EnrichmentState::Persisting(guide),
                            Err(e) => {
                                warn!(category = %category, error = %e, "Generation failed, skipping category");
                                report.actions.push(format!("failed: {category}: {e}"));
                                EnrichmentState::Generating
                            }
                        }
                    }
                }
            },

            EnrichmentState::Persisting(guide) => {
                let outcome = repo.upsert_guide(guide.clone()).await?;
                debug!(category = %guide.category, title = %guide.title, outcome = ?outcome, "Generated document persisted");
                report
                    .actions
                    .push(format!("generated: {}: {}", guide.category, guide.title));
                EnrichmentState::Generating
            }

            EnrichmentState::Complete => break EnrichmentStatus::Complete,
            EnrichmentState::Exhausted => break EnrichmentStatus::Exhausted,
        };
    };

    report.iterations = iterations;
    report.final_score = last.score;
    report.finished_at = Utc::now();
    report.status = status;
    report.remaining_categories = last.priority_categories.clone();
    report.resolved_categories = initially_deficient
        .into_iter()
        .filter(|c| !last.priority_categories.contains(c))
        .collect();

    info!(
        status = ?report.status,
        iterations = report.iterations,
        initial_score = report.initial_score,
        final_score = report.final_score,
        "Enrichment finished"
    );

    if let Some(dir) = &config.reports_dir {
        let path = dir.join(format!(
            "enrichment_{}.json",
            report.started_at.format("%Y%m%dT%H%M%S")
        ));
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, serde_json::to_vec_pretty(&report)?).await?;
        info!(path = %path.display(), "Enrichment report written");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::stores::MemoryRepository;
    use crate::types::{FreeZone, Guide};

    struct FailingGenerator;

    impl DocumentGenerator for FailingGenerator {
        fn generate(
            &self,
            category: &str,
            _sequence: usize,
        ) -> std::result::Result<Guide, GenerationError> {
            Err(GenerationError {
                category: category.to_string(),
                reason: "template service down".to_string(),
            })
        }
    }

    fn small_auditor() -> Auditor {
        Auditor::new("test").with_targets(vec![
            ("business_setup".to_string(), 2),
            ("licensing".to_string(), 1),
        ])
    }

    #[tokio::test]
    async fn test_runs_to_complete() {
        let repo = MemoryRepository::new();
        let config = EnrichmentConfig::new();

        let report = run_enrichment(&repo, &small_auditor(), &TemplateGenerator, &config)
            .await
            .unwrap();

        assert_eq!(report.status, EnrichmentStatus::Complete);
        assert_eq!(report.final_score, 100);
        assert!(report.is_monotonic());
        assert_eq!(
            repo.count_in_category("business_setup").await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_already_complete_terminates_immediately() {
        let repo = MemoryRepository::new();
        repo.upsert_guide(Guide::new("G1", "business_setup")).await.unwrap();
        repo.upsert_guide(Guide::new("G2", "business_setup")).await.unwrap();
        repo.upsert_guide(Guide::new("G3", "licensing")).await.unwrap();

        let report = run_enrichment(
            &repo,
            &small_auditor(),
            &TemplateGenerator,
            &EnrichmentConfig::new(),
        )
        .await
        .unwrap();

        assert_eq!(report.status, EnrichmentStatus::Complete);
        assert_eq!(report.iterations, 0);
    }

    #[tokio::test]
    async fn test_always_failing_generator_exhausts_ceiling() {
        let repo = MemoryRepository::new();
        let config = EnrichmentConfig::new().with_max_iterations(15);

        let report = run_enrichment(&repo, &small_auditor(), &FailingGenerator, &config)
            .await
            .unwrap();

        assert_eq!(report.status, EnrichmentStatus::Exhausted);
        assert_eq!(report.iterations, 15);
        assert_eq!(report.final_score, report.initial_score);
        // Remaining deficiencies are reported, not silently dropped
        assert_eq!(report.remaining_categories.len(), 2);
    }

    #[tokio::test]
    async fn test_score_never_decreases() {
        let repo = MemoryRepository::new();
        repo.upsert_zone(FreeZone::new("Zone A")).await.unwrap();
        repo.upsert_guide(Guide::new("G1", "business_setup")).await.unwrap();

        let auditor = Auditor::new("test").with_targets(vec![
            ("free_zones".to_string(), 2),
            ("business_setup".to_string(), 3),
        ]);
        let initial = auditor.audit(&repo).await.unwrap();

        let report = run_enrichment(
            &repo,
            &auditor,
            &TemplateGenerator,
            &EnrichmentConfig::new(),
        )
        .await
        .unwrap();

        assert!(report.final_score >= initial.score);
        assert!(report.is_monotonic());
    }

    #[tokio::test]
    async fn test_per_category_cap_respected() {
        let repo = MemoryRepository::new();
        // Target of 5 but cap of 2: the loop must stop at the cap and
        // exhaust rather than blow past it
        let auditor = Auditor::new("test")
            .with_targets(vec![("business_setup".to_string(), 5)]);
        let config = EnrichmentConfig::new()
            .with_max_iterations(10)
            .with_per_category_cap(2);

        let report = run_enrichment(&repo, &auditor, &TemplateGenerator, &config)
            .await
            .unwrap();

        assert_eq!(report.status, EnrichmentStatus::Exhausted);
        assert_eq!(repo.count_in_category("business_setup").await.unwrap(), 2);
    }

    #[test]
    fn test_selection_takes_most_deficient_first() {
        let auditor = small_auditor();
        let audit = AuditResult {
            domain: "test".to_string(),
            score: 50,
            categories: Vec::new(),
            priority_categories: vec![
                "licensing".to_string(),
                "business_setup".to_string(),
            ],
            is_complete: false,
            audited_at: chrono::Utc::now(),
        };

        assert_eq!(select_categories(&audit, &auditor, 1), vec!["licensing"]);
    }

    #[test]
    fn test_inconsistent_audit_falls_back_to_all_categories() {
        // Below 100% but nothing flagged: the selection must not trust
        // the empty priority list, or the cycle would spin doing nothing
        let auditor = small_auditor();
        let audit = AuditResult {
            domain: "test".to_string(),
            score: 80,
            categories: Vec::new(),
            priority_categories: Vec::new(),
            is_complete: false,
            audited_at: chrono::Utc::now(),
        };

        assert_eq!(select_categories(&audit, &auditor, 3), auditor.categories());
    }

    #[test]
    fn test_complete_audit_selects_nothing() {
        let auditor = small_auditor();
        let audit = AuditResult {
            domain: "test".to_string(),
            score: 100,
            categories: Vec::new(),
            priority_categories: Vec::new(),
            is_complete: true,
            audited_at: chrono::Utc::now(),
        };

        assert!(select_categories(&audit, &auditor, 3).is_empty());
    }

    #[tokio::test]
    async fn test_report_artifact_written() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MemoryRepository::new();
        let config = EnrichmentConfig::new().with_reports_dir(dir.path());

        run_enrichment(&repo, &small_auditor(), &TemplateGenerator, &config)
            .await
            .unwrap();

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let entry = entries.next_entry().await.unwrap().expect("report file");
        assert!(entry
            .file_name()
            .to_string_lossy()
            .starts_with("enrichment_"));
    }
}
