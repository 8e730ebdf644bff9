//! Resilient Knowledge Acquisition Pipeline
//!
//! Populates and maintains a knowledge base for a free-zone business
//! setup guidance platform. Built around the assumption that the
//! upstream sources are unreliable: every stage has a fallback and the
//! pipeline always produces a usable knowledge base.
//!
//! # Design Philosophy
//!
//! **"Degrade, never fail"**
//!
//! - Tiered transports: each fetch walks progressively more permissive
//!   tiers before giving up on the network
//! - Cache then synthetic: stale-but-real content beats nothing, and
//!   clearly-labeled placeholder content beats an empty knowledge base
//! - Natural-key upserts: re-running the pipeline is always safe
//! - Audit and enrich: gaps are measured and filled, never ignored
//!
//! # Usage
//!
//! ```rust,ignore
//! use knowledge_pipeline::{
//!     acquire, FetchConfig, FetchOrchestrator, MemoryRepository, RecordShape, StaticFixtures,
//! };
//!
//! let config = FetchConfig::from_env();
//! let orchestrator = FetchOrchestrator::new(config, StaticFixtures);
//! let repo = MemoryRepository::new();
//!
//! let report = acquire(&orchestrator, &repo, "https://example.com/free-zones", &RecordShape::Entity).await?;
//! println!("{} inserted, {} updated", report.inserted, report.updated);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (FetchTier, KnowledgeRepository, FixtureProvider)
//! - [`types`] - Domain records, audit results, enrichment reports
//! - [`fetch`] - Tiered transport orchestration
//! - [`cache`] - Disk cache with TTL
//! - [`extract`] - Heuristic HTML extraction strategies
//! - [`stores`] - Repository implementations (MemoryRepository, etc.)
//! - [`audit`] - Completeness auditing against category targets
//! - [`enrich`] - Bounded gap-filling with templated documents
//! - [`pipeline`] - End-to-end acquisition
//! - [`testing`] - Scripted transport tiers for tests

pub mod audit;
pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod fixtures;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{GenerationError, PipelineError, TransportError};
pub use traits::{FetchTier, FixtureProvider, KnowledgeRepository, NoFixtures, UpsertOutcome};
pub use types::{
    AuditResult, CategoryStatus, EnrichmentReport, EnrichmentStatus, ExtractedRecord, FreeZone,
    Guide, GuideStep, KnowledgeRecord, RecordShape, FREE_ZONES_CATEGORY,
};

pub use config::{EnrichmentConfig, FetchConfig};

// Fetch layer
pub use cache::{CacheStatus, CacheStore, CACHE_TTL_HOURS};
pub use fetch::{ContentSource, FetchOrchestrator, FetchedContent};
pub use fixtures::StaticFixtures;

// Extraction
pub use extract::extract;

// Stores
pub use stores::MemoryRepository;

#[cfg(feature = "postgres")]
pub use stores::PostgresRepository;

// Audit and enrichment
pub use audit::{write_audit_report, Auditor};
pub use enrich::{run_enrichment, DocumentGenerator, TemplateGenerator};

// Pipeline entry points
pub use pipeline::{acquire, acquire_many, AcquisitionReport};
