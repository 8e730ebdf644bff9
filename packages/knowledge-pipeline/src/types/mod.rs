//! Domain types for the knowledge pipeline.

pub mod audit;
pub mod entity;
pub mod record;

pub use audit::{AuditResult, CategoryStatus, EnrichmentReport, EnrichmentStatus};
pub use entity::{FreeZone, Guide, GuideStep, FREE_ZONES_CATEGORY};
pub use record::{ExtractedRecord, KnowledgeRecord, RecordShape};
