//! Structured extractor - raw HTML to category-tagged records.
//!
//! Every structured strategy runs and their results concatenate; the
//! page-summary fallback only fires when the structured strategies
//! produced nothing. An empty result set is valid, not an error.
//! Deduplication is the upsert layer's job, not the extractor's.

pub mod classify;
pub mod strategies;

use tracing::debug;

use crate::types::{ExtractedRecord, RecordShape};

pub use classify::{bucket_for_heading, classify_bullet, BulletClass, GuideBucket};

/// Extract zero or more structured records from raw HTML.
pub fn extract(content: &str, shape: &RecordShape) -> Vec<ExtractedRecord> {
    let mut records = strategies::semantic_sections(content, shape);
    records.extend(strategies::card_layout(content, shape));

    if records.is_empty() {
        debug!("Structured strategies found nothing, trying page summary");
        records = strategies::page_summary(content, shape);
    }

    let before = records.len();
    records.retain(|r| !r.record.is_discardable());
    if records.len() < before {
        debug!(discarded = before - records.len(), "Dropped empty records");
    }

    records
}
