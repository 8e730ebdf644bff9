//! Extraction output shapes.
//!
//! Extraction strategies all funnel into [`ExtractedRecord`]: a
//! knowledge record plus the strategy that produced it and a crude
//! confidence tag. Deduplication happens later, at the upsert layer.

use serde::{Deserialize, Serialize};

use crate::types::entity::{FreeZone, Guide, FREE_ZONES_CATEGORY};

/// The record shape a caller wants the extractor to target.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordShape {
    /// Free-zone entity records
    Entity,
    /// Procedural guides, tagged with the category to file them under
    Guide { category: String },
}

impl RecordShape {
    /// Guide shape constructor.
    pub fn guide(category: impl Into<String>) -> Self {
        Self::Guide {
            category: category.into(),
        }
    }
}

/// A knowledge record of either kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KnowledgeRecord {
    Zone(FreeZone),
    Guide(Guide),
}

impl KnowledgeRecord {
    /// Natural key used for deduplication at the upsert layer.
    pub fn natural_key(&self) -> String {
        match self {
            Self::Zone(z) => z.name.clone(),
            Self::Guide(g) => format!("{}/{}", g.category, g.title),
        }
    }

    /// Category the record counts toward in audits.
    pub fn category(&self) -> &str {
        match self {
            Self::Zone(_) => FREE_ZONES_CATEGORY,
            Self::Guide(g) => &g.category,
        }
    }

    /// A record with an empty name/title and no body is worthless and
    /// gets discarded before leaving the extractor.
    pub fn is_discardable(&self) -> bool {
        match self {
            Self::Zone(z) => z.name.trim().is_empty() && !z.has_content(),
            Self::Guide(g) => g.title.trim().is_empty() && !g.has_content(),
        }
    }
}

/// One record produced by an extraction strategy.
#[derive(Debug, Clone)]
pub struct ExtractedRecord {
    pub record: KnowledgeRecord,

    /// Name of the strategy that produced this record
    pub strategy: &'static str,

    /// Crude confidence tag; the page-summary fallback is explicitly
    /// lower-confidence than the structured strategies
    pub confidence: f32,
}

impl ExtractedRecord {
    pub fn new(record: KnowledgeRecord, strategy: &'static str, confidence: f32) -> Self {
        Self {
            record,
            strategy,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_keys() {
        let zone = KnowledgeRecord::Zone(FreeZone::new("Zone A"));
        assert_eq!(zone.natural_key(), "Zone A");
        assert_eq!(zone.category(), FREE_ZONES_CATEGORY);

        let guide = KnowledgeRecord::Guide(Guide::new("Visa renewal", "visa_information"));
        assert_eq!(guide.natural_key(), "visa_information/Visa renewal");
        assert_eq!(guide.category(), "visa_information");
    }

    #[test]
    fn test_discardable() {
        let empty = KnowledgeRecord::Zone(FreeZone::new("  "));
        assert!(empty.is_discardable());

        let named = KnowledgeRecord::Zone(FreeZone::new("Zone A"));
        assert!(!named.is_discardable());

        let unnamed_with_body =
            KnowledgeRecord::Guide(Guide::new("", "business_setup").with_body("something"));
        assert!(!unnamed_with_body.is_discardable());
    }
}
