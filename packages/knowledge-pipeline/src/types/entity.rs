//! Knowledge entities - free zones and procedural guides.
//!
//! Both record kinds are identified by a natural key (name, or
//! category + title) rather than a surrogate ID, so repeated
//! acquisition of the same source updates in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category under which free-zone entity records are counted.
pub const FREE_ZONES_CATEGORY: &str = "free_zones";

/// A named free-zone record with categorized attribute lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeZone {
    /// Unique, case-sensitive natural key
    pub name: String,

    /// Short description of the zone
    pub description: String,

    /// Physical location, empty when the source did not state one
    pub location: String,

    /// Advantages of setting up in this zone
    pub benefits: Vec<String>,

    /// Setup requirements
    pub requirements: Vec<String>,

    /// Industries the zone caters to
    pub industries: Vec<String>,

    /// Bumped on every upsert that touches this record
    pub last_updated: DateTime<Utc>,
}

impl FreeZone {
    /// Create a new free zone with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            location: String::new(),
            benefits: Vec::new(),
            requirements: Vec::new(),
            industries: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Replace mutable fields from a newer record and bump the timestamp.
    ///
    /// The natural key is never touched; callers look the record up by
    /// name before merging.
    pub fn merge_from(&mut self, newer: FreeZone) {
        self.description = newer.description;
        self.location = newer.location;
        self.benefits = newer.benefits;
        self.requirements = newer.requirements;
        self.industries = newer.industries;
        self.last_updated = Utc::now();
    }

    /// Whether the record carries any content beyond its name.
    pub fn has_content(&self) -> bool {
        !self.description.trim().is_empty()
            || !self.benefits.is_empty()
            || !self.requirements.is_empty()
            || !self.industries.is_empty()
    }
}

/// One ordered step inside a guide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideStep {
    pub title: String,
    pub description: String,
}

impl GuideStep {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// A titled procedural document grouped by category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guide {
    /// Natural key within `category`
    pub title: String,

    /// Category label, e.g. "business_setup"
    pub category: String,

    /// Body text
    pub body: String,

    /// Requirements called out by the guide
    pub requirements: Vec<String>,

    /// Documents the reader must supply
    pub documents: Vec<String>,

    /// Ordered procedure steps
    pub steps: Vec<GuideStep>,

    /// Bumped on every upsert that touches this record
    pub last_updated: DateTime<Utc>,
}

impl Guide {
    /// Create a new guide with a title and category.
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            body: String::new(),
            requirements: Vec::new(),
            documents: Vec::new(),
            steps: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Set the body text.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Replace mutable fields from a newer record and bump the timestamp.
    pub fn merge_from(&mut self, newer: Guide) {
        self.body = newer.body;
        self.requirements = newer.requirements;
        self.documents = newer.documents;
        self.steps = newer.steps;
        self.last_updated = Utc::now();
    }

    /// Whether the record carries any content beyond its title.
    pub fn has_content(&self) -> bool {
        !self.body.trim().is_empty()
            || !self.requirements.is_empty()
            || !self.documents.is_empty()
            || !self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_builder() {
        let zone = FreeZone::new("Harbor Point Free Zone")
            .with_description("Port-side zone")
            .with_location("East Quay");

        assert_eq!(zone.name, "Harbor Point Free Zone");
        assert_eq!(zone.location, "East Quay");
        assert!(zone.has_content());
    }

    #[test]
    fn test_merge_preserves_key() {
        let mut existing = FreeZone::new("Zone A").with_description("old");
        let before = existing.last_updated;

        let newer = FreeZone::new("ignored key").with_description("new");
        existing.merge_from(newer);

        assert_eq!(existing.name, "Zone A");
        assert_eq!(existing.description, "new");
        assert!(existing.last_updated >= before);
    }

    #[test]
    fn test_empty_guide_has_no_content() {
        let guide = Guide::new("Opening a bank account", "banking_finance");
        assert!(!guide.has_content());

        let with_step = {
            let mut g = guide.clone();
            g.steps.push(GuideStep::new("Gather documents", ""));
            g
        };
        assert!(with_step.has_content());
    }
}
