//! Static synthetic content for known resource classes.
//!
//! Hand-authored placeholder pages representative of the shapes the
//! extractor expects. The fetch orchestrator falls back to these when
//! every transport tier and the cache come up empty.

use crate::traits::FixtureProvider;

/// Canned free-zone directory page: three named zones with benefit,
/// requirement, and industry bullets, shaped like the real sources.
pub const FREE_ZONE_DIRECTORY_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Free Zone Directory</title>
    <meta name="description" content="Directory of licensed free zones and their setup profiles">
</head>
<body>
<main>
    <h2>Meridian Gate Free Zone</h2>
    <p>A flagship commercial free zone serving trading and holding companies.</p>
    <p>Location: Central Business District</p>
    <ul>
        <li>100% foreign ownership permitted</li>
        <li>Zero corporate tax on qualifying income</li>
        <li>Minimum share capital requirement varies by activity</li>
        <li>Physical office space must be leased within the zone</li>
        <li>Key industries include trading and professional services</li>
    </ul>

    <h2>Harbor Point Free Zone</h2>
    <p>Maritime and logistics zone adjacent to the deep-water port.</p>
    <p>Location: East Quay, Port District</p>
    <ul>
        <li>On-dock warehousing and bonded storage</li>
        <li>Fast-track customs clearance</li>
        <li>Applicants must hold a maritime or logistics activity license</li>
        <li>Serves the shipping and freight forwarding sector</li>
    </ul>

    <h2>Skyline Media Free Zone</h2>
    <p>Creative cluster for media production and digital agencies.</p>
    <p>Location: North Ridge Campus</p>
    <ul>
        <li>Shared studio infrastructure</li>
        <li>Freelancer permits available</li>
        <li>Portfolio submission required for creative licenses</li>
        <li>Focused on the media and advertising industry</li>
    </ul>
</main>
</body>
</html>
"#;

/// Canned guide page used when a guide-class source is unreachable.
pub const SETUP_GUIDE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Business Setup Guides</title></head>
<body>
<main>
    <h2>Choosing the right free zone</h2>
    <p>Match the zone to the licensed activity, the budget, and the visa quota the business needs.</p>
    <h4>Requirements</h4>
    <ul>
        <li>Shortlist of intended licensed activities</li>
        <li>Indicative budget for license and lease</li>
    </ul>
    <h4>Required Documents</h4>
    <ul>
        <li>Shareholder passport copies</li>
        <li>Summary business plan</li>
    </ul>
    <h4>Steps</h4>
    <ul>
        <li>Compare zones: review activity lists and fee schedules</li>
        <li>Confirm visa quota: check the allocation for the office type</li>
        <li>Apply: submit the application to the chosen zone</li>
    </ul>
</main>
</body>
</html>
"#;

/// Fixture provider keyed on URL substrings per resource class.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFixtures;

impl FixtureProvider for StaticFixtures {
    fn synthetic_for(&self, url: &str) -> Option<String> {
        let lower = url.to_lowercase();
        if lower.contains("free-zone") || lower.contains("freezone") || lower.contains("free_zone")
        {
            Some(FREE_ZONE_DIRECTORY_HTML.to_string())
        } else if lower.contains("guide") || lower.contains("setup") {
            Some(SETUP_GUIDE_HTML.to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::types::{KnowledgeRecord, RecordShape};

    #[test]
    fn test_recognizes_resource_classes() {
        let fixtures = StaticFixtures;
        assert!(fixtures.synthetic_for("https://example.com/free-zones").is_some());
        assert!(fixtures.synthetic_for("https://example.com/setup-guides").is_some());
        assert!(fixtures.synthetic_for("https://example.com/contact").is_none());
    }

    #[test]
    fn test_directory_fixture_extracts_three_zones() {
        let records = extract(FREE_ZONE_DIRECTORY_HTML, &RecordShape::Entity);

        let zones: Vec<_> = records
            .iter()
            .filter_map(|r| match &r.record {
                KnowledgeRecord::Zone(z) => Some(z),
                _ => None,
            })
            .collect();
        assert_eq!(zones.len(), 3);

        let meridian = zones.iter().find(|z| z.name.contains("Meridian")).unwrap();
        assert!(!meridian.benefits.is_empty());
        assert!(!meridian.requirements.is_empty());
        assert!(!meridian.industries.is_empty());
        assert_eq!(meridian.location, "Central Business District");
    }

    #[test]
    fn test_guide_fixture_extracts_buckets() {
        let records = extract(SETUP_GUIDE_HTML, &RecordShape::guide("business_setup"));
        let guide = match &records[0].record {
            KnowledgeRecord::Guide(g) => g,
            _ => panic!("expected a guide"),
        };

        assert_eq!(guide.title, "Choosing the right free zone");
        assert_eq!(guide.requirements.len(), 2);
        assert_eq!(guide.documents.len(), 2);
        assert_eq!(guide.steps.len(), 3);
    }
}
