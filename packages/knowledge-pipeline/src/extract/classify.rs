//! Keyword classification of bulleted list items.
//!
//! Bullets are bucketed by substring markers with a fixed precedence:
//! requirements beat industries beat benefits, so an ambiguous bullet
//! like "industry-standard requirements" files as a requirement. The
//! precedence is an inherited default, not a guaranteed-correct policy;
//! the rule list below is ordered so changing it is a one-line edit.

/// Classification of one entity bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletClass {
    Requirement,
    Industry,
    Benefit,
}

/// Marker table in precedence order. First matching class wins.
const BULLET_RULES: &[(BulletClass, &[&str])] = &[
    (BulletClass::Requirement, &["require", "need", "must"]),
    (BulletClass::Industry, &["industr", "sector", "business"]),
];

/// Classify one entity bullet. Anything matching no marker is a benefit.
pub fn classify_bullet(text: &str) -> BulletClass {
    let lower = text.to_lowercase();
    for (class, markers) in BULLET_RULES {
        if markers.iter().any(|marker| lower.contains(marker)) {
            return *class;
        }
    }
    BulletClass::Benefit
}

/// Bucket a guide's bullets fall into, derived from the nearest
/// preceding sub-heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideBucket {
    Documents,
    Requirements,
    Steps,
    Unclassified,
}

/// Map a sub-heading to the bucket it opens.
pub fn bucket_for_heading(heading: &str) -> GuideBucket {
    let lower = heading.to_lowercase();
    if lower.contains("document") {
        GuideBucket::Documents
    } else if lower.contains("requirement") {
        GuideBucket::Requirements
    } else if lower.contains("step") || lower.contains("process") || lower.contains("procedure") {
        GuideBucket::Steps
    } else {
        GuideBucket::Unclassified
    }
}
