//! Extraction strategies over raw HTML.
//!
//! Three named strategies sharing one output shape. Scanning is
//! regex-based, the same way the HTTP ingestion path reads HTML; it is
//! heuristic by design and tolerates malformed markup rather than
//! insisting on a well-formed DOM.

use regex::Regex;
use tracing::debug;

use crate::extract::classify::{bucket_for_heading, classify_bullet, BulletClass, GuideBucket};
use crate::types::{ExtractedRecord, FreeZone, Guide, GuideStep, KnowledgeRecord, RecordShape};

/// Strip tags, decode common entities, and collapse whitespace.
fn strip_tags(fragment: &str) -> String {
    let tag_pattern = Regex::new(r"<[^>]+>").unwrap();
    let text = tag_pattern.replace_all(fragment, " ");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of every `<li>` in a fragment.
fn list_items(fragment: &str) -> Vec<String> {
    let li_pattern = Regex::new(r"(?s)<li[^>]*>(.*?)</li>").unwrap();
    li_pattern
        .captures_iter(fragment)
        .filter_map(|cap| cap.get(1))
        .map(|m| strip_tags(m.as_str()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Text of every `<p>` in a fragment.
fn paragraphs(fragment: &str) -> Vec<String> {
    let p_pattern = Regex::new(r"(?s)<p[^>]*>(.*?)</p>").unwrap();
    p_pattern
        .captures_iter(fragment)
        .filter_map(|cap| cap.get(1))
        .map(|m| strip_tags(m.as_str()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Narrow the page to its main content container when one exists.
fn content_container(html: &str) -> &str {
    let container_patterns = [
        r"(?s)<main[^>]*>(.*?)</main>",
        r"(?s)<article[^>]*>(.*?)</article>",
        r#"(?s)<(?:div|section)[^>]*(?:id|class)="[^"]*content[^"]*"[^>]*>(.*)"#,
    ];

    for pattern in container_patterns {
        if let Some(cap) = Regex::new(pattern).unwrap().captures(html) {
            if let Some(m) = cap.get(1) {
                return m.as_str();
            }
        }
    }
    html
}

/// Strategy A: semantic containers.
///
/// Headings inside the main content container each start one record;
/// everything until the next heading is that record's body. Entity
/// bullets are keyword-classified; guide bullets are bucketed by the
/// nearest preceding sub-heading.
pub fn semantic_sections(html: &str, shape: &RecordShape) -> Vec<ExtractedRecord> {
    let container = content_container(html);

    let heading_pattern = Regex::new(r"(?s)<h[23][^>]*>(.*?)</h[23]>").unwrap();
    let headings: Vec<(usize, usize, String)> = heading_pattern
        .captures_iter(container)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let text = strip_tags(cap.get(1)?.as_str());
            Some((whole.start(), whole.end(), text))
        })
        .collect();

    let mut records = Vec::new();
    for (i, (_, body_start, name)) in headings.iter().enumerate() {
        let body_end = headings
            .get(i + 1)
            .map(|(next_start, _, _)| *next_start)
            .unwrap_or(container.len());
        let body = &container[*body_start..body_end];

        let record = match shape {
            RecordShape::Entity => KnowledgeRecord::Zone(entity_from_section(name, body)),
            RecordShape::Guide { category } => {
                KnowledgeRecord::Guide(guide_from_section(name, category, body))
            }
        };
        records.push(ExtractedRecord::new(record, "semantic_sections", 0.8));
    }

    debug!(records = records.len(), "Semantic section strategy finished");
    records
}

fn entity_from_section(name: &str, body: &str) -> FreeZone {
    let mut zone = FreeZone::new(name);

    for paragraph in paragraphs(body) {
        if let Some(rest) = paragraph.strip_prefix("Location:") {
            zone.location = rest.trim().to_string();
        } else if zone.location.is_empty() && paragraph.to_lowercase().contains("located in") {
            zone.location = paragraph.clone();
            if zone.description.is_empty() {
                zone.description = paragraph;
            }
        } else if zone.description.is_empty() {
            zone.description = paragraph;
        }
    }

    for item in list_items(body) {
        match classify_bullet(&item) {
            BulletClass::Requirement => zone.requirements.push(item),
            BulletClass::Industry => zone.industries.push(item),
            BulletClass::Benefit => zone.benefits.push(item),
        }
    }

    zone
}

fn guide_from_section(title: &str, category: &str, body: &str) -> Guide {
    let mut guide = Guide::new(title, category);
    let mut bucket = GuideBucket::Unclassified;
    let mut body_parts: Vec<String> = Vec::new();

    // Walk sub-headings, bullets, and paragraphs in document order so
    // each bullet lands in the bucket its nearest heading opened.
    let token_pattern = Regex::new(
        r"(?s)<h[4-6][^>]*>(.*?)</h[4-6]>|<strong[^>]*>(.*?)</strong>|<li[^>]*>(.*?)</li>|<p[^>]*>(.*?)</p>",
    )
    .unwrap();

    for cap in token_pattern.captures_iter(body) {
        if let Some(heading) = cap.get(1).or_else(|| cap.get(2)) {
            bucket = bucket_for_heading(&strip_tags(heading.as_str()));
        } else if let Some(item) = cap.get(3) {
            let text = strip_tags(item.as_str());
            if text.is_empty() {
                continue;
            }
            match bucket {
                GuideBucket::Documents => guide.documents.push(text),
                GuideBucket::Requirements => guide.requirements.push(text),
                GuideBucket::Steps => {
                    let (step_title, description) = match text.split_once(':') {
                        Some((t, d)) => (t.trim().to_string(), d.trim().to_string()),
                        None => (text, String::new()),
                    };
                    guide.steps.push(GuideStep::new(step_title, description));
                }
                GuideBucket::Unclassified => body_parts.push(format!("- {text}")),
            }
        } else if let Some(paragraph) = cap.get(4) {
            let text = strip_tags(paragraph.as_str());
            if !text.is_empty() {
                body_parts.push(text);
            }
        }
    }

    guide.body = body_parts.join("\n");
    guide
}

/// Strategy B: card/tile layouts.
///
/// Elements whose class names look card-like each yield one record,
/// with title, description, and list sub-elements read directly from
/// the card markup.
pub fn card_layout(html: &str, shape: &RecordShape) -> Vec<ExtractedRecord> {
    let card_pattern = Regex::new(
        r#"(?s)<(?:div|section|article)[^>]*class="[^"]*(?:card|tile|feature|listing)[^"]*"[^>]*>(.*?)</(?:div|section|article)>"#,
    )
    .unwrap();
    let title_pattern = Regex::new(r"(?s)<h[2-6][^>]*>(.*?)</h[2-6]>|<strong[^>]*>(.*?)</strong>").unwrap();

    let mut records = Vec::new();
    for cap in card_pattern.captures_iter(html) {
        let card = match cap.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };

        let title = title_pattern
            .captures(card)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| strip_tags(m.as_str()))
            .unwrap_or_default();
        let description = paragraphs(card).into_iter().next().unwrap_or_default();
        let items = list_items(card);

        let record = match shape {
            RecordShape::Entity => {
                let mut zone = FreeZone::new(title).with_description(description);
                for item in items {
                    match classify_bullet(&item) {
                        BulletClass::Requirement => zone.requirements.push(item),
                        BulletClass::Industry => zone.industries.push(item),
                        BulletClass::Benefit => zone.benefits.push(item),
                    }
                }
                KnowledgeRecord::Zone(zone)
            }
            RecordShape::Guide { category } => {
                let mut guide = Guide::new(title, category).with_body(description);
                for item in items {
                    if item.to_lowercase().contains("document") {
                        guide.documents.push(item);
                    } else if classify_bullet(&item) == BulletClass::Requirement {
                        guide.requirements.push(item);
                    } else {
                        guide.steps.push(GuideStep::new(item, ""));
                    }
                }
                KnowledgeRecord::Guide(guide)
            }
        };
        records.push(ExtractedRecord::new(record, "card_layout", 0.7));
    }

    debug!(records = records.len(), "Card layout strategy finished");
    records
}

/// Fallback strategy: synthesize one best-effort record from the page
/// title, meta description, and leading paragraphs. Explicitly
/// lower-confidence than the structured strategies.
pub fn page_summary(html: &str, shape: &RecordShape) -> Vec<ExtractedRecord> {
    let title = Regex::new(r"(?s)<title[^>]*>(.*?)</title>")
        .unwrap()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| strip_tags(m.as_str()))
        .or_else(|| {
            Regex::new(r"(?s)<h1[^>]*>(.*?)</h1>")
                .unwrap()
                .captures(html)
                .and_then(|c| c.get(1))
                .map(|m| strip_tags(m.as_str()))
        })
        .unwrap_or_default();

    let meta_description = Regex::new(r#"<meta[^>]*name="description"[^>]*content="([^"]*)""#)
        .unwrap()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());

    let leading: Vec<String> = paragraphs(html).into_iter().take(3).collect();
    let description = meta_description.unwrap_or_else(|| leading.join("\n"));

    let record = match shape {
        RecordShape::Entity => {
            KnowledgeRecord::Zone(FreeZone::new(title).with_description(description))
        }
        RecordShape::Guide { category } => {
            KnowledgeRecord::Guide(Guide::new(title, category).with_body(description))
        }
    };

    vec![ExtractedRecord::new(record, "page_summary", 0.3)]
}
