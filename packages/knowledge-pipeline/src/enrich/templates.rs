//! Per-category document templates for enrichment.
//!
//! A fixed table of canned guide material. Categories without a
//! template get a generic placeholder so the loop can always make
//! progress toward the target counts.

use crate::error::GenerationError;
use crate::types::{Guide, GuideStep};

struct CategoryTemplate {
    category: &'static str,
    title_stem: &'static str,
    body: &'static str,
    requirements: &'static [&'static str],
    documents: &'static [&'static str],
    steps: &'static [(&'static str, &'static str)],
}

const TEMPLATES: &[CategoryTemplate] = &[
    CategoryTemplate {
        category: "business_setup",
        title_stem: "Company formation essentials",
        body: "Forming a company in a free zone starts with choosing a legal \
               structure and a licensed activity, then reserving a trade name \
               with the zone authority. Most zones issue the license within a \
               few working days once the application file is complete.",
        requirements: &[
            "Chosen legal structure and licensed activity",
            "Approved trade name reservation",
            "Registered office or flexi-desk lease within the zone",
        ],
        documents: &[
            "Shareholder passport copies",
            "Completed application form",
            "Business plan summary",
        ],
        steps: &[
            ("Select an activity", "Pick the licensed activity that matches the business model."),
            ("Reserve a trade name", "Submit three name options to the zone authority."),
            ("Submit the application", "File the application with supporting documents."),
            ("Collect the license", "Pay the fees and collect the trade license."),
        ],
    },
    CategoryTemplate {
        category: "visa_information",
        title_stem: "Residence visa overview",
        body: "Free-zone companies sponsor residence visas for shareholders and \
               employees under the zone's establishment card. Quotas depend on \
               the office size and license type.",
        requirements: &[
            "Valid establishment card for the sponsoring company",
            "Medical fitness test for the applicant",
        ],
        documents: &[
            "Passport with at least six months validity",
            "Passport photographs",
            "Entry permit application",
        ],
        steps: &[
            ("Apply for an entry permit", "The company files the permit with the zone."),
            ("Complete medical screening", "Attend the medical center after arrival."),
            ("Submit biometrics", "Complete fingerprinting for the ID card."),
            ("Receive the visa stamp", "The residence visa is issued into the passport."),
        ],
    },
    CategoryTemplate {
        category: "banking_finance",
        title_stem: "Corporate account opening",
        body: "Banks ask free-zone companies for proof of substance and a clear \
               description of expected account activity. Timelines vary from two \
               to six weeks depending on the bank's compliance checks.",
        requirements: &[
            "Active trade license",
            "Shareholder identity verification",
        ],
        documents: &[
            "Trade license copy",
            "Memorandum of association",
            "Six-month business projection",
        ],
        steps: &[
            ("Shortlist banks", "Compare minimum balance and activity requirements."),
            ("Prepare the file", "Collect corporate and shareholder documents."),
            ("Attend the interview", "Signatories meet the relationship manager."),
        ],
    },
    CategoryTemplate {
        category: "legal_compliance",
        title_stem: "Ongoing compliance obligations",
        body: "Free-zone companies must keep their license, lease, and registers \
               current, file any required economic substance notifications, and \
               renew before expiry to avoid penalties.",
        requirements: &[
            "Annual license renewal before expiry",
            "Maintained statutory registers",
        ],
        documents: &["Renewal application", "Audited accounts where required"],
        steps: &[
            ("Track renewal dates", "Diarize license and lease expiry."),
            ("File notifications", "Submit any substance or ownership filings."),
        ],
    },
    CategoryTemplate {
        category: "licensing",
        title_stem: "License types and activities",
        body: "Zones commonly offer trading, service, and industrial licenses. \
               Each license lists the approved activities; operating outside \
               them needs an amendment.",
        requirements: &["Activity list matching actual operations"],
        documents: &["License amendment form"],
        steps: &[
            ("Review the activity list", "Check the license covers current operations."),
            ("Amend if needed", "Apply to add or swap activities."),
        ],
    },
];

/// Render one templated document for a category.
///
/// `sequence` keeps titles unique as the loop generates more than one
/// document per category. Unknown categories get a generic placeholder
/// rather than an error.
pub fn render(category: &str, sequence: usize) -> Guide {
    match TEMPLATES.iter().find(|t| t.category == category) {
        Some(template) => {
            let mut guide = Guide::new(
                format!("{} (part {})", template.title_stem, sequence),
                category,
            )
            .with_body(template.body);
            guide.requirements = template.requirements.iter().map(|s| s.to_string()).collect();
            guide.documents = template.documents.iter().map(|s| s.to_string()).collect();
            guide.steps = template
                .steps
                .iter()
                .map(|(title, description)| GuideStep::new(*title, *description))
                .collect();
            guide
        }
        None => generic_placeholder(category, sequence),
    }
}

fn generic_placeholder(category: &str, sequence: usize) -> Guide {
    let readable = category.replace('_', " ");
    Guide::new(format!("{readable} overview (part {sequence})"), category).with_body(format!(
        "Placeholder guidance for the {readable} category. This entry was \
         generated to fill a knowledge gap and should be replaced with \
         sourced content.",
    ))
}

/// Generates one document per call for the enrichment loop.
///
/// A trait so tests can substitute an always-failing generator and
/// exercise the loop's skip-and-continue path.
pub trait DocumentGenerator: Send + Sync {
    fn generate(&self, category: &str, sequence: usize) -> Result<Guide, GenerationError>;
}

/// The standard template-table generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl DocumentGenerator for TemplateGenerator {
    fn generate(&self, category: &str, sequence: usize) -> Result<Guide, GenerationError> {
        Ok(render(category, sequence))
    }
}
