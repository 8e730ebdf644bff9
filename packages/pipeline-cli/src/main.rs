//! Operational CLI for the knowledge acquisition pipeline.
//!
//! `kpipe run` is the everyday command: acquire the configured sources,
//! audit the result, and enrich to completeness. The other subcommands
//! exist for poking at individual stages.

use anyhow::{bail, Result};
use colored::Colorize;
use knowledge_pipeline::{
    acquire_many, run_enrichment, write_audit_report, Auditor, EnrichmentConfig, EnrichmentStatus,
    FetchConfig, FetchOrchestrator, KnowledgeRepository, MemoryRepository, RecordShape,
    StaticFixtures, TemplateGenerator,
};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const AUDIT_DOMAIN: &str = "business_setup_kb";

/// Source URLs acquired by `run` when none are given on the command line.
const DEFAULT_ENTITY_SOURCES: &[&str] = &[
    "https://www.moec.gov.ae/en/free-zones",
    "https://u.ae/en/information-and-services/business/free-zones",
];

const DEFAULT_GUIDE_SOURCES: &[(&str, &str)] = &[
    (
        "https://u.ae/en/information-and-services/business/setting-up-business/setup-guides",
        "business_setup",
    ),
    (
        "https://u.ae/en/information-and-services/visa-and-emirates-id/visa-guides",
        "visa_information",
    ),
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,knowledge_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    dotenvy::dotenv().ok();
    tracing::info!("Starting knowledge pipeline CLI");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("help");

    match command {
        "run" => cmd_run(&args[1..]).await,
        "fetch" => cmd_fetch(&args[1..]).await,
        "list" => cmd_list().await,
        "cache-status" => cmd_cache_status(&args[1..]).await,
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("{}", "kpipe - free zone knowledge pipeline".bright_cyan().bold());
    println!();
    println!("Usage: kpipe <command> [args]");
    println!();
    println!("Commands:");
    println!("  run [urls...]   Acquire sources (default set if none given), audit, enrich");
    println!("  fetch <url>     Fetch one URL through the fallback tiers and print the source");
    println!("  list            Acquire the zone directory and list the zones");
    println!("  cache-status    Summarize the disk cache");
    println!("  help            Show this message");
    println!();
    println!("Environment:");
    println!("  KNOWLEDGE_OFFLINE_MODE   Skip connectivity-bound tiers when set to 1/true");
    println!("  KNOWLEDGE_CACHE_DIR      Cache directory (default: knowledge_cache)");
}

fn orchestrator() -> FetchOrchestrator<StaticFixtures> {
    FetchOrchestrator::new(FetchConfig::from_env(), StaticFixtures)
}

async fn cmd_run(urls: &[String]) -> Result<()> {
    let orchestrator = orchestrator();
    let repo = MemoryRepository::new();

    println!("{}", "🚀 Acquisition".bright_green().bold());
    let report = if urls.is_empty() {
        let mut merged = acquire_many(
            &orchestrator,
            &repo,
            DEFAULT_ENTITY_SOURCES,
            &RecordShape::Entity,
        )
        .await?;
        for (url, category) in DEFAULT_GUIDE_SOURCES {
            let guide_report =
                acquire_many(&orchestrator, &repo, &[*url], &RecordShape::guide(*category))
                    .await?;
            merged.absorb(guide_report);
        }
        merged
    } else {
        let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        acquire_many(&orchestrator, &repo, &refs, &RecordShape::Entity).await?
    };

    println!(
        "  {} URLs, {} records ({} inserted, {} updated)",
        report.urls_processed, report.records_extracted, report.inserted, report.updated
    );
    for url in &report.failed_urls {
        println!("  {} {}", "✗ unreachable:".red(), url);
    }
    for url in &report.synthetic_sources {
        println!("  {} {}", "⊘ synthetic:".yellow(), url);
    }

    println!();
    println!("{}", "📋 Audit".bright_green().bold());
    let auditor = Auditor::new(AUDIT_DOMAIN);
    let audit = auditor.audit(&repo).await?;
    print_audit(&audit.categories, audit.score);

    if !audit.is_complete {
        println!();
        println!("{}", "🔄 Enrichment".bright_green().bold());
        let enrichment = run_enrichment(
            &repo,
            &auditor,
            &TemplateGenerator,
            &EnrichmentConfig::new().with_reports_dir("reports"),
        )
        .await?;

        let status = match enrichment.status {
            EnrichmentStatus::Complete => "complete".bright_green(),
            EnrichmentStatus::Exhausted => "exhausted".yellow(),
        };
        println!(
            "  {} after {} cycles ({} -> {})",
            status, enrichment.iterations, enrichment.initial_score, enrichment.final_score
        );
        for action in &enrichment.actions {
            println!("    {action}");
        }
    }

    println!();
    let final_audit = auditor.audit(&repo).await?;
    let report_path = write_audit_report(&final_audit, Path::new("reports")).await?;
    println!(
        "{} final score {} (report: {})",
        "✓".bright_green(),
        format!("{}%", final_audit.score).bold(),
        report_path.display()
    );
    Ok(())
}

async fn cmd_fetch(args: &[String]) -> Result<()> {
    let Some(url) = args.first() else {
        bail!("Usage: kpipe fetch <url>");
    };

    let orchestrator = orchestrator();
    match orchestrator.fetch_resource(url).await {
        Some(content) => {
            println!(
                "{} {} bytes from {}",
                "✓".bright_green(),
                content.body.len(),
                content.source.label().bold()
            );
            Ok(())
        }
        None => bail!("No content available for {url}"),
    }
}

/// Acquire the zone directory (live, cached, or synthetic) and print
/// every known zone.
async fn cmd_list() -> Result<()> {
    let orchestrator = orchestrator();
    let repo = MemoryRepository::new();

    acquire_many(
        &orchestrator,
        &repo,
        DEFAULT_ENTITY_SOURCES,
        &RecordShape::Entity,
    )
    .await?;

    let mut zones = repo.list_zones().await?;
    zones.sort_by(|a, b| a.name.cmp(&b.name));

    println!("{}", format!("{} free zones", zones.len()).bright_cyan().bold());
    for zone in zones {
        let location = if zone.location.is_empty() {
            String::new()
        } else {
            format!(" ({})", zone.location)
        };
        println!("  • {}{}", zone.name.bold(), location.dimmed());
        if !zone.description.is_empty() {
            println!("    {}", zone.description.dimmed());
        }
    }
    Ok(())
}

async fn cmd_cache_status(args: &[String]) -> Result<()> {
    let orchestrator = orchestrator();
    let status = orchestrator.cache().status().await?;

    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Cache".bright_cyan().bold());
    println!("  entries:     {}", status.entries);
    println!("  total bytes: {}", status.total_bytes);
    match status.oldest_entry {
        Some(oldest) => println!("  oldest:      {oldest}"),
        None => println!("  oldest:      (empty)"),
    }
    Ok(())
}

fn print_audit(categories: &[knowledge_pipeline::CategoryStatus], score: u8) {
    for status in categories {
        let mark = if status.is_deficient() {
            "✗".red()
        } else {
            "✓".bright_green()
        };
        println!(
            "  {} {:<18} {}/{}",
            mark, status.category, status.count, status.target
        );
    }
    println!("  score: {}%", score);
}
