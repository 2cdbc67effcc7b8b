use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;
use project_discovery::{
    html, read_candidates_csv, write_candidates_csv, CandidateId, CandidateProject,
    DiscoveryJob, DiscoverySession, Extractor, JobOutcome, MemoryRegistry, PageFetcher,
    ProjectRegistry, ScanMode,
};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::config::Config;
use crate::render;

/// Options shared by every command that stages candidates.
#[derive(Args, Debug, Clone)]
pub struct StagingArgs {
    /// Import staged candidates that need no review
    #[arg(long)]
    pub import: bool,

    /// With --import, also import candidates flagged for review
    #[arg(long, requires = "import")]
    pub include_review: bool,

    /// Write the staged candidates to a CSV file before importing
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write the registry as JSON after importing
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Article or tender page to fetch (repeatable)
    #[arg(long = "url")]
    pub urls: Vec<Url>,

    /// Pasted text to extract from (repeatable)
    #[arg(long = "text")]
    pub texts: Vec<String>,

    /// fresh, backlog or combined
    #[arg(long, default_value_t = ScanMode::Fresh)]
    pub mode: ScanMode,

    #[command(flatten)]
    pub staging: StagingArgs,
}

fn open_session(config: &Config) -> Result<DiscoverySession<MemoryRegistry>> {
    let registry = Arc::new(config.registry()?);
    Ok(DiscoverySession::new(registry)
        .with_config(config.discovery_config())
        .with_actor(config.actor.clone()))
}

// ============================================================================
// Commands
// ============================================================================

pub fn extract(config: &Config, text: &str, title: Option<&str>, json: bool) -> Result<()> {
    let extractor = Extractor::new(config.discovery_config().extractor);
    let result = extractor.extract(text, title);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render::print_extraction(&result);
    }
    Ok(())
}

pub async fn inspect(config: &Config, url: &Url) -> Result<()> {
    let fetcher = config.fetcher()?;
    let page = fetcher
        .fetch_page(url)
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    let content = html::page_text(&page.body);
    let published = html::published_date(&page.body);

    println!("{} {}", "URL      ".bold(), page.url);
    println!("{} {}", "Channel  ".bold(), page.channel);
    println!("{} {}", "SHA-256  ".bold(), &page.content_hash[..16]);
    println!(
        "{} {}",
        "Title    ".bold(),
        content.title.as_deref().unwrap_or("-")
    );
    println!(
        "{} {}",
        "Published".bold(),
        published
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    println!("{} {} chars", "Text     ".bold(), content.text.chars().count());
    println!();

    let extractor = Extractor::new(config.discovery_config().extractor);
    render::print_extraction(&extractor.extract(&content.text, content.title.as_deref()));
    Ok(())
}

pub async fn scan(config: &Config, args: ScanArgs) -> Result<()> {
    if args.urls.is_empty() && args.texts.is_empty() {
        bail!("Nothing to scan: pass --url or --text");
    }

    let jobs: Vec<DiscoveryJob> = args
        .urls
        .into_iter()
        .map(DiscoveryJob::url)
        .chain(args.texts.into_iter().map(DiscoveryJob::text))
        .map(|job| job.with_mode(args.mode))
        .collect();

    let mut session = open_session(config)?;
    info!(jobs = jobs.len(), mode = %args.mode, "starting scan");

    let outcomes = session
        .run_jobs(Arc::new(config.fetcher()?), &jobs)
        .await
        .context("Failed to stage scan results")?;

    for outcome in &outcomes {
        if let JobOutcome::Failed { job_id, error } = outcome {
            eprintln!("{} job {}: {}", "failed".bright_red().bold(), job_id, error);
        }
    }

    finish_staging(&mut session, &args.staging)
}

pub fn import_csv(config: &Config, path: &Path, staging: StagingArgs) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let parsed = read_candidates_csv(file, &source, Utc::now())
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if !parsed.skipped_rows.is_empty() {
        eprintln!(
            "{} rows without a project name: {:?}",
            "skipped".yellow().bold(),
            parsed.skipped_rows
        );
    }

    let mut session = open_session(config)?;
    session.stage(parsed.candidates)?;
    finish_staging(&mut session, &staging)
}

pub fn projects(config: &Config, json: bool) -> Result<()> {
    let registry = config.registry()?;
    let projects = registry.list_projects()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else {
        render::print_projects(&projects);
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn finish_staging(
    session: &mut DiscoverySession<MemoryRegistry>,
    args: &StagingArgs,
) -> Result<()> {
    render::print_candidates(session.staging().items());

    if let Some(path) = &args.export {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_candidates_csv(session.staging().items(), file)?;
        println!("Exported {} candidates to {}", session.staging().len(), path.display());
    }

    if !args.import {
        return Ok(());
    }

    let selected = select_for_import(session.staging().items(), args.include_review);
    if selected.is_empty() {
        println!("{}", "Nothing selected for import".dimmed());
        return Ok(());
    }

    println!();
    let report = session.import(&selected)?;
    render::print_report(&report);

    if let Some(path) = &args.save {
        save_registry(session.registry(), path)?;
        println!("Saved registry to {}", path.display());
    }
    Ok(())
}

fn select_for_import(candidates: &[CandidateProject], include_review: bool) -> HashSet<CandidateId> {
    candidates
        .iter()
        .filter(|c| include_review || !c.needs_review())
        .map(|c| c.id)
        .collect()
}

fn save_registry(registry: &MemoryRegistry, path: &Path) -> Result<()> {
    let records = registry.list_projects()?;
    let json = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
