//! Project intel CLI
//!
//! Drives crawler discovery in one process: extract from text, inspect a
//! page, scan sources into staging, stage spreadsheet rows and import the
//! selection into the project registry.

mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use crate::commands::{ScanArgs, StagingArgs};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "intel")]
#[command(about = "Crawler discovery and staging for KSA hospitality projects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the extractor over a piece of text
    Extract {
        text: String,
        /// Use this as the project name
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Fetch a page and show what the extractor finds in it
    Inspect { url: Url },

    /// Run discovery jobs and stage the candidates they produce
    Scan(ScanArgs),

    /// Stage candidates from a spreadsheet export
    ImportCsv {
        path: PathBuf,
        #[command(flatten)]
        staging: StagingArgs,
    },

    /// List registry projects
    Projects {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,project_discovery=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Extract { text, title, json } => {
            commands::extract(&config, &text, title.as_deref(), json)
        }
        Commands::Inspect { url } => commands::inspect(&config, &url).await,
        Commands::Scan(args) => commands::scan(&config, args).await,
        Commands::ImportCsv { path, staging } => commands::import_csv(&config, &path, staging),
        Commands::Projects { json } => commands::projects(&config, json),
    }
}
