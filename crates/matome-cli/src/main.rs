//! Matome CLI - forum comments to narration script
//!
//! Fetches a forum-aggregator page, extracts its comments, and writes them
//! as a two-column (speaker, line) table for video narration tooling.

use anyhow::Result;
use clap::Parser;
use matome_core::{
    fetch::Fetcher,
    output::{default_output_path, write_script},
    script::to_script_lines,
    sites::extract_comments,
    ExtractConfig, MatomeError, OutputFormat,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "matome")]
#[command(author, version, about = "Extract aggregator comments into a narration script table", long_about = None)]
struct Cli {
    /// URL of the aggregator page
    url: String,

    /// Output file path (default: output/comments_<timestamp>.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: tsv or csv
    #[arg(short, long, default_value = "tsv")]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // warnings always reach the operator; --verbose opens up the rest
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    println!("Fetching: {}", cli.url);
    let fetcher = Fetcher::new()?;
    let page = match fetcher.fetch(&cli.url).await {
        Ok(page) => page,
        Err(e) => {
            eprintln!("Failed to fetch page: {}", e);
            process::exit(1);
        }
    };

    let config = ExtractConfig::default();
    let comments = match extract_comments(&page.html, page.host(), &config) {
        Ok(comments) => comments,
        Err(MatomeError::NoComments) => {
            eprintln!("No comments found.");
            eprintln!("Hint: the site structure may not match the extraction patterns.");
            process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    println!("Extracted {} comments", comments.len());

    let lines = to_script_lines(&comments, config.max_line_len);
    let path = cli
        .output
        .unwrap_or_else(|| default_output_path(cli.format));
    write_script(&path, &lines, cli.format)?;

    println!("Wrote {} script lines to {}", lines.len(), path.display());
    Ok(())
}
