use anyhow::{Context, Result};
use clap::Args;
use std::time::Instant;

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat, SearchRequest, SearchResults};
use crate::services::ProductIndexer;

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(required = true, help = "Search query text")]
    pub query: String,

    #[arg(long, short = 'n', help = "Maximum number of results to return")]
    pub limit: Option<u32>,

    #[arg(long, help = "Minimum similarity score threshold (0.0-1.0)")]
    pub min_score: Option<f32>,
}

pub async fn handle_search(
    args: SearchArgs,
    config: &Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let query = args.query.trim();
    if query.is_empty() {
        anyhow::bail!("search query cannot be empty");
    }

    let formatter = get_formatter(format);
    let start_time = Instant::now();

    let request = SearchRequest::new(query)
        .with_limit(args.limit.unwrap_or(config.search.default_limit))
        .with_min_score(args.min_score.unwrap_or(config.search.default_min_score));

    if verbose {
        eprintln!("Query: \"{}\"", request.query);
        eprintln!("  Limit: {}", request.limit);
        eprintln!("  Min score: {:.3}", request.min_score);
    }

    let indexer = ProductIndexer::from_config(config)
        .await
        .context("failed to connect to vector store")?;

    let hits = indexer.search_request(&request).await.context("search failed")?;

    let duration_ms = start_time.elapsed().as_millis() as u64;
    if verbose {
        eprintln!("  Total: {duration_ms}ms");
        eprintln!();
    }

    let results = SearchResults::new(request.query, hits, duration_ms);
    print!("{}", formatter.format_search_results(&results));

    Ok(())
}
