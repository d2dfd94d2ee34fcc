//! Index command implementation.

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::cli::output::get_formatter;
use crate::error::ImportError;
use crate::models::{Config, OutputFormat, ProductRecord};
use crate::services::ProductIndexer;

/// Arguments for the index command.
#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Path to a JSON array or JSONL product export (use - for stdin)
    #[arg()]
    pub file: Option<PathBuf>,

    /// Products per batch (defaults to indexing.batch_size)
    #[arg(long, short = 'b')]
    pub batch_size: Option<usize>,

    /// Seconds allowed for each product write (defaults to indexing.item_timeout_secs)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub item_timeout: Option<u64>,

    /// Only validate the export without indexing
    #[arg(long)]
    pub validate_only: bool,
}

pub async fn handle_index(
    args: IndexArgs,
    config: &Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let formatter = get_formatter(format);

    let input = read_input(args.file.as_deref())?;
    let products = parse_products(&input)?;

    if products.is_empty() {
        print!("{}", formatter.format_message("No products found in input."));
        return Ok(());
    }

    if verbose || args.validate_only {
        eprintln!("Found {} products", products.len());
    }

    if args.validate_only {
        print!(
            "{}",
            formatter.format_message(&format!(
                "Validation successful: {} products ready for indexing",
                products.len()
            ))
        );
        return Ok(());
    }

    let batch_size = args
        .batch_size
        .unwrap_or(config.indexing.batch_size as usize);

    let indexer = ProductIndexer::from_config(config)
        .await
        .context("failed to connect to vector store")?
        .with_timeout_secs(args.item_timeout);

    let pb = ProgressBar::new(products.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let report = indexer
        .index_products_with_progress(&products, batch_size, |n| pb.inc(n as u64))
        .await?;

    pb.finish_and_clear();
    print!("{}", formatter.format_index_report(&report));

    Ok(())
}

/// Read input from file or stdin.
fn read_input(file: Option<&Path>) -> Result<String, ImportError> {
    match file {
        Some(path) if path.to_string_lossy() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// Parse products from a JSON array or JSONL.
pub fn parse_products(input: &str) -> Result<Vec<ProductRecord>, ImportError> {
    let input = input.trim();

    if input.is_empty() {
        return Ok(Vec::new());
    }

    let products: Vec<ProductRecord> = if input.starts_with('[') {
        serde_json::from_str(input).map_err(|source| ImportError::JsonParseError {
            line: source.line(),
            source,
        })?
    } else {
        let mut products = Vec::new();
        for (i, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let product = serde_json::from_str(line)
                .map_err(|source| ImportError::JsonParseError { line: i + 1, source })?;
            products.push(product);
        }
        products
    };

    if let Some(bad) = products
        .iter()
        .position(|p| p.sku.trim().is_empty() || p.id.trim().is_empty())
    {
        return Err(ImportError::ValidationError(format!(
            "product #{} has an empty id or sku",
            bad + 1
        )));
    }

    Ok(products)
}
