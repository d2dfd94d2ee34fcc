use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};
use crate::services::{AgentQuery, ProductIndexer, ProductSearchAgent, create_chat_model};

#[derive(Debug, Args)]
pub struct AskArgs {
    #[arg(required = true, help = "Question about the product catalog")]
    pub query: String,

    #[arg(long, short = 'n', help = "Maximum number of products to consider")]
    pub max_results: Option<u32>,

    #[arg(long, help = "Maximum B2B price in EUR")]
    pub price_max: Option<f64>,

    #[arg(long, short = 'c', help = "Restrict to a product category")]
    pub category: Option<String>,
}

pub async fn handle_ask(
    args: AskArgs,
    config: &Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let formatter = get_formatter(format);

    let model = create_chat_model(&config.chat).context("chat model is not configured")?;
    let indexer = ProductIndexer::from_config(config)
        .await
        .context("failed to connect to vector store")?;
    let agent = ProductSearchAgent::new(indexer, model)
        .with_min_score(config.search.default_min_score);

    let options = AgentQuery {
        max_results: args.max_results.unwrap_or(config.search.default_limit),
        price_max: args.price_max,
        category: args.category,
    };

    if verbose {
        eprintln!(
            "Query: \"{}\"",
            ProductSearchAgent::enhance_query(&args.query, &options)
        );
        eprintln!("  Provider: {}", config.chat.provider);
    }

    let answer = agent.ask(&args.query, &options).await?;
    print!("{}", formatter.format_answer(&answer));

    Ok(())
}
