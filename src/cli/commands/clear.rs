use anyhow::Result;
use clap::Args;

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};
use crate::services::create_backend;

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub force: bool,
}

pub async fn handle_clear(
    args: ClearArgs,
    config: &Config,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let formatter = get_formatter(format);

    if verbose {
        eprintln!(
            "Clearing collection '{}'...",
            config.vector_store.collection
        );
    }

    if !args.force {
        println!(
            "This will delete ALL indexed products in '{}'. Continue? [y/N]",
            config.vector_store.collection
        );
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            print!("{}", formatter.format_message("Cancelled."));
            return Ok(());
        }
    }

    let vector_store = create_backend(config).await?;
    vector_store.clear_collection().await?;

    print!(
        "{}",
        formatter.format_message("All indexed products have been cleared.")
    );

    Ok(())
}
