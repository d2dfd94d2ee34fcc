use anyhow::{Context, Result};
use clap::Subcommand;

use crate::cli::output::{Formatter, get_formatter};
use crate::models::{Config, OutputFormat};

const MASK: &str = "********";

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Initialize configuration file")]
    Init {
        #[arg(
            long,
            short = 'g',
            help = "Create global config instead of project config"
        )]
        global: bool,
        #[arg(long, help = "Force overwrite existing config")]
        force: bool,
    },
    #[command(about = "Show effective configuration (API keys masked)")]
    Show,
    #[command(about = "Show configuration file paths")]
    Path {
        #[arg(long, help = "Show all possible config paths")]
        all: bool,
    },
}

pub async fn handle_config(
    cmd: ConfigCommand,
    config: &Config,
    format: OutputFormat,
    _verbose: bool,
) -> Result<()> {
    let formatter = get_formatter(format);

    match cmd {
        ConfigCommand::Init { global, force } => handle_init(global, force, formatter.as_ref()),
        ConfigCommand::Show => handle_show(config, format),
        ConfigCommand::Path { all } => handle_path(all),
    }
}

fn handle_init(global: bool, force: bool, formatter: &dyn Formatter) -> Result<()> {
    let (label, path) = if global {
        let path = Config::global_path()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        ("global", path)
    } else {
        let path = Config::project_path()
            .ok_or_else(|| anyhow::anyhow!("could not determine project directory"))?;
        ("project", path)
    };

    if path.exists() && !force {
        anyhow::bail!(
            "{} config already exists at: {}\nUse --force to overwrite.",
            label,
            path.display()
        );
    }

    Config::default()
        .save_to(&path)
        .with_context(|| format!("failed to create {} config", label))?;

    print!(
        "{}",
        formatter.format_message(&format!("Created {} config at: {}", label, path.display()))
    );

    Ok(())
}

fn handle_show(config: &Config, format: OutputFormat) -> Result<()> {
    let masked = masked(config);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&masked)?);
    } else {
        print!("{}", toml::to_string_pretty(&masked)?);
    }

    Ok(())
}

fn handle_path(show_all: bool) -> Result<()> {
    println!("Configuration paths:");
    println!();

    for (label, path) in [
        ("Project config", Config::project_path()),
        ("Global config", Config::global_path()),
    ] {
        let Some(path) = path else { continue };
        if path.exists() {
            println!("{} (found): {}", label, path.display());
        } else if show_all {
            println!("{} (would be): {}", label, path.display());
        }
    }

    if show_all && let Ok(cwd) = std::env::current_dir() {
        let env_path = cwd.join(".env");
        if env_path.exists() {
            println!(".env file (found): {}", env_path.display());
        } else {
            println!(".env file (would be): {}", env_path.display());
        }
    }

    Ok(())
}

fn masked(config: &Config) -> Config {
    let mask = |key: &Option<String>| key.as_ref().map(|_| MASK.to_string());

    let mut masked = config.clone();
    masked.embedding.api_key = mask(&config.embedding.api_key);
    masked.vector_store.api_key = mask(&config.vector_store.api_key);
    masked.chat.openai_api_key = mask(&config.chat.openai_api_key);
    masked.chat.google_api_key = mask(&config.chat.google_api_key);
    masked
}
