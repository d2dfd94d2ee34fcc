//! CLI module for the product catalog toolkit.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::error::ConfigError;
use crate::models::{Config, OutputFormat};

/// Product catalog indexing and natural-language search.
#[derive(Debug, Parser)]
#[command(name = "cypher-rag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(
        long,
        short = 'f',
        global = true,
        help = "Output format: text, json, or markdown"
    )]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check vector store and model configuration
    Status,

    /// Index products from a JSON/JSONL export
    Index(commands::IndexArgs),

    /// Search indexed products
    Search(commands::SearchArgs),

    /// Ask the product search agent
    Ask(commands::AskArgs),

    /// Remove all indexed products
    Clear(commands::ClearArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}

impl Commands {
    /// `config` subcommands must work on a broken or invalid file so it can
    /// be inspected and replaced.
    pub fn needs_valid_config(&self) -> bool {
        !matches!(self, Commands::Config(_))
    }
}

/// Turn the result of [`Config::load`] into the config `command`
/// runs with: validated for commands that reach the store or a model,
/// defaults for `config` subcommands when the files can't be read.
pub fn effective_config(
    command: &Commands,
    loaded: Result<Config, ConfigError>,
) -> Result<Config, ConfigError> {
    match loaded {
        Ok(config) => {
            if command.needs_valid_config() {
                config.validate()?;
            }
            Ok(config)
        }
        Err(e) if !command.needs_valid_config() => {
            warn!(error = %e, "configuration could not be loaded, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::ConfigCommand;

    fn invalid_config() -> Config {
        let mut config = Config::default();
        config.indexing.batch_size = 0;
        config
    }

    #[test]
    fn test_config_commands_skip_validation() {
        let command = Commands::Config(ConfigCommand::Show);
        let config = effective_config(&command, Ok(invalid_config())).unwrap();
        assert_eq!(config.indexing.batch_size, 0);
    }

    #[test]
    fn test_config_commands_fall_back_to_defaults_on_load_error() {
        let command = Commands::Config(ConfigCommand::Path { all: true });
        let loaded = Err(ConfigError::ValidationError("unknown vector driver".to_string()));
        let config = effective_config(&command, loaded).unwrap();
        assert_eq!(config.indexing.batch_size, 100);
    }

    #[test]
    fn test_other_commands_require_a_valid_config() {
        assert!(matches!(
            effective_config(&Commands::Status, Ok(invalid_config())),
            Err(ConfigError::ValidationError(_))
        ));

        let loaded = Err(ConfigError::PathError("unreadable".to_string()));
        assert!(effective_config(&Commands::Status, loaded).is_err());
    }
}
