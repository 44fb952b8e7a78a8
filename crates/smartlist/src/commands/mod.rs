//! Command implementations for the smartlist CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod parse;
pub mod preview;
pub mod rules;

use std::io::{self, IsTerminal};

use dialoguer::Confirm;

use crate::cli::Cli;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Expression parsing error.
    #[error("expression error: {0}")]
    Format(#[from] smartlist_core::expression::FormatError),

    /// Rule store error.
    #[error("rule store error: {0}")]
    Store(#[from] smartlist_core::StoreError),

    /// Catalog read error.
    #[error("catalog error: {0}")]
    Catalog(#[from] smartlist_core::CatalogError),

    /// Rule processing error.
    #[error("rule error: {0}")]
    Rule(#[from] smartlist_core::RuleError),

    /// No saved rule has the requested name.
    #[error("rule not found: {0}")]
    RuleNotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    ///
    /// Colors are disabled by `--no-color`, by `output.color = false` in the
    /// config file, or by a non-empty `NO_COLOR` environment variable.
    pub fn from_cli(cli: &Cli, config: &config::Config) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && config.output.color != Some(false) && !no_color_env,
            quiet: cli.quiet,
            verbose: cli.verbose,
        }
    }
}

/// Asks the user to confirm a destructive action.
///
/// Returns `Ok(true)` immediately when `force` is set. Without a terminal the
/// action is refused, since there is nobody to answer the prompt.
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }

    if !io::stdin().is_terminal() {
        return Err(CommandError::Config(
            "Operation cancelled. Use --force to confirm.".to_string(),
        ));
    }

    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CommandError::Io(io::Error::other(e.to_string())))
}
