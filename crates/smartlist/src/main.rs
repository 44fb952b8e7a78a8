use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::{load_config, Settings};
use commands::{CommandContext, CommandError};
use dispatch::{ConfiguredCommand, ConfiguredDispatch, LocalCommand, LocalDispatch};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows `--verbose` /
/// `--quiet`.
fn init_tracing(cli: &Cli) {
    let default_level = default_log_level(cli);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();
}

fn default_log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    }
}

async fn run(cli: &Cli) -> commands::Result<()> {
    let config = load_config();

    // Local commands still work with a broken config file, so it can be fixed.
    if let Some(dispatch) = LocalDispatch::try_from_cli(cli) {
        let ctx = CommandContext::from_cli(cli, &config.unwrap_or_default());
        return dispatch.execute(&ctx);
    }

    let config = config?;
    let ctx = CommandContext::from_cli(cli, &config);
    let settings = Settings::resolve(cli, &config)?;
    if let Some(dispatch) = ConfiguredDispatch::from_cli(cli) {
        return dispatch.execute(&ctx, &settings).await;
    }

    Ok(())
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Format(_) => "EXPRESSION_ERROR",
        CommandError::Store(_) => "STORE_ERROR",
        CommandError::Catalog(_) => "CATALOG_ERROR",
        CommandError::Rule(_) => "RULE_ERROR",
        CommandError::RuleNotFound(_) => "NOT_FOUND",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    match e {
        CommandError::Format(_) => ExitCode::from(1),
        CommandError::RuleNotFound(_) => ExitCode::from(1),
        CommandError::Json(_) => ExitCode::from(1),
        CommandError::Rule(_) => ExitCode::from(2),
        CommandError::Io(_) => ExitCode::from(3),
        CommandError::Catalog(_) => ExitCode::from(4),
        CommandError::Config(_) => ExitCode::from(5),
        CommandError::Store(_) => ExitCode::from(5),
    }
}
