//! Preview command implementation.
//!
//! Evaluates one or more expressions against the catalog the same way a
//! rule would, without writing a playlist.

use smartlist_core::{select_for_rule, JsonCatalog, Rule};
use tracing::debug;

use super::config::Settings;
use super::{CommandContext, Result};
use crate::output::{format_preview_json, format_preview_table};

/// Options for the preview command.
#[derive(Debug)]
pub struct PreviewOptions {
    /// Expressions to evaluate.
    pub expressions: Vec<String>,
    /// User whose watch state applies (default: from config).
    pub user: Option<String>,
}

/// Executes the preview command.
///
/// Malformed expressions are logged and skipped, as in a rule run.
///
/// # Errors
///
/// Returns a configuration error if no catalog is set, a catalog error if it
/// cannot be read, and the first `CommandError::Format` if every expression
/// is malformed.
pub async fn execute(ctx: &CommandContext, settings: &Settings, opts: &PreviewOptions) -> Result<()> {
    let catalog = JsonCatalog::new(settings.catalog()?);
    let user = opts.user.as_deref().or(settings.user.as_deref());

    let records = catalog.load().await?.items_for(user);
    debug!(records = records.len(), user = ?user, "catalog loaded");

    let rule = Rule::new("preview", opts.expressions.clone());
    let mut selection = select_for_rule(&rule, &records);

    if !selection.failures.is_empty() && selection.failures.len() == opts.expressions.len() {
        return Err(selection.failures.remove(0).error.into());
    }

    // Skipped expressions are already logged as warnings by the selection.
    if ctx.json_output {
        println!("{}", format_preview_json(&selection.items, &selection.failures)?);
    } else if !ctx.quiet {
        print!("{}", format_preview_table(&selection.items, ctx.use_colors));
    }

    Ok(())
}
