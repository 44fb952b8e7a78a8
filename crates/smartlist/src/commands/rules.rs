//! Rules command implementation.
//!
//! Lists, edits and runs saved rules. Rules live in a JSON file managed by
//! [`RuleStore`]; running a rule reads the catalog and writes a playlist file.

use std::path::PathBuf;

use smartlist_core::expression::{ExpressionParser, FormatError, ParsedExpression};
use smartlist_core::{DirectoryPlaylistSink, JsonCatalog, Rule, RuleProcessor, RuleStore};
use tracing::debug;

use super::config::Settings;
use super::{confirm, CommandContext, CommandError, Result};
use crate::output::{
    format_removed_rule, format_rule_details_json, format_rule_details_table,
    format_rules_json, format_rules_table, format_run_results_json, format_run_results_table,
    format_saved_rule,
};

// ============================================================================
// Rules List Command
// ============================================================================

/// Executes the rules list command.
///
/// # Errors
///
/// Returns an error if the rule file exists but cannot be read.
pub fn execute_list(ctx: &CommandContext, store: &RuleStore) -> Result<()> {
    let rules = store.load_or_default()?;

    if ctx.json_output {
        println!("{}", format_rules_json(&rules.rules)?);
    } else if !ctx.quiet {
        print!("{}", format_rules_table(&rules.rules, ctx.use_colors));
    }

    Ok(())
}

// ============================================================================
// Rules Show Command
// ============================================================================

/// How one expression of a rule parses.
#[derive(Debug)]
pub struct ExpressionCheck {
    /// The expression text as stored.
    pub expression: String,
    /// The parse result.
    pub result: std::result::Result<ParsedExpression, FormatError>,
}

/// Result of looking up a rule for display.
#[derive(Debug)]
pub struct RuleShowResult {
    /// The stored rule.
    pub rule: Rule,
    /// One check per expression, in rule order.
    pub checks: Vec<ExpressionCheck>,
}

/// Parses every expression of `rule` without failing on the bad ones.
pub fn check_expressions(rule: &Rule) -> Vec<ExpressionCheck> {
    rule.expressions
        .iter()
        .map(|expression| ExpressionCheck {
            expression: expression.clone(),
            result: ExpressionParser::parse(expression),
        })
        .collect()
}

/// Executes the rules show command.
///
/// # Errors
///
/// Returns `CommandError::RuleNotFound` if no rule has the given name.
pub fn execute_show(ctx: &CommandContext, store: &RuleStore, name: &str) -> Result<()> {
    let rules = store.load_or_default()?;
    let rule = rules
        .get(name)
        .cloned()
        .ok_or_else(|| CommandError::RuleNotFound(name.to_string()))?;

    let result = RuleShowResult {
        checks: check_expressions(&rule),
        rule,
    };

    if ctx.json_output {
        println!("{}", format_rule_details_json(&result)?);
    } else if !ctx.quiet {
        print!("{}", format_rule_details_table(&result, ctx.use_colors));
    }

    Ok(())
}

// ============================================================================
// Rules Add Command
// ============================================================================

/// Options for the rules add command.
#[derive(Debug)]
pub struct RulesAddOptions {
    /// Rule name.
    pub name: String,
    /// Rule expressions.
    pub expressions: Vec<String>,
    /// Owner.
    pub user: Option<String>,
    /// Save disabled.
    pub disabled: bool,
}

/// Result of saving a rule.
#[derive(Debug)]
pub struct RuleSaveResult {
    /// The saved rule.
    pub rule: Rule,
    /// Whether an existing rule was replaced.
    pub replaced: bool,
    /// The rule file.
    pub path: PathBuf,
}

/// Executes the rules add command.
///
/// Every expression must parse; the rule is not saved otherwise.
///
/// # Errors
///
/// Returns `CommandError::Format` for the first malformed expression, or a
/// store error if the rule file cannot be read or written.
pub fn execute_add(ctx: &CommandContext, store: &RuleStore, opts: &RulesAddOptions) -> Result<()> {
    for expression in &opts.expressions {
        ExpressionParser::parse(expression)?;
    }

    let rule = Rule {
        name: opts.name.clone(),
        expressions: opts.expressions.clone(),
        user: opts.user.clone(),
        enabled: !opts.disabled,
    };

    let mut rules = store.load_or_default()?;
    let replaced = rules.upsert(rule.clone()).is_some();
    store.save(&rules)?;
    debug!(rule = %rule.name, replaced, "rule saved");

    let result = RuleSaveResult {
        rule,
        replaced,
        path: store.path().clone(),
    };

    if ctx.json_output {
        println!("{}", format_saved_rule(&result)?);
    } else if !ctx.quiet {
        let verb = if result.replaced { "Updated" } else { "Added" };
        println!(
            "{verb} rule '{}' ({} expression{})",
            result.rule.name,
            result.rule.expressions.len(),
            if result.rule.expressions.len() == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

// ============================================================================
// Rules Remove Command
// ============================================================================

/// Executes the rules remove command.
///
/// # Errors
///
/// Returns `CommandError::RuleNotFound` if no rule has the given name, or
/// `CommandError::Config` if confirmation is required but impossible.
pub fn execute_remove(
    ctx: &CommandContext,
    store: &RuleStore,
    name: &str,
    force: bool,
) -> Result<()> {
    let mut rules = store.load_or_default()?;
    let Some(rule) = rules.get(name) else {
        return Err(CommandError::RuleNotFound(name.to_string()));
    };
    let rule_name = rule.name.clone();

    if !confirm(&format!("Remove rule '{rule_name}'?"), force || ctx.quiet)? {
        if !ctx.quiet {
            eprintln!("Aborted.");
        }
        return Ok(());
    }

    rules.remove(&rule_name);
    store.save(&rules)?;

    if ctx.json_output {
        println!("{}", format_removed_rule(&rule_name)?);
    } else if !ctx.quiet {
        println!("Removed rule '{rule_name}'");
    }

    Ok(())
}

// ============================================================================
// Rules Run Command
// ============================================================================

/// Executes the rules run command.
///
/// Runs the named rule, or every enabled rule when `name` is `None`. A rule
/// that fails does not stop the others; the command fails afterwards if any
/// rule failed.
///
/// # Errors
///
/// Returns `CommandError::RuleNotFound` for an unknown name, a configuration
/// error if no catalog is set, and the first `CommandError::Rule` if any rule
/// could not complete.
pub async fn execute_run(
    ctx: &CommandContext,
    settings: &Settings,
    name: Option<&str>,
) -> Result<()> {
    let rules = settings.rule_store().load_or_default_async().await?;
    let selected: Vec<Rule> = match name {
        Some(name) => {
            let rule = rules
                .get(name)
                .cloned()
                .ok_or_else(|| CommandError::RuleNotFound(name.to_string()))?;
            // An explicitly named rule runs even when disabled.
            vec![Rule {
                enabled: true,
                ..rule
            }]
        }
        None => rules.rules.clone(),
    };

    let processor = RuleProcessor::new(
        JsonCatalog::new(settings.catalog()?),
        DirectoryPlaylistSink::new(&settings.playlists_dir),
    );
    if ctx.verbose {
        eprintln!(
            "Running {} rule(s) against {}",
            selected.iter().filter(|r| r.enabled).count(),
            processor.source().path().display()
        );
    }

    let results = processor.run_all(&selected).await;

    if ctx.json_output {
        println!("{}", format_run_results_json(&results)?);
    } else if !ctx.quiet {
        print!("{}", format_run_results_table(&results, ctx.use_colors));
    }

    match results.into_iter().find_map(|(_, result)| result.err()) {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
