//! Parse command implementation.
//!
//! Parses a single rule expression and prints the resulting filter tree.
//! Needs no catalog; useful for checking rule text before saving it.

use smartlist_core::expression::ExpressionParser;

use super::{CommandContext, Result};
use crate::output::{format_expression_json, format_expression_tree};

/// Options for the parse command.
#[derive(Debug)]
pub struct ParseOptions {
    /// The expression text.
    pub expression: String,
    /// Print an indented outline instead of canonical rule text.
    pub tree: bool,
}

/// Executes the parse command.
///
/// # Errors
///
/// Returns `CommandError::Format` if the expression is malformed.
pub fn execute(ctx: &CommandContext, opts: &ParseOptions) -> Result<()> {
    let parsed = ExpressionParser::parse(&opts.expression)?;

    if ctx.json_output {
        println!("{}", format_expression_json(&parsed)?);
    } else if !ctx.quiet {
        if opts.tree {
            print!("{}", format_expression_tree(&parsed, ctx.use_colors));
        } else {
            println!("{parsed}");
        }
    }

    Ok(())
}
