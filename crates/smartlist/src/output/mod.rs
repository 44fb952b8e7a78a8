//! Output formatting utilities for the smartlist CLI.
//!
//! This module provides functions for formatting data as tables or JSON.
//! It is organized into submodules by entity type:
//!
//! - [`expression`] - Parsed expression output (parse command)
//! - [`items`] - Media item output (preview command)
//! - [`rules`] - Rule output (list, show, add, remove, run)
//! - [`helpers`] - Common formatting utilities (truncation, ratings, runtimes)

mod expression;
pub mod helpers;
mod items;
mod rules;

// Expressions
pub use expression::{format_expression_json, format_expression_tree};

// Items
pub use items::{format_preview_json, format_preview_table};

// Rules
pub use rules::{
    format_removed_rule, format_rule_details_json, format_rule_details_table, format_rules_json,
    format_rules_table, format_run_results_json, format_run_results_table, format_saved_rule,
};
