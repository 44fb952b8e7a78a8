//! Rule output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use smartlist_core::{Rule, RuleError, RuleOutcome};

use crate::commands::rules::{RuleSaveResult, RuleShowResult};

use super::helpers::{
    format_enabled, format_header, format_label, paint_enabled, truncate_id, truncate_str,
};

/// JSON output structure for rules list command.
#[derive(Serialize)]
pub struct RulesListOutput<'a> {
    pub rules: &'a [Rule],
}

/// Formats rules as JSON.
pub fn format_rules_json(rules: &[Rule]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&RulesListOutput { rules })
}

/// Formats rules as a table.
pub fn format_rules_table(rules: &[Rule], use_colors: bool) -> String {
    if rules.is_empty() {
        return "No rules found.\n".to_string();
    }

    let mut output = format_header(
        &format!("{:<25} {:<8} {:<12} {}", "Name", "Status", "User", "Expressions"),
        use_colors,
    );

    for rule in rules {
        // Pad before coloring so the columns stay aligned.
        let status = format!("{:<8}", format_enabled(rule.enabled, false));
        let status = if use_colors {
            paint_enabled(&status, rule.enabled)
        } else {
            status
        };

        output.push_str(&format!(
            "{:<25} {} {:<12} {}\n",
            truncate_str(&rule.name, 25),
            status,
            truncate_str(rule.user.as_deref().unwrap_or("-"), 12),
            rule.expressions.len(),
        ));
    }

    output
}

/// JSON output structure for one expression in rule details.
#[derive(Serialize)]
pub struct ExpressionDetailsOutput<'a> {
    pub expression: &'a str,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// JSON output structure for rule details (rules show command).
#[derive(Serialize)]
pub struct RuleDetailsOutput<'a> {
    pub name: &'a str,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<&'a str>,
    pub expressions: Vec<ExpressionDetailsOutput<'a>>,
}

/// Formats rule details as JSON (rules show command).
pub fn format_rule_details_json(result: &RuleShowResult) -> Result<String, serde_json::Error> {
    let output = RuleDetailsOutput {
        name: &result.rule.name,
        enabled: result.rule.enabled,
        user: result.rule.user.as_deref(),
        expressions: result
            .checks
            .iter()
            .map(|check| ExpressionDetailsOutput {
                expression: &check.expression,
                valid: check.result.is_ok(),
                canonical: check.result.as_ref().ok().map(ToString::to_string),
                error: check.result.as_ref().err().map(ToString::to_string),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats rule details as a human-readable block (rules show command).
pub fn format_rule_details_table(result: &RuleShowResult, use_colors: bool) -> String {
    let rule = &result.rule;
    let mut output = String::new();

    output.push_str(&format!(
        "{} {}\n",
        format_label("Rule:", use_colors),
        rule.name
    ));
    output.push_str(&format!(
        "{} {}\n",
        format_label("Status:", use_colors),
        format_enabled(rule.enabled, use_colors)
    ));
    if let Some(user) = &rule.user {
        output.push_str(&format!("{} {}\n", format_label("User:", use_colors), user));
    }

    output.push_str(&format!("\n{}\n", format_label("Expressions:", use_colors)));
    for (index, check) in result.checks.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", index + 1, check.expression));
        match &check.result {
            Ok(parsed) => {
                let canonical = parsed.to_string();
                if canonical != check.expression.trim() {
                    output.push_str(&format!("     = {canonical}\n"));
                }
            }
            Err(error) => {
                let line = format!("     ! {error}");
                if use_colors {
                    output.push_str(&format!("{}\n", line.red()));
                } else {
                    output.push_str(&line);
                    output.push('\n');
                }
            }
        }
    }

    output
}

/// JSON output structure for a saved rule.
#[derive(Serialize)]
pub struct SavedRuleOutput<'a> {
    pub status: &'static str,
    pub rule: &'a Rule,
    pub path: String,
}

/// Formats a saved rule as JSON.
pub fn format_saved_rule(result: &RuleSaveResult) -> Result<String, serde_json::Error> {
    let output = SavedRuleOutput {
        status: if result.replaced { "updated" } else { "created" },
        rule: &result.rule,
        path: result.path.display().to_string(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats a removed rule as JSON.
pub fn format_removed_rule(name: &str) -> Result<String, serde_json::Error> {
    let output = serde_json::json!({
        "status": "removed",
        "name": name,
    });

    serde_json::to_string_pretty(&output)
}

/// JSON output structure for one rule in a run.
#[derive(Serialize)]
pub struct RunResultOutput<'a> {
    pub rule: &'a str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<&'a str>,
    pub item_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_ids: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<super::items::FailureOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type RunResult = (String, Result<RuleOutcome, RuleError>);

/// Formats rule run results as JSON.
pub fn format_run_results_json(results: &[RunResult]) -> Result<String, serde_json::Error> {
    let output: Vec<RunResultOutput> = results
        .iter()
        .map(|(rule, result)| match result {
            Ok(outcome) => RunResultOutput {
                rule,
                success: true,
                playlist_id: outcome.playlist_id.as_deref(),
                item_count: outcome.item_ids.len(),
                item_ids: outcome.item_ids.iter().map(String::as_str).collect(),
                skipped: outcome.failures.iter().map(Into::into).collect(),
                error: None,
            },
            Err(error) => RunResultOutput {
                rule,
                success: false,
                playlist_id: None,
                item_count: 0,
                item_ids: Vec::new(),
                skipped: Vec::new(),
                error: Some(error.to_string()),
            },
        })
        .collect();

    serde_json::to_string_pretty(&serde_json::json!({ "results": output }))
}

/// Formats rule run results as human-readable lines.
pub fn format_run_results_table(results: &[RunResult], use_colors: bool) -> String {
    if results.is_empty() {
        return "No enabled rules to run.\n".to_string();
    }

    let mut output = String::new();
    for (rule, result) in results {
        let line = match result {
            Ok(RuleOutcome {
                playlist_id: Some(id),
                item_ids,
                ..
            }) => format!(
                "✓ {rule}: playlist {} ({} items)",
                truncate_id(id),
                item_ids.len()
            ),
            Ok(RuleOutcome {
                playlist_id: None, ..
            }) => format!("- {rule}: no items matched, no playlist created"),
            Err(error) => format!("✗ {rule}: {error}"),
        };

        let line = match (use_colors, result) {
            (true, Ok(outcome)) if outcome.playlist_id.is_some() => line.green().to_string(),
            (true, Ok(_)) => line.dimmed().to_string(),
            (true, Err(_)) => line.red().to_string(),
            (false, _) => line,
        };
        output.push_str(&line);
        output.push('\n');

        if let Ok(outcome) = result {
            for failure in &outcome.failures {
                let note = format!("    skipped {}: {}", failure.expression, failure.error);
                if use_colors {
                    output.push_str(&format!("{}\n", note.yellow()));
                } else {
                    output.push_str(&note);
                    output.push('\n');
                }
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::rules::check_expressions;
    use smartlist_core::expression::FormatError;
    use smartlist_core::ExpressionFailure;

    fn rule(name: &str, expressions: &[&str]) -> Rule {
        Rule::new(name, expressions.iter().map(|e| e.to_string()).collect())
    }

    #[test]
    fn test_rules_table_empty() {
        assert_eq!(format_rules_table(&[], false), "No rules found.\n");
    }

    #[test]
    fn test_rules_table_rows() {
        let mut disabled = rule("Old", &["{genre:Drama | none | 1}"]);
        disabled.enabled = false;
        disabled.user = Some("alice".to_string());
        let rules = vec![rule("Weekend", &["{a:b | none | 1}", "{c:d | none | 1}"]), disabled];

        let table = format_rules_table(&rules, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Weekend"));
        assert!(lines[1].contains("enabled"));
        assert!(lines[1].ends_with('2'));
        assert!(lines[2].contains("disabled"));
        assert!(lines[2].contains("alice"));
    }

    #[test]
    fn test_rule_details_table_marks_errors() {
        let rule = rule(
            "Mixed",
            &["{genre:Action | none | 5}", "{Genre:Action|none|5}", "{bogus:1 | none | 5}"],
        );
        let result = RuleShowResult {
            checks: check_expressions(&rule),
            rule,
        };

        let text = format_rule_details_table(&result, false);
        assert!(text.starts_with("Rule: Mixed\nStatus: enabled\n"));
        assert!(text.contains("  1. {genre:Action | none | 5}\n  2."));
        assert!(text.contains("     = {genre:Action | none | 5}"));
        assert!(text.contains("     ! "));
    }

    #[test]
    fn test_rule_details_json() {
        let rule = rule("Mixed", &["{genre:Action | none | 5}", "{genre:Action}"]);
        let result = RuleShowResult {
            checks: check_expressions(&rule),
            rule,
        };

        let json = format_rule_details_json(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "Mixed");
        assert_eq!(value["expressions"][0]["valid"], true);
        assert_eq!(value["expressions"][1]["valid"], false);
        assert!(value["expressions"][1]["error"].is_string());
    }

    #[test]
    fn test_run_results_table() {
        let results: Vec<RunResult> = vec![
            (
                "Weekend".to_string(),
                Ok(RuleOutcome {
                    rule: "Weekend".to_string(),
                    playlist_id: Some("0123456789".to_string()),
                    item_ids: vec!["a".to_string(), "b".to_string()],
                    failures: vec![ExpressionFailure {
                        expression: "{x}".to_string(),
                        error: FormatError::PartCount { found: 1 },
                    }],
                }),
            ),
            (
                "Empty".to_string(),
                Ok(RuleOutcome {
                    rule: "Empty".to_string(),
                    playlist_id: None,
                    item_ids: Vec::new(),
                    failures: Vec::new(),
                }),
            ),
            (
                "Broken".to_string(),
                Err(RuleError::Source("catalog missing".into())),
            ),
        ];

        let text = format_run_results_table(&results, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "✓ Weekend: playlist 01234567 (2 items)");
        assert!(lines[1].starts_with("    skipped {x}:"));
        assert_eq!(lines[2], "- Empty: no items matched, no playlist created");
        assert!(lines[3].starts_with("✗ Broken: failed to fetch content"));
    }

    #[test]
    fn test_run_results_json() {
        let results: Vec<RunResult> = vec![(
            "Broken".to_string(),
            Err(RuleError::Sink("disk full".into())),
        )];

        let json = format_run_results_json(&results).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"][0]["success"], false);
        assert_eq!(value["results"][0]["item_count"], 0);
        assert!(value["results"][0]["error"]
            .as_str()
            .unwrap()
            .contains("disk full"));
    }
}
