//! Rules and the per-rule processing loop.
//!
//! A [`Rule`] names one or more expressions. Processing a rule fetches the
//! user's content, runs every expression independently, unions the
//! selections and hands the result to a [`PlaylistSink`]. A malformed
//! expression is logged and skipped; it never aborts the rest of the rule.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::expression::{ExpressionParser, FormatError};
use crate::model::ContentRecord;
use crate::selection::union_by_id;

/// Boxed error returned by collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A named, user-authored playlist rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name, also used as the playlist name.
    pub name: String,

    /// Expressions whose selections are combined into one playlist.
    pub expressions: Vec<String>,

    /// User whose library and watch state the rule runs against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Disabled rules are kept in storage but skipped by `run_all`.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    /// Creates an enabled rule with no user.
    pub fn new(name: impl Into<String>, expressions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            expressions,
            user: None,
            enabled: true,
        }
    }
}

/// Supplies the media records a rule is evaluated against.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// Returns every eligible record for `user`, with the user's watched flag applied.
    async fn fetch_items(&self, user: Option<&str>) -> Result<Vec<ContentRecord>, BoxError>;
}

/// Persists the playlist a rule produces.
#[allow(async_fn_in_trait)]
pub trait PlaylistSink {
    /// Creates a playlist from an ordered list of item ids and returns its id.
    async fn create_playlist(
        &self,
        name: &str,
        user: Option<&str>,
        item_ids: &[String],
    ) -> Result<String, BoxError>;
}

/// Errors that stop a rule from producing a playlist.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The content source failed.
    #[error("failed to fetch content: {0}")]
    Source(#[source] BoxError),

    /// The playlist sink failed.
    #[error("failed to create playlist: {0}")]
    Sink(#[source] BoxError),
}

/// An expression that was skipped because it failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionFailure {
    /// The expression text.
    pub expression: String,
    /// Why it was rejected.
    pub error: FormatError,
}

/// Records selected by a rule, before any playlist is created.
#[derive(Debug)]
pub struct RuleSelection<'a> {
    /// The union of every expression's selection, in first-seen order.
    pub items: Vec<&'a ContentRecord>,
    /// Expressions that were skipped.
    pub failures: Vec<ExpressionFailure>,
}

/// Outcome of running a rule end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Name of the rule that ran.
    pub rule: String,
    /// Id of the created playlist, or `None` when nothing was selected.
    pub playlist_id: Option<String>,
    /// Ids of the items placed in the playlist.
    pub item_ids: Vec<String>,
    /// Expressions that were skipped.
    pub failures: Vec<ExpressionFailure>,
}

/// Runs every expression of `rule` against `records`.
///
/// Each expression is parsed and selected on its own. Failures are collected
/// and logged; the remaining expressions still contribute to the union.
pub fn select_for_rule<'a>(rule: &Rule, records: &'a [ContentRecord]) -> RuleSelection<'a> {
    let mut selections = Vec::with_capacity(rule.expressions.len());
    let mut failures = Vec::new();

    for text in &rule.expressions {
        match ExpressionParser::parse(text) {
            Ok(expression) => {
                let selected = expression.select(records);
                debug!(
                    rule = %rule.name,
                    expression = %text,
                    selected = selected.len(),
                    "expression evaluated"
                );
                selections.push(selected);
            }
            Err(error) => {
                warn!(rule = %rule.name, expression = %text, %error, "skipping expression");
                failures.push(ExpressionFailure {
                    expression: text.clone(),
                    error,
                });
            }
        }
    }

    RuleSelection {
        items: union_by_id(selections),
        failures,
    }
}

/// Drives rules from a content source to a playlist sink.
#[derive(Debug)]
pub struct RuleProcessor<S, P> {
    source: S,
    sink: P,
}

impl<S: ContentSource, P: PlaylistSink> RuleProcessor<S, P> {
    /// Creates a processor over the given collaborators.
    pub fn new(source: S, sink: P) -> Self {
        Self { source, sink }
    }

    /// Returns the content source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the playlist sink.
    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Runs a single rule.
    ///
    /// A rule that selects nothing creates no playlist.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::Source` if content cannot be fetched and
    /// `RuleError::Sink` if the playlist cannot be persisted. Malformed
    /// expressions are not errors; they are reported in
    /// [`RuleOutcome::failures`].
    pub async fn run(&self, rule: &Rule) -> Result<RuleOutcome, RuleError> {
        let user = rule.user.as_deref();
        let records = self
            .source
            .fetch_items(user)
            .await
            .map_err(RuleError::Source)?;
        debug!(rule = %rule.name, records = records.len(), "fetched content");

        let selection = select_for_rule(rule, &records);
        let item_ids: Vec<String> = selection.items.iter().map(|r| r.id.clone()).collect();

        let playlist_id = if item_ids.is_empty() {
            info!(rule = %rule.name, "rule selected no items; no playlist created");
            None
        } else {
            let id = self
                .sink
                .create_playlist(&rule.name, user, &item_ids)
                .await
                .map_err(RuleError::Sink)?;
            info!(rule = %rule.name, playlist = %id, items = item_ids.len(), "playlist created");
            Some(id)
        };

        Ok(RuleOutcome {
            rule: rule.name.clone(),
            playlist_id,
            item_ids,
            failures: selection.failures,
        })
    }

    /// Runs every enabled rule, isolating failures per rule.
    pub async fn run_all(&self, rules: &[Rule]) -> Vec<(String, Result<RuleOutcome, RuleError>)> {
        let mut results = Vec::new();
        for rule in rules.iter().filter(|r| r.enabled) {
            let result = self.run(rule).await;
            if let Err(error) = &result {
                warn!(rule = %rule.name, %error, "rule failed");
            }
            results.push((rule.name.clone(), result));
        }
        results
    }
}
