//! Rule expression parser and evaluator.
//!
//! A rule expression describes one slice of a dynamic playlist as
//! `{filter | sort | count}`. This module parses the text into a
//! [`ParsedExpression`] and evaluates its [`FilterNode`] tree against
//! [`ContentRecord`](crate::ContentRecord)s.
//!
//! # Supported Syntax
//!
//! ## Leaf Clauses
//! - `genre:<value>` - Records whose genre set contains a term
//! - `language:<value>` - Records in a language
//! - `type:<value>` - Records of a content type (`Movie`, `Episode`, ...)
//! - `length:<op><minutes>` - Runtime comparison, e.g. `length:<=90`
//! - `released:<op><year>` - Release year comparison, e.g. `released:>2000`
//! - `rating:<op><decimal>` - Community rating comparison, e.g. `rating:>=7.5`
//! - `watchstatus:true` / `watchstatus:false` - Watched state
//!
//! Comparison operators are `<`, `>`, `=`, `<=` and `>=`. Rating equality
//! allows a difference of up to 0.1.
//!
//! ## Boolean Operators
//! - `AND`, `OR` - whole words, uppercase
//! - `NOT` - prefix, any case
//! - `[...]` - grouping of clauses
//! - `(...)` - grouping inside genre/language/type values,
//!   e.g. `genre:(Action OR Thriller)`
//!
//! AND is split before OR at every level, so unbracketed mixed expressions
//! group as `A AND (B OR C)`.
//!
//! ## Sort Keys
//! See [`SortKey`](crate::selection::SortKey).
//!
//! # Example
//!
//! ```
//! use smartlist_core::expression::{ExpressionParser, FilterNode};
//!
//! let expression = ExpressionParser::parse("{genre:Comedy | alphabetical | 10}").unwrap();
//! assert_eq!(expression.filter, FilterNode::genre("Comedy"));
//! assert_eq!(expression.count, 10);
//! ```

mod ast;
mod error;
mod evaluator;
mod parser;
mod scanner;

pub use ast::{ComparisonOp, Field, FilterNode, ParsedExpression, RATING_EQUALITY_TOLERANCE};
pub use error::{ExpressionResult, FormatError};
pub use evaluator::{evaluate, FilterEvaluator};
pub use parser::ExpressionParser;


#[cfg(test)]
mod evaluator_tests;
