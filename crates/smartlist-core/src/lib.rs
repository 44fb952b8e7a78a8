//! Rule-driven dynamic playlists.
//!
//! This crate turns short textual rules such as
//! `{[genre:Action AND NOT released:<2000] | rating | 20}` into predicate
//! trees, evaluates them against media records, and assembles the selected
//! items into playlists.
//!
//! - [`expression`] - parsing and evaluation of rule expressions
//! - [`selection`] - filtering, sorting and truncating a record collection
//! - [`rule`] - multi-expression rules and the processing loop
//! - [`store`] - JSON persistence for rules
//! - [`catalog`] / [`sink`] - file-backed content source and playlist sink

pub mod catalog;
pub mod expression;
pub mod model;
pub mod rule;
pub mod selection;
pub mod sink;
pub mod store;

pub use catalog::{Catalog, CatalogError, JsonCatalog};
pub use model::ContentRecord;
pub use rule::{
    select_for_rule, BoxError, ContentSource, ExpressionFailure, PlaylistSink, Rule, RuleError,
    RuleOutcome, RuleProcessor, RuleSelection,
};
pub use selection::{select, sort_records, union_by_id, SortKey};
pub use sink::{DirectoryPlaylistSink, Playlist, SinkError};
pub use store::{RuleSet, RuleStore, StoreError};
