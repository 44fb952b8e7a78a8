//! Tests for filter evaluation.

use std::sync::Arc;
use std::thread;

use super::*;
use crate::model::ContentRecord;

// ==================== Test Helpers ====================

fn make_record(id: &str, name: &str) -> ContentRecord {
    ContentRecord::new(id, name, "Movie")
}

fn with_genres(mut record: ContentRecord, genres: &[&str]) -> ContentRecord {
    record.genres = genres.iter().map(|g| g.to_string()).collect();
    record
}

fn matches(filter: &str, record: &ContentRecord) -> bool {
    ExpressionParser::parse_filter(filter).unwrap().matches(record)
}

// ==================== Genre / Language / Type Tests ====================

#[test]
fn test_genre_matches_any_member_case_insensitive() {
    let record = with_genres(make_record("1", "Alien"), &["Horror", "Science Fiction"]);
    assert!(matches("genre:horror", &record));
    assert!(matches("genre:SCIENCE FICTION", &record));
    assert!(!matches("genre:Comedy", &record));
}

#[test]
fn test_genre_is_exact_not_substring() {
    let record = with_genres(make_record("1", "Alien"), &["Science Fiction"]);
    assert!(!matches("genre:Science", &record));
}

#[test]
fn test_genre_non_ascii_case_insensitive() {
    let record = with_genres(make_record("1", "Amélie"), &["Comédie"]);
    assert!(matches("genre:COMÉDIE", &record));
}

#[test]
fn test_genre_value_expression() {
    let action = with_genres(make_record("1", "Heat"), &["Action", "Crime"]);
    let thriller = with_genres(make_record("2", "Se7en"), &["Thriller", "Horror"]);
    let filter = "genre:((Action OR Thriller) AND NOT Horror)";

    assert!(matches(filter, &action));
    assert!(!matches(filter, &thriller));
}

#[test]
fn test_language_missing_never_matches() {
    let record = make_record("1", "Untitled");
    assert!(!matches("language:en", &record));
    assert!(matches("NOT language:en", &record));
}

#[test]
fn test_language_case_insensitive() {
    let record = ContentRecord {
        language: Some("EN".to_string()),
        ..make_record("1", "Heat")
    };
    assert!(matches("language:en OR language:fr", &record));
    assert!(matches("language:(fr OR en)", &record));
}

#[test]
fn test_type_matches() {
    let episode = ContentRecord::new("1", "Pilot", "Episode");
    assert!(matches("type:episode", &episode));
    assert!(!matches("type:Movie", &episode));
}

// ==================== Numeric Comparison Tests ====================

#[test]
fn test_runtime_less_or_equal_boundary() {
    let at = ContentRecord {
        runtime_minutes: Some(90),
        ..make_record("1", "a")
    };
    let over = ContentRecord {
        runtime_minutes: Some(91),
        ..make_record("2", "b")
    };
    assert!(matches("length:<=90", &at));
    assert!(!matches("length:<=90", &over));
    assert!(matches("length:=90", &at));
    assert!(!matches("length:<90", &at));
}

#[test]
fn test_missing_runtime_is_zero() {
    let record = make_record("1", "a");
    assert!(matches("length:<10", &record));
    assert!(matches("length:=0", &record));
    assert!(!matches("length:>0", &record));
}

#[test]
fn test_missing_release_year_is_zero() {
    let record = make_record("1", "a");
    assert!(!matches("released:>2000", &record));
    assert!(matches("released:<2000", &record));
}

#[test]
fn test_release_year_comparisons() {
    let record = ContentRecord {
        release_year: Some(2000),
        ..make_record("1", "a")
    };
    assert!(matches("released:>=2000", &record));
    assert!(matches("released:=2000", &record));
    assert!(!matches("released:>2000", &record));
}

#[test]
fn test_rating_equality_tolerance() {
    let close = ContentRecord {
        community_rating: Some(7.55),
        ..make_record("1", "a")
    };
    let far = ContentRecord {
        community_rating: Some(7.7),
        ..make_record("2", "b")
    };
    assert!(matches("rating:=7.5", &close));
    assert!(!matches("rating:=7.5", &far));
}

#[test]
fn test_rating_ordering_is_exact() {
    let record = ContentRecord {
        community_rating: Some(7.55),
        ..make_record("1", "a")
    };
    assert!(!matches("rating:<=7.5", &record));
    assert!(matches("rating:>7.5", &record));
}

#[test]
fn test_missing_rating_is_zero() {
    let record = make_record("1", "a");
    assert!(matches("rating:=0", &record));
    assert!(!matches("rating:>=1", &record));
}

#[test]
fn test_compare_int_is_exact() {
    assert!(ComparisonOp::Equal.compare_int(90, 90));
    assert!(!ComparisonOp::Equal.compare_int(90, 91));
}

// ==================== Watch Status Tests ====================

#[test]
fn test_not_watched_matches_only_unwatched() {
    let watched = ContentRecord {
        watched: true,
        ..make_record("1", "a")
    };
    let unwatched = make_record("2", "b");
    assert!(!matches("NOT [watchstatus:true]", &watched));
    assert!(matches("NOT [watchstatus:true]", &unwatched));
}

// ==================== Logical Operator Tests ====================

#[test]
fn test_action_without_horror() {
    let action = with_genres(make_record("1", "Heat"), &["Action"]);
    let action_horror = with_genres(make_record("2", "Predator"), &["Action", "Horror"]);
    let horror = with_genres(make_record("3", "Alien"), &["Horror"]);
    let filter = "[genre:Action AND NOT genre:Horror]";

    assert!(matches(filter, &action));
    assert!(!matches(filter, &action_horror));
    assert!(!matches(filter, &horror));
}

#[test]
fn test_bracketed_or_of_and() {
    let long_action = ContentRecord {
        runtime_minutes: Some(120),
        ..with_genres(make_record("1", "Heat"), &["Action"])
    };
    let short_action = ContentRecord {
        runtime_minutes: Some(80),
        ..with_genres(make_record("2", "Crank"), &["Action"])
    };
    let comedy = with_genres(make_record("3", "Airplane!"), &["Comedy"]);

    let parsed = ExpressionParser::parse_filter("[genre:Action AND length:>90] OR [genre:Comedy]")
        .unwrap();
    let built = FilterNode::or([
        FilterNode::and([
            FilterNode::genre("Action"),
            FilterNode::RuntimeCompare {
                op: ComparisonOp::GreaterThan,
                minutes: 90,
            },
        ]),
        FilterNode::genre("Comedy"),
    ]);

    for record in [&long_action, &short_action, &comedy] {
        assert_eq!(evaluate(&parsed, record), evaluate(&built, record));
    }
    assert!(parsed.matches(&long_action));
    assert!(!parsed.matches(&short_action));
    assert!(parsed.matches(&comedy));
}

fn visited(filter: &FilterNode, record: &ContentRecord) -> (bool, Vec<FilterNode>) {
    let mut seen = Vec::new();
    let result = super::evaluator::evaluate_with(filter, record, &mut |node: &FilterNode| {
        seen.push(node.clone())
    });
    (result, seen)
}

#[test]
fn test_and_stops_at_first_false_child() {
    let filter =
        ExpressionParser::parse_filter("watchstatus:true AND genre:Action AND length:>90").unwrap();
    let FilterNode::And(children) = &filter else {
        panic!("expected And, got {filter:?}");
    };

    let (result, seen) = visited(&filter, &make_record("1", "Heat"));
    assert!(!result);
    assert_eq!(seen, vec![filter.clone(), children[0].clone()]);
}

#[test]
fn test_or_stops_at_first_true_child() {
    let filter =
        ExpressionParser::parse_filter("length:>90 OR watchstatus:false OR genre:Action").unwrap();
    let FilterNode::Or(children) = &filter else {
        panic!("expected Or, got {filter:?}");
    };

    let (result, seen) = visited(&filter, &make_record("1", "Heat"));
    assert!(result);
    assert_eq!(
        seen,
        vec![filter.clone(), children[0].clone(), children[1].clone()]
    );
}

#[test]
fn test_and_visits_children_left_to_right() {
    let filter =
        ExpressionParser::parse_filter("watchstatus:false AND length:<=90 AND released:<3000").unwrap();
    let FilterNode::And(children) = &filter else {
        panic!("expected And, got {filter:?}");
    };

    let (result, seen) = visited(&filter, &make_record("1", "Heat"));
    assert!(result);
    let mut expected = vec![filter.clone()];
    expected.extend(children.iter().cloned());
    assert_eq!(seen, expected);
}

#[test]
fn test_and_or_identities() {
    let record = make_record("1", "a");
    assert!(evaluate(&FilterNode::And(vec![]), &record));
    assert!(!evaluate(&FilterNode::Or(vec![]), &record));
}

#[test]
fn test_group_delegates_to_child() {
    let record = ContentRecord::new("1", "a", "Movie");
    let group = FilterNode::TypeGroup(Box::new(FilterNode::TypeIs("movie".to_string())));
    assert!(evaluate(&group, &record));
}

#[test]
fn test_evaluation_is_deterministic() {
    let record = with_genres(make_record("1", "Heat"), &["Action"]);
    let filter = ExpressionParser::parse_filter("genre:Action AND NOT watchstatus:true").unwrap();
    assert_eq!(filter.matches(&record), filter.matches(&record));
}

// ==================== Evaluator Wrapper Tests ====================

#[test]
fn test_filter_items_preserves_order() {
    let records = vec![
        with_genres(make_record("1", "a"), &["Drama"]),
        with_genres(make_record("2", "b"), &["Comedy"]),
        with_genres(make_record("3", "c"), &["Drama", "Comedy"]),
    ];
    let filter = ExpressionParser::parse_filter("genre:Drama").unwrap();
    let evaluator = FilterEvaluator::new(&filter);

    let ids: Vec<&str> = evaluator
        .filter_items(&records)
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn test_shared_tree_across_threads() {
    let filter = Arc::new(ExpressionParser::parse_filter("rating:>5").unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                let record = ContentRecord {
                    community_rating: Some(f64::from(i) * 2.5),
                    ..make_record(&i.to_string(), "x")
                };
                filter.matches(&record)
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    // 0.0, 2.5, 5.0, 7.5: only 7.5 is strictly greater than 5.
    assert_eq!(results, vec![false, false, false, true]);
}
