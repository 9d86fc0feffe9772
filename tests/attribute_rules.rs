//! Attribute reconciliation rules, exercised through the public
//! `intersect_attributes` API and through full selector strings.

use selector_intersect::{AttrOperator, AttributeAssertion, intersect, intersect_attributes};

fn assertion(operator: AttrOperator, value: &str, case_sensitive: bool) -> AttributeAssertion {
    AttributeAssertion {
        key: "x".to_owned(),
        operator,
        value: value.to_owned(),
        case_sensitive,
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn presence_only_collapses_to_one() {
    init_logging();
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Exists, "", true),
        assertion(AttrOperator::Exists, "", true),
    ])
    .expect("satisfiable");
    assert_eq!(merged, vec![assertion(AttrOperator::Exists, "", true)]);
}

#[test]
fn presence_is_absorbed_by_any_operator() {
    init_logging();
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Exists, "", true),
        assertion(AttrOperator::Equals, "a", true),
    ])
    .expect("satisfiable");
    assert_eq!(merged, vec![assertion(AttrOperator::Equals, "a", true)]);
    assert_eq!(intersect(&["[x]", "[x='a']"]).expect("intersect"), "[x='a']");
    assert_eq!(intersect(&["[x]", "[x]"]).expect("intersect"), "[x]");
}

#[test]
fn conflicting_exact_values_are_unsatisfiable() {
    init_logging();
    assert_eq!(
        intersect_attributes(&[
            assertion(AttrOperator::Equals, "a", true),
            assertion(AttrOperator::Equals, "b", true),
        ]),
        None
    );
    assert_eq!(intersect(&["[x='a']", "[x='b']"]).expect("intersect"), "");
}

#[test]
fn insensitive_equalities_merge_folded() {
    init_logging();
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Equals, "Foo", false),
        assertion(AttrOperator::Equals, "FOO", false),
    ])
    .expect("satisfiable");
    assert_eq!(merged, vec![assertion(AttrOperator::Equals, "foo", false)]);
}

#[test]
fn sensitive_equality_must_fold_to_the_insensitive_one() {
    init_logging();
    assert_eq!(
        intersect_attributes(&[
            assertion(AttrOperator::Equals, "Foo", false),
            assertion(AttrOperator::Equals, "bar", true),
        ]),
        None
    );
    assert_eq!(
        intersect(&["[x='Foo' i]", "[x='foo']"]).expect("intersect"),
        "[x='foo']"
    );
}

#[test]
fn prefix_anchors_keep_the_more_specific() {
    init_logging();
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Prefix, "ab", true),
        assertion(AttrOperator::Prefix, "abc", true),
    ])
    .expect("satisfiable");
    assert_eq!(merged, vec![assertion(AttrOperator::Prefix, "abc", true)]);
    assert_eq!(
        intersect_attributes(&[
            assertion(AttrOperator::Prefix, "ab", true),
            assertion(AttrOperator::Prefix, "ba", true),
        ]),
        None
    );
}

#[test]
fn suffix_anchors_keep_the_more_specific() {
    init_logging();
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Suffix, "bc", true),
        assertion(AttrOperator::Suffix, "abc", true),
    ])
    .expect("satisfiable");
    assert_eq!(merged, vec![assertion(AttrOperator::Suffix, "abc", true)]);
    assert_eq!(intersect(&["[x$='bc']", "[x$='bd']"]).expect("intersect"), "");
}

#[test]
fn dash_anchors_canonicalize_trailing_dash() {
    init_logging();
    assert_eq!(
        intersect(&["[x|='en-']", "[x|='en']"]).expect("intersect"),
        "[x|='en']"
    );
}

#[test]
fn cross_case_anchor_is_dropped_when_reached() {
    init_logging();
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Prefix, "AB", true),
        assertion(AttrOperator::Prefix, "a", false),
    ])
    .expect("satisfiable");
    assert_eq!(merged, vec![assertion(AttrOperator::Prefix, "AB", true)]);
}

#[test]
fn cross_case_anchor_is_kept_when_stricter() {
    init_logging();
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Prefix, "a", true),
        assertion(AttrOperator::Prefix, "ab", false),
    ])
    .expect("satisfiable");
    assert_eq!(
        merged,
        vec![
            assertion(AttrOperator::Prefix, "a", true),
            assertion(AttrOperator::Prefix, "ab", false),
        ]
    );
    assert_eq!(
        intersect_attributes(&[
            assertion(AttrOperator::Prefix, "a", true),
            assertion(AttrOperator::Prefix, "b", false),
        ]),
        None
    );
}

#[test]
fn fixed_value_subsumes_a_compatible_anchor() {
    init_logging();
    assert_eq!(
        intersect(&["[x='abc']", "[x^='ab']"]).expect("intersect"),
        "[x='abc']"
    );
    assert_eq!(intersect(&["[x='abc']", "[x^='bc']"]).expect("intersect"), "");
    assert_eq!(
        intersect(&["[x='abc']", "[x$='bc']"]).expect("intersect"),
        "[x='abc']"
    );
}

#[test]
fn sensitive_anchor_survives_an_insensitive_equality() {
    init_logging();
    assert_eq!(
        intersect(&["[x='ab' i]", "[x^='AB']"]).expect("intersect"),
        "[x='ab' i][x^='AB']"
    );
    assert_eq!(intersect(&["[x='ab' i]", "[x^='BA']"]).expect("intersect"), "");
}

#[test]
fn dash_match_against_fixed_value() {
    init_logging();
    assert_eq!(
        intersect(&["[x='en-US']", "[x|='en']"]).expect("intersect"),
        "[x='en-US']"
    );
    assert_eq!(intersect(&["[x='enx']", "[x|='en']"]).expect("intersect"), "");
}

#[test]
fn prefix_implied_by_dash_match_is_dropped() {
    init_logging();
    assert_eq!(
        intersect(&["[x^='ab']", "[x|='ab-cd']"]).expect("intersect"),
        "[x|='ab-cd']"
    );
    assert_eq!(
        intersect(&["[x^='ab']", "[x|='ab']"]).expect("intersect"),
        "[x|='ab']"
    );
}

#[test]
fn prefix_crossing_the_dash_boundary_wins() {
    init_logging();
    assert_eq!(
        intersect(&["[x^='ab-c']", "[x|='ab']"]).expect("intersect"),
        "[x^='ab-c']"
    );
    assert_eq!(intersect(&["[x^='abc']", "[x|='ab']"]).expect("intersect"), "");
}

#[test]
fn substrings_keep_only_maximal_values() {
    init_logging();
    assert_eq!(
        intersect(&["[x*='ab']", "[x*='b']"]).expect("intersect"),
        "[x*='ab']"
    );
    assert_eq!(
        intersect(&["[x*='b']", "[x*='ab']"]).expect("intersect"),
        "[x*='ab']"
    );
    assert_eq!(
        intersect(&["[x*='ab']", "[x*='cd']"]).expect("intersect"),
        "[x*='ab'][x*='cd']"
    );
}

#[test]
fn insensitive_substring_covered_by_a_sensitive_one_is_dropped() {
    init_logging();
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Substring, "AB", true),
        assertion(AttrOperator::Substring, "ab", false),
    ])
    .expect("satisfiable");
    assert_eq!(merged, vec![assertion(AttrOperator::Substring, "AB", true)]);
}

#[test]
fn substrings_validate_against_a_fixed_value() {
    init_logging();
    assert_eq!(
        intersect(&["[x*='a']", "[x='ab']"]).expect("intersect"),
        "[x='ab']"
    );
    assert_eq!(intersect(&["[x*='c']", "[x='ab']"]).expect("intersect"), "");
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Substring, "B", false),
        assertion(AttrOperator::Equals, "aB", true),
    ])
    .expect("satisfiable");
    assert_eq!(merged, vec![assertion(AttrOperator::Equals, "aB", true)]);
}

#[test]
fn token_matches_dedup_but_stay_independent() {
    init_logging();
    assert_eq!(
        intersect(&["[x~='a'][x~='b']", "[x~='a']"]).expect("intersect"),
        "[x~='a'][x~='b']"
    );
    let merged = intersect_attributes(&[
        assertion(AttrOperator::Includes, "a", true),
        assertion(AttrOperator::Includes, "a", false),
    ])
    .expect("satisfiable");
    assert_eq!(
        merged,
        vec![
            assertion(AttrOperator::Includes, "a", true),
            assertion(AttrOperator::Includes, "a", false),
        ]
    );
}

#[test]
fn reconciliation_is_idempotent_and_order_insensitive() {
    init_logging();
    let forward = [
        assertion(AttrOperator::Prefix, "ab", true),
        assertion(AttrOperator::Substring, "cd", true),
        assertion(AttrOperator::Includes, "t", true),
    ];
    let reversed: Vec<AttributeAssertion> = forward.iter().rev().cloned().collect();
    let merged_forward = intersect_attributes(&forward).expect("satisfiable");
    let merged_reversed = intersect_attributes(&reversed).expect("satisfiable");
    let mut sorted_forward = merged_forward.clone();
    let mut sorted_reversed = merged_reversed;
    sorted_forward.sort_by(|a, b| a.value.cmp(&b.value));
    sorted_reversed.sort_by(|a, b| a.value.cmp(&b.value));
    assert_eq!(sorted_forward, sorted_reversed);
    let again = intersect_attributes(&merged_forward).expect("satisfiable");
    assert_eq!(again, merged_forward);
}
