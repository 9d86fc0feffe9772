//! End-to-end intersection scenarios.

use selector_intersect::{Error, intersect};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn disjoint_types_are_empty() {
    init_logging();
    assert_eq!(intersect(&["a", "b"]).expect("intersect"), "");
}

#[test]
fn classes_accumulate() {
    init_logging();
    assert_eq!(intersect(&["a.x", "a.y"]).expect("intersect"), "a.x.y");
}

#[test]
fn longer_prefix_wins() {
    init_logging();
    assert_eq!(
        intersect(&["[href^='https://']", "[href^='https://example']"]).expect("intersect"),
        "[href^='https://example']"
    );
}

#[test]
fn exact_value_subsumes_insensitive_one() {
    init_logging();
    assert_eq!(
        intersect(&["[x='Foo' i]", "[x='foo']"]).expect("intersect"),
        "[x='foo']"
    );
}

#[test]
fn longer_prefix_wins_same_case() {
    init_logging();
    assert_eq!(
        intersect(&["[x^='ab']", "[x^='abc']"]).expect("intersect"),
        "[x^='abc']"
    );
}

#[test]
fn dash_match_narrows_to_longer_language_range() {
    init_logging();
    assert_eq!(
        intersect(&["[x|='en']", "[x|='en-US']"]).expect("intersect"),
        "[x|='en-US']"
    );
}

#[test]
fn five_way_intersection_folds_left() {
    init_logging();
    assert_eq!(
        intersect(&[
            "a + b:nth-child(4) > b",
            "b, c",
            "b:not([attr~='yo']) > b",
            "b",
            "d b",
        ])
        .expect("intersect"),
        "d a ~ b:nth-child(4):not([attr~='yo']) > b"
    );
}

#[test]
fn child_is_stricter_than_descendant() {
    init_logging();
    assert_eq!(
        intersect(&["div > span", "span"]).expect("intersect"),
        "div > span"
    );
    assert_eq!(
        intersect(&["div > span", "div span"]).expect("intersect"),
        "div > span"
    );
}

#[test]
fn universal_is_neutral() {
    init_logging();
    assert_eq!(intersect(&["a", "*"]).expect("intersect"), "a");
    assert_eq!(intersect(&["*", ".x"]).expect("intersect"), ".x");
}

#[test]
fn distinct_pseudo_elements_are_empty() {
    init_logging();
    assert_eq!(
        intersect(&["p::first-line", "p::first-letter"]).expect("intersect"),
        ""
    );
    assert_eq!(
        intersect(&["p::first-line", "p::first-line"]).expect("intersect"),
        "p::first-line"
    );
}

#[test]
fn union_branches_intersect_pairwise() {
    init_logging();
    assert_eq!(intersect(&["a, b", "b, c"]).expect("intersect"), "b");
}

#[test]
fn empty_union_branch_contributes_nothing() {
    init_logging();
    assert_eq!(intersect(&["a, ,b", "a"]).expect("intersect"), "a");
}

#[test]
fn descendant_contexts_fan_out_into_both_orders() {
    init_logging();
    assert_eq!(
        intersect(&["x y", "u y"]).expect("intersect"),
        "x u y, u x y"
    );
}

#[test]
fn equal_descendant_contexts_collapse() {
    init_logging();
    assert_eq!(intersect(&["a b", "a b"]).expect("intersect"), "a b");
}

#[test]
fn child_under_named_ancestor() {
    init_logging();
    assert_eq!(intersect(&["a > b", "c b"]).expect("intersect"), "c a > b");
}

#[test]
fn sibling_constraints_union() {
    init_logging();
    assert_eq!(
        intersect(&["a ~ b", "c ~ b"]).expect("intersect"),
        "c ~ a ~ b"
    );
    assert_eq!(intersect(&["a ~ b", "a ~ b"]).expect("intersect"), "a ~ b");
}

#[test]
fn adjacent_sibling_renders_as_general_sibling() {
    init_logging();
    assert_eq!(intersect(&["a + b"]).expect("intersect"), "a ~ b");
}

#[test]
fn single_selector_round_trips() {
    init_logging();
    assert_eq!(
        intersect(&["[x='Foo' i]"]).expect("intersect"),
        "[x='Foo' i]"
    );
    assert_eq!(intersect(&["a.x.x"]).expect("intersect"), "a.x.x");
    assert_eq!(
        intersect(&["div  >  span"]).expect("intersect"),
        "div > span"
    );
}

#[test]
fn quoting_round_trips_through_the_tokenizer() {
    init_logging();
    assert_eq!(
        intersect(&["[title=\"it's\"]"]).expect("intersect"),
        "[title=\"it's\"]"
    );
    assert_eq!(
        intersect(&["[title='say \"hi\"']"]).expect("intersect"),
        "[title='say \"hi\"']"
    );
}

#[test]
fn class_shorthand_needs_an_identifier_value() {
    init_logging();
    assert_eq!(
        intersect(&["[class~='a b']"]).expect("intersect"),
        "[class~='a b']"
    );
    assert_eq!(intersect(&["[class~='wide']"]).expect("intersect"), ".wide");
}

#[test]
fn adding_constraints_never_enlarges_the_result() {
    init_logging();
    assert_eq!(intersect(&["a.x", "a"]).expect("intersect"), "a.x");
    assert_eq!(intersect(&["a.x.y", "a.x"]).expect("intersect"), "a.x.y");
}

#[test]
fn associativity_on_compound_constraints() {
    init_logging();
    let (r, s, t) = ("a.x", "a.y[href^='ab']", "a.z:hover");
    let left_first = intersect(&[r, s]).expect("intersect");
    let right_first = intersect(&[s, t]).expect("intersect");
    assert_eq!(
        intersect(&[left_first.as_str(), t]).expect("intersect"),
        intersect(&[r, right_first.as_str()]).expect("intersect")
    );
    assert_eq!(
        intersect(&[r, s, t]).expect("intersect"),
        "a.x.y.z[href^='ab']:hover"
    );
}

#[test]
fn no_selectors_is_an_error() {
    init_logging();
    assert_eq!(intersect::<&str>(&[]), Err(Error::NoSelectors));
}

#[test]
fn parse_errors_surface() {
    init_logging();
    assert!(matches!(intersect(&["a >"]), Err(Error::Parse(_))));
    assert!(matches!(intersect(&["> a"]), Err(Error::Parse(_))));
    assert!(matches!(intersect(&["a + > b"]), Err(Error::Parse(_))));
    assert!(matches!(intersect(&["#1x"]), Err(Error::Parse(_))));
    assert!(matches!(intersect(&["a..x"]), Err(Error::Parse(_))));
    assert!(matches!(intersect(&["[3=4]"]), Err(Error::Parse(_))));
}

#[test]
fn parse_errors_surface_even_after_an_empty_step() {
    init_logging();
    assert!(matches!(intersect(&["a", "b", "a >"]), Err(Error::Parse(_))));
}
