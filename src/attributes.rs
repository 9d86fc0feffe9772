//! Attribute assertion reconciliation.
//! Spec: <https://www.w3.org/TR/selectors-3/#attribute-selectors>
//!
//! Reduces a conjunction of attribute assertions on one key to a minimal
//! equivalent conjunction, or reports that the conjunction cannot be
//! satisfied. Each reconciliation stage is a pure fold over the incoming
//! assertions: presence elimination, equality, the anchoring operators
//! (`^=`, `$=`, `|=`), substring containment, the `^=`/`|=` cross check,
//! and token-match dedup. Case-insensitive comparisons use Unicode simple
//! lower-case folding throughout.

use crate::{AttrOperator, AttributeAssertion, LOG_TARGET};
use log::trace;

/// Lower-case fold used for every `i`-flagged comparison.
#[inline]
fn fold(value: &str) -> String {
    value.to_lowercase()
}

/// Strip one trailing `-` from a `|=` value: `en-` and `en` match the same
/// set of values, so the dashless form is the canonical anchor.
#[inline]
fn strip_pipe(value: &str) -> &str {
    value.strip_suffix('-').unwrap_or(value)
}

/// True when `longer` extends `shorter` across a `-` boundary.
#[inline]
fn extends_dash(longer: &str, shorter: &str) -> bool {
    longer
        .strip_prefix(shorter)
        .is_some_and(|rest| rest.starts_with('-'))
}

/// At most one case-sensitive and one case-insensitive anchor survive per
/// anchoring operator; the insensitive one is stored folded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Anchoring {
    sensitive: Option<String>,
    insensitive: Option<String>,
}

/// Reconciled equality values. The insensitive value is stored folded; a
/// case-sensitive equality, once established, subsumes insensitive ones.
#[derive(Clone, Debug, Default)]
struct EqualityValues {
    sensitive: Option<String>,
    insensitive: Option<String>,
}

/// Reduce a conjunction of assertions sharing one attribute key.
///
/// Returns the minimal equivalent conjunction, or `None` when the
/// assertions cannot all hold of a single attribute value. The result is
/// deterministic for a fixed input order, idempotent, and order-insensitive
/// when compared as a set.
pub fn intersect_attributes(
    assertions: &[AttributeAssertion],
) -> Option<Vec<AttributeAssertion>> {
    let operative: Vec<&AttributeAssertion> = assertions
        .iter()
        .filter(|assertion| assertion.operator != AttrOperator::Exists)
        .collect();
    // Presence is implied by any operator-bearing assertion.
    if operative.is_empty() {
        return assertions.first().map(|first| vec![first.clone()]);
    }
    let key = operative.first().map(|first| first.key.clone())?;

    let equality = reconcile_equality(&operative)?;
    let prefix = reconcile_anchoring(&operative, AttrOperator::Prefix, &equality)?;
    let suffix = reconcile_anchoring(&operative, AttrOperator::Suffix, &equality)?;
    let dash = reconcile_anchoring(&operative, AttrOperator::DashMatch, &equality)?;
    let (prefix, dash) = cross_check_prefix_dash(prefix, dash)?;
    let (substrings_sensitive, substrings_insensitive) =
        reconcile_substrings(&operative, &equality)?;
    let token_matches = dedup_token_matches(&operative);

    let mut out = Vec::new();
    if let Some(value) = equality.sensitive {
        out.push(AttributeAssertion {
            key: key.clone(),
            operator: AttrOperator::Equals,
            value,
            case_sensitive: true,
        });
    } else if let Some(value) = equality.insensitive {
        out.push(AttributeAssertion {
            key: key.clone(),
            operator: AttrOperator::Equals,
            value,
            case_sensitive: false,
        });
    }
    for (anchoring, operator) in [
        (prefix, AttrOperator::Prefix),
        (suffix, AttrOperator::Suffix),
        (dash, AttrOperator::DashMatch),
    ] {
        if let Some(value) = anchoring.sensitive {
            out.push(AttributeAssertion {
                key: key.clone(),
                operator,
                value,
                case_sensitive: true,
            });
        }
        if let Some(value) = anchoring.insensitive {
            out.push(AttributeAssertion {
                key: key.clone(),
                operator,
                value,
                case_sensitive: false,
            });
        }
    }
    for value in substrings_sensitive {
        out.push(AttributeAssertion {
            key: key.clone(),
            operator: AttrOperator::Substring,
            value,
            case_sensitive: true,
        });
    }
    for value in substrings_insensitive {
        out.push(AttributeAssertion {
            key: key.clone(),
            operator: AttrOperator::Substring,
            value,
            case_sensitive: false,
        });
    }
    for (value, case_sensitive) in token_matches {
        out.push(AttributeAssertion {
            key: key.clone(),
            operator: AttrOperator::Includes,
            value,
            case_sensitive,
        });
    }
    Some(out)
}

/// Fold all `=` assertions into at most one sensitive and one insensitive
/// equality value.
fn reconcile_equality(operative: &[&AttributeAssertion]) -> Option<EqualityValues> {
    let mut equality = EqualityValues::default();
    for assertion in operative
        .iter()
        .filter(|assertion| assertion.operator == AttrOperator::Equals)
    {
        if assertion.case_sensitive {
            if equality
                .sensitive
                .as_ref()
                .is_some_and(|existing| *existing != assertion.value)
            {
                trace!(
                    target: LOG_TARGET,
                    "[{}] conflicting exact values {:?} and {:?}",
                    assertion.key, equality.sensitive, assertion.value
                );
                return None;
            }
            if equality
                .insensitive
                .as_ref()
                .is_some_and(|existing| *existing != fold(&assertion.value))
            {
                return None;
            }
            equality.sensitive = Some(assertion.value.clone());
        } else {
            let folded = fold(&assertion.value);
            if equality
                .sensitive
                .as_ref()
                .is_some_and(|existing| fold(existing) != folded)
            {
                return None;
            }
            if equality
                .insensitive
                .as_ref()
                .is_some_and(|existing| *existing != folded)
            {
                return None;
            }
            equality.insensitive = Some(folded);
        }
    }
    Some(equality)
}

/// Reconcile all assertions of one anchoring operator (`^=`, `$=` or `|=`)
/// down to at most one sensitive and one insensitive anchor, then check the
/// survivors against any fixed equality value.
fn reconcile_anchoring(
    operative: &[&AttributeAssertion],
    operator: AttrOperator,
    equality: &EqualityValues,
) -> Option<Anchoring> {
    let piped = operator == AttrOperator::DashMatch;
    let suffixing = operator == AttrOperator::Suffix;
    let mut anchoring = Anchoring::default();
    for assertion in operative
        .iter()
        .filter(|assertion| assertion.operator == operator)
    {
        let incoming = if piped {
            strip_pipe(&assertion.value)
        } else {
            assertion.value.as_str()
        };
        if assertion.case_sensitive {
            anchoring.sensitive = Some(merge_anchor(
                anchoring.sensitive.as_deref(),
                incoming,
                piped,
                suffixing,
            )?);
        } else {
            anchoring.insensitive = Some(merge_anchor(
                anchoring.insensitive.as_deref(),
                &fold(incoming),
                piped,
                suffixing,
            )?);
        }
    }

    // A sensitive anchor implies its own folded form: the insensitive
    // anchor is redundant when the folded sensitive anchor reaches it, and
    // contradictory when the two disagree on the anchored region.
    if let (Some(sensitive), Some(insensitive)) = (&anchoring.sensitive, &anchoring.insensitive) {
        let folded = fold(sensitive);
        if anchor_reaches(&folded, insensitive, piped, suffixing) {
            anchoring.insensitive = None;
        } else if !anchor_reaches(insensitive, &folded, piped, suffixing) {
            trace!(
                target: LOG_TARGET,
                "incompatible {}-anchors {sensitive:?} and {insensitive:?}",
                operator.as_str()
            );
            return None;
        }
    }

    if let Some(value) = &equality.sensitive {
        // The exact value is fixed; the anchoring either holds of it and is
        // subsumed, or contradicts it.
        if let Some(anchor) = anchoring.sensitive.take()
            && !anchor_satisfied(value, &anchor, piped, suffixing)
        {
            return None;
        }
        if let Some(anchor) = anchoring.insensitive.take()
            && !anchor_satisfied(&fold(value), &anchor, piped, suffixing)
        {
            return None;
        }
    } else if let Some(value) = &equality.insensitive {
        if let Some(anchor) = anchoring.insensitive.take()
            && !anchor_satisfied(value, &anchor, piped, suffixing)
        {
            return None;
        }
        // A sensitive anchor still constrains the exact spelling; validate
        // its folded form against the insensitive value but keep it.
        if let Some(anchor) = &anchoring.sensitive
            && !anchor_satisfied(value, &fold(anchor), piped, suffixing)
        {
            return None;
        }
    }
    Some(anchoring)
}

/// Combine two same-sensitivity anchors of one operator. The more specific
/// (longer) anchor wins; disjoint anchors cannot both hold.
fn merge_anchor(
    existing: Option<&str>,
    incoming: &str,
    piped: bool,
    suffixing: bool,
) -> Option<String> {
    let Some(existing) = existing else {
        return Some(incoming.to_owned());
    };
    if piped {
        if existing == incoming {
            return Some(existing.to_owned());
        }
        if extends_dash(incoming, existing) {
            return Some(incoming.to_owned());
        }
        if extends_dash(existing, incoming) {
            return Some(existing.to_owned());
        }
        return None;
    }
    if suffixing {
        if existing.ends_with(incoming) {
            return Some(existing.to_owned());
        }
        if incoming.ends_with(existing) {
            return Some(incoming.to_owned());
        }
        return None;
    }
    if existing.starts_with(incoming) {
        return Some(existing.to_owned());
    }
    if incoming.starts_with(existing) {
        return Some(incoming.to_owned());
    }
    None
}

/// True when an attribute value anchored by `strict` necessarily satisfies
/// the anchor `loose` as well.
fn anchor_reaches(strict: &str, loose: &str, piped: bool, suffixing: bool) -> bool {
    if piped {
        strict == loose || extends_dash(strict, loose)
    } else if suffixing {
        strict.ends_with(loose)
    } else {
        strict.starts_with(loose)
    }
}

/// True when the fixed value `value` satisfies the anchoring assertion.
fn anchor_satisfied(value: &str, anchor: &str, piped: bool, suffixing: bool) -> bool {
    if piped {
        value == anchor || extends_dash(value, anchor)
    } else if suffixing {
        value.ends_with(anchor)
    } else {
        value.starts_with(anchor)
    }
}

/// `^=` and `|=` anchor the same end of the value: keep whichever is
/// stricter when one implies the other, fail when they disagree.
fn cross_check_prefix_dash(
    mut prefix: Anchoring,
    mut dash: Anchoring,
) -> Option<(Anchoring, Anchoring)> {
    let (kept_prefix, kept_dash) =
        reconcile_prefix_with_dash(prefix.sensitive.take(), dash.sensitive.take())?;
    prefix.sensitive = kept_prefix;
    dash.sensitive = kept_dash;
    let (kept_prefix, kept_dash) =
        reconcile_prefix_with_dash(prefix.insensitive.take(), dash.insensitive.take())?;
    prefix.insensitive = kept_prefix;
    dash.insensitive = kept_dash;
    Some((prefix, dash))
}

fn reconcile_prefix_with_dash(
    prefix: Option<String>,
    dash: Option<String>,
) -> Option<(Option<String>, Option<String>)> {
    let (Some(prefix_anchor), Some(dash_anchor)) = (&prefix, &dash) else {
        return Some((prefix, dash));
    };
    if dash_anchor.starts_with(prefix_anchor.as_str()) {
        // `|=` on the longer anchor implies the prefix assertion.
        Some((None, dash))
    } else if extends_dash(prefix_anchor, dash_anchor) {
        // The prefix crosses the dash boundary, so it implies the `|=`.
        Some((prefix, None))
    } else {
        trace!(
            target: LOG_TARGET,
            "prefix anchor {prefix_anchor:?} cannot satisfy |= anchor {dash_anchor:?}"
        );
        None
    }
}

/// Fold `*=` assertions into minimal substring sets and validate them
/// against any fixed equality value. A fixed equality subsumes every
/// surviving substring, so the sets come back empty in that case.
fn reconcile_substrings(
    operative: &[&AttributeAssertion],
    equality: &EqualityValues,
) -> Option<(Vec<String>, Vec<String>)> {
    let mut sensitive: Vec<String> = Vec::new();
    let mut insensitive: Vec<String> = Vec::new();
    for assertion in operative
        .iter()
        .filter(|assertion| assertion.operator == AttrOperator::Substring)
    {
        if assertion.case_sensitive {
            let value = &assertion.value;
            // An existing include that contains the new one is stricter.
            if sensitive.iter().any(|existing| existing.contains(value.as_str())) {
                continue;
            }
            sensitive.retain(|existing| !value.contains(existing.as_str()));
            sensitive.push(value.clone());
        } else {
            let folded = fold(&assertion.value);
            if sensitive
                .iter()
                .any(|existing| fold(existing).contains(&folded))
            {
                continue;
            }
            if insensitive.iter().any(|existing| existing.contains(&folded)) {
                continue;
            }
            insensitive.retain(|existing| !folded.contains(existing.as_str()));
            insensitive.push(folded);
        }
    }
    if let Some(value) = &equality.sensitive {
        if sensitive.iter().any(|include| !value.contains(include.as_str())) {
            trace!(target: LOG_TARGET, "substring not contained in fixed value {value:?}");
            return None;
        }
        let folded = fold(value);
        if insensitive.iter().any(|include| !folded.contains(include.as_str())) {
            return None;
        }
        return Some((Vec::new(), Vec::new()));
    }
    if let Some(value) = &equality.insensitive {
        if sensitive.iter().any(|include| !value.contains(&fold(include))) {
            return None;
        }
        if insensitive.iter().any(|include| !value.contains(include.as_str())) {
            return None;
        }
        return Some((Vec::new(), Vec::new()));
    }
    Some((sensitive, insensitive))
}

/// Token-match (`~=`) assertions are independent constraints; only exact
/// duplicates collapse.
fn dedup_token_matches(operative: &[&AttributeAssertion]) -> Vec<(String, bool)> {
    let mut seen: Vec<(String, bool)> = Vec::new();
    for assertion in operative
        .iter()
        .filter(|assertion| assertion.operator == AttrOperator::Includes)
    {
        let entry = (assertion.value.clone(), assertion.case_sensitive);
        if !seen.contains(&entry) {
            seen.push(entry);
        }
    }
    seen
}
