//! Selector structuring: token stream to union-of-chains.
//! Spec: <https://www.w3.org/TR/selectors-3/#selector-syntax>
//!
//! Splits the flat token sequence on commas into union branches and walks
//! each branch right to left (the rightmost compound is the subject),
//! grouping compounds into combinator-linked chain entries. The adjacent
//! and subsequent sibling combinators are conflated: either one appends a
//! sibling slot to the current entry's group.

use crate::tokenizer::{CombinatorToken, SelectorToken, tokenize};
use crate::{
    AttrOperator, AttributeAssertion, Chain, ChainEntry, Combinator, Compound, Error, LOG_TARGET,
    PseudoClass, PseudoElement, SiblingGroup, UnionSelector,
};
use log::debug;

/// Parse a selector string into a union of chains.
///
/// Branches that are provably unsatisfiable on their own (an empty branch,
/// or a compound with two distinct pseudo-elements) contribute nothing to
/// the union.
///
/// # Errors
/// Returns [`Error::Parse`] when the input is not a valid selector.
pub fn parse_selector_list(input: &str) -> Result<UnionSelector, Error> {
    let tokens = tokenize(input)?;
    let mut chains = Vec::new();
    for branch in tokens.split(|token| matches!(token, SelectorToken::Comma)) {
        if let Some(chain) = structure_branch(branch) {
            chains.push(chain);
        }
    }
    debug!(
        target: LOG_TARGET,
        "parsed {input:?} into {} union branch(es)",
        chains.len()
    );
    Ok(UnionSelector { chains })
}

/// Structure one union branch into a chain, walking right to left.
fn structure_branch(tokens: &[SelectorToken]) -> Option<Chain> {
    if tokens.is_empty() {
        return None;
    }
    let mut entries = Vec::new();
    // Sibling slots of the entry being built; slot 0 is the primary
    // compound. Tokens arrive reversed because of the walk direction.
    let mut slots: Vec<Vec<&SelectorToken>> = vec![Vec::new()];
    let mut combinator = Combinator::Subject;
    for token in tokens.iter().rev() {
        match token {
            SelectorToken::Combinator(
                CombinatorToken::NextSibling | CombinatorToken::SubsequentSibling,
            ) => {
                slots.push(Vec::new());
            }
            SelectorToken::Combinator(step @ (CombinatorToken::Child | CombinatorToken::Descendant)) => {
                entries.push(close_entry(&mut slots, combinator)?);
                combinator = match step {
                    CombinatorToken::Child => Combinator::Parent,
                    _ => Combinator::Ancestor,
                };
            }
            other => slots.last_mut()?.push(other),
        }
    }
    entries.push(close_entry(&mut slots, combinator)?);
    entries.reverse();
    Some(Chain { entries })
}

/// Turn the accumulated sibling slots into a chain entry and reset them.
fn close_entry(
    slots: &mut Vec<Vec<&SelectorToken>>,
    combinator: Combinator,
) -> Option<ChainEntry> {
    let finished = core::mem::replace(slots, vec![Vec::new()]);
    let mut members = Vec::new();
    for mut run in finished {
        run.reverse();
        members.push(extract_compound(&run)?);
    }
    Some(ChainEntry {
        combinator,
        group: SiblingGroup { members },
    })
}

/// Fold a run of non-combinator tokens into a compound selector.
/// Returns `None` when the run is empty or cannot match any element.
fn extract_compound(run: &[&SelectorToken]) -> Option<Compound> {
    if run.is_empty() {
        return None;
    }
    let mut compound = Compound::default();
    for token in run {
        match token {
            SelectorToken::Type { name } => {
                if compound
                    .element_type
                    .as_deref()
                    .is_some_and(|existing| existing != "*" && existing != name && name != "*")
                {
                    return None;
                }
                if compound.element_type.as_deref().is_none_or(|t| t == "*") {
                    compound.element_type = Some(name.clone());
                }
            }
            SelectorToken::Universal => {
                if compound.element_type.is_none() {
                    compound.element_type = Some("*".to_owned());
                }
            }
            SelectorToken::Id { name } => compound.attributes.push(AttributeAssertion {
                key: "id".to_owned(),
                operator: AttrOperator::Equals,
                value: name.clone(),
                case_sensitive: true,
            }),
            SelectorToken::Class { name } => compound.attributes.push(AttributeAssertion {
                key: "class".to_owned(),
                operator: AttrOperator::Includes,
                value: name.clone(),
                case_sensitive: true,
            }),
            SelectorToken::Attribute {
                key,
                operator,
                value,
                case_sensitive,
            } => compound.attributes.push(AttributeAssertion {
                key: key.clone(),
                operator: *operator,
                value: value.clone(),
                case_sensitive: *case_sensitive,
            }),
            SelectorToken::PseudoClass { name, argument } => {
                let pseudo = PseudoClass {
                    name: name.clone(),
                    argument: argument.clone(),
                };
                if !compound.pseudo_classes.contains(&pseudo) {
                    compound.pseudo_classes.push(pseudo);
                }
            }
            SelectorToken::PseudoElement { name, argument } => {
                let pseudo = PseudoElement {
                    name: name.clone(),
                    argument: argument.clone(),
                };
                if compound
                    .pseudo_element
                    .as_ref()
                    .is_some_and(|existing| *existing != pseudo)
                {
                    return None;
                }
                compound.pseudo_element = Some(pseudo);
            }
            SelectorToken::Combinator(_) | SelectorToken::Comma => return None,
        }
    }
    Some(compound)
}
