//! Chain intersection: aligning combinator-linked selector chains.
//! Spec: <https://www.w3.org/TR/selectors-3/#combinators>
//!
//! Two chains are aligned right to left (the subjects pair up, then their
//! contexts), padding the shorter chain with universal ancestor entries.
//! Matching combinators intersect their groups; a child paired with a
//! descendant splits into two entries; two descendants with different
//! groups also split, and the split is order-free, so both orders are
//! emitted into the output union.

use crate::compound::intersect_compounds;
use crate::{
    Chain, ChainEntry, Combinator, Compound, LOG_TARGET, SiblingGroup, UnionSelector,
};
use log::{trace, warn};

/// Fan-out guard for the swap enumeration. A chain would need this many
/// order-free descendant splits before alternatives get dropped.
const MAX_SWAP_MARKS: usize = 12;

/// Intersect two unions of chains: every branch of one against every
/// branch of the other, flattened into one union.
pub fn intersect_unions(a: &UnionSelector, b: &UnionSelector) -> UnionSelector {
    let mut chains = Vec::new();
    for left in &a.chains {
        for right in &b.chains {
            for chain in intersect_chains(left, right) {
                if !chains.contains(&chain) {
                    chains.push(chain);
                }
            }
        }
    }
    UnionSelector { chains }
}

/// Intersect two chains. The result is a set of equivalent alternatives
/// (order-free splits fan out); the empty set means the pair cannot match
/// any element.
pub(crate) fn intersect_chains(a: &Chain, b: &Chain) -> Vec<Chain> {
    let length = a.entries.len().max(b.entries.len());
    let left = pad_entries(&a.entries, length);
    let right = pad_entries(&b.entries, length);
    // Output entries, each flagged when it may swap with its predecessor.
    let mut out: Vec<(ChainEntry, bool)> = Vec::new();
    for (left_entry, right_entry) in left.iter().zip(right.iter()) {
        match (left_entry.combinator, right_entry.combinator) {
            (Combinator::Subject, Combinator::Subject)
            | (Combinator::Parent, Combinator::Parent) => {
                let Some(group) = intersect_groups(&left_entry.group, &right_entry.group) else {
                    return Vec::new();
                };
                out.push((
                    ChainEntry {
                        combinator: left_entry.combinator,
                        group,
                    },
                    false,
                ));
            }
            (Combinator::Ancestor, Combinator::Ancestor) => {
                if left_entry.group == right_entry.group {
                    // Identical constraints need only one witness.
                    if !is_universal_group(&left_entry.group) {
                        out.push((left_entry.clone(), false));
                    }
                } else {
                    let keep_left = !is_universal_group(&left_entry.group);
                    let keep_right = !is_universal_group(&right_entry.group);
                    if keep_left {
                        out.push((left_entry.clone(), false));
                    }
                    if keep_right {
                        out.push((right_entry.clone(), keep_left));
                    }
                }
            }
            (Combinator::Parent, Combinator::Ancestor) => {
                out.extend(split_parent_ancestor(left_entry, right_entry));
            }
            (Combinator::Ancestor, Combinator::Parent) => {
                out.extend(split_parent_ancestor(right_entry, left_entry));
            }
            _ => {
                // Subject entries only ever pair with each other once the
                // chains are length-aligned.
                trace!(target: LOG_TARGET, "misaligned chain entries");
                return Vec::new();
            }
        }
    }
    enumerate_swaps(&out)
}

/// Rewrite a child entry paired with a descendant entry. The descendant
/// constraint sits above the parent, unless the parent itself witnesses it
/// (equal groups) or it constrains nothing (universal).
fn split_parent_ancestor(
    parent: &ChainEntry,
    ancestor: &ChainEntry,
) -> Vec<(ChainEntry, bool)> {
    if ancestor.group == parent.group || is_universal_group(&ancestor.group) {
        return vec![(
            ChainEntry {
                combinator: Combinator::Parent,
                group: parent.group.clone(),
            },
            false,
        )];
    }
    vec![
        (
            ChainEntry {
                combinator: Combinator::Ancestor,
                group: ancestor.group.clone(),
            },
            false,
        ),
        (
            ChainEntry {
                combinator: Combinator::Parent,
                group: parent.group.clone(),
            },
            false,
        ),
    ]
}

/// Intersect two sibling groups: the primaries merge, and the sibling
/// constraints of both sides union as a set.
fn intersect_groups(a: &SiblingGroup, b: &SiblingGroup) -> Option<SiblingGroup> {
    let (Some(primary_a), Some(primary_b)) = (a.members.first(), b.members.first()) else {
        return None;
    };
    let primary = intersect_compounds(primary_a, primary_b)?;
    let mut members = vec![primary];
    for sibling in a.members.iter().skip(1).chain(b.members.iter().skip(1)) {
        if !members
            .iter()
            .skip(1)
            .any(|existing| existing == sibling)
        {
            members.push(sibling.clone());
        }
    }
    Some(SiblingGroup { members })
}

#[inline]
fn is_universal_group(group: &SiblingGroup) -> bool {
    matches!(group.members.as_slice(), [only] if only.is_universal())
}

/// Left-pad a chain with universal ancestor entries up to `length`.
fn pad_entries(entries: &[ChainEntry], length: usize) -> Vec<ChainEntry> {
    let missing = length.saturating_sub(entries.len());
    let mut out = Vec::with_capacity(length);
    for _ in 0..missing {
        out.push(universal_entry());
    }
    out.extend(entries.iter().cloned());
    out
}

fn universal_entry() -> ChainEntry {
    ChainEntry {
        combinator: Combinator::Ancestor,
        group: SiblingGroup {
            members: vec![Compound {
                element_type: Some("*".to_owned()),
                ..Compound::default()
            }],
        },
    }
}

/// Expand the swap-flagged entries into every equivalent ordering. Each
/// flagged entry may trade places with its predecessor independently, so n
/// flags yield up to 2ⁿ distinct chains.
fn enumerate_swaps(entries: &[(ChainEntry, bool)]) -> Vec<Chain> {
    let mut marks: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, (_, swappable))| (*swappable && index > 0).then_some(index))
        .collect();
    if marks.len() > MAX_SWAP_MARKS {
        warn!(
            target: LOG_TARGET,
            "dropping {} of {} order-free alternatives",
            marks.len().saturating_sub(MAX_SWAP_MARKS),
            marks.len()
        );
        marks.truncate(MAX_SWAP_MARKS);
    }
    let combinations: u32 = 1_u32 << marks.len();
    let mut chains = Vec::new();
    for mask in 0..combinations {
        let mut variant: Vec<ChainEntry> =
            entries.iter().map(|(entry, _)| entry.clone()).collect();
        for (bit, &index) in marks.iter().enumerate() {
            if mask & (1_u32 << bit) != 0 {
                variant.swap(index.saturating_sub(1), index);
            }
        }
        let chain = Chain { entries: variant };
        if !chains.contains(&chain) {
            chains.push(chain);
        }
    }
    chains
}
