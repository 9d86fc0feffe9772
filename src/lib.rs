//! CSS selector intersection.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! Given one or more CSS selector strings, [`intersect`] computes a single
//! selector string whose matched element set equals the intersection of the
//! matched sets of the inputs, or the empty string when the intersection is
//! provably empty. The library is pure and synchronous: no I/O, no global
//! state, referentially transparent.
//!
//! Tokenization is delegated to the `cssparser` crate; everything above the
//! token stream (structuring, attribute reconciliation, compound and chain
//! intersection, stringification) is implemented here. CSS namespaces are
//! not supported, and the adjacent (`+`) and general (`~`) sibling
//! combinators are deliberately conflated into a single sibling relation.

#![forbid(unsafe_code)]

use core::fmt;
use log::debug;

mod attributes;
mod chain;
mod compound;
mod parser;
mod render;
mod tokenizer;

// Re-export public API
pub use attributes::intersect_attributes;
pub use chain::intersect_unions;
pub use parser::parse_selector_list;
pub use tokenizer::{CombinatorToken, SelectorToken, tokenize};

/// Log target used across the crate.
pub(crate) const LOG_TARGET: &str = "selector_intersect";

/// Attribute selector operators.
/// Spec: Section 8 — Attribute selectors (plus presence form)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[attr]` — the attribute is present.
    Exists,
    /// `[attr=v]` — exact value match.
    Equals,
    /// `[attr~=v]` — `v` is one of the whitespace-separated tokens of the value.
    Includes,
    /// `[attr|=v]` — the value is `v` or starts with `v` followed by `-`.
    DashMatch,
    /// `[attr^=v]` — the value starts with `v`.
    Prefix,
    /// `[attr$=v]` — the value ends with `v`.
    Suffix,
    /// `[attr*=v]` — the value contains `v`.
    Substring,
}

impl AttrOperator {
    /// The CSS source form of the operator (empty for presence).
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::Substring => "*=",
        }
    }
}

/// One assertion over a single attribute key.
/// Spec: Section 8 — Attribute selectors
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeAssertion {
    /// Attribute name, ASCII lower-cased (attribute names match
    /// case-insensitively in HTML).
    pub key: String,
    /// The comparison operator; `Exists` carries no value.
    pub operator: AttrOperator,
    /// The unquoted, unescaped comparison value. Empty for `Exists`.
    pub value: String,
    /// False when the selector carried the `i` flag.
    pub case_sensitive: bool,
}

/// A pseudo-class such as `:hover` or `:nth-child(2n+1)`.
/// Arguments are kept as opaque raw text; no argument arithmetic is done.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PseudoClass {
    pub name: String,
    pub argument: Option<String>,
}

/// A pseudo-element such as `::before` or `::slotted(span)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PseudoElement {
    pub name: String,
    pub argument: Option<String>,
}

/// A compound selector: everything between two combinators.
/// Spec: Section 5, 6, 7, 8 — simple selector sequences
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound {
    /// Optional element type name, possibly `"*"`.
    pub element_type: Option<String>,
    /// At most one pseudo-element; two distinct ones cannot both hold.
    pub pseudo_element: Option<PseudoElement>,
    /// Pseudo-classes with set semantics (structural equality).
    pub pseudo_classes: Vec<PseudoClass>,
    /// Attribute assertions; the list is a conjunction and may carry
    /// several assertions per key. Id and class selectors are folded in
    /// here as `[id=..]` and `[class~=..]`.
    pub attributes: Vec<AttributeAssertion>,
}

impl Compound {
    /// True for the bare universal selector (`*` or an empty compound),
    /// which constrains nothing.
    #[inline]
    pub fn is_universal(&self) -> bool {
        self.pseudo_element.is_none()
            && self.pseudo_classes.is_empty()
            && self.attributes.is_empty()
            && self.element_type.as_deref().is_none_or(|name| name == "*")
    }
}

/// Relation between a chain entry and the entry to its right.
/// Spec: Section 11 — Combinators (siblings are handled inside groups)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (whitespace).
    Ancestor,
    /// Child combinator (`>`).
    Parent,
    /// No relation; only the final (subject) entry carries this.
    Subject,
}

/// Compound selectors connected by sibling combinators.
///
/// `members[0]` is the primary compound, the one the entry's combinator
/// relates to the rest of the chain; the remaining members are sibling
/// constraints sharing the same parent context. Sibling constraints form an
/// unordered set: order is only fixed at stringification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiblingGroup {
    pub members: Vec<Compound>,
}

/// One combinator-linked step of a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainEntry {
    pub combinator: Combinator,
    pub group: SiblingGroup,
}

/// A complex selector, left to right; the last entry is the subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chain {
    pub entries: Vec<ChainEntry>,
}

/// A comma-separated list of chains.
/// Spec: Section 4 — Groups of selectors
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnionSelector {
    pub chains: Vec<Chain>,
}

/// Errors surfaced by parsing and intersection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The input string is not a valid CSS selector. Carries the source
    /// location and a description of the offending token.
    Parse(String),
    /// `intersect` requires at least one selector.
    NoSelectors,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid selector: {message}"),
            Self::NoSelectors => write!(f, "at least one selector is required"),
        }
    }
}

impl std::error::Error for Error {}

/// Intersect one or more CSS selectors into a single selector string.
///
/// The empty output string denotes a provably empty intersection; it is not
/// an error. A single selector is returned unchanged apart from a
/// parse/stringify round trip. With three or more selectors the result is
/// the left-associative fold of the binary intersection.
///
/// # Errors
/// Returns [`Error::Parse`] when any input fails to parse as a selector,
/// even if an earlier binary step already produced the empty union, and
/// [`Error::NoSelectors`] when `selectors` is empty.
pub fn intersect<S: AsRef<str>>(selectors: &[S]) -> Result<String, Error> {
    let Some((first, rest)) = selectors.split_first() else {
        return Err(Error::NoSelectors);
    };
    let mut union = parse_selector_list(first.as_ref())?;
    for selector in rest {
        let parsed = parse_selector_list(selector.as_ref())?;
        union = intersect_unions(&union, &parsed);
    }
    let rendered = union.to_string();
    debug!(
        target: LOG_TARGET,
        "intersected {} selector(s) into {rendered:?}",
        selectors.len()
    );
    Ok(rendered)
}
