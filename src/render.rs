//! Canonical stringification of selector structures.
//! Spec: <https://www.w3.org/TR/selectors-3/#selector-syntax>
//!
//! Renders compounds in a stable component order (type, pseudo-element,
//! classes, attributes, pseudo-classes, ids), picks quotes so attribute
//! values survive a tokenizer round trip, and joins sibling-group members
//! with `~` (the only sibling relation this library knows). Identical union
//! branches render once.

use crate::{
    AttrOperator, AttributeAssertion, Chain, Combinator, Compound, PseudoClass, PseudoElement,
    SiblingGroup, UnionSelector,
};
use core::fmt;

/// True for values that can be written back as a bare CSS identifier.
fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '-') {
        return false;
    }
    if first == '-' {
        // A lone '-' or a '-' followed by a digit is not an identifier.
        match value.chars().nth(1) {
            None => return false,
            Some(second) if second.is_ascii_digit() => return false,
            Some(_) => {}
        }
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

/// `.name` is only an equivalent spelling of a case-sensitive
/// `[class~=name]` with an identifier value.
fn class_shorthand(assertion: &AttributeAssertion) -> Option<&str> {
    (assertion.key == "class"
        && assertion.operator == AttrOperator::Includes
        && assertion.case_sensitive
        && is_identifier(&assertion.value))
    .then_some(assertion.value.as_str())
}

/// `#name` is only an equivalent spelling of a case-sensitive `[id=name]`
/// with an identifier value.
fn id_shorthand(assertion: &AttributeAssertion) -> Option<&str> {
    (assertion.key == "id"
        && assertion.operator == AttrOperator::Equals
        && assertion.case_sensitive
        && is_identifier(&assertion.value))
    .then_some(assertion.value.as_str())
}

/// Quote an attribute value: double quotes when the value contains a
/// single quote, single quotes otherwise; the quote character and
/// backslashes are escaped so the output re-tokenizes to the same value.
fn quote_value(value: &str) -> String {
    let quote = if value.contains('\'') { '"' } else { '\'' };
    let mut out = String::with_capacity(value.len().saturating_add(2));
    out.push(quote);
    for ch in value.chars() {
        if ch == quote || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push(quote);
    out
}

fn write_attribute(f: &mut fmt::Formatter<'_>, assertion: &AttributeAssertion) -> fmt::Result {
    if assertion.operator == AttrOperator::Exists {
        return write!(f, "[{}]", assertion.key);
    }
    write!(
        f,
        "[{}{}{}",
        assertion.key,
        assertion.operator.as_str(),
        quote_value(&assertion.value)
    )?;
    if !assertion.case_sensitive {
        f.write_str(" i")?;
    }
    f.write_str("]")
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, ":{}({argument})", self.name),
            None => write!(f, ":{}", self.name),
        }
    }
}

impl fmt::Display for PseudoElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "::{}({argument})", self.name),
            None => write!(f, "::{}", self.name),
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bare = self.pseudo_element.is_none()
            && self.pseudo_classes.is_empty()
            && self.attributes.is_empty();
        match self.element_type.as_deref() {
            Some("*") | None if bare => return f.write_str("*"),
            Some("*") | None => {}
            Some(name) => f.write_str(name)?,
        }
        if let Some(pseudo) = &self.pseudo_element {
            write!(f, "{pseudo}")?;
        }
        for class in self.attributes.iter().filter_map(class_shorthand) {
            write!(f, ".{class}")?;
        }
        for assertion in self
            .attributes
            .iter()
            .filter(|assertion| class_shorthand(assertion).is_none() && id_shorthand(assertion).is_none())
        {
            write_attribute(f, assertion)?;
        }
        for pseudo in &self.pseudo_classes {
            write!(f, "{pseudo}")?;
        }
        for id in self.attributes.iter().filter_map(id_shorthand) {
            write!(f, "#{id}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SiblingGroup {
    /// Members print primary-last: the primary carries the combinator to
    /// the rest of the chain, so siblings precede it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for member in self.members.iter().rev() {
            if !first {
                f.write_str(" ~ ")?;
            }
            write!(f, "{member}")?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut previous: Option<Combinator> = None;
        for entry in &self.entries {
            match previous {
                Some(Combinator::Parent) => f.write_str(" > ")?,
                Some(_) => f.write_str(" ")?,
                None => {}
            }
            write!(f, "{}", entry.group)?;
            previous = Some(entry.combinator);
        }
        Ok(())
    }
}

impl fmt::Display for UnionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen: Vec<String> = Vec::new();
        for chain in &self.chains {
            let rendered = chain.to_string();
            if !seen.contains(&rendered) {
                seen.push(rendered);
            }
        }
        f.write_str(&seen.join(", "))
    }
}
