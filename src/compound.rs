//! Compound selector intersection.
//! Spec: <https://www.w3.org/TR/selectors-3/#simple-selectors>
//!
//! Merges two compound selectors component-wise: type and pseudo-element
//! conflicts are unsatisfiable, pseudo-classes union as a set, and
//! attribute assertions are grouped per key and handed to the attribute
//! reconciler.

use crate::attributes::intersect_attributes;
use crate::{AttributeAssertion, Compound, LOG_TARGET};
use log::trace;

/// Intersect two compound selectors, or report the pair unsatisfiable.
pub(crate) fn intersect_compounds(a: &Compound, b: &Compound) -> Option<Compound> {
    let element_type = match (a.element_type.as_deref(), b.element_type.as_deref()) {
        (Some(left), Some(right)) if left != right && left != "*" && right != "*" => {
            trace!(target: LOG_TARGET, "type selectors {left:?} and {right:?} cannot both hold");
            return None;
        }
        (Some(left), Some(right)) => Some(if left == "*" { right } else { left }.to_owned()),
        (Some(only), None) | (None, Some(only)) => Some(only.to_owned()),
        (None, None) => None,
    };

    let pseudo_element = match (&a.pseudo_element, &b.pseudo_element) {
        (Some(left), Some(right)) if left != right => {
            trace!(
                target: LOG_TARGET,
                "pseudo-elements ::{} and ::{} cannot both hold",
                left.name, right.name
            );
            return None;
        }
        (Some(pseudo), _) | (_, Some(pseudo)) => Some(pseudo.clone()),
        (None, None) => None,
    };

    let mut pseudo_classes = a.pseudo_classes.clone();
    for pseudo in &b.pseudo_classes {
        if !pseudo_classes.contains(pseudo) {
            pseudo_classes.push(pseudo.clone());
        }
    }

    // Group assertions per key, in first-seen order, and reconcile each
    // group. Any unsatisfiable group sinks the whole compound.
    let mut groups: Vec<(&str, Vec<AttributeAssertion>)> = Vec::new();
    for assertion in a.attributes.iter().chain(&b.attributes) {
        match groups
            .iter_mut()
            .find(|(key, _)| *key == assertion.key.as_str())
        {
            Some((_, list)) => list.push(assertion.clone()),
            None => groups.push((assertion.key.as_str(), vec![assertion.clone()])),
        }
    }
    let mut attributes = Vec::new();
    for (_, group) in groups {
        attributes.extend(intersect_attributes(&group)?);
    }

    Some(Compound {
        element_type,
        pseudo_element,
        pseudo_classes,
        attributes,
    })
}
