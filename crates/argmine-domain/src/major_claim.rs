//! Major claim selection
//!
//! Comparing every component of one statement against every component of
//! another explodes quickly. Instead each statement is represented by a single
//! claim, picked by a deterministic heuristic until a model for the task exists:
//!
//! 1. most inbound relations,
//! 2. then fewest outbound relations,
//! 3. then highest score.
//!
//! Ties beyond these rules keep the input order.

use crate::{Component, Identifier, Relation};
use std::cmp::Ordering;

/// Relation counts for one component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Degree {
    /// Edges where the component is the target
    pub inbound: usize,

    /// Edges where the component is the source
    pub outbound: usize,
}

/// Count inbound and outbound edges of `component` among `relations`
pub fn degree(component: &Identifier, relations: &[Relation]) -> Degree {
    relations.iter().fold(Degree::default(), |mut degree, relation| {
        if &relation.target == component {
            degree.inbound += 1;
        }
        if &relation.source == component {
            degree.outbound += 1;
        }
        degree
    })
}

/// Pick the major claim of a statement
///
/// `components` are the statement's components and `relations` every edge
/// touching them. Returns `None` when there is no claim.
pub fn select_major_claim<'a>(
    components: &'a [Component],
    relations: &[Relation],
) -> Option<&'a Component> {
    components
        .iter()
        .filter(|component| component.is_claim())
        .map(|component| (component, degree(&component.identifier, relations)))
        .min_by(|(a, a_degree), (b, b_degree)| rank(a, a_degree, b, b_degree))
        .map(|(component, _)| component)
}

fn rank(a: &Component, a_degree: &Degree, b: &Component, b_degree: &Degree) -> Ordering {
    b_degree
        .inbound
        .cmp(&a_degree.inbound)
        .then(a_degree.outbound.cmp(&b_degree.outbound))
        .then(b.score.total_cmp(&a.score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentLabel, IdentityEngine, RelationLabel};

    fn component(name: &str, label: ComponentLabel, score: f64) -> Component {
        let engine = IdentityEngine::default();
        Component {
            identifier: engine.identifier(&[name]),
            statement: engine.identifier(&["statement"]),
            start: 0,
            end: name.len(),
            label,
            score,
            fragment: name.to_string(),
            manual_annotation: false,
        }
    }

    fn edge(source: &Component, target: &Component) -> Relation {
        Relation::new(
            source.identifier.clone(),
            target.identifier.clone(),
            RelationLabel::Support,
            0.9,
        )
    }

    #[test]
    fn test_no_claims() {
        let premise = component("premise", ComponentLabel::Premise, 0.99);
        assert!(select_major_claim(&[premise], &[]).is_none());
        assert!(select_major_claim(&[], &[]).is_none());
    }

    #[test]
    fn test_most_inbound_wins() {
        let a = component("a", ComponentLabel::Claim, 0.99);
        let b = component("b", ComponentLabel::Claim, 0.60);
        let p = component("p", ComponentLabel::Premise, 0.90);
        let relations = vec![edge(&p, &b)];
        let components = vec![a, b.clone(), p];
        let major = select_major_claim(&components, &relations).unwrap();
        assert_eq!(major.identifier, b.identifier);
    }

    #[test]
    fn test_fewest_outbound_breaks_inbound_tie() {
        let a = component("a", ComponentLabel::Claim, 0.99);
        let b = component("b", ComponentLabel::Claim, 0.50);
        let p = component("p", ComponentLabel::Premise, 0.90);
        // both have one inbound, `a` also argues for `b`
        let relations = vec![edge(&p, &a), edge(&a, &b)];
        let components = vec![a, b.clone(), p];
        let major = select_major_claim(&components, &relations).unwrap();
        assert_eq!(major.identifier, b.identifier);
    }

    #[test]
    fn test_score_breaks_remaining_tie() {
        let a = component("a", ComponentLabel::Claim, 0.70);
        let b = component("b", ComponentLabel::Claim, 0.95);
        let components = vec![a, b.clone()];
        let major = select_major_claim(&components, &[]).unwrap();
        assert_eq!(major.identifier, b.identifier);
    }

    #[test]
    fn test_full_tie_keeps_input_order() {
        let a = component("a", ComponentLabel::Claim, 0.80);
        let b = component("b", ComponentLabel::Claim, 0.80);
        let components = vec![a.clone(), b];
        let major = select_major_claim(&components, &[]).unwrap();
        assert_eq!(major.identifier, a.identifier);
    }

    #[test]
    fn test_premise_never_selected() {
        let claim = component("claim", ComponentLabel::Claim, 0.10);
        let premise = component("premise", ComponentLabel::Premise, 0.99);
        let relations = vec![edge(&claim, &premise), edge(&claim, &premise)];
        let components = vec![premise, claim.clone()];
        let major = select_major_claim(&components, &relations).unwrap();
        assert_eq!(major.identifier, claim.identifier);
    }

    #[test]
    fn test_degree_counts_both_sides() {
        let a = component("a", ComponentLabel::Claim, 0.5);
        let b = component("b", ComponentLabel::Claim, 0.5);
        let relations = vec![edge(&a, &b), edge(&b, &a)];
        assert_eq!(degree(&a.identifier, &relations), Degree { inbound: 1, outbound: 1 });
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::{ComponentLabel, IdentityEngine, RelationLabel};
    use proptest::prelude::*;

    proptest! {
        /// Property: selection is deterministic and only ever returns a claim
        #[test]
        fn test_selection_deterministic(
            specs in prop::collection::vec((any::<bool>(), 0.0f64..1.0), 0..8),
            edges in prop::collection::vec((0usize..8, 0usize..8), 0..16),
        ) {
            let engine = IdentityEngine::default();
            let components: Vec<Component> = specs
                .iter()
                .enumerate()
                .map(|(i, (is_claim, score))| Component {
                    identifier: engine.identifier(&[i.to_string()]),
                    statement: engine.identifier(&["s"]),
                    start: 0,
                    end: 1,
                    label: if *is_claim { ComponentLabel::Claim } else { ComponentLabel::Premise },
                    score: *score,
                    fragment: i.to_string(),
                    manual_annotation: false,
                })
                .collect();
            let relations: Vec<Relation> = edges
                .iter()
                .filter(|(s, t)| *s < components.len() && *t < components.len() && s != t)
                .map(|(s, t)| Relation::new(
                    components[*s].identifier.clone(),
                    components[*t].identifier.clone(),
                    RelationLabel::Attack,
                    0.5,
                ))
                .collect();

            let first = select_major_claim(&components, &relations).map(|c| c.identifier.clone());
            let second = select_major_claim(&components, &relations).map(|c| c.identifier.clone());
            prop_assert_eq!(&first, &second);

            let has_claim = components.iter().any(|c| c.is_claim());
            prop_assert_eq!(first.is_some(), has_claim);
            if let Some(id) = first {
                let chosen = components.iter().find(|c| c.identifier == id).unwrap();
                prop_assert!(chosen.is_claim());
            }
        }
    }
}
