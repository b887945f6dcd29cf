//! Relation candidates and the classify-and-upsert step
//!
//! Used twice per run: for the components inside one statement, and for the
//! major claims of linked statements.

use crate::config::PipelineConfig;
use crate::types::{FailureKind, PipelineFailure};
use argmine_domain::traits::{GraphStore, Prediction, TextPair, Upsert};
use argmine_domain::{Component, Relation, RelationLabel};
use argmine_gatekeeper::Gatekeeper;
use tracing::debug;

/// An ordered component pair waiting for the relation classifier
#[derive(Debug, Clone, PartialEq)]
pub struct RelationCandidate<'a> {
    /// Would-be source
    pub source: &'a Component,

    /// Would-be target
    pub target: &'a Component,
}

impl<'a> RelationCandidate<'a> {
    /// Pair two components
    pub fn new(source: &'a Component, target: &'a Component) -> Self {
        Self { source, target }
    }

    /// Whether the pair satisfies the directionality rule
    pub fn is_allowed(&self, claim_targets_only: bool) -> bool {
        self.source.identifier != self.target.identifier
            && (!claim_targets_only || self.target.is_claim())
    }

    /// The classifier input for this pair
    pub fn job(&self) -> TextPair {
        TextPair::new(&self.source.fragment, &self.target.fragment)
    }
}

/// All ordered pairs `(i, j)`, `i != j`, of one statement's components whose
/// target is a Claim
///
/// Premises may only be sources inside a statement. Pairs come out in
/// `(i, j)` lexicographic order.
pub fn candidate_pairs(components: &[Component]) -> Vec<RelationCandidate<'_>> {
    components
        .iter()
        .enumerate()
        .flat_map(|(i, source)| {
            components
                .iter()
                .enumerate()
                .filter(move |(j, _)| *j != i)
                .map(move |(_, target)| RelationCandidate::new(source, target))
        })
        .filter(|candidate| candidate.is_allowed(true))
        .collect()
}

/// The label of a classifier result worth keeping, if any
///
/// `noRel`, unknown labels and scores below `min_score` yield `None`.
pub fn accepted_label(prediction: &Prediction, min_score: f64) -> Option<RelationLabel> {
    if prediction.score < min_score {
        return None;
    }
    RelationLabel::parse(&prediction.label)
}

/// Keep accepted predictions and get-or-create an edge for each
///
/// `predictions` must be aligned with `candidates`. Returns the number of
/// edges created; existing edges are left as they are.
pub fn persist_relations<S: GraphStore>(
    store: &mut S,
    gatekeeper: &Gatekeeper,
    config: &PipelineConfig,
    candidates: &[RelationCandidate<'_>],
    predictions: &[Prediction],
    failures: &mut Vec<PipelineFailure>,
) -> Result<usize, S::Error> {
    let mut created = 0;

    for (candidate, prediction) in candidates.iter().zip(predictions) {
        let Some(label) = accepted_label(prediction, config.min_relation_score) else {
            debug!(
                source = %candidate.source.identifier,
                target = %candidate.target.identifier,
                label = %prediction.label,
                score = prediction.score,
                "relation not kept"
            );
            continue;
        };

        let relation = Relation::new(
            candidate.source.identifier.clone(),
            candidate.target.identifier.clone(),
            label,
            prediction.score,
        );

        let validation = gatekeeper.validate_relation(&relation);
        if !validation.is_accepted() {
            failures.push(PipelineFailure::new(
                FailureKind::Relation,
                validation.describe(),
                format!("{} -> {}", candidate.source.fragment, candidate.target.fragment),
            ));
            continue;
        }

        if let Upsert::Created(_) = store.upsert_relation(relation)? {
            created += 1;
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmine_domain::{ComponentLabel, IdentityEngine};

    fn component(name: &str, label: ComponentLabel) -> Component {
        let engine = IdentityEngine::default();
        Component {
            identifier: engine.identifier(&[name]),
            statement: engine.identifier(&["statement"]),
            start: 0,
            end: name.len(),
            label,
            score: 0.9,
            fragment: name.to_string(),
            manual_annotation: false,
        }
    }

    #[test]
    fn test_premise_never_a_target() {
        let components = vec![
            component("claim one", ComponentLabel::Claim),
            component("premise", ComponentLabel::Premise),
            component("claim two", ComponentLabel::Claim),
        ];
        let pairs: Vec<(String, String)> = candidate_pairs(&components)
            .iter()
            .map(|c| (c.source.fragment.clone(), c.target.fragment.clone()))
            .collect();

        let expected = [
            ("claim one", "claim two"),
            ("premise", "claim one"),
            ("premise", "claim two"),
            ("claim two", "claim one"),
        ];
        assert_eq!(
            pairs,
            expected
                .iter()
                .map(|(s, t)| (s.to_string(), t.to_string()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_no_pairs_for_single_component() {
        let components = vec![component("claim", ComponentLabel::Claim)];
        assert!(candidate_pairs(&components).is_empty());
        assert!(candidate_pairs(&[]).is_empty());
    }

    #[test]
    fn test_only_premises_yield_no_pairs() {
        let components = vec![
            component("p1", ComponentLabel::Premise),
            component("p2", ComponentLabel::Premise),
        ];
        assert!(candidate_pairs(&components).is_empty());
    }

    #[test]
    fn test_is_allowed_policy_switch() {
        let claim = component("claim", ComponentLabel::Claim);
        let premise = component("premise", ComponentLabel::Premise);
        let to_premise = RelationCandidate::new(&claim, &premise);
        assert!(!to_premise.is_allowed(true));
        assert!(to_premise.is_allowed(false));
        assert!(!RelationCandidate::new(&claim, &claim).is_allowed(false));
    }

    #[test]
    fn test_accepted_label() {
        assert_eq!(
            accepted_label(&Prediction::new("Support", 0.8), 0.5),
            Some(RelationLabel::Support)
        );
        assert_eq!(
            accepted_label(&Prediction::new("Attack", 0.5), 0.5),
            Some(RelationLabel::Attack)
        );
        assert_eq!(accepted_label(&Prediction::new("Attack", 0.49), 0.5), None);
        assert_eq!(accepted_label(&Prediction::new("noRel", 0.99), 0.5), None);
    }

    #[test]
    fn test_job_is_source_then_target() {
        let a = component("first", ComponentLabel::Premise);
        let b = component("second", ComponentLabel::Claim);
        assert_eq!(RelationCandidate::new(&a, &b).job(), TextPair::new("first", "second"));
    }
}
