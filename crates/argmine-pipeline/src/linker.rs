//! Cross-statement linking
//!
//! An Attack or Support statement may be linked to one Position of the same
//! batch. Each ordered pair that passes [`is_candidate`] is scored by the
//! statement relation classifier; a result counts only when its label is the
//! source's own role and its score clears the threshold.

use crate::config::PipelineConfig;
use argmine_domain::traits::{Prediction, TextPair};
use argmine_domain::{Identifier, LinkState, Statement, StatementRole};

/// An ordered statement pair waiting for the statement relation classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCandidate<'a> {
    /// Attack or Support statement
    pub source: &'a Statement,

    /// Position statement
    pub target: &'a Statement,
}

impl LinkCandidate<'_> {
    /// The classifier input for this pair
    pub fn job(&self) -> TextPair {
        TextPair::new(&self.source.text, &self.target.text)
    }
}

/// Outcome of linking for one source statement
#[derive(Debug, Clone, PartialEq)]
pub enum LinkDecision {
    /// The source relates to `target`
    Linked {
        /// Source statement
        source: Identifier,
        /// Position it attacks or supports
        target: Identifier,
        /// Classifier score
        score: f64,
    },

    /// Every pair of the source was rejected
    NoRelation {
        /// Source statement
        source: Identifier,
    },
}

impl LinkDecision {
    /// The statement the decision is about
    pub fn source(&self) -> &Identifier {
        match self {
            LinkDecision::Linked { source, .. } | LinkDecision::NoRelation { source } => source,
        }
    }
}

/// Whether `(source, target)` should be sent to the classifier
///
/// - the source is an Attack or Support and the target a Position
/// - the source is not manually annotated
/// - the source is unevaluated, unless `override_cached` is set
/// - neither classification score is below the minimum (a missing score passes)
pub fn is_candidate(source: &Statement, target: &Statement, config: &PipelineConfig) -> bool {
    if source.identifier == target.identifier {
        return false;
    }
    if !source.is_argument() || target.role != Some(StatementRole::Position) {
        return false;
    }
    if source.manual_annotation {
        return false;
    }
    if source.link_state() != LinkState::Unevaluated && !config.override_cached {
        return false;
    }

    let confident = |statement: &Statement| {
        statement
            .classification_score
            .is_none_or(|score| score >= config.min_statement_classification_score)
    };
    confident(source) && confident(target)
}

/// Every ordered pair of the batch that passes [`is_candidate`], in `(i, j)` order
pub fn candidate_pairs<'a>(statements: &'a [Statement], config: &PipelineConfig) -> Vec<LinkCandidate<'a>> {
    statements
        .iter()
        .flat_map(|source| {
            statements
                .iter()
                .filter(move |target| is_candidate(source, target, config))
                .map(move |target| LinkCandidate { source, target })
        })
        .collect()
}

/// Whether a classifier result confirms the source's own role
pub fn accepts(source: &Statement, prediction: &Prediction, min_score: f64) -> bool {
    prediction.score >= min_score
        && source.role.is_some()
        && StatementRole::parse(&prediction.label) == source.role
}

/// One decision per source statement, in the order sources first appear
///
/// With several accepted targets the highest score wins, the earliest pair on
/// ties. A source with no accepted target gets [`LinkDecision::NoRelation`].
/// `predictions` must be aligned with `candidates`.
pub fn resolve_links(
    candidates: &[LinkCandidate<'_>],
    predictions: &[Prediction],
    min_score: f64,
) -> Vec<LinkDecision> {
    // (source, best accepted target and score)
    let mut best: Vec<(&Identifier, Option<(&Identifier, f64)>)> = Vec::new();

    for (candidate, prediction) in candidates.iter().zip(predictions) {
        let source = &candidate.source.identifier;
        let index = match best.iter().position(|(id, _)| *id == source) {
            Some(index) => index,
            None => {
                best.push((source, None));
                best.len() - 1
            }
        };

        if !accepts(candidate.source, prediction, min_score) {
            continue;
        }
        let slot = &mut best[index].1;
        if slot.is_none_or(|(_, score)| prediction.score > score) {
            *slot = Some((&candidate.target.identifier, prediction.score));
        }
    }

    best.into_iter()
        .map(|(source, chosen)| match chosen {
            Some((target, score)) => LinkDecision::Linked {
                source: source.clone(),
                target: target.clone(),
                score,
            },
            None => LinkDecision::NoRelation {
                source: source.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmine_domain::{Author, Debate, IdentityEngine, StatementDraft, NO_RELATION_SENTINEL};

    fn statement(text: &str, role: StatementRole, score: f64) -> Statement {
        let engine = IdentityEngine::default();
        let debate = Debate::new(&engine, "d", None);
        let author = Author::new(&engine, text);
        let draft = StatementDraft::new(text, debate.identifier, author.identifier);
        let id = draft.build_identifier(&engine);
        let mut statement = draft.into_statement(id);
        statement.role = Some(role);
        statement.classification_score = Some(score);
        statement
    }

    #[test]
    fn test_only_arguments_to_positions() {
        let config = PipelineConfig::default();
        let support = statement("s1", StatementRole::Support, 0.9);
        let position = statement("s2", StatementRole::Position, 0.95);
        let attack = statement("s3", StatementRole::Attack, 0.9);

        assert!(is_candidate(&support, &position, &config));
        assert!(is_candidate(&attack, &position, &config));
        assert!(!is_candidate(&position, &support, &config));
        assert!(!is_candidate(&support, &attack, &config));
        assert!(!is_candidate(&position, &position, &config));
    }

    #[test]
    fn test_low_classification_score_excluded() {
        let config = PipelineConfig::default();
        let unsure = statement("s1", StatementRole::Support, 0.3);
        let position = statement("s2", StatementRole::Position, 0.95);
        let unsure_position = statement("s3", StatementRole::Position, 0.1);
        let sure = statement("s4", StatementRole::Attack, 0.9);

        assert!(!is_candidate(&unsure, &position, &config));
        assert!(!is_candidate(&sure, &unsure_position, &config));
    }

    #[test]
    fn test_missing_classification_score_passes() {
        let config = PipelineConfig::default();
        let mut manual_position = statement("s2", StatementRole::Position, 0.0);
        manual_position.classification_score = None;
        let support = statement("s1", StatementRole::Support, 0.9);
        assert!(is_candidate(&support, &manual_position, &config));
    }

    #[test]
    fn test_manual_source_excluded() {
        let config = PipelineConfig::default().with_override(true);
        let mut support = statement("s1", StatementRole::Support, 0.9);
        support.manual_annotation = true;
        let position = statement("s2", StatementRole::Position, 0.95);
        assert!(!is_candidate(&support, &position, &config));
    }

    #[test]
    fn test_evaluated_source_needs_override() {
        let position = statement("s2", StatementRole::Position, 0.95);

        let mut rejected = statement("s1", StatementRole::Support, 0.9);
        rejected.relation_score = Some(NO_RELATION_SENTINEL);
        let mut linked = statement("s3", StatementRole::Attack, 0.9);
        linked.related_to = Some(position.identifier.clone());
        linked.relation_score = Some(0.8);

        let config = PipelineConfig::default();
        assert!(!is_candidate(&rejected, &position, &config));
        assert!(!is_candidate(&linked, &position, &config));

        let config = config.with_override(true);
        assert!(is_candidate(&rejected, &position, &config));
        assert!(is_candidate(&linked, &position, &config));
    }

    #[test]
    fn test_accepted_support_link() {
        let support = statement("s1", StatementRole::Support, 0.9);
        let position = statement("s2", StatementRole::Position, 0.95);
        let batch = vec![support.clone(), position.clone()];
        let config = PipelineConfig::default();

        let candidates = candidate_pairs(&batch, &config);
        assert_eq!(candidates.len(), 1);

        let decisions = resolve_links(&candidates, &[Prediction::new("Support", 0.8)], 0.75);
        assert_eq!(
            decisions,
            vec![LinkDecision::Linked {
                source: support.identifier,
                target: position.identifier,
                score: 0.8,
            }]
        );
    }

    #[test]
    fn test_label_mismatch_is_no_relation() {
        let support = statement("s1", StatementRole::Support, 0.9);
        let position = statement("s2", StatementRole::Position, 0.95);
        let candidates = [LinkCandidate {
            source: &support,
            target: &position,
        }];

        let decisions = resolve_links(&candidates, &[Prediction::new("Attack", 0.9)], 0.75);
        assert_eq!(
            decisions,
            vec![LinkDecision::NoRelation {
                source: support.identifier.clone()
            }]
        );

        let decisions = resolve_links(&candidates, &[Prediction::new("Support", 0.7)], 0.75);
        assert!(matches!(decisions[0], LinkDecision::NoRelation { .. }));
    }

    #[test]
    fn test_best_target_wins() {
        let attack = statement("s1", StatementRole::Attack, 0.9);
        let p1 = statement("p1", StatementRole::Position, 0.9);
        let p2 = statement("p2", StatementRole::Position, 0.9);
        let p3 = statement("p3", StatementRole::Position, 0.9);
        let candidates = [
            LinkCandidate { source: &attack, target: &p1 },
            LinkCandidate { source: &attack, target: &p2 },
            LinkCandidate { source: &attack, target: &p3 },
        ];
        let predictions = [
            Prediction::new("Attack", 0.8),
            Prediction::new("Attack", 0.9),
            Prediction::new("Attack", 0.9),
        ];

        let decisions = resolve_links(&candidates, &predictions, 0.5);
        assert_eq!(decisions.len(), 1);
        match &decisions[0] {
            LinkDecision::Linked { target, score, .. } => {
                assert_eq!(target, &p2.identifier);
                assert_eq!(*score, 0.9);
            }
            other => panic!("expected a link, got {:?}", other),
        }
    }

    #[test]
    fn test_decisions_follow_source_order() {
        let s1 = statement("s1", StatementRole::Attack, 0.9);
        let s2 = statement("s2", StatementRole::Support, 0.9);
        let p = statement("p", StatementRole::Position, 0.9);
        let batch = vec![s1.clone(), p, s2.clone()];

        let candidates = candidate_pairs(&batch, &PipelineConfig::default());
        let predictions = vec![Prediction::new("Position", 1.0); candidates.len()];
        let decisions = resolve_links(&candidates, &predictions, 0.5);

        let sources: Vec<_> = decisions.iter().map(LinkDecision::source).collect();
        assert_eq!(sources, vec![&s1.identifier, &s2.identifier]);
    }
}
