//! Argmine Scoring Layer
//!
//! Implementations of the `ArgumentScorer` trait from `argmine-domain`.
//!
//! # Scorers
//!
//! - `MockScorer`: Deterministic scripted scorer for testing
//! - `HttpScorer`: Client for model-serving endpoints (one URL per model)
//!
//! # Examples
//!
//! ```
//! use argmine_scoring::MockScorer;
//! use argmine_domain::traits::{ArgumentScorer, Prediction};
//!
//! let mut scorer = MockScorer::new();
//! scorer.add_statement("God must stay out of the law.", Prediction::new("Attack", 0.9));
//! let prediction = scorer.classify_statement("God must stay out of the law.").unwrap();
//! assert_eq!(prediction.label, "Attack");
//! ```

#![warn(missing_docs)]

pub mod http;

use argmine_domain::traits::{ArgumentScorer, Prediction, TaggedSpan, TextPair};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use http::{HttpScorer, ScorerConfig};

/// Label the relation classifiers use for "no relation"
pub const NO_RELATION_LABEL: &str = "noRel";

/// Errors that can occur during scoring
#[derive(Error, Debug)]
pub enum ScoringError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from a model endpoint
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Batch response not aligned with the request
    #[error("Batch mismatch: sent {expected} inputs, got {actual} predictions")]
    BatchMismatch {
        /// Inputs sent
        expected: usize,
        /// Predictions received
        actual: usize,
    },

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Scoring error: {0}")]
    Other(String),
}

/// Map the label spellings used by the different models onto one vocabulary
///
/// BIO prefixes are dropped. Unknown labels are returned trimmed but
/// otherwise untouched so callers can skip them.
///
/// # Examples
///
/// ```
/// use argmine_scoring::normalize_label;
///
/// assert_eq!(normalize_label("B-CL"), "Claim");
/// assert_eq!(normalize_label("sup"), "Support");
/// assert_eq!(normalize_label("NOREL"), "noRel");
/// assert_eq!(normalize_label("LABEL_3"), "LABEL_3");
/// ```
pub fn normalize_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_prefix("B-")
        .or_else(|| trimmed.strip_prefix("I-"))
        .unwrap_or(trimmed);

    let normalized = match bare.to_lowercase().as_str() {
        "claim" | "cl" => "Claim",
        "premise" | "pr" => "Premise",
        "attack" | "att" => "Attack",
        "support" | "sup" => "Support",
        "norel" | "no_rel" | "none" => NO_RELATION_LABEL,
        "position" => "Position",
        _ => bare,
    };
    normalized.to_string()
}

/// Fail unless a batch response has one prediction per input
pub fn check_alignment(expected: usize, predictions: &[Prediction]) -> Result<(), ScoringError> {
    if predictions.len() == expected {
        Ok(())
    } else {
        Err(ScoringError::BatchMismatch {
            expected,
            actual: predictions.len(),
        })
    }
}

/// One of the four model calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScorerCall {
    /// Component tagging
    TagComponents,
    /// Component relation classification
    ClassifyRelations,
    /// Statement classification
    ClassifyStatement,
    /// Statement relation classification
    ClassifyStatementRelations,
}

/// Number of calls and batched inputs seen by a `MockScorer`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `tag_components` calls
    pub tag_components: usize,
    /// `classify_relations` calls
    pub classify_relations: usize,
    /// Pairs across all `classify_relations` calls
    pub relation_pairs: usize,
    /// `classify_statement` calls
    pub classify_statement: usize,
    /// `classify_statement_relations` calls
    pub classify_statement_relations: usize,
    /// Pairs across all `classify_statement_relations` calls
    pub statement_relation_pairs: usize,
}

#[derive(Debug, Default)]
struct Script {
    spans: HashMap<String, Vec<TaggedSpan>>,
    relations: HashMap<TextPair, Prediction>,
    statements: HashMap<String, Prediction>,
    statement_relations: HashMap<TextPair, Prediction>,
    failing: HashSet<ScorerCall>,
}

/// Mock scorer for deterministic testing
///
/// Responses are scripted by text (tagger, statement classifier) or by text
/// pair (relation classifiers). Unscripted inputs get neutral answers: no
/// spans, `noRel`, and `Position`. Clones share script and counters.
///
/// # Examples
///
/// ```
/// use argmine_scoring::MockScorer;
/// use argmine_domain::traits::{ArgumentScorer, Prediction, TextPair};
///
/// let mut scorer = MockScorer::new();
/// scorer.add_relation("taxes fund roads", "everyone should pay", Prediction::new("Support", 0.8));
///
/// let pairs = vec![
///     TextPair::new("taxes fund roads", "everyone should pay"),
///     TextPair::new("everyone should pay", "taxes fund roads"),
/// ];
/// let predictions = scorer.classify_relations(&pairs).unwrap();
/// assert_eq!(predictions[0].label, "Support");
/// assert_eq!(predictions[1].label, "noRel");
/// assert_eq!(scorer.calls().relation_pairs, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockScorer {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<CallCounts>>,
}

impl MockScorer {
    /// Create a scorer with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the tagger output for a statement text
    pub fn add_spans(&mut self, text: impl Into<String>, spans: Vec<TaggedSpan>) {
        lock(&self.script).spans.insert(text.into(), spans);
    }

    /// Script the relation classifier for one ordered component pair
    pub fn add_relation(
        &mut self,
        text: impl Into<String>,
        text_pair: impl Into<String>,
        prediction: Prediction,
    ) {
        lock(&self.script)
            .relations
            .insert(TextPair::new(text, text_pair), prediction);
    }

    /// Script the statement classifier for a statement text
    pub fn add_statement(&mut self, text: impl Into<String>, prediction: Prediction) {
        lock(&self.script).statements.insert(text.into(), prediction);
    }

    /// Script the statement relation classifier for one ordered statement pair
    pub fn add_statement_relation(
        &mut self,
        text: impl Into<String>,
        text_pair: impl Into<String>,
        prediction: Prediction,
    ) {
        lock(&self.script)
            .statement_relations
            .insert(TextPair::new(text, text_pair), prediction);
    }

    /// Make every subsequent `call` fail
    pub fn add_error(&mut self, call: ScorerCall) {
        lock(&self.script).failing.insert(call);
    }

    /// Stop failing `call`
    pub fn clear_error(&mut self, call: ScorerCall) {
        lock(&self.script).failing.remove(&call);
    }

    /// Snapshot of the call counters
    pub fn calls(&self) -> CallCounts {
        *lock(&self.calls)
    }

    /// Reset the call counters
    pub fn reset_calls(&self) {
        *lock(&self.calls) = CallCounts::default();
    }

    fn check(&self, call: ScorerCall) -> Result<(), ScoringError> {
        if lock(&self.script).failing.contains(&call) {
            return Err(ScoringError::Other(format!("Mock failure in {:?}", call)));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ArgumentScorer for MockScorer {
    type Error = ScoringError;

    fn tag_components(&self, text: &str) -> Result<Vec<TaggedSpan>, Self::Error> {
        lock(&self.calls).tag_components += 1;
        self.check(ScorerCall::TagComponents)?;

        Ok(lock(&self.script).spans.get(text).cloned().unwrap_or_default())
    }

    fn classify_relations(&self, pairs: &[TextPair]) -> Result<Vec<Prediction>, Self::Error> {
        {
            let mut calls = lock(&self.calls);
            calls.classify_relations += 1;
            calls.relation_pairs += pairs.len();
        }
        self.check(ScorerCall::ClassifyRelations)?;

        let script = lock(&self.script);
        Ok(pairs
            .iter()
            .map(|pair| {
                script
                    .relations
                    .get(pair)
                    .cloned()
                    .unwrap_or_else(|| Prediction::new(NO_RELATION_LABEL, 1.0))
            })
            .collect())
    }

    fn classify_statement(&self, text: &str) -> Result<Prediction, Self::Error> {
        lock(&self.calls).classify_statement += 1;
        self.check(ScorerCall::ClassifyStatement)?;

        Ok(lock(&self.script)
            .statements
            .get(text)
            .cloned()
            .unwrap_or_else(|| Prediction::new("Position", 1.0)))
    }

    fn classify_statement_relations(
        &self,
        pairs: &[TextPair],
    ) -> Result<Vec<Prediction>, Self::Error> {
        {
            let mut calls = lock(&self.calls);
            calls.classify_statement_relations += 1;
            calls.statement_relation_pairs += pairs.len();
        }
        self.check(ScorerCall::ClassifyStatementRelations)?;

        let script = lock(&self.script);
        Ok(pairs
            .iter()
            .map(|pair| {
                script
                    .statement_relations
                    .get(pair)
                    .cloned()
                    .unwrap_or_else(|| Prediction::new("Position", 1.0))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, label: &str, score: f64) -> TaggedSpan {
        TaggedSpan {
            start,
            end,
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn test_mock_scorer_defaults() {
        let scorer = MockScorer::new();
        assert!(scorer.tag_components("anything").unwrap().is_empty());
        assert_eq!(scorer.classify_statement("anything").unwrap().label, "Position");

        let pairs = vec![TextPair::new("a", "b")];
        assert_eq!(scorer.classify_relations(&pairs).unwrap()[0].label, NO_RELATION_LABEL);
        assert_eq!(
            scorer.classify_statement_relations(&pairs).unwrap()[0].label,
            "Position"
        );
    }

    #[test]
    fn test_mock_scorer_scripted_spans() {
        let mut scorer = MockScorer::new();
        scorer.add_spans("text", vec![span(0, 4, "Claim", 0.9)]);

        let spans = scorer.tag_components("text").unwrap();
        assert_eq!(spans, vec![span(0, 4, "Claim", 0.9)]);
    }

    #[test]
    fn test_mock_scorer_pairs_are_ordered() {
        let mut scorer = MockScorer::new();
        scorer.add_statement_relation("s", "t", Prediction::new("Support", 0.8));

        let forward = scorer
            .classify_statement_relations(&[TextPair::new("s", "t")])
            .unwrap();
        let backward = scorer
            .classify_statement_relations(&[TextPair::new("t", "s")])
            .unwrap();
        assert_eq!(forward[0], Prediction::new("Support", 0.8));
        assert_eq!(backward[0].label, "Position");
    }

    #[test]
    fn test_mock_scorer_call_counts() {
        let scorer = MockScorer::new();
        scorer.tag_components("x").unwrap();
        scorer
            .classify_relations(&[TextPair::new("a", "b"), TextPair::new("b", "a")])
            .unwrap();
        scorer.classify_statement("x").unwrap();

        let calls = scorer.calls();
        assert_eq!(calls.tag_components, 1);
        assert_eq!(calls.classify_relations, 1);
        assert_eq!(calls.relation_pairs, 2);
        assert_eq!(calls.classify_statement, 1);
        assert_eq!(calls.classify_statement_relations, 0);

        scorer.reset_calls();
        assert_eq!(scorer.calls(), CallCounts::default());
    }

    #[test]
    fn test_mock_scorer_error() {
        let mut scorer = MockScorer::new();
        scorer.add_error(ScorerCall::ClassifyRelations);

        let result = scorer.classify_relations(&[TextPair::new("a", "b")]);
        assert!(matches!(result, Err(ScoringError::Other(_))));
        // counted even when failing
        assert_eq!(scorer.calls().classify_relations, 1);

        scorer.clear_error(ScorerCall::ClassifyRelations);
        assert!(scorer.classify_relations(&[TextPair::new("a", "b")]).is_ok());
    }

    #[test]
    fn test_mock_scorer_clone_shares_state() {
        let scorer = MockScorer::new();
        let mut handle = scorer.clone();
        handle.add_statement("s", Prediction::new("Attack", 0.7));

        assert_eq!(scorer.classify_statement("s").unwrap().label, "Attack");
        assert_eq!(handle.calls().classify_statement, 1);
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Claim"), "Claim");
        assert_eq!(normalize_label("I-PR"), "Premise");
        assert_eq!(normalize_label(" ATT "), "Attack");
        assert_eq!(normalize_label("noRel"), NO_RELATION_LABEL);
        assert_eq!(normalize_label("position"), "Position");
    }

    #[test]
    fn test_check_alignment() {
        let predictions = vec![Prediction::new("Attack", 0.5)];
        assert!(check_alignment(1, &predictions).is_ok());
        assert!(matches!(
            check_alignment(2, &predictions),
            Err(ScoringError::BatchMismatch { expected: 2, actual: 1 })
        ));
    }
}
