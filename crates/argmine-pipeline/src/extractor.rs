//! Component extraction: from tagged spans to canonical components
//!
//! Spans go through a fixed policy, in order:
//!
//! 1. drop spans scoring below `min_component_score`
//! 2. reject spans whose bounds do not fit the text
//! 3. shrink the span inward until it neither starts nor ends on whitespace
//! 4. drop fragments shorter than `min_component_length` characters
//! 5. assign the content identifier and get-or-create the component
//!
//! Spans may overlap; nothing here assumes otherwise.

use crate::config::PipelineConfig;
use crate::types::{FailureKind, PipelineFailure};
use argmine_domain::component::{char_len, char_slice, trim_span};
use argmine_domain::traits::{GraphStore, TaggedSpan, Upsert};
use argmine_domain::{Component, ComponentDraft, ComponentLabel, IdentityEngine, Statement};
use argmine_gatekeeper::Gatekeeper;
use std::collections::HashSet;
use tracing::debug;

/// Canonical components of one statement
#[derive(Debug, Clone, Default)]
pub struct ExtractedComponents {
    /// Components in the order their spans were yielded, without repeats
    pub components: Vec<Component>,

    /// How many of them were persisted by this call
    pub created: usize,
}

/// Apply steps 1 to 4 of the span policy
///
/// Spans with bounds outside the text are reported as failures. Spans with a
/// label other than Claim or Premise are skipped like low scores.
pub fn select_spans(
    statement: &Statement,
    spans: Vec<TaggedSpan>,
    config: &PipelineConfig,
    gatekeeper: &Gatekeeper,
    failures: &mut Vec<PipelineFailure>,
) -> Vec<ComponentDraft> {
    let text = statement.text.as_str();
    let mut drafts = Vec::new();

    for span in spans {
        if span.score < config.min_component_score {
            debug!(start = span.start, end = span.end, score = span.score, "span below score threshold");
            continue;
        }

        let Some(label) = ComponentLabel::parse(&span.label) else {
            debug!(label = %span.label, "span with unknown label");
            continue;
        };

        let bounds = gatekeeper.validate_span(text, span.start, span.end);
        if !bounds.is_accepted() {
            failures.push(PipelineFailure::new(
                FailureKind::Component,
                bounds.describe(),
                format!("[{}, {}) of a {} character statement", span.start, span.end, char_len(text)),
            ));
            continue;
        }

        let (start, end) = trim_span(text, span.start, span.end);
        let fragment = char_slice(text, start, end).unwrap_or_default();
        if char_len(fragment) < config.min_component_length {
            debug!(fragment, "fragment below minimum length");
            continue;
        }

        drafts.push(ComponentDraft {
            statement: statement.identifier.clone(),
            start,
            end,
            label,
            score: span.score,
            fragment: fragment.to_string(),
        });
    }

    drafts
}

/// Step 5: validate, identify and get-or-create each draft
///
/// An existing component is returned as stored; its score is never updated.
/// A draft whose identifier is taken by different content is reported as a
/// failure and left out.
pub fn persist_components<S: GraphStore>(
    store: &mut S,
    engine: &IdentityEngine,
    gatekeeper: &Gatekeeper,
    statement: &Statement,
    drafts: Vec<ComponentDraft>,
    failures: &mut Vec<PipelineFailure>,
) -> Result<ExtractedComponents, S::Error> {
    let mut extracted = ExtractedComponents::default();
    let mut seen = HashSet::new();

    for draft in drafts {
        let validation = gatekeeper.validate_component(&draft, &statement.text);
        if !validation.is_accepted() {
            failures.push(PipelineFailure::new(
                FailureKind::Component,
                validation.describe(),
                draft.fragment,
            ));
            continue;
        }

        let identifier = draft.build_identifier(engine);
        if !seen.insert(identifier.clone()) {
            continue;
        }

        let fragment = draft.fragment.clone();
        match store.upsert_component(draft.into_component(identifier))? {
            Upsert::Created(component) => {
                extracted.created += 1;
                extracted.components.push(component);
            }
            Upsert::Existing(component) => extracted.components.push(component),
            Upsert::Collision(existing) => failures.push(PipelineFailure::new(
                FailureKind::Component,
                format!(
                    "identifier {} already belongs to '{}'",
                    existing.identifier, existing.fragment
                ),
                fragment,
            )),
        }
    }

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmine_domain::{Author, Debate, StatementDraft};

    const TEXT: &str = "We cannot have religious prejudice.  Faith is private. Yes.";

    fn statement() -> Statement {
        let engine = IdentityEngine::default();
        let debate = Debate::new(&engine, "d", None);
        let author = Author::new(&engine, "a");
        let draft = StatementDraft::new(TEXT, debate.identifier, author.identifier);
        let id = draft.build_identifier(&engine);
        draft.into_statement(id)
    }

    fn span(start: usize, end: usize, label: &str, score: f64) -> TaggedSpan {
        TaggedSpan {
            start,
            end,
            label: label.to_string(),
            score,
        }
    }

    fn select(spans: Vec<TaggedSpan>) -> (Vec<ComponentDraft>, Vec<PipelineFailure>) {
        let mut failures = Vec::new();
        let drafts = select_spans(
            &statement(),
            spans,
            &PipelineConfig::default(),
            &Gatekeeper::default_config(),
            &mut failures,
        );
        (drafts, failures)
    }

    #[test]
    fn test_low_score_dropped() {
        let (drafts, failures) = select(vec![span(0, 34, "Claim", 0.49)]);
        assert!(drafts.is_empty());
        assert!(failures.is_empty());
    }

    #[test]
    fn test_whitespace_trimmed_inward() {
        // "  Faith is private" with the two leading spaces
        let (drafts, _) = select(vec![span(35, 54, "Premise", 0.8)]);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].fragment, "Faith is private.");
        assert_eq!((drafts[0].start, drafts[0].end), (37, 54));
        assert_eq!(drafts[0].label, ComponentLabel::Premise);
    }

    #[test]
    fn test_short_fragment_dropped() {
        let (drafts, failures) = select(vec![span(55, 59, "Claim", 0.9)]);
        assert!(drafts.is_empty());
        assert!(failures.is_empty());
    }

    #[test]
    fn test_invalid_span_reported() {
        let (drafts, failures) = select(vec![span(10, 5, "Claim", 0.9), span(50, 500, "Claim", 0.9)]);
        assert!(drafts.is_empty());
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|f| f.kind == FailureKind::Component));
    }

    #[test]
    fn test_unknown_label_skipped() {
        let (drafts, failures) = select(vec![span(0, 34, "O", 0.99)]);
        assert!(drafts.is_empty());
        assert!(failures.is_empty());
    }

    #[test]
    fn test_overlapping_spans_kept_in_yield_order() {
        let (drafts, _) = select(vec![span(15, 34, "Premise", 0.7), span(0, 34, "Claim", 0.9)]);
        let fragments: Vec<_> = drafts.iter().map(|d| d.fragment.as_str()).collect();
        assert_eq!(fragments, vec!["religious prejudice", "We cannot have religious prejudice"]);
    }
}
