//! Entity validation logic

use crate::ValidationConfig;
use argmine_domain::component::{char_len, char_slice};
use argmine_domain::{ComponentDraft, Relation, Statement, StatementRole};
use thiserror::Error;

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the entity passed validation
    pub status: ValidationStatus,

    /// Rejection reasons (if any)
    pub reasons: Vec<RejectionReason>,
}

impl ValidationResult {
    fn from_reasons(reasons: Vec<RejectionReason>) -> Self {
        let status = if reasons.is_empty() {
            ValidationStatus::Accepted
        } else {
            ValidationStatus::Rejected
        };
        Self { status, reasons }
    }

    /// Whether the entity may be persisted
    pub fn is_accepted(&self) -> bool {
        self.status == ValidationStatus::Accepted
    }

    /// All reasons joined into one message
    pub fn describe(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Entity accepted
    Accepted,

    /// Entity rejected
    Rejected,
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectionReason {
    /// Span is empty, reversed or runs past the text
    #[error("invalid span [{start}, {end}) for text of length {len}: {issue}")]
    InvalidSpan {
        /// Span start
        start: usize,
        /// Span end
        end: usize,
        /// Text length in characters
        len: usize,
        /// Description of the issue
        issue: String,
    },

    /// Stored fragment differs from the text under the span
    #[error("fragment '{fragment}' does not match the text under its span")]
    FragmentMismatch {
        /// The offending fragment
        fragment: String,
    },

    /// A score outside [0.0, 1.0]
    #[error("{field} {value} is outside [0.0, 1.0]")]
    ScoreOutOfRange {
        /// Which score
        field: &'static str,
        /// The value
        value: f64,
    },

    /// Relation from a component to itself
    #[error("source and target component are the same ({0})")]
    SelfRelation(String),

    /// Statement link from a statement to itself
    #[error("statement {0} cannot relate to itself")]
    SelfLink(String),

    /// Statement link between different debates
    #[error("statements belong to different debates")]
    CrossDebateLink,

    /// Statement link with roles other than Attack/Support -> Position
    #[error("{issue}")]
    InvalidLinkRole {
        /// Description of the issue
        issue: String,
    },
}

/// The Gatekeeper validates entities before storage
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Validate raw span bounds `[start, end)` against a text
    pub fn validate_span(&self, text: &str, start: usize, end: usize) -> ValidationResult {
        ValidationResult::from_reasons(span_reason(text, start, end).into_iter().collect())
    }

    /// Validate a component draft against its statement's text
    pub fn validate_component(&self, draft: &ComponentDraft, text: &str) -> ValidationResult {
        let mut reasons = Vec::new();

        if let Some(reason) = span_reason(text, draft.start, draft.end) {
            reasons.push(reason);
        } else if self.config.validate_fragments
            && char_slice(text, draft.start, draft.end) != Some(draft.fragment.as_str())
        {
            reasons.push(RejectionReason::FragmentMismatch {
                fragment: draft.fragment.clone(),
            });
        }

        if self.config.validate_score_bounds {
            reasons.extend(score_reason("component score", draft.score));
        }

        ValidationResult::from_reasons(reasons)
    }

    /// Validate a relation between two components
    pub fn validate_relation(&self, relation: &Relation) -> ValidationResult {
        let mut reasons = Vec::new();

        if relation.is_self_relation() {
            reasons.push(RejectionReason::SelfRelation(relation.source.to_string()));
        }

        if self.config.validate_score_bounds {
            reasons.extend(score_reason("relation score", relation.score));
        }

        ValidationResult::from_reasons(reasons)
    }

    /// Validate that `source` may be linked to `target` as an attack or support
    pub fn validate_link(&self, source: &Statement, target: &Statement) -> ValidationResult {
        let mut reasons = self.link_reasons(source, target);

        if self.config.validate_link_roles && !source.is_argument() {
            reasons.push(RejectionReason::InvalidLinkRole {
                issue: format!(
                    "only Attack or Support statements can relate to a position, source is {}",
                    role_name(source.role)
                ),
            });
        }

        ValidationResult::from_reasons(reasons)
    }

    /// Validate a manual annotation giving `source` the role `role` and an optional target
    pub fn validate_annotation(
        &self,
        source: &Statement,
        role: StatementRole,
        target: Option<&Statement>,
    ) -> ValidationResult {
        let Some(target) = target else {
            return ValidationResult::from_reasons(Vec::new());
        };

        let mut reasons = self.link_reasons(source, target);
        if self.config.validate_link_roles && !role.is_argument() {
            reasons.push(RejectionReason::InvalidLinkRole {
                issue: format!("a {} statement cannot relate to another statement", role),
            });
        }

        ValidationResult::from_reasons(reasons)
    }

    fn link_reasons(&self, source: &Statement, target: &Statement) -> Vec<RejectionReason> {
        let mut reasons = Vec::new();

        if source.identifier == target.identifier {
            reasons.push(RejectionReason::SelfLink(source.identifier.to_string()));
        }

        if source.debate != target.debate {
            reasons.push(RejectionReason::CrossDebateLink);
        }

        if self.config.validate_link_roles && target.role != Some(StatementRole::Position) {
            reasons.push(RejectionReason::InvalidLinkRole {
                issue: format!(
                    "only a Position can be the target of a relation, target is {}",
                    role_name(target.role)
                ),
            });
        }

        reasons
    }
}

fn span_reason(text: &str, start: usize, end: usize) -> Option<RejectionReason> {
    let len = char_len(text);
    let issue = if start >= end {
        "start must be less than end"
    } else if end > len {
        "end is past the end of the text"
    } else {
        return None;
    };

    Some(RejectionReason::InvalidSpan {
        start,
        end,
        len,
        issue: issue.to_string(),
    })
}

fn score_reason(field: &'static str, value: f64) -> Option<RejectionReason> {
    if (0.0..=1.0).contains(&value) {
        None
    } else {
        Some(RejectionReason::ScoreOutOfRange { field, value })
    }
}

fn role_name(role: Option<StatementRole>) -> &'static str {
    role.map(|r| r.as_str()).unwrap_or("unclassified")
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmine_domain::{
        Author, ComponentLabel, Debate, IdentityEngine, RelationLabel, StatementDraft,
    };

    const TEXT: &str = "We cannot have religious prejudice in a campaign.";

    fn draft(start: usize, end: usize) -> ComponentDraft {
        ComponentDraft {
            statement: IdentityEngine::default().identifier(&["s"]),
            start,
            end,
            label: ComponentLabel::Claim,
            score: 0.9,
            fragment: char_slice(TEXT, start, end).unwrap_or_default().to_string(),
        }
    }

    fn statement(text: &str, debate: &str, role: Option<StatementRole>) -> Statement {
        let engine = IdentityEngine::default();
        let debate = Debate::new(&engine, debate, None);
        let author = Author::new(&engine, "author");
        let draft = StatementDraft::new(text, debate.identifier, author.identifier);
        let id = draft.build_identifier(&engine);
        let mut statement = draft.into_statement(id);
        statement.role = role;
        statement
    }

    #[test]
    fn test_valid_component() {
        let gatekeeper = Gatekeeper::default_config();
        let result = gatekeeper.validate_component(&draft(0, 34), TEXT);
        assert_eq!(result.status, ValidationStatus::Accepted);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_reversed_span() {
        let gatekeeper = Gatekeeper::default_config();
        let result = gatekeeper.validate_span(TEXT, 10, 10);
        assert_eq!(result.status, ValidationStatus::Rejected);
        match &result.reasons[0] {
            RejectionReason::InvalidSpan { issue, .. } => {
                assert!(issue.contains("less than"));
            }
            _ => panic!("Expected InvalidSpan"),
        }
    }

    #[test]
    fn test_span_past_end() {
        let gatekeeper = Gatekeeper::default_config();
        let len = char_len(TEXT);
        assert!(gatekeeper.validate_span(TEXT, 0, len).is_accepted());
        assert!(!gatekeeper.validate_span(TEXT, 0, len + 1).is_accepted());
    }

    #[test]
    fn test_fragment_mismatch() {
        let gatekeeper = Gatekeeper::default_config();
        let mut d = draft(0, 9);
        d.fragment = "something else".to_string();
        let result = gatekeeper.validate_component(&d, TEXT);
        assert!(matches!(result.reasons[0], RejectionReason::FragmentMismatch { .. }));

        let permissive = Gatekeeper::new(ValidationConfig::permissive());
        assert!(permissive.validate_component(&d, TEXT).is_accepted());
    }

    #[test]
    fn test_component_score_out_of_range() {
        let gatekeeper = Gatekeeper::default_config();
        let mut d = draft(0, 9);
        d.score = 1.5;
        let result = gatekeeper.validate_component(&d, TEXT);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.describe().contains("component score"));
    }

    #[test]
    fn test_self_relation_rejected() {
        let gatekeeper = Gatekeeper::default_config();
        let id = IdentityEngine::default().identifier(&["c"]);
        let relation = Relation::new(id.clone(), id, RelationLabel::Attack, 0.9);
        let result = gatekeeper.validate_relation(&relation);
        assert!(matches!(result.reasons[0], RejectionReason::SelfRelation(_)));
    }

    #[test]
    fn test_valid_link() {
        let gatekeeper = Gatekeeper::default_config();
        let source = statement("I agree", "d", Some(StatementRole::Support));
        let target = statement("Taxes should rise", "d", Some(StatementRole::Position));
        assert!(gatekeeper.validate_link(&source, &target).is_accepted());
    }

    #[test]
    fn test_link_requires_position_target() {
        let gatekeeper = Gatekeeper::default_config();
        let source = statement("I agree", "d", Some(StatementRole::Support));
        let target = statement("No way", "d", Some(StatementRole::Attack));
        let result = gatekeeper.validate_link(&source, &target);
        assert_eq!(result.status, ValidationStatus::Rejected);
        assert!(result.describe().contains("target is Attack"));
    }

    #[test]
    fn test_link_requires_argument_source() {
        let gatekeeper = Gatekeeper::default_config();
        let source = statement("Taxes should fall", "d", Some(StatementRole::Position));
        let target = statement("Taxes should rise", "d", Some(StatementRole::Position));
        assert!(!gatekeeper.validate_link(&source, &target).is_accepted());
    }

    #[test]
    fn test_cross_debate_link() {
        let gatekeeper = Gatekeeper::default_config();
        let source = statement("I agree", "one", Some(StatementRole::Support));
        let target = statement("Taxes should rise", "two", Some(StatementRole::Position));
        let result = gatekeeper.validate_link(&source, &target);
        assert!(result.reasons.contains(&RejectionReason::CrossDebateLink));
    }

    #[test]
    fn test_annotation_without_target() {
        let gatekeeper = Gatekeeper::default_config();
        let source = statement("Taxes should rise", "d", None);
        assert!(gatekeeper
            .validate_annotation(&source, StatementRole::Position, None)
            .is_accepted());
    }

    #[test]
    fn test_annotation_position_cannot_link() {
        let gatekeeper = Gatekeeper::default_config();
        let source = statement("Taxes should fall", "d", None);
        let target = statement("Taxes should rise", "d", Some(StatementRole::Position));
        let result = gatekeeper.validate_annotation(&source, StatementRole::Position, Some(&target));
        assert!(!result.is_accepted());
        assert!(gatekeeper
            .validate_annotation(&source, StatementRole::Attack, Some(&target))
            .is_accepted());
    }
}
