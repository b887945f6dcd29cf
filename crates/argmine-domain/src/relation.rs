//! Relation module - directed edges between argumentative components

use super::Identifier;
use std::fmt;

/// Type of relation between components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationLabel {
    /// The source argues against the target
    Attack,

    /// The source argues in favor of the target
    Support,
}

impl RelationLabel {
    /// Short code used for storage and brat export
    pub fn code(&self) -> &'static str {
        match self {
            RelationLabel::Attack => "ATT",
            RelationLabel::Support => "SUP",
        }
    }

    /// Human readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationLabel::Attack => "Attack",
            RelationLabel::Support => "Support",
        }
    }

    /// Parse a classifier or storage label
    ///
    /// `noRel` and anything unknown yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "attack" | "att" => Some(RelationLabel::Attack),
            "support" | "sup" => Some(RelationLabel::Support),
            _ => None,
        }
    }
}

impl fmt::Display for RelationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge `source -> target` between two components
///
/// At most one edge exists per ordered pair. Edges may connect components
/// of different statements in the same debate, and may form cycles.
/// Once stored an edge is never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Source component, 'A' in 'A' -> 'B'
    pub source: Identifier,

    /// Target component, 'B' in 'A' -> 'B'
    pub target: Identifier,

    /// Attack or support
    pub label: RelationLabel,

    /// Classifier confidence [0.0, 1.0]
    pub score: f64,

    /// Set when a human annotated the relation
    pub manual_annotation: bool,
}

impl Relation {
    /// Create an automatically annotated relation
    pub fn new(source: Identifier, target: Identifier, label: RelationLabel, score: f64) -> Self {
        Self {
            source,
            target,
            label,
            score,
            manual_annotation: false,
        }
    }

    /// Whether both ends are the same component
    pub fn is_self_relation(&self) -> bool {
        self.source == self.target
    }
}
