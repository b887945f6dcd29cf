//! Statement module - debates, authors and the statements they make

use crate::identity::{content_key, IdentityEngine, Identifier};
use std::fmt;

/// Relation score that marks a statement as evaluated with no relation found
///
/// Distinct from `None`, which means the statement was never evaluated.
pub const NO_RELATION_SENTINEL: f64 = 0.0;

/// A debate that groups statements by different authors
#[derive(Debug, Clone, PartialEq)]
pub struct Debate {
    /// Content identifier (hash of the name)
    pub identifier: Identifier,

    /// Title of the debate, unique
    pub name: String,

    /// Where the debate comes from, if known
    pub source: Option<String>,
}

impl Debate {
    /// Create a debate, deriving its identifier from the name
    pub fn new(engine: &IdentityEngine, name: impl Into<String>, source: Option<String>) -> Self {
        let name = name.into();
        Self {
            identifier: engine.identifier(&[name.as_str()]),
            name,
            source,
        }
    }
}

/// The author of one or more statements
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    /// Content identifier (hash of the name)
    pub identifier: Identifier,

    /// Name or pseudonym, unique
    pub name: String,
}

impl Author {
    /// Create an author, deriving its identifier from the name
    pub fn new(engine: &IdentityEngine, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            identifier: engine.identifier(&[name.as_str()]),
            name,
        }
    }
}

/// Discourse role of a whole statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementRole {
    /// A position over the debate
    Position,

    /// An argument against a position
    Attack,

    /// An argument in favor of a position
    Support,
}

impl StatementRole {
    /// Stable name used for storage and model labels
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementRole::Position => "Position",
            StatementRole::Attack => "Attack",
            StatementRole::Support => "Support",
        }
    }

    /// Parse a role from a model or storage label (case-insensitive)
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "position" => Some(StatementRole::Position),
            "attack" | "att" => Some(StatementRole::Attack),
            "support" | "sup" => Some(StatementRole::Support),
            _ => None,
        }
    }

    /// Whether a statement with this role argues for or against something
    pub fn is_argument(&self) -> bool {
        matches!(self, StatementRole::Attack | StatementRole::Support)
    }
}

impl fmt::Display for StatementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a statement stands in cross-statement linking
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkState<'a> {
    /// Never evaluated
    Unevaluated,

    /// Evaluated, and no relation was accepted
    NoRelation,

    /// Related to a position statement
    Linked {
        /// The position statement
        target: &'a Identifier,
        /// Relation score, absent for manual links
        score: Option<f64>,
    },
}

/// A statement made by an author within a debate
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Content identifier, set once
    pub identifier: Identifier,

    /// Raw argumentative text
    pub text: String,

    /// Debate this statement belongs to
    pub debate: Identifier,

    /// Author of the statement
    pub author: Identifier,

    /// Discourse role, `None` until classified or annotated
    pub role: Option<StatementRole>,

    /// Classifier confidence in `role` [0.0, 1.0]
    pub classification_score: Option<f64>,

    /// Position statement this one attacks or supports
    pub related_to: Option<Identifier>,

    /// Relation classifier confidence, or the no-relation sentinel
    pub relation_score: Option<f64>,

    /// Set when a human annotated the role or relation
    pub manual_annotation: bool,
}

impl Statement {
    /// Whether this statement is a candidate source of a cross-statement relation
    pub fn is_argument(&self) -> bool {
        self.role.is_some_and(|role| role.is_argument())
    }

    /// Current linking state, derived from `related_to` and `relation_score`
    pub fn link_state(&self) -> LinkState<'_> {
        match (&self.related_to, self.relation_score) {
            (Some(target), score) => LinkState::Linked { target, score },
            (None, Some(score)) if score == NO_RELATION_SENTINEL => LinkState::NoRelation,
            _ => LinkState::Unevaluated,
        }
    }

    /// Normalized content this statement's identifier is derived from
    pub fn content_key(&self) -> String {
        statement_key(&self.text, &self.debate, &self.author)
    }
}

/// A statement that has not been assigned an identifier yet
#[derive(Debug, Clone, PartialEq)]
pub struct StatementDraft {
    /// Raw argumentative text
    pub text: String,

    /// Debate the statement is made in
    pub debate: Identifier,

    /// Author of the statement
    pub author: Identifier,
}

impl StatementDraft {
    /// Create a draft
    pub fn new(text: impl Into<String>, debate: Identifier, author: Identifier) -> Self {
        Self {
            text: text.into(),
            debate,
            author,
        }
    }

    /// Derive the identifier from (text, debate, author)
    pub fn build_identifier(&self, engine: &IdentityEngine) -> Identifier {
        engine.identifier(&[
            self.text.as_str(),
            self.debate.as_str(),
            self.author.as_str(),
        ])
    }

    /// Attach an identifier, producing an unclassified statement
    pub fn into_statement(self, identifier: Identifier) -> Statement {
        Statement {
            identifier,
            text: self.text,
            debate: self.debate,
            author: self.author,
            role: None,
            classification_score: None,
            related_to: None,
            relation_score: None,
            manual_annotation: false,
        }
    }
}

fn statement_key(text: &str, debate: &Identifier, author: &Identifier) -> String {
    content_key(&[text, debate.as_str(), author.as_str()])
}
