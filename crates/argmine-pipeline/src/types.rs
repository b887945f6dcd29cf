//! Request and response types for a pipeline run

use crate::error::PipelineError;
use argmine_domain::{Debate, Statement};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A batch of statements of one debate
///
/// This is the JSON body accepted by `argmine run`:
///
/// ```json
/// {
///   "debate": "Religion in politics",
///   "source": "forum",
///   "statements": [{"statement": "...", "author": "anon-1"}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Debate identifier or name; created on first sight
    pub debate: String,

    /// Where the debate comes from, stored when the debate is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Statements in the order they should be reported
    pub statements: Vec<StatementInput>,
}

/// One statement of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementInput {
    /// Argumentative text
    pub statement: String,

    /// Author identifier or name; created on first sight
    pub author: String,
}

impl StatementInput {
    /// Create an input
    pub fn new(statement: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            author: author.into(),
        }
    }
}

impl PipelineRequest {
    /// Create an empty request for a debate
    pub fn new(debate: impl Into<String>) -> Self {
        Self {
            debate: debate.into(),
            source: None,
            statements: Vec::new(),
        }
    }

    /// Add a statement
    pub fn with_statement(mut self, statement: impl Into<String>, author: impl Into<String>) -> Self {
        self.statements.push(StatementInput::new(statement, author));
        self
    }

    /// Parse a request from JSON
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the request before touching the store
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.debate.trim().is_empty() {
            return Err(PipelineError::InvalidRequest("debate is empty".to_string()));
        }
        if let Some(index) = self
            .statements
            .iter()
            .position(|input| input.statement.trim().is_empty() || input.author.trim().is_empty())
        {
            return Err(PipelineError::InvalidRequest(format!(
                "statement #{} has an empty text or author",
                index
            )));
        }
        Ok(())
    }
}

/// Outcome of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// The debate the batch belongs to
    pub debate: Debate,

    /// Final state of the batch's statements, in request order
    pub statements: Vec<Statement>,

    /// Counters
    pub counts: PipelineCounts,

    /// Entities that were rejected
    pub failures: Vec<PipelineFailure>,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// What a run created, reused and skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineCounts {
    /// Statements persisted for the first time
    pub statements_created: usize,

    /// Existing statements skipped because they already had results
    pub statements_skipped: usize,

    /// Statements whose role was (re)written by the classifier
    pub statements_classified: usize,

    /// Components persisted for the first time
    pub components_created: usize,

    /// Components that already existed
    pub components_reused: usize,

    /// Intra-statement relations persisted for the first time
    pub relations_created: usize,

    /// Statements linked to a position
    pub links_created: usize,

    /// Statements marked as evaluated with no relation
    pub links_rejected: usize,

    /// Major-claim relations across statements persisted for the first time
    pub cross_relations_created: usize,
}

/// Kind of entity a failure is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A statement of the request
    Statement,
    /// A tagged span
    Component,
    /// A component relation
    Relation,
    /// A statement link
    Link,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Statement => "statement",
            FailureKind::Component => "component",
            FailureKind::Relation => "relation",
            FailureKind::Link => "link",
        };
        f.write_str(name)
    }
}

/// An entity that was rejected
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineFailure {
    /// What was rejected
    pub kind: FailureKind,

    /// Reason for failure
    pub reason: String,

    /// Text of the rejected entity
    pub raw_text: String,
}

impl PipelineFailure {
    /// Create a failure
    pub fn new(kind: FailureKind, reason: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
            raw_text: raw_text.into(),
        }
    }
}
