//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{
    Author, Component, Debate, DebateGraph, Identifier, Relation, Statement, StatementRole,
};

/// Outcome of a content-addressed upsert
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert<T> {
    /// No record had the identifier; this one was persisted
    Created(T),

    /// A record with the same identifier and the same content exists; it is returned untouched
    Existing(T),

    /// A record with the same identifier but different content exists
    Collision(T),
}

impl<T> Upsert<T> {
    /// Whether a new record was persisted
    pub fn created(&self) -> bool {
        matches!(self, Upsert::Created(_))
    }

    /// The canonical record, or `None` on collision
    pub fn into_canonical(self) -> Option<(T, bool)> {
        match self {
            Upsert::Created(entity) => Some((entity, true)),
            Upsert::Existing(entity) => Some((entity, false)),
            Upsert::Collision(_) => None,
        }
    }
}

/// Trait for storing and retrieving the argumentative graph
///
/// Implemented by the infrastructure layer (argmine-store). Upserts are
/// idempotent: racing writers of identical content end with a single record.
pub trait GraphStore {
    /// Error type for store operations
    type Error;

    /// Find a debate by identifier or by name
    fn find_debate(&self, key: &str) -> Result<Option<Debate>, Self::Error>;

    /// Persist a debate unless one with the same identifier exists
    fn upsert_debate(&mut self, debate: Debate) -> Result<Upsert<Debate>, Self::Error>;

    /// Find an author by identifier or by name
    fn find_author(&self, key: &str) -> Result<Option<Author>, Self::Error>;

    /// Persist an author unless one with the same identifier exists
    fn upsert_author(&mut self, author: Author) -> Result<Upsert<Author>, Self::Error>;

    /// Persist a statement unless one with the same identifier exists
    fn upsert_statement(&mut self, statement: Statement) -> Result<Upsert<Statement>, Self::Error>;

    /// Get a statement by identifier
    fn get_statement(&self, id: &Identifier) -> Result<Option<Statement>, Self::Error>;

    /// Overwrite role and classification score of an automatically annotated statement
    ///
    /// A changed role clears the statement's own link. When the statement stops
    /// being a Position, automatic links pointing at it are cleared as well.
    /// Returns `false` when the statement is manually annotated or missing.
    fn set_classification(
        &mut self,
        id: &Identifier,
        role: StatementRole,
        score: f64,
    ) -> Result<bool, Self::Error>;

    /// Record the outcome of cross-statement linking for an automatically annotated statement
    ///
    /// `related_to = None` with the sentinel score marks "no relation".
    fn set_link(
        &mut self,
        id: &Identifier,
        related_to: Option<&Identifier>,
        score: f64,
    ) -> Result<bool, Self::Error>;

    /// Manually annotate a statement's role and relation, clearing model scores
    fn annotate_statement(
        &mut self,
        id: &Identifier,
        role: StatementRole,
        related_to: Option<&Identifier>,
    ) -> Result<bool, Self::Error>;

    /// Persist a component unless one with the same identifier exists
    fn upsert_component(&mut self, component: Component) -> Result<Upsert<Component>, Self::Error>;

    /// Get a component by identifier
    fn get_component(&self, id: &Identifier) -> Result<Option<Component>, Self::Error>;

    /// Components of a statement, in span order
    fn components_for_statement(&self, id: &Identifier) -> Result<Vec<Component>, Self::Error>;

    /// Persist a relation unless an edge for the same (source, target) exists
    fn upsert_relation(&mut self, relation: Relation) -> Result<Upsert<Relation>, Self::Error>;

    /// Relations with at least one end in the given statement
    fn relations_for_statement(&self, id: &Identifier) -> Result<Vec<Relation>, Self::Error>;

    /// The whole graph of a debate
    fn debate_graph(&self, id: &Identifier) -> Result<Option<DebateGraph>, Self::Error>;
}

/// A span produced by the component tagger
///
/// Offsets are character offsets into the tagged text. Spans may overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSpan {
    /// First character
    pub start: usize,
    /// One past the last character
    pub end: usize,
    /// Tagger label (`Claim`/`CL`, `Premise`/`PR`)
    pub label: String,
    /// Tagger confidence
    pub score: f64,
}

/// One input of a pairwise classifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextPair {
    /// Source text
    pub text: String,
    /// Target text
    pub text_pair: String,
}

impl TextPair {
    /// Create a pair
    pub fn new(text: impl Into<String>, text_pair: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            text_pair: text_pair.into(),
        }
    }
}

/// A label with its confidence, as returned by a classifier
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Predicted label
    pub label: String,
    /// Confidence [0.0, 1.0]
    pub score: f64,
}

impl Prediction {
    /// Create a prediction
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Trait for the argument mining models
///
/// Implemented by the infrastructure layer (argmine-scoring). Batched calls
/// return one prediction per input, aligned by index; a failure fails the
/// whole call.
pub trait ArgumentScorer {
    /// Error type for scoring operations
    type Error;

    /// Tag claim and premise spans in a statement
    fn tag_components(&self, text: &str) -> Result<Vec<TaggedSpan>, Self::Error>;

    /// Classify component pairs as `Attack`, `Support` or `noRel`
    fn classify_relations(&self, pairs: &[TextPair]) -> Result<Vec<Prediction>, Self::Error>;

    /// Classify a statement as `Position`, `Attack` or `Support`
    fn classify_statement(&self, text: &str) -> Result<Prediction, Self::Error>;

    /// Classify how the first statement of each pair relates to the second
    fn classify_statement_relations(&self, pairs: &[TextPair]) -> Result<Vec<Prediction>, Self::Error>;
}
