//! Debate-scoped view of the argumentative graph

use crate::{Component, Debate, Identifier, Relation, Statement};

/// All statements, components (nodes) and relations (edges) of one debate
///
/// Edges include every relation with at least one end inside the debate.
#[derive(Debug, Clone, PartialEq)]
pub struct DebateGraph {
    /// The debate
    pub debate: Debate,

    /// Statements in insertion order
    pub statements: Vec<Statement>,

    /// Components of those statements, grouped by statement
    pub nodes: Vec<Component>,

    /// Relations touching those components
    pub edges: Vec<Relation>,
}

impl DebateGraph {
    /// Components belonging to one statement, in span order
    pub fn components_of<'a>(&'a self, statement: &'a Identifier) -> impl Iterator<Item = &'a Component> + 'a {
        self.nodes.iter().filter(move |c| &c.statement == statement)
    }

    /// Edges whose source is `component`
    pub fn outgoing<'a>(&'a self, component: &'a Identifier) -> impl Iterator<Item = &'a Relation> + 'a {
        self.edges.iter().filter(move |r| &r.source == component)
    }

    /// Edges whose target is `component`
    pub fn incoming<'a>(&'a self, component: &'a Identifier) -> impl Iterator<Item = &'a Relation> + 'a {
        self.edges.iter().filter(move |r| &r.target == component)
    }
}
