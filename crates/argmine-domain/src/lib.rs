//! Argmine Domain Layer
//!
//! This crate contains the core domain model of the argument mining graph.
//! It has a single external dependency (the XXH3 hash) and defines the
//! fundamental concepts, value objects, and trait interfaces that all other
//! layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Statement**: One author's argumentative text within a debate, with a discourse role
//! - **Component**: A claim or premise span within one statement
//! - **Relation**: A directed attack/support edge between two components
//! - **Identifier**: Content-derived hash; re-ingesting the same content is a no-op
//! - **Major claim**: The one claim that represents a statement across statements
//!
//! ## Architecture
//!
//! - Pure domain logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions (storage, models)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod component;
pub mod graph;
pub mod identity;
pub mod major_claim;
pub mod relation;
pub mod statement;
pub mod traits;

// Re-exports for convenience
pub use component::{Component, ComponentDraft, ComponentLabel};
pub use graph::DebateGraph;
pub use identity::{IdentityEngine, Identifier};
pub use major_claim::select_major_claim;
pub use relation::{Relation, RelationLabel};
pub use statement::{
    Author, Debate, LinkState, Statement, StatementDraft, StatementRole, NO_RELATION_SENTINEL,
};
