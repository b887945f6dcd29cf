//! Manual statement annotation

use crate::error::PipelineError;
use argmine_domain::traits::GraphStore;
use argmine_domain::{Identifier, Statement, StatementRole};
use argmine_gatekeeper::Gatekeeper;
use std::fmt::Display;
use tracing::info;

/// Give a statement a role, and optionally the position it relates to, by hand
///
/// The target must be a Position of the same debate and only Attack or
/// Support statements may carry one. Model scores are cleared and the
/// statement is never touched by the classifier or the linker again.
pub fn annotate_statement<S>(
    store: &mut S,
    gatekeeper: &Gatekeeper,
    id: &Identifier,
    role: StatementRole,
    related_to: Option<&Identifier>,
) -> Result<Statement, PipelineError>
where
    S: GraphStore,
    S::Error: Display,
{
    let source = fetch(store, id)?;
    let target = related_to.map(|target| fetch(store, target)).transpose()?;

    let validation = gatekeeper.validate_annotation(&source, role, target.as_ref());
    if !validation.is_accepted() {
        return Err(PipelineError::InvalidRequest(validation.describe()));
    }

    store
        .annotate_statement(id, role, related_to)
        .map_err(|e| PipelineError::Store(e.to_string()))?;
    info!(statement = %id, %role, "statement annotated");

    fetch(store, id)
}

fn fetch<S>(store: &S, id: &Identifier) -> Result<Statement, PipelineError>
where
    S: GraphStore,
    S::Error: Display,
{
    store
        .get_statement(id)
        .map_err(|e| PipelineError::Store(e.to_string()))?
        .ok_or_else(|| PipelineError::InvalidRequest(format!("statement {} not found", id)))
}
