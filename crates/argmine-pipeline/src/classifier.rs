//! Statement classification and the per-statement caching rule

use argmine_domain::traits::{GraphStore, Prediction};
use argmine_domain::{Statement, StatementRole};
use tracing::debug;

/// What the pipeline does with one statement of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementPlan {
    /// Results from an earlier run stand; only linking may still use it
    Skip,

    /// Manually annotated: components are (re)extracted, the role is left alone
    ExtractOnly,

    /// Extract components and classify the statement
    ExtractAndClassify,
}

impl StatementPlan {
    /// Decide for a statement just upserted
    ///
    /// `created` is whether the upsert persisted it. An automatically
    /// annotated statement that already has a role is skipped unless
    /// `override_cached` is set.
    pub fn decide(statement: &Statement, created: bool, override_cached: bool) -> Self {
        if statement.manual_annotation {
            StatementPlan::ExtractOnly
        } else if !created && statement.role.is_some() && !override_cached {
            StatementPlan::Skip
        } else {
            StatementPlan::ExtractAndClassify
        }
    }

    /// Whether components are extracted
    pub fn extracts(&self) -> bool {
        !matches!(self, StatementPlan::Skip)
    }

    /// Whether the statement classifier runs
    pub fn classifies(&self) -> bool {
        matches!(self, StatementPlan::ExtractAndClassify)
    }
}

/// Write a classifier result onto the statement and into the store
///
/// Unknown labels are ignored. A new role drops the link scored under the old
/// one. Returns whether the role was written.
pub fn apply_classification<S: GraphStore>(
    store: &mut S,
    statement: &mut Statement,
    prediction: &Prediction,
) -> Result<bool, S::Error> {
    let Some(role) = StatementRole::parse(&prediction.label) else {
        debug!(statement = %statement.identifier, label = %prediction.label, "unknown statement label");
        return Ok(false);
    };

    if !store.set_classification(&statement.identifier, role, prediction.score)? {
        return Ok(false);
    }
    if statement.role != Some(role) {
        statement.related_to = None;
        statement.relation_score = None;
    }
    statement.role = Some(role);
    statement.classification_score = Some(prediction.score);
    Ok(true)
}
