//! Graph command implementation.

use crate::cli::GraphArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use argmine_domain::traits::GraphStore;
use argmine_domain::DebateGraph;
use argmine_store::SqliteStore;

/// Execute the graph command.
pub fn execute_graph(args: GraphArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let graph = load_graph(store, &args.debate)?;
    println!("{}", formatter.format_graph(&graph)?);
    Ok(())
}

/// Find a debate by identifier or name and load its graph.
pub fn load_graph(store: &SqliteStore, debate: &str) -> Result<DebateGraph> {
    let found = store
        .find_debate(debate)?
        .ok_or_else(|| CliError::NotFound(format!("debate '{}'", debate)))?;

    store
        .debate_graph(&found.identifier)?
        .ok_or_else(|| CliError::NotFound(format!("debate '{}'", debate)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmine_domain::traits::Upsert;
    use argmine_domain::{Debate, IdentityEngine};

    #[test]
    fn test_load_graph_by_name_or_identifier() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let debate = Debate::new(&IdentityEngine::default(), "Taxes", None);
        let Upsert::Created(debate) = store.upsert_debate(debate).unwrap() else {
            panic!("debate should be new");
        };

        let by_name = load_graph(&store, "Taxes").unwrap();
        let by_id = load_graph(&store, debate.identifier.as_str()).unwrap();
        assert_eq!(by_name.debate, debate);
        assert_eq!(by_id.debate, debate);
        assert!(by_name.statements.is_empty());
    }

    #[test]
    fn test_unknown_debate() {
        let store = SqliteStore::new(":memory:").unwrap();
        assert!(matches!(load_graph(&store, "nope"), Err(CliError::NotFound(_))));
    }
}
