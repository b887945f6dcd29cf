//! Export-brat command implementation.

use crate::brat::BratExport;
use crate::cli::ExportBratArgs;
use crate::commands::graph::load_graph;
use crate::error::Result;
use crate::output::Formatter;
use argmine_store::SqliteStore;
use std::path::Path;
use tracing::debug;

/// Execute the export-brat command.
pub fn execute_export_brat(
    args: ExportBratArgs,
    store: &SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let graph = load_graph(store, &args.debate)?;
    let export = BratExport::from_graph(&graph);
    debug!(debate = %graph.debate.identifier, out = %args.out, "writing brat export");
    let written = export.write_to(Path::new(&args.out))?;

    println!(
        "{}",
        formatter.success(&format!(
            "Exported {} components and {} relations of '{}' to {}",
            graph.nodes.len(),
            graph.edges.len(),
            graph.debate.name,
            args.out
        ))
    );
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}
