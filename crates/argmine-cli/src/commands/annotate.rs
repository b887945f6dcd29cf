//! Annotate command implementation.

use crate::cli::AnnotateArgs;
use crate::commands::show::parse_identifier;
use crate::error::Result;
use crate::output::Formatter;
use argmine_gatekeeper::Gatekeeper;
use argmine_pipeline::annotate_statement;
use argmine_store::SqliteStore;

/// Execute the annotate command.
pub fn execute_annotate(
    args: AnnotateArgs,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let id = parse_identifier(&args.id)?;
    let related_to = args.related_to.as_deref().map(parse_identifier).transpose()?;

    let statement = annotate_statement(
        store,
        &Gatekeeper::default_config(),
        &id,
        args.role.into(),
        related_to.as_ref(),
    )?;

    println!("{}", formatter.success(&format!("Statement {} annotated", statement.identifier)));
    println!("{}", formatter.format_statement(&statement, &[])?);
    Ok(())
}
