//! Statement and component lookups.

use crate::cli::ShowArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use argmine_domain::traits::GraphStore;
use argmine_domain::Identifier;
use argmine_store::SqliteStore;

/// Execute the statement command.
pub fn execute_statement(args: ShowArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let id = parse_identifier(&args.id)?;
    let statement = store
        .get_statement(&id)?
        .ok_or_else(|| CliError::NotFound(format!("statement {}", id)))?;
    let components = store.components_for_statement(&id)?;

    println!("{}", formatter.format_statement(&statement, &components)?);
    Ok(())
}

/// Execute the component command.
pub fn execute_component(args: ShowArgs, store: &SqliteStore, formatter: &Formatter) -> Result<()> {
    let id = parse_identifier(&args.id)?;
    let component = store
        .get_component(&id)?
        .ok_or_else(|| CliError::NotFound(format!("component {}", id)))?;
    let relations = store.relations_for_statement(&component.statement)?;

    println!("{}", formatter.format_component(&component, &relations)?);
    Ok(())
}

/// Parse a command-line identifier.
pub fn parse_identifier(input: &str) -> Result<Identifier> {
    Identifier::parse(input.trim()).map_err(CliError::InvalidInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier() {
        assert!(parse_identifier("0123456789abcdef").is_ok());
        assert!(parse_identifier(" 0123456789abcdef\n").is_ok());
        assert!(matches!(parse_identifier("not-an-id"), Err(CliError::InvalidInput(_))));
    }
}
