//! CLI command definitions and argument parsing.

use argmine_domain::StatementRole;
use clap::{Parser, Subcommand};

/// Argmine CLI - Build and inspect argumentative graphs of debates.
#[derive(Debug, Parser)]
#[command(name = "argmine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// SQLite database path
    #[arg(short, long, global = true, env = "ARGMINE_DATABASE")]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (identifiers only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pipeline over a batch of debate statements
    Run(RunArgs),

    /// Show the graph of a debate
    Graph(GraphArgs),

    /// Export a debate in brat standoff format
    ExportBrat(ExportBratArgs),

    /// Show a statement with its components
    Statement(ShowArgs),

    /// Show a component with its relations
    Component(ShowArgs),

    /// Manually annotate a statement
    Annotate(AnnotateArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// JSON file with the batch (`{"debate": ..., "statements": [...]}`)
    pub file: Option<String>,

    /// Read the batch from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Re-run classification and linking for statements that already have results
    #[arg(long = "override")]
    pub override_cached: bool,
}

/// Arguments for the graph command.
#[derive(Debug, Parser)]
pub struct GraphArgs {
    /// Debate identifier or name
    pub debate: String,
}

/// Arguments for the export-brat command.
#[derive(Debug, Parser)]
pub struct ExportBratArgs {
    /// Debate identifier or name
    pub debate: String,

    /// Output directory
    #[arg(short, long, default_value = "brat")]
    pub out: String,
}

/// Arguments for commands showing one record.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Identifier
    pub id: String,
}

/// Arguments for the annotate command.
#[derive(Debug, Parser)]
pub struct AnnotateArgs {
    /// Statement identifier
    pub id: String,

    /// Discourse role
    #[arg(short, long, value_enum)]
    pub role: RoleArg,

    /// Identifier of the Position statement this one attacks or supports
    #[arg(long)]
    pub related_to: Option<String>,
}

/// Role argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum RoleArg {
    /// The stance under debate
    Position,
    /// Argues against a position
    Attack,
    /// Argues for a position
    Support,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<RoleArg> for StatementRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Position => StatementRole::Position,
            RoleArg::Attack => StatementRole::Attack,
            RoleArg::Support => StatementRole::Support,
        }
    }
}
