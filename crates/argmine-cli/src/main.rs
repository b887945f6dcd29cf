//! Argmine CLI - Command-line interface for the argument mining pipeline.

use argmine_cli::commands;
use argmine_cli::{Cli, Command, Config, Formatter};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so that JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> argmine_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load or create config
    let mut config = Config::load(cli.config.as_deref().map(Path::new))?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    let mut store = config.open_store()?;

    match cli.command {
        Command::Run(args) => {
            commands::execute_run(args, &config, store, &formatter).await?;
        }
        Command::Graph(args) => {
            commands::execute_graph(args, &store, &formatter)?;
        }
        Command::ExportBrat(args) => {
            commands::execute_export_brat(args, &store, &formatter)?;
        }
        Command::Statement(args) => {
            commands::execute_statement(args, &store, &formatter)?;
        }
        Command::Component(args) => {
            commands::execute_component(args, &store, &formatter)?;
        }
        Command::Annotate(args) => {
            commands::execute_annotate(args, &mut store, &formatter)?;
        }
    }

    Ok(())
}
