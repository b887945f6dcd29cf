//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use argmine_domain::traits::ArgumentScorer;
use argmine_gatekeeper::Gatekeeper;
use argmine_pipeline::{Pipeline, PipelineConfig, PipelineReport, PipelineRequest};
use argmine_scoring::HttpScorer;
use argmine_store::SqliteStore;
use std::fmt::Display;
use std::fs;
use std::io::{self, Read};
use tracing::info;

/// Execute the run command.
pub async fn execute_run(
    args: RunArgs,
    config: &Config,
    store: SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let request = read_request(&args)?;
    info!(
        database = %config.database,
        statements = request.statements.len(),
        "running pipeline"
    );
    let pipeline_config = config
        .pipeline
        .clone()
        .with_override(args.override_cached || config.pipeline.override_cached);

    // The blocking HTTP client may not be built on an async worker
    let scorer_config = config.scorer.clone();
    let scorer = tokio::task::spawn_blocking(move || HttpScorer::new(scorer_config))
        .await
        .map_err(|e| CliError::Config(format!("Scorer setup failed: {}", e)))??;

    let report = run_batch(scorer, store, pipeline_config, request).await?;
    println!("{}", formatter.format_report(&report)?);

    Ok(())
}

/// Run one batch through a pipeline built from its parts.
pub async fn run_batch<M>(
    scorer: M,
    store: SqliteStore,
    config: PipelineConfig,
    request: PipelineRequest,
) -> Result<PipelineReport>
where
    M: ArgumentScorer + Send + Sync + 'static,
    M::Error: Display,
{
    let pipeline = Pipeline::new(scorer, store, Gatekeeper::default_config(), config);
    Ok(pipeline.run(request).await?)
}

fn read_request(args: &RunArgs) -> Result<PipelineRequest> {
    let json_data = if args.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else if let Some(file_path) = &args.file {
        fs::read_to_string(file_path)?
    } else {
        return Err(CliError::InvalidInput(
            "Must specify either a FILE or --stdin".to_string(),
        ));
    };

    Ok(PipelineRequest::from_json(&json_data)?)
}
