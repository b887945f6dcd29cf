//! Argmine Pipeline
//!
//! Turns batches of debate statements into an argumentative graph.
//!
//! # Overview
//!
//! Every statement of a batch is tagged for claim and premise spans, its
//! spans become components, component pairs are classified into attack and
//! support relations, and the statement itself is classified as a Position,
//! an Attack or a Support. Attack and Support statements are then linked to
//! the Position they argue about, and the major claims of linked statements
//! are related to each other.
//!
//! # Architecture
//!
//! ```text
//! Statements → Tagger → Components ─┬→ Relation classifier → Relations
//!                                   └→ Statement classifier → Roles
//!                                         ↓
//!                      Statement relation classifier → Links → Major-claim relations
//! ```
//!
//! # Key Features
//!
//! - **Content identity**: every entity is keyed by a hash of its content, so
//!   re-running a batch creates nothing new
//! - **Caching**: classified statements are skipped unless override is set
//! - **Manual annotations**: never overwritten by a model
//! - **Failure reporting**: bad spans and collisions are reported, not fatal
//!
//! # Example Usage
//!
//! ```no_run
//! use argmine_pipeline::{Pipeline, PipelineConfig, PipelineRequest};
//! use argmine_scoring::MockScorer;
//! use argmine_store::SqliteStore;
//! use argmine_gatekeeper::Gatekeeper;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scorer = MockScorer::new();
//! let store = SqliteStore::new(":memory:")?;
//! let pipeline = Pipeline::new(scorer, store, Gatekeeper::default_config(), PipelineConfig::default());
//!
//! let request = PipelineRequest::new("Religion in politics")
//!     .with_statement("Faith is a private matter and must stay out of the law.", "anon-1");
//!
//! let report = pipeline.run(request).await?;
//!
//! println!("Components: {}", report.counts.components_created);
//! println!("Links: {}", report.counts.links_created);
//! println!("Failures: {}", report.failures.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod config;
mod types;
pub mod annotation;
pub mod classifier;
pub mod extractor;
pub mod linker;
pub mod relations;
mod pipeline;


pub use error::PipelineError;
pub use config::PipelineConfig;
pub use types::{
    FailureKind, PipelineCounts, PipelineFailure, PipelineReport, PipelineRequest, StatementInput,
};
pub use annotation::annotate_statement;
pub use pipeline::Pipeline;
