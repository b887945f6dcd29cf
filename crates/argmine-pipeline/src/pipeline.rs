//! Core pipeline implementation

use crate::classifier::{apply_classification, StatementPlan};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::extractor::{persist_components, select_spans};
use crate::linker::{self, LinkDecision};
use crate::relations::{self, RelationCandidate};
use crate::types::{
    FailureKind, PipelineCounts, PipelineFailure, PipelineReport, PipelineRequest, StatementInput,
};
use argmine_domain::traits::{ArgumentScorer, GraphStore, Prediction, TextPair, Upsert};
use argmine_domain::{
    select_major_claim, Author, Component, Debate, IdentityEngine, Identifier, Statement,
    StatementDraft, NO_RELATION_SENTINEL,
};
use argmine_gatekeeper::Gatekeeper;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// The Pipeline turns a batch of statements into argumentative graph
///
/// Components, relations and statements are written as they are produced.
/// If a scoring call fails the run stops with an error; everything already
/// written stays, and re-running the same batch is safe.
pub struct Pipeline<M, S>
where
    M: ArgumentScorer,
    S: GraphStore,
{
    scorer: Arc<M>,
    store: Arc<Mutex<S>>,
    gatekeeper: Gatekeeper,
    config: PipelineConfig,
    engine: IdentityEngine,
}

impl<M, S> Pipeline<M, S>
where
    M: ArgumentScorer + Send + Sync + 'static,
    S: GraphStore,
    M::Error: Display,
    S::Error: Display,
{
    /// Create a new Pipeline
    pub fn new(scorer: M, store: S, gatekeeper: Gatekeeper, config: PipelineConfig) -> Self {
        Self::with_shared(Arc::new(scorer), Arc::new(Mutex::new(store)), gatekeeper, config)
    }

    /// Create a Pipeline over a scorer and store shared with other owners
    pub fn with_shared(
        scorer: Arc<M>,
        store: Arc<Mutex<S>>,
        gatekeeper: Gatekeeper,
        config: PipelineConfig,
    ) -> Self {
        let engine = config.identity();
        Self {
            scorer,
            store,
            gatekeeper,
            config,
            engine,
        }
    }

    /// The configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Handle to the underlying store
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Run the pipeline over one batch
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineReport, PipelineError> {
        request.validate()?;
        self.config.validate().map_err(PipelineError::Config)?;
        let start_time = Instant::now();

        info!(
            "Starting pipeline for debate '{}', {} statements, override {}",
            request.debate,
            request.statements.len(),
            self.config.override_cached
        );

        let debate = self.resolve_debate(&request)?;
        let mut counts = PipelineCounts::default();
        let mut failures = Vec::new();
        let mut batch: Vec<Statement> = Vec::new();
        let mut seen = HashSet::new();

        for input in &request.statements {
            let Some((mut statement, created)) = self.upsert_statement(&debate, input, &mut failures)? else {
                continue;
            };
            if !seen.insert(statement.identifier.clone()) {
                debug!(statement = %statement.identifier, "statement repeated in batch");
                continue;
            }
            if created {
                counts.statements_created += 1;
            }

            let plan = StatementPlan::decide(&statement, created, self.config.override_cached);
            debug!(statement = %statement.identifier, ?plan, "statement plan");
            if plan == StatementPlan::Skip {
                counts.statements_skipped += 1;
            } else {
                self.process_statement(&mut statement, plan, &mut counts, &mut failures)
                    .await?;
            }
            batch.push(statement);
        }

        self.link_statements(&mut batch, &mut counts, &mut failures).await?;

        let statements = {
            let store = self.lock_store()?;
            batch
                .iter()
                .map(|statement| {
                    store
                        .get_statement(&statement.identifier)
                        .map(|stored| stored.unwrap_or_else(|| statement.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(store_error)?
        };

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Pipeline complete: {} statements, {} components, {} relations, {} links, {} cross relations, {} failed",
            statements.len(),
            counts.components_created,
            counts.relations_created,
            counts.links_created,
            counts.cross_relations_created,
            failures.len()
        );

        Ok(PipelineReport {
            debate,
            statements,
            counts,
            failures,
            processing_time_ms,
        })
    }

    /// Find the debate by identifier or name, creating it on first sight
    fn resolve_debate(&self, request: &PipelineRequest) -> Result<Debate, PipelineError> {
        let mut store = self.lock_store()?;
        if let Some(debate) = store.find_debate(&request.debate).map_err(store_error)? {
            return Ok(debate);
        }

        let debate = Debate::new(&self.engine, request.debate.as_str(), request.source.clone());
        match store.upsert_debate(debate).map_err(store_error)? {
            Upsert::Created(debate) | Upsert::Existing(debate) => Ok(debate),
            Upsert::Collision(existing) => Err(PipelineError::Collision(format!(
                "debate '{}' collides with '{}'",
                request.debate, existing.name
            ))),
        }
    }

    /// Resolve the author and get-or-create the statement
    ///
    /// Returns `None` when the author or statement collides with other content.
    fn upsert_statement(
        &self,
        debate: &Debate,
        input: &StatementInput,
        failures: &mut Vec<PipelineFailure>,
    ) -> Result<Option<(Statement, bool)>, PipelineError> {
        let mut store = self.lock_store()?;

        let author = match store.find_author(&input.author).map_err(store_error)? {
            Some(author) => author,
            None => {
                let author = Author::new(&self.engine, input.author.as_str());
                match store.upsert_author(author).map_err(store_error)?.into_canonical() {
                    Some((author, _)) => author,
                    None => {
                        failures.push(PipelineFailure::new(
                            FailureKind::Statement,
                            format!("author '{}' collides with another author", input.author),
                            input.statement.as_str(),
                        ));
                        return Ok(None);
                    }
                }
            }
        };

        let draft = StatementDraft::new(
            input.statement.as_str(),
            debate.identifier.clone(),
            author.identifier,
        );
        let identifier = draft.build_identifier(&self.engine);
        match store
            .upsert_statement(draft.into_statement(identifier))
            .map_err(store_error)?
        {
            Upsert::Created(statement) => Ok(Some((statement, true))),
            Upsert::Existing(statement) => Ok(Some((statement, false))),
            Upsert::Collision(existing) => {
                warn!(statement = %existing.identifier, "statement identifier collision");
                failures.push(PipelineFailure::new(
                    FailureKind::Statement,
                    format!("identifier {} already belongs to other content", existing.identifier),
                    input.statement.as_str(),
                ));
                Ok(None)
            }
        }
    }

    /// Extract components and intra-statement relations, then classify
    async fn process_statement(
        &self,
        statement: &mut Statement,
        plan: StatementPlan,
        counts: &mut PipelineCounts,
        failures: &mut Vec<PipelineFailure>,
    ) -> Result<(), PipelineError> {
        let text = statement.text.clone();
        let spans = self
            .score("tag_components", move |scorer| scorer.tag_components(&text))
            .await?;
        debug!(statement = %statement.identifier, spans = spans.len(), "tagged spans");

        let extracted = {
            let mut store = self.lock_store()?;
            let drafts = select_spans(statement, spans, &self.config, &self.gatekeeper, failures);
            persist_components(&mut *store, &self.engine, &self.gatekeeper, statement, drafts, failures)
                .map_err(store_error)?
        };
        counts.components_created += extracted.created;
        counts.components_reused += extracted.components.len() - extracted.created;

        let candidates = relations::candidate_pairs(&extracted.components);
        if !candidates.is_empty() {
            let jobs: Vec<TextPair> = candidates.iter().map(RelationCandidate::job).collect();
            let predictions = self.classify_relations(jobs).await?;

            let mut store = self.lock_store()?;
            counts.relations_created += relations::persist_relations(
                &mut *store,
                &self.gatekeeper,
                &self.config,
                &candidates,
                &predictions,
                failures,
            )
            .map_err(store_error)?;
        }

        if plan.classifies() {
            let text = statement.text.clone();
            let prediction = self
                .score("classify_statement", move |scorer| scorer.classify_statement(&text))
                .await?;

            let mut store = self.lock_store()?;
            if apply_classification(&mut *store, statement, &prediction).map_err(store_error)? {
                counts.statements_classified += 1;
            }
        }

        Ok(())
    }

    /// Score statement pairs, relate the linked major claims, then record links
    ///
    /// Links and sentinels are written last. A failed cross-statement call
    /// leaves every source unevaluated, so retrying the batch scores it again.
    async fn link_statements(
        &self,
        batch: &mut [Statement],
        counts: &mut PipelineCounts,
        failures: &mut Vec<PipelineFailure>,
    ) -> Result<(), PipelineError> {
        let decisions = {
            let candidates = linker::candidate_pairs(batch, &self.config);
            if candidates.is_empty() {
                debug!("no statement pairs to link");
                return Ok(());
            }

            let jobs: Vec<TextPair> = candidates.iter().map(|candidate| candidate.job()).collect();
            let predictions = self
                .score("classify_statement_relations", move |scorer| {
                    scorer.classify_statement_relations(&jobs)
                })
                .await?;
            check_alignment("classify_statement_relations", candidates.len(), &predictions)?;

            linker::resolve_links(&candidates, &predictions, self.config.min_statement_relation_score)
        };

        // (source, Some((target, score))) for a link, (source, None) for the sentinel
        let mut outcomes: Vec<(usize, Option<(usize, f64)>)> = Vec::new();
        let mut major_claims: Vec<(Component, Component)> = Vec::new();
        {
            let store = self.lock_store()?;
            for decision in decisions {
                let Some(source) = index_of(batch, decision.source()) else {
                    continue;
                };

                match decision {
                    LinkDecision::Linked { target, score, .. } => {
                        let Some(target) = index_of(batch, &target) else {
                            continue;
                        };
                        let validation = self.gatekeeper.validate_link(&batch[source], &batch[target]);
                        if !validation.is_accepted() {
                            failures.push(PipelineFailure::new(
                                FailureKind::Link,
                                validation.describe(),
                                batch[source].text.as_str(),
                            ));
                            continue;
                        }

                        let source_major = major_claim(&*store, &batch[source].identifier).map_err(store_error)?;
                        let target_major = major_claim(&*store, &batch[target].identifier).map_err(store_error)?;
                        if let (Some(source_major), Some(target_major)) = (source_major, target_major) {
                            major_claims.push((source_major, target_major));
                        }
                        outcomes.push((source, Some((target, score))));
                    }
                    LinkDecision::NoRelation { .. } => outcomes.push((source, None)),
                }
            }
        }

        self.relate_major_claims(&major_claims, counts, failures).await?;

        let mut store = self.lock_store()?;
        for (source, outcome) in outcomes {
            match outcome {
                Some((target, score)) => {
                    let target_id = batch[target].identifier.clone();
                    if !store
                        .set_link(&batch[source].identifier, Some(&target_id), score)
                        .map_err(store_error)?
                    {
                        continue;
                    }
                    info!(source = %batch[source].identifier, target = %target_id, score, "statements linked");
                    batch[source].related_to = Some(target_id);
                    batch[source].relation_score = Some(score);
                    counts.links_created += 1;
                }
                None => {
                    if store
                        .set_link(&batch[source].identifier, None, NO_RELATION_SENTINEL)
                        .map_err(store_error)?
                    {
                        debug!(statement = %batch[source].identifier, "no relation found");
                        batch[source].related_to = None;
                        batch[source].relation_score = Some(NO_RELATION_SENTINEL);
                        counts.links_rejected += 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// Score and persist relations between the major claims of linked statements
    async fn relate_major_claims(
        &self,
        pairs: &[(Component, Component)],
        counts: &mut PipelineCounts,
        failures: &mut Vec<PipelineFailure>,
    ) -> Result<(), PipelineError> {
        let candidates: Vec<RelationCandidate<'_>> = pairs
            .iter()
            .map(|(source, target)| RelationCandidate::new(source, target))
            .filter(|candidate| candidate.is_allowed(self.config.cross_statement_claim_targets_only))
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        let jobs: Vec<TextPair> = candidates.iter().map(RelationCandidate::job).collect();
        let predictions = self.classify_relations(jobs).await?;

        let mut store = self.lock_store()?;
        counts.cross_relations_created += relations::persist_relations(
            &mut *store,
            &self.gatekeeper,
            &self.config,
            &candidates,
            &predictions,
            failures,
        )
        .map_err(store_error)?;
        Ok(())
    }

    async fn classify_relations(&self, jobs: Vec<TextPair>) -> Result<Vec<Prediction>, PipelineError> {
        let expected = jobs.len();
        let predictions = self
            .score("classify_relations", move |scorer| scorer.classify_relations(&jobs))
            .await?;
        check_alignment("classify_relations", expected, &predictions)?;
        Ok(predictions)
    }

    /// Call the scorer on a blocking thread, bounded by the scoring timeout
    async fn score<T, F>(&self, call: &'static str, f: F) -> Result<T, PipelineError>
    where
        T: Send + 'static,
        F: FnOnce(&M) -> Result<T, M::Error> + Send + 'static,
    {
        let scorer = Arc::clone(&self.scorer);
        let task = tokio::task::spawn_blocking(move || {
            f(&*scorer).map_err(|e| PipelineError::Scoring(format!("{}: {}", call, e)))
        });

        timeout(self.config.scoring_timeout(), task)
            .await
            .map_err(|_| PipelineError::Timeout(call))?
            .map_err(|e| PipelineError::Scoring(format!("{}: task join error: {}", call, e)))?
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, S>, PipelineError> {
        self.store
            .lock()
            .map_err(|e| PipelineError::Store(format!("Store lock error: {}", e)))
    }
}

fn store_error<E: Display>(e: E) -> PipelineError {
    PipelineError::Store(e.to_string())
}

fn check_alignment(call: &'static str, expected: usize, predictions: &[Prediction]) -> Result<(), PipelineError> {
    if predictions.len() != expected {
        return Err(PipelineError::Scoring(format!(
            "{}: sent {} inputs, got {} predictions",
            call,
            expected,
            predictions.len()
        )));
    }
    Ok(())
}

fn index_of(batch: &[Statement], id: &Identifier) -> Option<usize> {
    batch.iter().position(|statement| &statement.identifier == id)
}

fn major_claim<S: GraphStore>(store: &S, statement: &Identifier) -> Result<Option<Component>, S::Error> {
    let components = store.components_for_statement(statement)?;
    let relations = store.relations_for_statement(statement)?;
    Ok(select_major_claim(&components, &relations).cloned())
}
