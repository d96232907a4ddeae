// The find-references engine: expand symbols, resolve scope, build the
// project and document maps, scan candidate documents, collect results.

mod candidate_map;
mod cascade;
mod results;
mod scope;
mod strategy;
mod symbol_set;

pub use results::SearchResults;
pub use scope::SearchScope;
pub use strategy::SearchStrategy;
pub use symbol_set::SymbolSet;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

use crate::error::{FailureSink, Result, SearchError};
use crate::finders::{ReferenceFinder, default_finders};
use crate::model::{Solution, Symbol};
use crate::progress::{NoopProgress, SearchProgress};

use candidate_map::{CandidateMapBuilder, FinderIndex};
use cascade::CascadeExpander;
use results::ResultsCollector;

/// Per-engine configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Schedule for every pipeline fan-out. Both schedules produce identical
    /// final snapshots; they differ only in throughput and in the
    /// interleaving of streamed callbacks.
    pub strategy: SearchStrategy,
}

/// Outcome of one search run.
///
/// Finder failures are isolated per invocation and never discard sibling
/// results, so a run can complete with both results and an aggregate error.
/// Callers should treat a `Some(failure)` as a degraded search: report what
/// was found, plus the error.
#[derive(Debug)]
pub struct SearchOutcome {
    pub results: SearchResults,
    pub failure: Option<SearchError>,
}

/// Incremental fan-out symbol-reference search engine.
///
/// Built once with a solution snapshot and a fixed finder collection, then
/// `run` per search. All per-run state (symbol set, maps, results) is created
/// fresh inside `run`; nothing persists across invocations.
pub struct FindReferencesEngine {
    solution: Arc<Solution>,
    finders: Vec<Arc<dyn ReferenceFinder>>,
    options: SearchOptions,
}

impl FindReferencesEngine {
    pub fn new(
        solution: Arc<Solution>,
        finders: Vec<Arc<dyn ReferenceFinder>>,
        options: SearchOptions,
    ) -> Self {
        Self {
            solution,
            finders,
            options,
        }
    }

    /// Engine with the bundled finder set.
    pub fn with_default_finders(solution: Arc<Solution>, options: SearchOptions) -> Self {
        Self::new(solution, default_finders(), options)
    }

    pub fn solution(&self) -> &Arc<Solution> {
        &self.solution
    }

    /// Convenience entry point: whole-solution search, no streaming sink,
    /// fresh token.
    pub async fn find_references(&self, root: &Arc<Symbol>) -> Result<SearchOutcome> {
        self.run(
            root,
            None,
            Arc::new(NoopProgress),
            CancellationToken::new(),
        )
        .await
    }

    /// Run the full pipeline for one root symbol.
    ///
    /// Returns `Err(SearchError::Cancelled)` when the token fires; otherwise
    /// always returns an outcome, with any isolated finder failures
    /// aggregated into `outcome.failure`.
    pub async fn run(
        &self,
        root: &Arc<Symbol>,
        search_scope: Option<SearchScope>,
        progress: Arc<dyn SearchProgress>,
        token: CancellationToken,
    ) -> Result<SearchOutcome> {
        progress.on_started().await;

        let failures = FailureSink::new();
        let symbol_set = SymbolSet::new();
        let collector = ResultsCollector::new();

        // Resolved up front: the cascade is constrained to the same project
        // scope the map stages filter with.
        let project_scope = scope::resolve_project_scope(&self.solution, search_scope.as_ref());

        let expander = CascadeExpander {
            solution: &self.solution,
            finders: &self.finders,
            strategy: self.options.strategy,
            scope: project_scope.as_ref(),
            symbols: &symbol_set,
            results: &collector,
            progress: progress.as_ref(),
            token: &token,
            failures: &failures,
        };
        expander
            .expand(Arc::clone(root))
            .instrument(info_span!("expand_symbols"))
            .await?;

        let symbols = symbol_set.snapshot();
        debug!(symbols = symbols.len(), "symbol expansion complete");

        let builder = CandidateMapBuilder {
            solution: &self.solution,
            finders: &self.finders,
            strategy: self.options.strategy,
            token: &token,
            failures: &failures,
        };
        let project_map = builder
            .build_project_map(&symbols, project_scope.as_ref())
            .instrument(info_span!("build_project_map"))
            .await?;
        let document_map = builder
            .build_document_map(&project_map, search_scope.as_ref())
            .instrument(info_span!("build_document_map"))
            .await?;

        // Search stage: the unit of concurrency is the (document, symbol,
        // finder) triple. Finders are stateless, so scanning one document for
        // several symbols concurrently is safe.
        let triples: Vec<(crate::model::DocumentId, Arc<Symbol>, FinderIndex)> = document_map
            .into_iter()
            .flat_map(|(document, bucket)| {
                bucket
                    .into_iter()
                    .map(move |(symbol, finder)| (document.clone(), symbol, finder))
            })
            .collect();
        debug!(triples = triples.len(), "scanning candidate documents");

        let collector_ref = &collector;
        let progress_ref = progress.as_ref();
        let token_ref = &token;
        strategy::for_each(
            self.options.strategy,
            &token,
            &failures,
            triples,
            |(document_id, symbol, finder)| async move {
                let Some(document) = self.solution.document(&document_id) else {
                    return Ok(());
                };
                let locations = self.finders[finder]
                    .find_references_in_document(&symbol, &document, &self.solution, token_ref)
                    .await
                    .map_err(|source| SearchError::finder(self.finders[finder].name(), source))?;
                for location in locations {
                    collector_ref.add_reference(&symbol, location.clone());
                    progress_ref.on_reference_found(&symbol, &location).await;
                }
                Ok(())
            },
        )
        .instrument(info_span!("find_references_in_documents"))
        .await?;

        progress.on_completed().await;

        Ok(SearchOutcome {
            results: collector.freeze(),
            failure: failures.into_aggregate(),
        })
    }
}
