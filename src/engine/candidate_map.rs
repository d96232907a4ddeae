// Two-stage candidate map construction.
//
// Stage A: (symbol, finder) pairs -> candidate projects. Stage B: project
// buckets -> candidate documents. Both stages are the same shape - fan out
// finder narrowing queries under the configured strategy, pour results into
// a deduplicating sink - so membership is identical whichever schedule ran.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{FailureSink, Result, SearchError};
use crate::finders::ReferenceFinder;
use crate::model::{DocumentId, EquivalenceKey, ProjectId, Solution, Symbol};

use super::scope::SearchScope;
use super::strategy::{self, SearchStrategy};

/// Index of a finder in the engine's registered slice; pair identity for all
/// bucket de-duplication is (symbol equivalence key, finder index).
pub(crate) type FinderIndex = usize;

pub(crate) type PairBucket = Vec<(Arc<Symbol>, FinderIndex)>;
pub(crate) type ProjectMap = HashMap<ProjectId, PairBucket>;
pub(crate) type DocumentMap = HashMap<DocumentId, PairBucket>;

/// Concurrent map sink that refuses duplicate (symbol, finder) pairs per key
struct PairSink<K> {
    inner: Mutex<HashMap<K, BucketState>>,
}

#[derive(Default)]
struct BucketState {
    pairs: PairBucket,
    seen: HashSet<(EquivalenceKey, FinderIndex)>,
}

impl<K: Eq + Hash> PairSink<K> {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn insert(&self, key: K, symbol: &Arc<Symbol>, finder: FinderIndex) {
        let mut inner = self.inner.lock().unwrap();
        let bucket = inner.entry(key).or_default();
        if bucket.seen.insert((symbol.equivalence_key.clone(), finder)) {
            bucket.pairs.push((Arc::clone(symbol), finder));
        }
    }

    fn into_map(self) -> HashMap<K, PairBucket> {
        let inner = self.inner.into_inner().unwrap();
        inner
            .into_iter()
            .map(|(key, bucket)| {
                // The sink makes duplicates impossible by construction; a
                // mismatch here is an engine defect, not a runtime condition.
                debug_assert_eq!(bucket.pairs.len(), bucket.seen.len());
                (key, bucket.pairs)
            })
            .collect()
    }
}

pub(crate) struct CandidateMapBuilder<'a> {
    pub solution: &'a Arc<Solution>,
    pub finders: &'a [Arc<dyn ReferenceFinder>],
    pub strategy: SearchStrategy,
    pub token: &'a CancellationToken,
    pub failures: &'a FailureSink,
}

impl CandidateMapBuilder<'_> {
    /// Stage A: ask every (symbol, finder) pair which projects to search.
    pub async fn build_project_map(
        &self,
        symbols: &[Arc<Symbol>],
        scope: Option<&HashSet<ProjectId>>,
    ) -> Result<ProjectMap> {
        let sink = PairSink::new();
        let pairs: Vec<(Arc<Symbol>, FinderIndex)> = symbols
            .iter()
            .flat_map(|symbol| {
                (0..self.finders.len()).map(move |finder| (Arc::clone(symbol), finder))
            })
            .collect();

        let sink_ref = &sink;
        strategy::for_each(
            self.strategy,
            self.token,
            self.failures,
            pairs,
            |(symbol, finder)| async move {
                let projects = self.finders[finder]
                    .determine_projects_to_search(&symbol, self.solution, scope, self.token)
                    .await
                    .map_err(|source| {
                        SearchError::finder(self.finders[finder].name(), source)
                    })?;
                for project in projects {
                    // With an active scope finders may only narrow, never
                    // broaden; enforce that here rather than trusting them.
                    if scope.is_none_or(|s| s.contains(&project.id)) {
                        sink_ref.insert(project.id.clone(), &symbol, finder);
                    }
                }
                Ok(())
            },
        )
        .await?;

        let map = sink.into_map();
        debug!(projects = map.len(), "project map built");
        Ok(map)
    }

    /// Stage B: ask every project-bucket pair which documents to search.
    pub async fn build_document_map(
        &self,
        project_map: &ProjectMap,
        document_scope: Option<&SearchScope>,
    ) -> Result<DocumentMap> {
        let sink = PairSink::new();
        let work: Vec<(ProjectId, Arc<Symbol>, FinderIndex)> = project_map
            .iter()
            .flat_map(|(project, bucket)| {
                bucket
                    .iter()
                    .map(|(symbol, finder)| (project.clone(), Arc::clone(symbol), *finder))
            })
            .collect();

        let sink_ref = &sink;
        let doc_scope = document_scope.map(SearchScope::documents);
        strategy::for_each(
            self.strategy,
            self.token,
            self.failures,
            work,
            |(project_id, symbol, finder)| async move {
                let Some(project) = self.solution.project(&project_id) else {
                    return Ok(());
                };
                let documents = self.finders[finder]
                    .determine_documents_to_search(
                        &symbol,
                        &project,
                        self.solution,
                        doc_scope,
                        self.token,
                    )
                    .await
                    .map_err(|source| {
                        SearchError::finder(self.finders[finder].name(), source)
                    })?;
                for document in documents {
                    if doc_scope.is_none_or(|s| s.contains(&document.id)) {
                        sink_ref.insert(document.id.clone(), &symbol, finder);
                    }
                }
                Ok(())
            },
        )
        .await?;

        let map = sink.into_map();
        debug!(documents = map.len(), "document map built");
        Ok(map)
    }
}
