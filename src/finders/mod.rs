// Reference finder plugin contract.
//
// One finder per family of symbol kinds. Finders are stateless, idempotent,
// and safely invoked concurrently; a finder that does not handle a symbol
// returns empty results rather than erroring, so the engine never needs a
// central kind dispatch. The engine deduplicates and scope-filters whatever
// finders return.

pub mod ordinary;
pub mod property;

pub use ordinary::OrdinaryReferenceFinder;
pub use property::PropertyAccessorFinder;

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::model::{Document, DocumentId, Project, ProjectId, ReferenceLocation, Solution, Symbol};

/// Result type for finder implementations. Plugins fail with arbitrary
/// context; the engine wraps failures with the finder's name and aggregates
/// them per run.
pub type FinderResult<T> = anyhow::Result<T>;

#[async_trait]
pub trait ReferenceFinder: Send + Sync {
    /// Stable name used in error reports and logs.
    fn name(&self) -> &'static str;

    /// Symbols logically tied to `symbol` that must also be searched
    /// (overrides, implementations, partial parts, accessors, ...).
    /// `scope` is the resolved project scope: `Some` restricts cascading to
    /// those projects, `None` means the whole solution.
    async fn determine_cascaded_symbols(
        &self,
        symbol: &Arc<Symbol>,
        solution: &Solution,
        scope: Option<&HashSet<ProjectId>>,
        token: &CancellationToken,
    ) -> FinderResult<Vec<Arc<Symbol>>>;

    /// Projects that could contain references to `symbol`. With a `Some`
    /// scope the engine additionally filters the result to the scope, so
    /// finders may treat it as advisory.
    async fn determine_projects_to_search(
        &self,
        symbol: &Arc<Symbol>,
        solution: &Solution,
        scope: Option<&HashSet<ProjectId>>,
        token: &CancellationToken,
    ) -> FinderResult<Vec<Arc<Project>>>;

    /// Documents within `project` that could contain references to `symbol`.
    async fn determine_documents_to_search(
        &self,
        symbol: &Arc<Symbol>,
        project: &Arc<Project>,
        solution: &Solution,
        document_scope: Option<&HashSet<DocumentId>>,
        token: &CancellationToken,
    ) -> FinderResult<Vec<Arc<Document>>>;

    /// Scan one document for references to `symbol`.
    async fn find_references_in_document(
        &self,
        symbol: &Arc<Symbol>,
        document: &Arc<Document>,
        solution: &Solution,
        token: &CancellationToken,
    ) -> FinderResult<Vec<ReferenceLocation>>;
}

/// The finder set a default engine ships with.
pub fn default_finders() -> Vec<Arc<dyn ReferenceFinder>> {
    vec![
        Arc::new(OrdinaryReferenceFinder),
        Arc::new(PropertyAccessorFinder),
    ]
}
