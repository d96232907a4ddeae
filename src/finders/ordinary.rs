// Default finder for most symbol kinds.
//
// Cascades through override/implementation/partial-part edges in both
// directions, narrows projects to the defining project plus its dependents,
// narrows documents with the textual identifier pre-filter, and scans
// pre-bound occurrences for matches in the symbol's equivalence class.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::model::{
    Document, DocumentId, Project, ProjectId, ReferenceLocation, RelationKind, Solution, Symbol,
};

use super::{FinderResult, ReferenceFinder};

#[derive(Debug, Default, Clone, Copy)]
pub struct OrdinaryReferenceFinder;

const CASCADE_KINDS: &[RelationKind] = &[
    RelationKind::Overrides,
    RelationKind::Implements,
    RelationKind::PartialPart,
];

#[async_trait]
impl ReferenceFinder for OrdinaryReferenceFinder {
    fn name(&self) -> &'static str {
        "ordinary"
    }

    async fn determine_cascaded_symbols(
        &self,
        symbol: &Arc<Symbol>,
        solution: &Solution,
        scope: Option<&HashSet<ProjectId>>,
        _token: &CancellationToken,
    ) -> FinderResult<Vec<Arc<Symbol>>> {
        let mut cascaded = Vec::new();
        for kind in CASCADE_KINDS {
            // Relations cascade both ways: searching a base member must pull
            // in its overrides, and searching an override pulls in the base.
            cascaded.extend(solution.relations_from(&symbol.id, *kind));
            cascaded.extend(solution.relations_to(&symbol.id, *kind));
        }

        if let Some(scope) = scope {
            // Metadata symbols have no defining project; keep them, since the
            // scope only restricts where source declarations may live.
            cascaded.retain(|s| match s.defining_project() {
                Some(project) => scope.contains(project),
                None => true,
            });
        }

        debug!(
            symbol = %symbol.id,
            count = cascaded.len(),
            "cascaded through relation edges"
        );
        Ok(cascaded)
    }

    async fn determine_projects_to_search(
        &self,
        symbol: &Arc<Symbol>,
        solution: &Solution,
        scope: Option<&HashSet<ProjectId>>,
        _token: &CancellationToken,
    ) -> FinderResult<Vec<Arc<Project>>> {
        let candidates: Vec<ProjectId> = match symbol.defining_project() {
            // References can only appear in the defining project or a project
            // that directly references it.
            Some(defining) => {
                let mut ids = solution.dependent_projects(defining);
                ids.push(defining.clone());
                ids
            }
            // Metadata symbols are visible everywhere.
            None => solution.projects().map(|p| p.id.clone()).collect(),
        };

        Ok(candidates
            .into_iter()
            .filter(|id| scope.is_none_or(|s| s.contains(id)))
            .filter_map(|id| solution.project(&id))
            .collect())
    }

    async fn determine_documents_to_search(
        &self,
        symbol: &Arc<Symbol>,
        project: &Arc<Project>,
        solution: &Solution,
        document_scope: Option<&HashSet<DocumentId>>,
        _token: &CancellationToken,
    ) -> FinderResult<Vec<Arc<Document>>> {
        Ok(solution
            .documents_of(project)
            .into_iter()
            .filter(|doc| document_scope.is_none_or(|s| s.contains(&doc.id)))
            .filter(|doc| doc.contains_identifier(&symbol.name))
            .collect())
    }

    async fn find_references_in_document(
        &self,
        symbol: &Arc<Symbol>,
        document: &Arc<Document>,
        solution: &Solution,
        token: &CancellationToken,
    ) -> FinderResult<Vec<ReferenceLocation>> {
        let mut locations = Vec::new();
        for occurrence in &document.occurrences {
            if token.is_cancelled() {
                anyhow::bail!("cancelled while scanning {}", document.path);
            }
            let Some(resolved_id) = &occurrence.resolved else {
                continue;
            };
            let Some(resolved) = solution.symbol(resolved_id) else {
                continue;
            };
            // Match on the equivalence class, not handle identity, so a
            // metadata view of the searched symbol still counts.
            if resolved.equivalence_key == symbol.equivalence_key {
                locations.push(ReferenceLocation::new(
                    document.id.clone(),
                    occurrence.span,
                    occurrence.usage,
                ));
            }
        }
        Ok(locations)
    }
}
