// Search scope: optional restriction to a document subset, resolved to the
// closed set of projects the search may touch.

use std::collections::HashSet;

use crate::model::{DocumentId, ProjectId, Solution};

/// Restriction of a search to a specific set of documents. Absence of a
/// scope means the whole solution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchScope {
    documents: HashSet<DocumentId>,
}

impl SearchScope {
    pub fn new(documents: impl IntoIterator<Item = DocumentId>) -> Self {
        Self {
            documents: documents.into_iter().collect(),
        }
    }

    pub fn contains(&self, document: &DocumentId) -> bool {
        self.documents.contains(document)
    }

    pub fn documents(&self) -> &HashSet<DocumentId> {
        &self.documents
    }
}

/// Resolve a document scope to its project scope: the projects containing any
/// in-scope document, plus every project that directly references one of them
/// (one hop, deliberately not transitive - a symbol declared in an in-scope
/// project is visible to its direct dependents, and a restricted search should
/// not crawl the rest of a large solution).
///
/// `None` scope resolves to `None`: unrestricted.
pub(crate) fn resolve_project_scope(
    solution: &Solution,
    scope: Option<&SearchScope>,
) -> Option<HashSet<ProjectId>> {
    let scope = scope?;

    let seeds: HashSet<ProjectId> = scope
        .documents()
        .iter()
        .filter_map(|id| solution.document(id))
        .map(|doc| doc.project.clone())
        .collect();

    let mut projects = seeds.clone();
    for project in solution.projects() {
        if project.project_references.iter().any(|r| seeds.contains(r)) {
            projects.insert(project.id.clone());
        }
    }
    Some(projects)
}
