// Immutable solution snapshot: projects, documents, symbols, relations.
//
// The engine treats this as a frozen, read-only view for the duration of one
// search. Hosts assemble it with `SolutionBuilder`; nothing here changes once
// `build()` returns.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::location::IdentifierOccurrence;
use super::symbol::{EquivalenceKey, RelationKind, Symbol, SymbolId, SymbolRelation};

/// Unique identifier of a project within a solution snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a document within a solution snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A project: a named set of documents plus direct project-to-project references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub document_ids: Vec<DocumentId>,
    /// Projects this project directly references (one hop, outgoing)
    pub project_references: Vec<ProjectId>,
}

/// A document: a file with its pre-bound identifier occurrences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub project: ProjectId,
    pub path: String,
    pub occurrences: Vec<IdentifierOccurrence>,
}

impl Document {
    /// Cheap textual pre-filter: does any occurrence carry this identifier?
    pub fn contains_identifier(&self, name: &str) -> bool {
        self.occurrences.iter().any(|occ| occ.text == name)
    }
}

/// Read-only queryable snapshot of the host's project/document/symbol graph
#[derive(Debug)]
pub struct Solution {
    projects: HashMap<ProjectId, Arc<Project>>,
    documents: HashMap<DocumentId, Arc<Document>>,
    symbols: HashMap<SymbolId, Arc<Symbol>>,
    relations: Vec<SymbolRelation>,
    /// Source-declared symbol per equivalence class, for metadata -> source mapping
    source_by_equivalence: HashMap<EquivalenceKey, SymbolId>,
}

impl Solution {
    pub fn project(&self, id: &ProjectId) -> Option<Arc<Project>> {
        self.projects.get(id).cloned()
    }

    pub fn document(&self, id: &DocumentId) -> Option<Arc<Document>> {
        self.documents.get(id).cloned()
    }

    pub fn symbol(&self, id: &SymbolId) -> Option<Arc<Symbol>> {
        self.symbols.get(id).cloned()
    }

    pub fn projects(&self) -> impl Iterator<Item = &Arc<Project>> {
        self.projects.values()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.values()
    }

    /// Documents belonging to a project, skipping dangling ids defensively.
    pub fn documents_of(&self, project: &Project) -> Vec<Arc<Document>> {
        project
            .document_ids
            .iter()
            .filter_map(|id| self.document(id))
            .collect()
    }

    /// Projects that directly reference `project` (incoming edges, one hop).
    /// These are the projects that can see symbols declared in `project`.
    pub fn dependent_projects(&self, project: &ProjectId) -> Vec<ProjectId> {
        self.projects
            .values()
            .filter(|p| p.project_references.contains(project))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Symbols `symbol` points at via `kind` edges.
    pub fn relations_from(&self, symbol: &SymbolId, kind: RelationKind) -> Vec<Arc<Symbol>> {
        self.relations
            .iter()
            .filter(|r| r.kind == kind && &r.from == symbol)
            .filter_map(|r| self.symbol(&r.to))
            .collect()
    }

    /// Symbols pointing at `symbol` via `kind` edges.
    pub fn relations_to(&self, symbol: &SymbolId, kind: RelationKind) -> Vec<Arc<Symbol>> {
        self.relations
            .iter()
            .filter(|r| r.kind == kind && &r.to == symbol)
            .filter_map(|r| self.symbol(&r.from))
            .collect()
    }

    /// Map a metadata symbol back to its source-declared counterpart, if this
    /// solution declares one in the same equivalence class. Source symbols map
    /// to themselves.
    pub fn source_symbol_for(&self, symbol: &Symbol) -> Option<Arc<Symbol>> {
        self.source_by_equivalence
            .get(&symbol.equivalence_key)
            .and_then(|id| self.symbol(id))
    }
}

/// Builder hosts use to assemble an immutable snapshot
#[derive(Debug, Default)]
pub struct SolutionBuilder {
    projects: Vec<Project>,
    documents: Vec<Document>,
    symbols: Vec<Symbol>,
    relations: Vec<SymbolRelation>,
}

impl SolutionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    pub fn add_document(mut self, document: Document) -> Self {
        self.documents.push(document);
        self
    }

    pub fn add_symbol(mut self, symbol: Symbol) -> Self {
        self.symbols.push(symbol);
        self
    }

    pub fn add_relation(mut self, relation: SymbolRelation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn build(self) -> Arc<Solution> {
        let mut source_by_equivalence = HashMap::new();
        for symbol in &self.symbols {
            if symbol.is_source() {
                source_by_equivalence
                    .entry(symbol.equivalence_key.clone())
                    .or_insert_with(|| symbol.id.clone());
            }
        }

        Arc::new(Solution {
            projects: self
                .projects
                .into_iter()
                .map(|p| (p.id.clone(), Arc::new(p)))
                .collect(),
            documents: self
                .documents
                .into_iter()
                .map(|d| (d.id.clone(), Arc::new(d)))
                .collect(),
            symbols: self
                .symbols
                .into_iter()
                .map(|s| (s.id.clone(), Arc::new(s)))
                .collect(),
            relations: self.relations,
            source_by_equivalence,
        })
    }
}
