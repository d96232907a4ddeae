// Property/event accessor cascading.
//
// Searching a property must also surface its accessor methods (a caller of
// the getter references the property) and searching an accessor pulls in the
// owning property. This finder contributes cascade edges only; scanning is
// left to the ordinary finder, which already handles the cascaded symbols
// once they are in the symbol set.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::model::{
    Document, DocumentId, Project, ProjectId, ReferenceLocation, RelationKind, Solution, Symbol,
    SymbolKind,
};

use super::{FinderResult, ReferenceFinder};

#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyAccessorFinder;

#[async_trait]
impl ReferenceFinder for PropertyAccessorFinder {
    fn name(&self) -> &'static str {
        "property_accessor"
    }

    async fn determine_cascaded_symbols(
        &self,
        symbol: &Arc<Symbol>,
        solution: &Solution,
        scope: Option<&HashSet<ProjectId>>,
        _token: &CancellationToken,
    ) -> FinderResult<Vec<Arc<Symbol>>> {
        let mut cascaded = match symbol.kind {
            // Property/event -> its accessor methods
            SymbolKind::Property | SymbolKind::Event => {
                solution.relations_to(&symbol.id, RelationKind::AccessorOf)
            }
            // Accessor method -> its owning property/event
            SymbolKind::Method => solution.relations_from(&symbol.id, RelationKind::AccessorOf),
            _ => Vec::new(),
        };

        if let Some(scope) = scope {
            cascaded.retain(|s| match s.defining_project() {
                Some(project) => scope.contains(project),
                None => true,
            });
        }
        Ok(cascaded)
    }

    async fn determine_projects_to_search(
        &self,
        _symbol: &Arc<Symbol>,
        _solution: &Solution,
        _scope: Option<&HashSet<ProjectId>>,
        _token: &CancellationToken,
    ) -> FinderResult<Vec<Arc<Project>>> {
        Ok(Vec::new())
    }

    async fn determine_documents_to_search(
        &self,
        _symbol: &Arc<Symbol>,
        _project: &Arc<Project>,
        _solution: &Solution,
        _document_scope: Option<&HashSet<DocumentId>>,
        _token: &CancellationToken,
    ) -> FinderResult<Vec<Arc<Document>>> {
        Ok(Vec::new())
    }

    async fn find_references_in_document(
        &self,
        _symbol: &Arc<Symbol>,
        _document: &Arc<Document>,
        _solution: &Solution,
        _token: &CancellationToken,
    ) -> FinderResult<Vec<ReferenceLocation>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        EquivalenceKey, SolutionBuilder, SymbolId, SymbolOrigin, SymbolRelation,
    };

    fn symbol(id: &str, name: &str, kind: SymbolKind) -> Symbol {
        Symbol {
            id: SymbolId::new(id),
            name: name.to_string(),
            kind,
            origin: SymbolOrigin::Source(ProjectId::new("p1")),
            parent: None,
            alias_target: None,
            reduced_from: None,
            equivalence_key: EquivalenceKey::new(id),
        }
    }

    #[tokio::test]
    async fn property_cascades_to_accessors_and_back() {
        let solution = SolutionBuilder::new()
            .add_symbol(symbol("prop", "Value", SymbolKind::Property))
            .add_symbol(symbol("get", "get_Value", SymbolKind::Method))
            .add_symbol(symbol("set", "set_Value", SymbolKind::Method))
            .add_relation(SymbolRelation::new(
                SymbolId::new("get"),
                SymbolId::new("prop"),
                RelationKind::AccessorOf,
            ))
            .add_relation(SymbolRelation::new(
                SymbolId::new("set"),
                SymbolId::new("prop"),
                RelationKind::AccessorOf,
            ))
            .build();

        let finder = PropertyAccessorFinder;
        let token = CancellationToken::new();

        let prop = solution.symbol(&SymbolId::new("prop")).unwrap();
        let accessors = finder
            .determine_cascaded_symbols(&prop, &solution, None, &token)
            .await
            .unwrap();
        let mut ids: Vec<&str> = accessors.iter().map(|s| s.id.0.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["get", "set"]);

        let getter = solution.symbol(&SymbolId::new("get")).unwrap();
        let owners = finder
            .determine_cascaded_symbols(&getter, &solution, None, &token)
            .await
            .unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].id, SymbolId::new("prop"));
    }

    #[tokio::test]
    async fn irrelevant_kinds_get_empty_results() {
        let solution = SolutionBuilder::new()
            .add_symbol(symbol("f", "field", SymbolKind::Field))
            .build();

        let finder = PropertyAccessorFinder;
        let token = CancellationToken::new();
        let field = solution.symbol(&SymbolId::new("f")).unwrap();
        let cascaded = finder
            .determine_cascaded_symbols(&field, &solution, None, &token)
            .await
            .unwrap();
        assert!(cascaded.is_empty());
    }
}
