// Solution snapshot model consumed by the search engine.
//
// Everything here is immutable once built; the engine only reads it.

pub mod location;
pub mod solution;
pub mod symbol;

pub use location::{IdentifierOccurrence, ReferenceLocation, TextSpan, UsageInfo};
pub use solution::{
    Document, DocumentId, Project, ProjectId, Solution, SolutionBuilder,
};
pub use symbol::{
    EquivalenceKey, RelationKind, Symbol, SymbolId, SymbolKind, SymbolOrigin, SymbolRelation,
};
