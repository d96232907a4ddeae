// Quarry - Concurrent Fan-Out Find-References Engine
//!
//! Quarry takes a root symbol in an immutable solution snapshot, cascades to
//! every related symbol that must also be searched (overrides,
//! implementations, partial parts, property accessors, delegate-constructor
//! targets), narrows the candidate project and document sets through
//! pluggable reference finders, then concurrently scans the candidates -
//! streaming definitions and references as they are found and returning an
//! immutable aggregated result.
//!
//! The whole pipeline runs under a runtime-selected strategy (parallel
//! fan-out or strictly sequential); both produce identical final snapshots.

pub mod engine;
pub mod error;
pub mod finders;
pub mod model;
pub mod progress;

#[cfg(test)]
pub mod tests;

// Re-export the engine surface
pub use engine::{
    FindReferencesEngine, SearchOptions, SearchOutcome, SearchResults, SearchScope,
    SearchStrategy, SymbolSet,
};
pub use error::SearchError;
pub use finders::{FinderResult, ReferenceFinder, default_finders};
pub use model::{
    Document, DocumentId, EquivalenceKey, IdentifierOccurrence, Project, ProjectId,
    ReferenceLocation, RelationKind, Solution, SolutionBuilder, Symbol, SymbolId, SymbolKind,
    SymbolOrigin, SymbolRelation, TextSpan, UsageInfo,
};
pub use progress::{NoopProgress, SearchProgress};
