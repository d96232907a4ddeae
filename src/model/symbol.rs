// Symbol handles and the equivalence model used for all engine de-duplication.
//
// Symbols are owned by the host's solution snapshot; the engine only holds
// cheap Arc handles and never mutates them. Two handles may denote the same
// logical entity (a source declaration and its metadata view in another
// compilation) - those share an EquivalenceKey, which is the identity every
// de-duplicating structure in the engine keys on. SymbolId stays unique per
// handle and is what document occurrences bind to.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::solution::ProjectId;

/// Unique identifier of one symbol handle within a solution snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub String);

impl SymbolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cross-compilation identity: source and metadata views of the same logical
/// entity carry the same key. Distinct from `SymbolId` handle identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EquivalenceKey(pub String);

impl EquivalenceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl fmt::Display for EquivalenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of symbol handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    Method,
    Constructor,
    Property,
    Event,
    Field,
    Namespace,
    Alias,
}

/// Where a symbol is declared: in a source project of this solution, or in
/// referenced metadata (no project, no documents of its own).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolOrigin {
    Source(ProjectId),
    Metadata,
}

/// A declared program entity in the host's solution snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique handle identifier
    pub id: SymbolId,
    /// Symbol name as it appears in code
    pub name: String,
    /// Kind of symbol
    pub kind: SymbolKind,
    /// Source project or metadata origin
    pub origin: SymbolOrigin,
    /// Containing symbol (methods in types, accessors in properties, etc.)
    pub parent: Option<SymbolId>,
    /// For `Alias` symbols: the aliased target
    pub alias_target: Option<SymbolId>,
    /// For reduced forms (extension-method reduction, nullable wrapping):
    /// the original unreduced definition
    pub reduced_from: Option<SymbolId>,
    /// Cross-compilation identity key
    pub equivalence_key: EquivalenceKey,
}

impl Symbol {
    pub fn is_source(&self) -> bool {
        matches!(self.origin, SymbolOrigin::Source(_))
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self.origin, SymbolOrigin::Metadata)
    }

    /// Project this symbol is declared in, if declared in source.
    pub fn defining_project(&self) -> Option<&ProjectId> {
        match &self.origin {
            SymbolOrigin::Source(project) => Some(project),
            SymbolOrigin::Metadata => None,
        }
    }
}

/// Kinds of symbol-to-symbol edges the bundled finders cascade through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// `from` overrides `to`
    Overrides,
    /// `from` implements interface member `to`
    Implements,
    /// `from` and `to` are parts of one partial definition
    PartialPart,
    /// `from` is an accessor method of property/event `to`
    AccessorOf,
}

/// A directed edge between two symbols in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRelation {
    pub from: SymbolId,
    pub to: SymbolId,
    pub kind: RelationKind,
}

impl SymbolRelation {
    pub fn new(from: SymbolId, to: SymbolId, kind: RelationKind) -> Self {
        Self { from, to, kind }
    }
}
