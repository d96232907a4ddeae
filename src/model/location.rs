// Spans, usage flags, identifier occurrences, and reference locations.

use serde::{Deserialize, Serialize};

use super::solution::DocumentId;
use super::symbol::SymbolId;

/// Byte span within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextSpan {
    /// Start byte offset (inclusive)
    pub start: u32,
    /// End byte offset (exclusive)
    pub end: u32,
}

impl TextSpan {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// How a symbol is used at a particular location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageInfo {
    /// Location writes to the symbol (assignment, ref/out argument)
    pub is_write: bool,
    /// Usage the compiler synthesized rather than user-written text
    /// (e.g. accessor invocation behind property syntax)
    pub is_implicit: bool,
    /// Usage appears inside an attribute/annotation
    pub in_attribute: bool,
}

impl UsageInfo {
    pub fn read() -> Self {
        Self::default()
    }

    pub fn write() -> Self {
        Self {
            is_write: true,
            ..Self::default()
        }
    }
}

/// A pre-bound identifier use site inside a document.
///
/// The host's binder produces these when the snapshot is built; `resolved`
/// carries the bound symbol handle when binding succeeded, and is absent for
/// identifiers the binder could not resolve (those remain textual candidates
/// only and are never reported as references).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifierOccurrence {
    /// Identifier text as written
    pub text: String,
    /// Span of the identifier token
    pub span: TextSpan,
    /// Symbol this occurrence binds to, when known
    pub resolved: Option<SymbolId>,
    /// Access-kind flags
    pub usage: UsageInfo,
}

impl IdentifierOccurrence {
    pub fn new(text: impl Into<String>, span: TextSpan) -> Self {
        Self {
            text: text.into(),
            span,
            resolved: None,
            usage: UsageInfo::default(),
        }
    }

    pub fn resolved_to(mut self, symbol: SymbolId) -> Self {
        self.resolved = Some(symbol);
        self
    }

    pub fn with_usage(mut self, usage: UsageInfo) -> Self {
        self.usage = usage;
        self
    }
}

/// A document position where a searched symbol is referenced
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceLocation {
    /// Document containing the reference
    pub document: DocumentId,
    /// Span of the referencing token
    pub span: TextSpan,
    /// Access-kind flags
    pub usage: UsageInfo,
}

impl ReferenceLocation {
    pub fn new(document: DocumentId, span: TextSpan, usage: UsageInfo) -> Self {
        Self {
            document,
            span,
            usage,
        }
    }

    /// Sort key: results are ordered by document, then span position.
    pub(crate) fn sort_key(&self) -> (&DocumentId, u32, u32) {
        (&self.document, self.span.start, self.span.end)
    }
}
