// Results accumulation: concurrent writers during the run, immutable sorted
// snapshot afterwards.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::model::{EquivalenceKey, ReferenceLocation, Symbol};

#[derive(Debug)]
struct DefinitionEntry {
    symbol: Arc<Symbol>,
    locations: Vec<ReferenceLocation>,
}

/// Accumulates reference locations per definition symbol. Purely additive;
/// locations are appended until `freeze`.
#[derive(Debug, Default)]
pub(crate) struct ResultsCollector {
    inner: Mutex<HashMap<EquivalenceKey, DefinitionEntry>>,
}

impl ResultsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition of interest. Idempotent: a second registration
    /// of an equivalent symbol is a no-op.
    pub fn register_definition(&self, symbol: &Arc<Symbol>) {
        self.inner
            .lock()
            .unwrap()
            .entry(symbol.equivalence_key.clone())
            .or_insert_with(|| DefinitionEntry {
                symbol: Arc::clone(symbol),
                locations: Vec::new(),
            });
    }

    /// Append a located reference to its owning definition. Registers the
    /// definition defensively if a finder reported a reference for a symbol
    /// that was never registered.
    pub fn add_reference(&self, symbol: &Arc<Symbol>, location: ReferenceLocation) {
        self.inner
            .lock()
            .unwrap()
            .entry(symbol.equivalence_key.clone())
            .or_insert_with(|| DefinitionEntry {
                symbol: Arc::clone(symbol),
                locations: Vec::new(),
            })
            .locations
            .push(location);
    }

    /// Freeze into the immutable result. Reference lists are sorted by
    /// (document, span) and deduplicated so both strategies produce identical
    /// snapshots, and definitions are ordered by symbol id.
    pub fn freeze(self) -> SearchResults {
        let mut entries: Vec<(Arc<Symbol>, Vec<ReferenceLocation>)> = self
            .inner
            .into_inner()
            .unwrap()
            .into_values()
            .map(|mut entry| {
                entry.locations.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
                entry.locations.dedup();
                (entry.symbol, entry.locations)
            })
            .collect();
        entries.sort_by(|a, b| a.0.id.cmp(&b.0.id));
        SearchResults { entries }
    }
}

/// Immutable mapping from definition symbol to its ordered reference list
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    entries: Vec<(Arc<Symbol>, Vec<ReferenceLocation>)>,
}

impl SearchResults {
    /// Definitions with their references, ordered by symbol id.
    pub fn definitions(&self) -> impl Iterator<Item = (&Arc<Symbol>, &[ReferenceLocation])> {
        self.entries
            .iter()
            .map(|(symbol, locations)| (symbol, locations.as_slice()))
    }

    /// References for the definition equivalent to `symbol`, if registered.
    pub fn references_for(&self, symbol: &Symbol) -> Option<&[ReferenceLocation]> {
        self.entries
            .iter()
            .find(|(s, _)| s.equivalence_key == symbol.equivalence_key)
            .map(|(_, locations)| locations.as_slice())
    }

    pub fn definition_count(&self) -> usize {
        self.entries.len()
    }

    pub fn reference_count(&self) -> usize {
        self.entries.iter().map(|(_, locs)| locs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON rendering for hosts that persist results or ship them over RPC.
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Entry<'a> {
            definition: &'a Symbol,
            references: &'a [ReferenceLocation],
        }
        let entries: Vec<Entry> = self
            .entries
            .iter()
            .map(|(symbol, locations)| Entry {
                definition: symbol,
                references: locations,
            })
            .collect();
        serde_json::to_string(&entries)
    }
}
