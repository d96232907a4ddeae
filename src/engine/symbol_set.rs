// Concurrent, equivalence-aware set of symbols under search.
//
// `try_add` is the single synchronization point that prevents duplicate
// cascade expansion: of any number of concurrent callers adding symbols from
// the same equivalence class, exactly one observes `true`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::model::{EquivalenceKey, Symbol};

#[derive(Debug, Default)]
pub struct SymbolSet {
    inner: Mutex<HashMap<EquivalenceKey, Arc<Symbol>>>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `symbol` unless an equivalent symbol is already present. Returns
    /// true iff this call inserted it (test-and-set).
    pub fn try_add(&self, symbol: &Arc<Symbol>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.entry(symbol.equivalence_key.clone()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(Arc::clone(symbol));
                true
            }
        }
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.inner
            .lock()
            .unwrap()
            .contains_key(&symbol.equivalence_key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Arc<Symbol>> {
        self.inner.lock().unwrap().values().cloned().collect()
    }
}
