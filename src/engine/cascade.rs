// Cascade expansion: from one root symbol to the full set of symbols the
// search must cover.
//
// Expansion is a recursive concurrent graph walk. The symbol set's
// test-and-set is the only synchronization point: whichever branch adds a
// symbol first reports it and fans out to the finders; every other branch
// that reaches an equivalent symbol stops. The symbol universe is finite, so
// the walk reaches a fixed point.

use async_recursion::async_recursion;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{FailureSink, Result, SearchError};
use crate::finders::ReferenceFinder;
use crate::model::{ProjectId, Solution, Symbol, SymbolId, SymbolKind};
use crate::progress::SearchProgress;

use super::results::ResultsCollector;
use super::strategy::{self, SearchStrategy};
use super::symbol_set::SymbolSet;

pub(crate) struct CascadeExpander<'a> {
    pub solution: &'a Arc<Solution>,
    pub finders: &'a [Arc<dyn ReferenceFinder>],
    pub strategy: SearchStrategy,
    pub scope: Option<&'a HashSet<ProjectId>>,
    pub symbols: &'a SymbolSet,
    pub results: &'a ResultsCollector,
    pub progress: &'a dyn SearchProgress,
    pub token: &'a CancellationToken,
    pub failures: &'a FailureSink,
}

impl CascadeExpander<'_> {
    pub async fn expand(&self, root: Arc<Symbol>) -> Result<()> {
        self.expand_symbol(root).await
    }

    /// Anchor the search on the symbol callers actually mean:
    /// alias -> target, reduced form -> original unreduced definition,
    /// delegate constructor -> the delegate type itself (callers rarely
    /// distinguish construction from the delegate type), and finally
    /// metadata -> source counterpart when the solution declares one.
    fn normalize(&self, symbol: Arc<Symbol>) -> Arc<Symbol> {
        let mut current = symbol;
        let mut visited: HashSet<SymbolId> = HashSet::new();

        loop {
            if !visited.insert(current.id.clone()) {
                // Malformed alias/reduction cycle in the snapshot; anchor on
                // whatever we reached last.
                break;
            }

            if current.kind == SymbolKind::Alias {
                if let Some(target) = current
                    .alias_target
                    .as_ref()
                    .and_then(|id| self.solution.symbol(id))
                {
                    current = target;
                    continue;
                }
            }

            if let Some(original) = current
                .reduced_from
                .as_ref()
                .and_then(|id| self.solution.symbol(id))
            {
                current = original;
                continue;
            }

            if current.kind == SymbolKind::Constructor {
                if let Some(parent) = current
                    .parent
                    .as_ref()
                    .and_then(|id| self.solution.symbol(id))
                {
                    if parent.kind == SymbolKind::Delegate {
                        current = parent;
                        continue;
                    }
                }
            }

            break;
        }

        if current.is_metadata() {
            if let Some(source) = self.solution.source_symbol_for(&current) {
                debug!(metadata = %current.id, source = %source.id, "anchored on source symbol");
                return source;
            }
        }
        current
    }

    #[async_recursion]
    async fn expand_symbol(&self, symbol: Arc<Symbol>) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let symbol = self.normalize(symbol);
        if !self.symbols.try_add(&symbol) {
            // Another branch got here first; fixed point for this symbol.
            return Ok(());
        }

        debug!(symbol = %symbol.id, "definition found");
        self.results.register_definition(&symbol);
        self.progress.on_definition_found(&symbol).await;

        let finder_indices: Vec<usize> = (0..self.finders.len()).collect();
        strategy::for_each(
            self.strategy,
            self.token,
            self.failures,
            finder_indices,
            |finder| {
                let symbol = Arc::clone(&symbol);
                async move {
                    let cascaded = self.finders[finder]
                        .determine_cascaded_symbols(&symbol, self.solution, self.scope, self.token)
                        .await
                        .map_err(|source| {
                            SearchError::finder(self.finders[finder].name(), source)
                        })?;
                    strategy::for_each(
                        self.strategy,
                        self.token,
                        self.failures,
                        cascaded,
                        |next| self.expand_symbol(next),
                    )
                    .await
                }
            },
        )
        .await
    }
}
