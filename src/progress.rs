// Streaming progress sink.
//
// Definitions and references are reported as they are discovered so callers
// can update UI before the run completes. Callback order is unspecified and
// differs between strategies; only eventual completeness is guaranteed.

use async_trait::async_trait;
use std::sync::Arc;

use crate::model::{ReferenceLocation, Symbol};

#[async_trait]
pub trait SearchProgress: Send + Sync {
    /// Called once before the pipeline starts.
    async fn on_started(&self) {}

    /// Called once after the pipeline completes (not called on cancellation).
    async fn on_completed(&self) {}

    /// A symbol was added to the search as a definition of interest.
    async fn on_definition_found(&self, symbol: &Arc<Symbol>);

    /// A reference to `symbol` was located.
    async fn on_reference_found(&self, symbol: &Arc<Symbol>, location: &ReferenceLocation);
}

/// Progress sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

#[async_trait]
impl SearchProgress for NoopProgress {
    async fn on_definition_found(&self, _symbol: &Arc<Symbol>) {}

    async fn on_reference_found(&self, _symbol: &Arc<Symbol>, _location: &ReferenceLocation) {}
}
