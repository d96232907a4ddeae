// End-to-end pipeline properties over the override fixture.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::engine::{FindReferencesEngine, SearchOptions, SearchScope, SearchStrategy};
use crate::error::SearchError;
use crate::finders::default_finders;
use crate::model::DocumentId;
use crate::progress::NoopProgress;

use super::fixtures::{
    CollectingProgress, PanickingFinder, ThrowingFinder, override_fixture,
};

fn engine_with(strategy: SearchStrategy) -> FindReferencesEngine {
    let (solution, _, _) = override_fixture();
    FindReferencesEngine::with_default_finders(solution, SearchOptions { strategy })
}

#[tokio::test]
async fn references_attach_to_the_symbol_they_bind_to() {
    let (solution, base, derived) = override_fixture();
    let engine = FindReferencesEngine::with_default_finders(solution, SearchOptions::default());

    let outcome = engine.find_references(&base).await.unwrap();
    assert!(outcome.failure.is_none());

    // Root M cascades to the override; both are definitions.
    assert_eq!(outcome.results.definition_count(), 2);

    // The call bound to D.M lands on D.M, not on the root.
    let derived_refs = outcome.results.references_for(&derived).unwrap();
    assert_eq!(derived_refs.len(), 1);
    assert_eq!(derived_refs[0].document, DocumentId::new("d2"));

    let base_refs = outcome.results.references_for(&base).unwrap();
    assert_eq!(base_refs.len(), 2);
    assert_eq!(base_refs[0].document, DocumentId::new("d1"));
    assert_eq!(base_refs[1].document, DocumentId::new("d3"));

    // Access-kind flags travel from the bound occurrence to the reported
    // location: d1 is a plain read, d3 sits inside an attribute.
    assert!(!base_refs[0].usage.is_write);
    assert!(!base_refs[0].usage.in_attribute);
    assert!(base_refs[1].usage.in_attribute);
}

#[tokio::test]
async fn searching_the_override_cascades_back_to_the_base() {
    let (solution, base, derived) = override_fixture();
    let engine = FindReferencesEngine::with_default_finders(solution, SearchOptions::default());

    let outcome = engine.find_references(&derived).await.unwrap();
    assert_eq!(outcome.results.definition_count(), 2);
    assert_eq!(outcome.results.references_for(&base).unwrap().len(), 2);
}

#[tokio::test]
async fn sequential_and_parallel_runs_produce_identical_snapshots() {
    let (_, base, _) = override_fixture();

    let sequential = engine_with(SearchStrategy::Sequential)
        .find_references(&base)
        .await
        .unwrap();
    let parallel = engine_with(SearchStrategy::Parallel)
        .find_references(&base)
        .await
        .unwrap();

    assert!(sequential.failure.is_none());
    assert!(parallel.failure.is_none());
    assert_eq!(sequential.results, parallel.results);
}

#[tokio::test]
async fn document_scope_restricts_the_search() {
    let (solution, base, derived) = override_fixture();
    let engine = FindReferencesEngine::with_default_finders(solution, SearchOptions::default());

    let scope = SearchScope::new([DocumentId::new("d2")]);
    let outcome = engine
        .run(
            &base,
            Some(scope),
            Arc::new(NoopProgress),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    // Only d2 may be scanned: the override's call site is found, the base
    // calls in d1/d3 are not.
    assert_eq!(outcome.results.references_for(&derived).unwrap().len(), 1);
    assert_eq!(outcome.results.references_for(&base).unwrap().len(), 0);
}

#[tokio::test]
async fn pre_cancelled_token_invokes_no_finder() {
    let (solution, base, _) = override_fixture();
    let engine = FindReferencesEngine::new(
        solution,
        vec![Arc::new(PanickingFinder)],
        SearchOptions::default(),
    );

    let token = CancellationToken::new();
    token.cancel();
    let result = engine
        .run(&base, None, Arc::new(NoopProgress), token)
        .await;

    assert!(matches!(result, Err(SearchError::Cancelled)));
}

#[tokio::test]
async fn one_broken_finder_does_not_suppress_other_results() {
    let (solution, base, derived) = override_fixture();
    let mut finders = default_finders();
    finders.push(Arc::new(ThrowingFinder));
    let engine = FindReferencesEngine::new(solution, finders, SearchOptions::default());

    let outcome = engine.find_references(&base).await.unwrap();

    // The ordinary finder's results survive intact.
    assert_eq!(outcome.results.references_for(&derived).unwrap().len(), 1);
    assert_eq!(outcome.results.references_for(&base).unwrap().len(), 2);

    // And every scan failure is reported in the aggregate.
    let failure = outcome.failure.expect("throwing finder must be reported");
    assert!(
        failure
            .failures()
            .iter()
            .all(|f| f.to_string().contains("throwing")),
        "unexpected failure set: {failure}"
    );
}

#[tokio::test]
async fn pipeline_stages_log_under_their_scoped_spans() {
    use std::io;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(capture.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);

    let (solution, base, _) = override_fixture();
    let engine = FindReferencesEngine::with_default_finders(solution, SearchOptions::default());
    engine.find_references(&base).await.unwrap();
    drop(guard);

    let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(
        output.contains("expand_symbols"),
        "expansion logs missing their span: {output}"
    );
    assert!(
        output.contains("build_project_map"),
        "map-building logs missing their span: {output}"
    );
}

#[tokio::test]
async fn streamed_callbacks_cover_the_full_snapshot() {
    let (solution, base, _) = override_fixture();
    let engine = FindReferencesEngine::with_default_finders(solution, SearchOptions::default());

    let progress = Arc::new(CollectingProgress::default());
    let outcome = engine
        .run(
            &base,
            None,
            Arc::clone(&progress) as Arc<dyn crate::progress::SearchProgress>,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let mut streamed_definitions = progress.definitions.lock().unwrap().clone();
    streamed_definitions.sort();
    let mut snapshot_definitions: Vec<_> = outcome
        .results
        .definitions()
        .map(|(s, _)| s.id.clone())
        .collect();
    snapshot_definitions.sort();
    assert_eq!(streamed_definitions, snapshot_definitions);

    let streamed_references = progress.references.lock().unwrap().len();
    assert_eq!(streamed_references, outcome.results.reference_count());
}
