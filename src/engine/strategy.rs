// Execution strategy: one fan-out combinator, two schedules.
//
// Every fan-out in the pipeline (cascade, both map stages, the document scan)
// goes through `for_each`, so the sequential and parallel schedules are the
// same code path and must produce set-equal results - the dedup sinks make
// final membership independent of interleaving.
//
// Failure policy: a non-cancellation error from one item is pushed to the
// failure sink and siblings keep running; cancellation short-circuits and is
// the only error `for_each` itself returns.

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::{FailureSink, Result, SearchError};

/// Runtime-selected schedule for all pipeline fan-outs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Await each unit of work before starting the next
    Sequential,
    /// Fan out all units concurrently and join
    #[default]
    Parallel,
}

pub(crate) async fn for_each<T, F, Fut>(
    strategy: SearchStrategy,
    token: &CancellationToken,
    failures: &FailureSink,
    items: Vec<T>,
    f: F,
) -> Result<()>
where
    T: Send,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    match strategy {
        SearchStrategy::Sequential => {
            for item in items {
                if token.is_cancelled() {
                    return Err(SearchError::Cancelled);
                }
                if let Err(err) = f(item).await {
                    if err.is_cancelled() {
                        return Err(err);
                    }
                    failures.push(err);
                }
            }
            Ok(())
        }
        SearchStrategy::Parallel => {
            let f = &f;
            let mut pending: FuturesUnordered<_> = items
                .into_iter()
                .map(|item| async move {
                    // Guard each unit so nothing starts after cancellation,
                    // even though all futures are queued up front.
                    if token.is_cancelled() {
                        return Err(SearchError::Cancelled);
                    }
                    f(item).await
                })
                .collect();

            let mut cancelled = false;
            while let Some(result) = pending.next().await {
                if let Err(err) = result {
                    if err.is_cancelled() {
                        cancelled = true;
                    } else {
                        failures.push(err);
                    }
                }
            }

            if cancelled || token.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn run(
        strategy: SearchStrategy,
        token: &CancellationToken,
        items: Vec<u32>,
    ) -> (Result<()>, Vec<u32>, Option<SearchError>) {
        let failures = FailureSink::new();
        let seen = Mutex::new(Vec::new());
        let result = for_each(strategy, token, &failures, items, |item| {
            let seen = &seen;
            async move {
                if item == 13 {
                    return Err(SearchError::finder("mock", anyhow::anyhow!("unlucky")));
                }
                seen.lock().unwrap().push(item);
                Ok(())
            }
        })
        .await;
        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        (result, seen, failures.into_aggregate())
    }

    #[tokio::test]
    async fn both_strategies_visit_the_same_items() {
        let token = CancellationToken::new();
        let items: Vec<u32> = (0..10).collect();
        let (seq_res, seq_seen, _) = run(SearchStrategy::Sequential, &token, items.clone()).await;
        let (par_res, par_seen, _) = run(SearchStrategy::Parallel, &token, items).await;
        assert!(seq_res.is_ok());
        assert!(par_res.is_ok());
        assert_eq!(seq_seen, par_seen);
    }

    #[tokio::test]
    async fn failures_do_not_stop_siblings() {
        let token = CancellationToken::new();
        for strategy in [SearchStrategy::Sequential, SearchStrategy::Parallel] {
            let (result, seen, failure) = run(strategy, &token, vec![1, 13, 2, 3]).await;
            assert!(result.is_ok(), "failures are sunk, not returned");
            assert_eq!(seen, vec![1, 2, 3]);
            let failure = failure.expect("the unlucky item must be reported");
            assert!(failure.to_string().contains("unlucky"));
        }
    }

    #[tokio::test]
    async fn pre_cancelled_token_runs_nothing() {
        let token = CancellationToken::new();
        token.cancel();
        for strategy in [SearchStrategy::Sequential, SearchStrategy::Parallel] {
            let failures = FailureSink::new();
            let invoked = AtomicUsize::new(0);
            let result = for_each(strategy, &token, &failures, vec![1, 2, 3], |_| {
                let invoked = &invoked;
                async move {
                    invoked.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;
            assert!(matches!(result, Err(SearchError::Cancelled)));
            assert_eq!(invoked.load(Ordering::SeqCst), 0);
            assert!(failures.is_empty());
        }
    }

    #[tokio::test]
    async fn cancellation_mid_flight_short_circuits_sequential() {
        let token = CancellationToken::new();
        let failures = FailureSink::new();
        let invoked = AtomicUsize::new(0);
        let result = for_each(
            SearchStrategy::Sequential,
            &token,
            &failures,
            vec![1, 2, 3, 4],
            |item| {
                let token = token.clone();
                let invoked = &invoked;
                async move {
                    invoked.fetch_add(1, Ordering::SeqCst);
                    if item == 2 {
                        token.cancel();
                    }
                    Ok(())
                }
            },
        )
        .await;
        assert!(matches!(result, Err(SearchError::Cancelled)));
        // Items 1 and 2 ran; 3 and 4 were never started.
        assert_eq!(invoked.load(Ordering::SeqCst), 2);
    }
}
