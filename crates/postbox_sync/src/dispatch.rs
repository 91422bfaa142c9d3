//! Concurrent fan-out of remote operations.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

/// Options for dispatching remote calls.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Maximum number of calls in flight. `None` launches every call at once.
    pub concurrency: Option<usize>,
}

impl DispatchOptions {
    pub fn unbounded() -> Self {
        Self { concurrency: None }
    }

    pub fn bounded(limit: usize) -> Self {
        Self {
            concurrency: Some(limit.max(1)),
        }
    }
}

/// Run `op` for every item and wait for all of them to settle.
///
/// A failing call never cancels its siblings. Results come back in input
/// order, one slot per item.
pub async fn dispatch<T, R, F, Fut>(items: Vec<T>, options: &DispatchOptions, op: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    debug!(
        "Dispatching {} remote calls (limit: {:?})",
        items.len(),
        options.concurrency
    );

    let semaphore = options
        .concurrency
        .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

    let tasks = items.into_iter().map(|item| {
        let semaphore = semaphore.clone();
        let call = op(item);
        async move {
            let _permit = match &semaphore {
                Some(semaphore) => semaphore.acquire().await.ok(),
                None => None,
            };
            call.await
        }
    });

    join_all(tasks).await
}
