//! Batch execution with a hard bound on concurrent provider calls
//!
//! Items are split into fixed-size chunks that run strictly in order: every
//! call in batch N settles before batch N+1 dispatches. Within a batch all
//! calls run concurrently. Results land in input order because each chunk is
//! awaited as a unit and extended onto the output, never pushed on
//! completion.

use futures::future::join_all;
use std::future::Future;

/// Called once per batch boundary with (batch_number, total_batches, batch_len)
pub type BatchObserver<'a> = &'a (dyn Fn(usize, usize, usize) + Send + Sync);

/// Execute `items` through `run` with at most `batch_size` calls in flight.
///
/// `run` receives the item's index in the original sequence and the item
/// itself; its output is placed at that index in the returned vector. The
/// executor never fails: per-item error policy belongs in `run` itself
/// (return a placeholder, a Result, whatever the stage needs).
pub async fn run_in_batches<T, F, Fut, R>(
    items: Vec<T>,
    batch_size: usize,
    observer: Option<BatchObserver<'_>>,
    run: F,
) -> Vec<R>
where
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = R>,
{
    let batch_size = batch_size.max(1);
    let total = items.len();
    let total_batches = total.div_ceil(batch_size);

    let mut results = Vec::with_capacity(total);
    let mut indexed: Vec<(usize, T)> = items.into_iter().enumerate().collect();

    let mut batch_num = 0;
    while !indexed.is_empty() {
        let take = batch_size.min(indexed.len());
        let batch: Vec<(usize, T)> = indexed.drain(..take).collect();
        batch_num += 1;

        if let Some(observe) = observer {
            observe(batch_num, total_batches, batch.len());
        }

        let futures: Vec<_> = batch.into_iter().map(|(idx, item)| run(idx, item)).collect();
        results.extend(join_all(futures).await);
    }

    results
}
