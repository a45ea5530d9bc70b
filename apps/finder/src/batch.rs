use std::future::Future;

use futures::future::join_all;
use tracing::debug;

use crate::config::BatchPlan;

/// Runs `work` over `items` in fixed-size batches. Items within a batch run
/// concurrently; batches run one after another with `plan.delay` between them.
/// `on_batch` sees each finished batch plus a running `(done, total)` count.
pub async fn run_in_batches<'a, T, R, F, Fut>(
    items: &'a [T],
    plan: BatchPlan,
    mut work: F,
    mut on_batch: impl FnMut(&[R], usize, usize),
) -> Vec<R>
where
    F: FnMut(&'a T) -> Fut,
    Fut: Future<Output = R>,
{
    let total = items.len();
    let mut results = Vec::with_capacity(total);

    for (batch_idx, chunk) in items.chunks(plan.size).enumerate() {
        let batch = join_all(chunk.iter().map(&mut work)).await;
        let done = (batch_idx * plan.size + chunk.len()).min(total);
        on_batch(&batch, done, total);
        results.extend(batch);

        if done < total && !plan.delay.is_zero() {
            debug!(delay_ms = plan.delay.as_millis() as u64, "Pausing between batches");
            tokio::time::sleep(plan.delay).await;
        }
    }

    results
}
