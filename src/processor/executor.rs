//! Sharded parallel evaluation of a report run.
//!
//! Stores are split into contiguous chunks of the sorted id list, each chunk
//! is evaluated on a blocking worker, and the partial results are merged and
//! re-sorted so the outcome matches the sequential `run_report`.

use crate::engine::{
    assemble, evaluate_shard, prepare, DatasetSnapshot, ReportOptions, ReportOutcome, StoreInputs,
    StoreResult,
};
use crate::errors::AppResult;
use crate::types::statistics::StatisticsCollector;
use crate::types::RunStats;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

/// Split `stores` into at most `workers` contiguous, non-empty chunks
pub fn shard_stores(
    stores: Vec<(String, StoreInputs)>,
    workers: usize,
) -> Vec<Vec<(String, StoreInputs)>> {
    if stores.is_empty() {
        return Vec::new();
    }
    let chunk_size = stores.len().div_ceil(workers.max(1));

    let mut shards = Vec::new();
    let mut iter = stores.into_iter().peekable();
    while iter.peek().is_some() {
        shards.push(iter.by_ref().take(chunk_size).collect());
    }
    shards
}

/// Evaluate every store across `workers` blocking tasks
pub async fn run_sharded(
    snapshot: &DatasetSnapshot,
    options: &ReportOptions,
    workers: usize,
) -> AppResult<(ReportOutcome, RunStats)> {
    let mut stats = RunStats::new();

    let (plan, stores) = prepare(snapshot, options)?;
    stats.stores_total = stores.len();

    let shards = shard_stores(stores.into_iter().collect(), workers);
    stats.shards = shards.len();
    info!(
        "Evaluating {} stores in {} shards (reference time {})",
        stats.stores_total,
        stats.shards,
        plan.reference_time
    );

    let conversion = options.conversion;
    let partials: Vec<_> = stream::iter(shards.into_iter().enumerate())
        .map(move |(index, shard)| async move {
            let result =
                tokio::task::spawn_blocking(move || evaluate_shard(&shard, &plan, &conversion))
                    .await;
            debug!("Shard {} finished", index);
            result
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    let mut results: Vec<StoreResult> = Vec::with_capacity(stats.stores_total);
    for partial in partials {
        results.extend(partial?);
    }

    let outcome = assemble(&plan, results, options.failure_policy)?;
    stats.stores_failed = outcome.failures.len();
    stats.finish();
    info!("{}", stats.summary());

    Ok((outcome, stats))
}
