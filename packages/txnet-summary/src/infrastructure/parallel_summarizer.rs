//! Parallel burn-in summarizer
//!
//! Snapshot-then-shard: diffs are relative, so a shard cannot start from an
//! empty edge set. The coordinator replays the log once, sequentially, to
//! the burn-in boundary and on through every shard start, handing each shard
//! its true starting state. Shards then replay their own ranges on a rayon
//! pool and the partial weight maps are summed.
//!
//! ```text
//! samples:   0 .. burnin | burnin | burnin+1 ........................ total
//!            (excluded)  |  seed  |  shard 0  |  shard 1  | .. | shard k-1
//!                        ▲        ▲           ▲
//!                boundary state   seeds computed by one sequential pass
//! ```
//!
//! The summary window is `[burnin, total)`: sample `burnin` contributes
//! through the boundary state, the shards cover the rest. Each sample adds
//! `1 / (total - burnin)`, so an edge present in every window sample sums to 1.

use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::config::{resolve_concurrency, SummaryConfig};
use crate::domain::{EdgeSet, EdgeWeights, TransitionSequence};
use crate::errors::SummaryError;

use super::cancellation::CancellationToken;
use super::replay::{EdgeStateReplayEngine, ReplayFault, ReplayOutcome};

/// Split `window` into at most `shards` contiguous, near-equal ranges
///
/// Every range has `len / shards` samples; the last absorbs the remainder.
/// An empty window yields no shards.
pub fn plan_shards(window: Range<usize>, shards: usize) -> Vec<Range<usize>> {
    let len = window.end.saturating_sub(window.start);
    if len == 0 {
        return Vec::new();
    }

    let count = shards.clamp(1, len);
    let size = len / count;
    (0..count)
        .map(|i| {
            let start = window.start + i * size;
            let end = if i + 1 == count {
                window.end
            } else {
                start + size
            };
            start..end
        })
        .collect()
}

/// Sum `partial` into `into` (union of keys, per-key addition)
pub fn merge_weight_maps(into: &mut EdgeWeights, partial: EdgeWeights) {
    for (edge, weight) in partial {
        *into.entry(edge).or_insert(0.0) += weight;
    }
}

struct ShardTask {
    id: usize,
    range: Range<usize>,
    seed: EdgeSet,
}

/// Computes post-burn-in edge weights with concurrent shard replay
#[derive(Debug, Clone)]
pub struct ParallelBurninSummarizer {
    concurrency: usize,
}

impl ParallelBurninSummarizer {
    /// `concurrency = 0` uses the available parallelism
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: resolve_concurrency(concurrency),
        }
    }

    pub fn from_config(config: &SummaryConfig) -> Self {
        Self::new(config.concurrency)
    }

    /// Resolved worker count
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Edge weights over samples `[burnin, total)`
    ///
    /// `total == 0` or `burnin >= total` yields an empty map.
    pub fn summarize(
        &self,
        sequence: &TransitionSequence,
        burnin: usize,
    ) -> Result<EdgeWeights, SummaryError> {
        self.summarize_cancellable(sequence, burnin, &CancellationToken::none())
    }

    /// [`summarize`](Self::summarize) that gives up once `token` is cancelled
    pub fn summarize_cancellable(
        &self,
        sequence: &TransitionSequence,
        burnin: usize,
        token: &CancellationToken,
    ) -> Result<EdgeWeights, SummaryError> {
        let total = sequence.len();
        if total == 0 || burnin >= total {
            debug!("Nothing to summarize (samples={}, burnin={})", total, burnin);
            return Ok(EdgeWeights::default());
        }

        let plan = plan_shards(burnin + 1..total, self.concurrency);
        self.summarize_with_plan(sequence, burnin, plan, token)
    }

    /// Summarize with an explicit shard partition of `[burnin + 1, total)`
    ///
    /// `plan` must be contiguous, ordered and cover the window exactly.
    pub fn summarize_with_plan(
        &self,
        sequence: &TransitionSequence,
        burnin: usize,
        plan: Vec<Range<usize>>,
        token: &CancellationToken,
    ) -> Result<EdgeWeights, SummaryError> {
        let total = sequence.len();
        if total == 0 || burnin >= total {
            return Ok(EdgeWeights::default());
        }
        assert_covers(&plan, burnin + 1..total);

        let started = Instant::now();
        let engine = EdgeStateReplayEngine::new(sequence);
        let increment = 1.0 / (total - burnin) as f64;

        let boundary = engine
            .state_at(burnin + 1)
            .map_err(|fault| fault_error(None, fault, token))?;
        debug!(
            "Burn-in boundary at sample {}: {} edges present",
            burnin,
            boundary.len()
        );

        let tasks = seed_shards(&engine, &boundary, plan, token)?;
        let workers = tasks.len().min(self.concurrency);
        info!(
            "Summarizing {} samples (burnin={}) across {} shards on {} workers",
            total - burnin,
            burnin,
            tasks.len(),
            workers
        );

        let results: Vec<Result<ReplayOutcome, SummaryError>> = if tasks.is_empty() {
            Vec::new()
        } else {
            let pool = ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("txnet-shard-{}", i))
                .build()
                .map_err(|e| SummaryError::failed(format!("worker pool: {}", e)))?;
            pool.install(|| {
                tasks
                    .into_par_iter()
                    .map(|task| run_shard(&engine, task, increment, token))
                    .collect()
            })
        };

        if token.is_cancelled() {
            return Err(superseded(token));
        }

        // Sample `burnin` itself, carried by the boundary state
        let mut merged: EdgeWeights = boundary.iter().map(|&edge| (edge, increment)).collect();
        for result in results {
            merge_weight_maps(&mut merged, result?.weight_delta);
        }

        info!(
            "Summarized {} edges in {:.1}ms",
            merged.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(merged)
    }
}

/// One sequential pass from the boundary through every shard start
fn seed_shards(
    engine: &EdgeStateReplayEngine<'_>,
    boundary: &EdgeSet,
    plan: Vec<Range<usize>>,
    token: &CancellationToken,
) -> Result<Vec<ShardTask>, SummaryError> {
    let mut state = boundary.clone();
    let mut cursor = plan.first().map_or(0, |r| r.start);
    let mut tasks = Vec::with_capacity(plan.len());

    for (id, range) in plan.into_iter().enumerate() {
        if token.is_cancelled() {
            return Err(superseded(token));
        }
        engine
            .advance(&mut state, cursor..range.start)
            .map_err(|fault| fault_error(Some(id), fault, token))?;
        cursor = range.start;
        tasks.push(ShardTask {
            id,
            range,
            seed: state.clone(),
        });
    }
    Ok(tasks)
}

fn run_shard(
    engine: &EdgeStateReplayEngine<'_>,
    task: ShardTask,
    increment: f64,
    token: &CancellationToken,
) -> Result<ReplayOutcome, SummaryError> {
    let ShardTask { id, range, seed } = task;
    let span = range.clone();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        engine.replay_range_cancellable(seed, range, increment, token)
    }));

    match result {
        Ok(Ok(outcome)) => {
            debug!(
                "Shard {} [{}, {}) done: {} edges",
                id,
                span.start,
                span.end,
                outcome.weight_delta.len()
            );
            Ok(outcome)
        }
        Ok(Err(fault)) => Err(fault_error(Some(id), fault, token)),
        Err(payload) => Err(SummaryError::shard_failed(id, panic_message(payload.as_ref()))),
    }
}

fn assert_covers(plan: &[Range<usize>], window: Range<usize>) {
    let mut cursor = window.start;
    for range in plan {
        assert!(
            range.start == cursor && range.start < range.end,
            "shard {:?} does not continue the partition at {}",
            range,
            cursor
        );
        cursor = range.end;
    }
    assert_eq!(cursor, window.end, "shard plan does not cover {:?}", window);
}

fn fault_error(shard: Option<usize>, fault: ReplayFault, token: &CancellationToken) -> SummaryError {
    match fault {
        ReplayFault::Cancelled { .. } => superseded(token),
        other => SummaryError::SummarizationFailed {
            shard,
            reason: other.to_string(),
        },
    }
}

fn superseded(token: &CancellationToken) -> SummaryError {
    SummaryError::Superseded {
        generation: token.generation().unwrap_or_default(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", s)
    } else {
        "worker panicked".to_string()
    }
}
