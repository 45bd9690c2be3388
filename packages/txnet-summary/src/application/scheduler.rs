//! Last-request-wins summary scheduling
//!
//! Burn-in edits can arrive faster than a summary completes. Every `submit`
//! bumps a generation counter; in-flight work for an older generation sees
//! its cancellation token flip, stops replaying, and its result is never
//! published over a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::SummaryConfig;
use crate::domain::{EdgeWeights, TransitionSequence};
use crate::errors::SummaryError;
use crate::infrastructure::{CancellationToken, ParallelBurninSummarizer};

/// A completed summary that won its generation
#[derive(Debug, Clone)]
pub struct PublishedSummary {
    pub generation: u64,
    pub burnin: usize,
    pub weights: Arc<EdgeWeights>,
}

type SummaryOutcome = Result<Arc<EdgeWeights>, SummaryError>;

/// Handle to one submitted request
#[derive(Debug)]
pub struct SummaryTicket {
    generation: u64,
    receiver: mpsc::Receiver<SummaryOutcome>,
}

impl SummaryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Block until this request finishes or is superseded
    pub fn wait(self) -> SummaryOutcome {
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(SummaryError::failed("summary worker exited without a result")))
    }

    /// Non-blocking poll
    pub fn try_result(&self) -> Option<SummaryOutcome> {
        self.receiver.try_recv().ok()
    }
}

/// Runs summaries on background threads, newest request wins
pub struct SummaryScheduler {
    summarizer: ParallelBurninSummarizer,
    generation: Arc<AtomicU64>,
    published: Arc<Mutex<Option<PublishedSummary>>>,
}

impl SummaryScheduler {
    pub fn new(summarizer: ParallelBurninSummarizer) -> Self {
        Self {
            summarizer,
            generation: Arc::new(AtomicU64::new(0)),
            published: Arc::new(Mutex::new(None)),
        }
    }

    pub fn from_config(config: &SummaryConfig) -> Self {
        Self::new(ParallelBurninSummarizer::from_config(config))
    }

    /// Start summarizing `sequence` at `burnin`, superseding any in-flight request
    pub fn submit(&self, sequence: Arc<TransitionSequence>, burnin: usize) -> SummaryTicket {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let token = CancellationToken::for_generation(generation, Arc::clone(&self.generation));
        let summarizer = self.summarizer.clone();
        let published = Arc::clone(&self.published);
        let (sender, receiver) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name(format!("txnet-summary-{}", generation))
            .spawn(move || {
                let outcome = summarizer
                    .summarize_cancellable(&sequence, burnin, &token)
                    .map(Arc::new)
                    .and_then(|weights| {
                        publish(&published, &token, generation, burnin, Arc::clone(&weights))
                            .map(|_| weights)
                    });
                if let Err(SummaryError::Superseded { .. }) = &outcome {
                    debug!("Summary generation {} superseded", generation);
                }
                // The ticket may already be dropped
                let _ = sender.send(outcome);
            });

        if let Err(e) = spawned {
            warn!("Failed to start summary worker: {}", e);
        }

        SummaryTicket {
            generation,
            receiver,
        }
    }

    /// Supersede every in-flight request without starting a new one
    pub fn cancel_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Generation of the newest submitted request
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Most recent published summary
    pub fn latest(&self) -> Option<PublishedSummary> {
        self.published.lock().clone()
    }

    /// Published summary only if it belongs to the newest request
    pub fn current(&self) -> Option<PublishedSummary> {
        self.latest()
            .filter(|summary| summary.generation == self.current_generation())
    }
}

fn publish(
    slot: &Mutex<Option<PublishedSummary>>,
    token: &CancellationToken,
    generation: u64,
    burnin: usize,
    weights: Arc<EdgeWeights>,
) -> Result<(), SummaryError> {
    let mut slot = slot.lock();
    if token.is_cancelled() || slot.as_ref().is_some_and(|p| p.generation > generation) {
        return Err(SummaryError::Superseded { generation });
    }
    *slot = Some(PublishedSummary {
        generation,
        burnin,
        weights,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NetworkTransition;

    fn scenario() -> Arc<TransitionSequence> {
        Arc::new(
            vec![
                NetworkTransition::new(vec![1], vec![]),
                NetworkTransition::new(vec![5], vec![]),
                NetworkTransition::new(vec![], vec![1]),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn test_single_request_publishes() {
        let scheduler = SummaryScheduler::new(ParallelBurninSummarizer::new(2));
        let ticket = scheduler.submit(scenario(), 0);
        assert_eq!(ticket.generation(), 1);

        let weights = ticket.wait().unwrap();
        assert!((weights[&1] - 2.0 / 3.0).abs() < 1e-9);

        let current = scheduler.current().unwrap();
        assert_eq!(current.generation, 1);
        assert_eq!(current.burnin, 0);
    }

    #[test]
    fn test_newer_request_wins() {
        let scheduler = SummaryScheduler::new(ParallelBurninSummarizer::new(2));
        let first = scheduler.submit(scenario(), 0);
        let second = scheduler.submit(scenario(), 2);

        let second_weights = second.wait().unwrap();
        match first.wait() {
            Ok(_) | Err(SummaryError::Superseded { .. }) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }

        let latest = scheduler.latest().unwrap();
        assert_eq!(latest.generation, 2);
        assert_eq!(latest.burnin, 2);
        assert_eq!(*latest.weights, *second_weights);
    }

    #[test]
    fn test_publish_rejects_older_generation() {
        let slot = Mutex::new(None);
        let latest = Arc::new(AtomicU64::new(3));

        let newer = CancellationToken::for_generation(3, Arc::clone(&latest));
        publish(&slot, &newer, 3, 0, Arc::new(EdgeWeights::default())).unwrap();

        let older = CancellationToken::for_generation(2, Arc::clone(&latest));
        let err = publish(&slot, &older, 2, 0, Arc::new(EdgeWeights::default())).unwrap_err();
        assert_eq!(err, SummaryError::Superseded { generation: 2 });
        assert_eq!(slot.lock().as_ref().map(|p| p.generation), Some(3));
    }

    #[test]
    fn test_cancel_all_invalidates_current() {
        let scheduler = SummaryScheduler::new(ParallelBurninSummarizer::new(1));
        scheduler.submit(scenario(), 0).wait().unwrap();
        assert!(scheduler.current().is_some());

        scheduler.cancel_all();
        assert!(scheduler.current().is_none());
        assert!(scheduler.latest().is_some());
    }
}
